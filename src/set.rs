//! Associative lookup and the way-order primitives within one set.
//!
//! A set is a slice of [`Block`]s; a way id is an index into that slice.
//! Under the strict-LRU policy the slice order itself is the recency order
//! (index 0 = most recently used), so promotion and demotion physically
//! reposition blocks. Every other policy treats a way's position as a stable
//! identity and never reorders the slice.

use crate::cache::Block;

/// Find the way holding `tag` in this set.
///
/// A way matches iff its block is valid, its tag equals `tag`, and its
/// security-domain flag equals `is_secure`. Returns the lowest matching way
/// id (the tie-break if the caller ever violates the one-tag-per-set
/// invariant), or `None`.
pub fn find_way(ways: &[Block], tag: usize, is_secure: bool) -> Option<usize> {
    ways.iter()
        .position(|b| b.valid && b.tag == tag && b.secure == is_secure)
}

/// Move `way` to the head of the set, preserving the relative order of every
/// other way. No-op if `way` is already the head or is out of range.
pub fn move_to_head(ways: &mut [Block], way: usize) {
    if way == 0 || way >= ways.len() {
        return;
    }
    ways[..=way].rotate_right(1);
}

/// Move `way` to the tail of the set, preserving the relative order of every
/// other way. No-op if `way` is already the tail or is out of range.
pub fn move_to_tail(ways: &mut [Block], way: usize) {
    if way + 1 >= ways.len() {
        return;
    }
    ways[way..].rotate_left(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(tags: &[usize]) -> Vec<Block> {
        tags.iter()
            .map(|&tag| Block {
                valid: true,
                secure: false,
                tag,
            })
            .collect()
    }

    fn tags(ways: &[Block]) -> Vec<usize> {
        ways.iter().map(|b| b.tag).collect()
    }

    #[test]
    fn find_matches_tag_valid_and_secure() {
        let mut ways = set_of(&[10, 11, 12, 13]);
        assert_eq!(find_way(&ways, 12, false), Some(2));
        assert_eq!(find_way(&ways, 12, true), None);
        assert_eq!(find_way(&ways, 99, false), None);

        ways[2].valid = false;
        assert_eq!(find_way(&ways, 12, false), None);

        ways[1].secure = true;
        assert_eq!(find_way(&ways, 11, false), None);
        assert_eq!(find_way(&ways, 11, true), Some(1));
    }

    #[test]
    fn find_returns_lowest_way_on_duplicate_tags() {
        let ways = set_of(&[7, 7, 7]);
        assert_eq!(find_way(&ways, 7, false), Some(0));
    }

    #[test]
    fn move_to_head_preserves_relative_order() {
        let mut ways = set_of(&[0, 1, 2, 3]);
        move_to_head(&mut ways, 2);
        assert_eq!(tags(&ways), vec![2, 0, 1, 3]);
    }

    #[test]
    fn consecutive_promotions_reverse_into_tail() {
        let mut ways = set_of(&[0, 1, 2, 3]);
        for way in 0..4 {
            let pos = find_way(&ways, way, false).unwrap();
            move_to_head(&mut ways, pos);
        }
        // Last promoted is MRU; the earliest sit at the tail in reverse.
        assert_eq!(tags(&ways), vec![3, 2, 1, 0]);
    }

    #[test]
    fn move_to_tail_preserves_relative_order() {
        let mut ways = set_of(&[0, 1, 2, 3]);
        move_to_tail(&mut ways, 1);
        assert_eq!(tags(&ways), vec![0, 2, 3, 1]);
    }

    #[test]
    fn reorders_are_noops_when_in_place_or_out_of_range() {
        let mut ways = set_of(&[0, 1, 2, 3]);
        move_to_head(&mut ways, 0);
        move_to_tail(&mut ways, 3);
        move_to_head(&mut ways, 9);
        move_to_tail(&mut ways, 9);
        assert_eq!(tags(&ways), vec![0, 1, 2, 3]);
    }
}

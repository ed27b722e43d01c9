//! Strict LRU.
//!
//! Carries no state of its own: the way array's physical order *is* the
//! recency order. Index 0 is the most recently used way, the last index the
//! least, so victim selection is always the last slot and every touch is a
//! sub-range rotation via [`crate::set`].

use crate::{cache::Block, set};

use super::Replace;

/// Stateless strict-LRU policy; recency lives in the way order itself.
#[derive(Debug, Default)]
pub struct Lru;

impl Lru {
    pub fn new() -> Self {
        Lru
    }
}

impl Replace for Lru {
    fn record_access(&mut self, ways: &mut [Block], way: usize) {
        set::move_to_head(ways, way);
    }

    fn record_fill(&mut self, ways: &mut [Block], way: usize) {
        set::move_to_head(ways, way);
    }

    fn record_removal(&mut self, ways: &mut [Block], way: usize) {
        set::move_to_tail(ways, way);
    }

    fn select_victim(&mut self, ways: &[Block]) -> Option<usize> {
        ways.len().checked_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(n: usize) -> Vec<Block> {
        (0..n)
            .map(|tag| Block {
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
    fn victim_is_always_the_tail() {
        let mut lru = Lru::new();
        let mut ways = set_of(4);

        lru.record_access(&mut ways, 2);
        assert_eq!(tags(&ways), vec![2, 0, 1, 3]);
        assert_eq!(lru.select_victim(&ways), Some(3));

        // The victim slot is refilled in place, then promoted.
        ways[3].tag = 9;
        lru.record_fill(&mut ways, 3);
        assert_eq!(tags(&ways), vec![9, 2, 0, 1]);
        assert_eq!(lru.select_victim(&ways), Some(3));
    }

    #[test]
    fn removal_demotes_to_tail() {
        let mut lru = Lru::new();
        let mut ways = set_of(4);
        lru.record_removal(&mut ways, 1);
        assert_eq!(tags(&ways), vec![0, 2, 3, 1]);
    }

    #[test]
    fn empty_set_has_no_victim() {
        let mut lru = Lru::new();
        assert_eq!(lru.select_victim(&[]), None);
    }
}

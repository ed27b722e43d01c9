//! MRU bit-vector policy.
//!
//! One bit per way plus a saturating count of set bits. Marking a way as
//! recently used sets its bit; when every bit would be set, the vector
//! saturates and all bits except the just-marked way's are cleared, so the
//! stale recency information is discarded en masse instead of tracked
//! precisely. The eviction candidate is the lowest-indexed way with a clear
//! bit.
//!
//! Invariant: `set_count` equals the number of set bits at all times.

use crate::cache::Block;

use super::Replace;

/// Approximate-recency policy over a per-way bit vector.
#[derive(Debug)]
pub struct MruBits {
    bits: Vec<bool>,
    set_count: usize,
}

impl MruBits {
    pub fn new(n_ways: usize) -> Self {
        MruBits {
            bits: vec![false; n_ways],
            set_count: 0,
        }
    }

    /// Mark `way` as most recently used, saturating when the vector fills.
    fn mark(&mut self, way: usize) {
        let Some(bit) = self.bits.get_mut(way) else {
            return;
        };
        if !*bit {
            *bit = true;
            self.set_count += 1;
        }
        if self.set_count == self.bits.len() {
            self.bits.fill(false);
            self.bits[way] = true;
            self.set_count = 1;
        }
    }

    /// Clear `way`'s bit, making it an eviction candidate again.
    fn clear(&mut self, way: usize) {
        let Some(bit) = self.bits.get_mut(way) else {
            return;
        };
        if *bit {
            *bit = false;
            self.set_count -= 1;
        }
    }
}

impl Replace for MruBits {
    fn record_access(&mut self, _ways: &mut [Block], way: usize) {
        self.mark(way);
    }

    fn record_fill(&mut self, _ways: &mut [Block], way: usize) {
        self.mark(way);
    }

    fn record_removal(&mut self, _ways: &mut [Block], way: usize) {
        self.clear(way);
    }

    fn select_victim(&mut self, _ways: &[Block]) -> Option<usize> {
        match self.bits.iter().position(|&b| !b) {
            Some(way) => Some(way),
            None => {
                // Saturation keeps at least one bit clear whenever there is
                // more than one way; a fully-set vector is only legitimate
                // for a single-way set.
                debug_assert!(self.bits.len() <= 1, "mru bit vector fully set");
                self.bits.len().checked_sub(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_is_lowest_clear_bit() {
        let mut mru = MruBits::new(4);
        mru.mark(0);
        mru.mark(2);
        assert_eq!(mru.select_victim(&[]), Some(1));
    }

    #[test]
    fn marking_every_way_saturates_to_the_last() {
        let mut mru = MruBits::new(4);
        for way in 0..4 {
            mru.mark(way);
        }
        assert_eq!(mru.set_count, 1);
        assert_eq!(mru.bits, vec![false, false, false, true]);
        assert_eq!(mru.select_victim(&[]), Some(0));
    }

    #[test]
    fn remarking_a_set_way_does_not_inflate_the_count() {
        let mut mru = MruBits::new(4);
        mru.mark(1);
        mru.mark(1);
        mru.mark(1);
        assert_eq!(mru.set_count, 1);
        assert_eq!(mru.bits.iter().filter(|&&b| b).count(), mru.set_count);
    }

    #[test]
    fn clear_reopens_a_way_for_eviction() {
        let mut mru = MruBits::new(4);
        mru.mark(0);
        mru.mark(1);
        mru.clear(0);
        assert_eq!(mru.set_count, 1);
        assert_eq!(mru.select_victim(&[]), Some(0));

        // Clearing an already-clear or out-of-range way changes nothing.
        mru.clear(0);
        mru.clear(7);
        assert_eq!(mru.set_count, 1);
    }

    #[test]
    fn single_way_set_always_evicts_way_zero() {
        let mut mru = MruBits::new(1);
        mru.mark(0);
        assert_eq!(mru.select_victim(&[]), Some(0));
    }
}

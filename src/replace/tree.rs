//! Tree pseudo-LRU policy.
//!
//! A complete binary tree with one way per leaf and one direction bit per
//! internal node, stored breadth-first (root at 0, children of `n` at
//! `2n + 1` and `2n + 2`). Updates walk the root-to-leaf path for a way,
//! rewriting each visited node's bit; victim selection walks the recorded
//! bits to a leaf. Every operation is a log-depth walk, and the whole
//! recency estimate fits in `assoc - 1` bits.
//!
//! Two directional primitives exist: marking the path *toward* a way steers
//! the next victim walk at it, marking *away* steers the walk off it. The
//! tag store here wires hits to away-marking ([`Replace::record_access`])
//! and fills to toward-marking ([`Replace::record_fill`]); both stay exposed
//! so an owner with the opposite contract can call either.

use crate::{cache::Block, config::ConfigError};

use super::Replace;

/// Pseudo-LRU bit tree over a power-of-two number of ways.
#[derive(Debug)]
pub struct TreePlru {
    /// Direction bits for the `n_ways - 1` internal nodes, breadth-first.
    dir: Vec<bool>,
    n_ways: usize,
}

impl TreePlru {
    /// Fails unless `n_ways` is a power of two: the walk halves the index
    /// range at every level, so any other associativity would produce wrong
    /// tree indices.
    pub fn new(n_ways: usize) -> Result<Self, ConfigError> {
        if !n_ways.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "ways",
                value: n_ways,
            });
        }
        Ok(TreePlru {
            dir: vec![false; n_ways - 1],
            n_ways,
        })
    }

    /// Walk the root-to-leaf path for `way`, writing at each internal node
    /// the half containing the target (`toward`) or its complement (away).
    fn mark_path(&mut self, way: usize, toward: bool) {
        if way >= self.n_ways {
            return;
        }
        let mut node = 0;
        let mut span = self.n_ways;
        let mut rel = way;
        while span > 1 {
            span /= 2;
            let upper = rel >= span;
            self.dir[node] = if toward { upper } else { !upper };
            node = 2 * node + 1 + usize::from(upper);
            if upper {
                rel -= span;
            }
        }
    }
}

impl Replace for TreePlru {
    fn record_access(&mut self, _ways: &mut [Block], way: usize) {
        self.mark_path(way, false);
    }

    fn record_fill(&mut self, _ways: &mut [Block], way: usize) {
        self.mark_path(way, true);
    }

    fn select_victim(&mut self, _ways: &[Block]) -> Option<usize> {
        let mut node = 0;
        while node < self.n_ways - 1 {
            node = 2 * node + 1 + usize::from(self.dir[node]);
        }
        Some(node - (self.n_ways - 1))
    }
}

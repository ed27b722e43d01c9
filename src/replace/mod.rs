//! Replacement policies.
//!
//! Four mutually exclusive eviction disciplines over one way array:
//!
//! - [`lru::Lru`]: strict LRU by physically reordering the way array.
//! - [`mru::MruBits`]: bounded most-recently-used bit-vector approximation.
//! - [`tree::TreePlru`]: binary-tree pseudo-LRU approximation.
//! - [`twoq::TwoQ`]: two-queue (2Q) admission/promotion algorithm.
//!
//! One policy instance exists per set, chosen once when the owning cache is
//! built. The tag store drives the same protocol regardless of variant:
//! lookup, then [`Replace::record_access`] on a hit; on a miss, a vacant way
//! or [`Replace::select_victim`], the fill, then [`Replace::record_fill`].

pub mod lru;
pub mod mru;
pub mod tree;
pub mod twoq;

use crate::cache::Block;

/// Outcome of a single cache access, as seen by the driver.
pub enum AccessResult {
    Hit,
    Miss,
}

/// Per-set replacement policy state and its query/update operations.
///
/// `ways` is the set's block slice; `way` arguments are indices into it,
/// obtained from a prior lookup or victim selection on the same set. A `way`
/// the policy does not currently track (or one out of range) is a silent
/// no-op, never an error.
pub trait Replace {
    /// A lookup hit landed on `way`.
    fn record_access(&mut self, ways: &mut [Block], way: usize);

    /// A fresh fill landed on `way`. For 2Q this is the admission point and
    /// must be called exactly once per fill of a previously untracked way.
    fn record_fill(&mut self, ways: &mut [Block], way: usize);

    /// `way`'s block left the set (invalidation) without an immediate refill.
    fn record_removal(&mut self, _ways: &mut [Block], _way: usize) {}

    /// Pick the way to evict next. `None` means the policy tracks nothing
    /// evictable; the caller treats that as "nothing to evict".
    ///
    /// May update internal bookkeeping: 2Q pops the returned way from its
    /// queues, so the way is untracked until the caller re-admits one via
    /// [`Replace::record_fill`].
    fn select_victim(&mut self, ways: &[Block]) -> Option<usize>;
}

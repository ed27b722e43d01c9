//! Two-queue (2Q) admission policy.
//!
//! Tracks way ids in two FIFO queues: `a1` holds probationary ways (filled
//! once, never re-referenced), `am` holds hot ways (referenced at least
//! twice). A fresh fill enters the tail of `a1`; a hit promotes an `a1`
//! entry to the tail of `am`, or refreshes an `am` entry to its tail. The
//! victim comes from the head of `a1` whenever the probationary queue has
//! reached its configured bound `a1_thres`, otherwise from the head of `am`.
//! A way touched only once ages out of `a1` without ever disturbing the hot
//! queue; `a1_thres` decides how much of the set the probationary side may
//! hold before it starts paying for its own evictions.
//!
//! A way id lives in at most one queue at a time. Queue scans are O(queue
//! length), bounded by the associativity.

use std::collections::VecDeque;

use crate::{cache::Block, config::ConfigError};

use super::Replace;

/// 2Q policy state: probationary and hot ring buffers of way ids.
#[derive(Debug)]
pub struct TwoQ {
    a1: VecDeque<u16>,
    am: VecDeque<u16>,
    a1_thres: usize,
    n_ways: usize,
}

impl TwoQ {
    pub fn new(n_ways: usize, a1_thres: usize) -> Result<Self, ConfigError> {
        if a1_thres > n_ways {
            return Err(ConfigError::A1ThresholdOutOfRange {
                thres: a1_thres,
                assoc: n_ways,
            });
        }
        Ok(TwoQ {
            a1: VecDeque::with_capacity(n_ways),
            am: VecDeque::with_capacity(n_ways),
            a1_thres,
            n_ways,
        })
    }

    /// Detach `way` from whichever queue holds it.
    fn detach(&mut self, way: u16) -> bool {
        if let Some(pos) = self.a1.iter().position(|&w| w == way) {
            let _ = self.a1.remove(pos);
            true
        } else if let Some(pos) = self.am.iter().position(|&w| w == way) {
            let _ = self.am.remove(pos);
            true
        } else {
            false
        }
    }
}

impl Replace for TwoQ {
    /// Hit: refresh within `am`, or promote from `a1` to the tail of `am`.
    /// A way in neither queue is left untracked.
    fn record_access(&mut self, _ways: &mut [Block], way: usize) {
        let way = way as u16;
        if let Some(pos) = self.am.iter().position(|&w| w == way) {
            let _ = self.am.remove(pos);
            self.am.push_back(way);
        } else if let Some(pos) = self.a1.iter().position(|&w| w == way) {
            let _ = self.a1.remove(pos);
            self.am.push_back(way);
        }
    }

    /// Admission: a freshly filled way enters the tail of the probationary
    /// queue. A way that was somehow still tracked (an invalidation re-homes
    /// entries rather than dropping them) is detached first, so no way is
    /// ever queued twice.
    fn record_fill(&mut self, _ways: &mut [Block], way: usize) {
        if way >= self.n_ways {
            return;
        }
        let way = way as u16;
        let _ = self.detach(way);
        self.a1.push_back(way);
    }

    /// Re-home a tracked way without discarding its membership: detach it,
    /// then reinsert at the head of `a1` if the probationary queue is at or
    /// over its bound, else at the head of `am`.
    fn record_removal(&mut self, _ways: &mut [Block], way: usize) {
        let way = way as u16;
        if self.detach(way) {
            if self.a1.len() >= self.a1_thres {
                self.a1.push_front(way);
            } else {
                self.am.push_front(way);
            }
        }
    }

    /// Pop the oldest probationary way while `a1` is at or over its bound,
    /// else the oldest hot way; fall back to the other queue when the chosen
    /// one is empty. The returned way leaves the queues entirely.
    fn select_victim(&mut self, _ways: &[Block]) -> Option<usize> {
        let way = if self.a1.len() >= self.a1_thres {
            self.a1.pop_front().or_else(|| self.am.pop_front())
        } else {
            self.am.pop_front().or_else(|| self.a1.pop_front())
        };
        way.map(usize::from)
    }
}

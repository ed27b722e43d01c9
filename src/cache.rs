//! The owning tag store: block storage, address decomposition, and the
//! per-access protocol driven over the replacement policies.

use std::ops::{Not, Range};

use serde::Serialize;

use crate::{
    config::ConfigError,
    replace::{AccessResult, Replace},
    set,
};

/// An address split into its offset/set/tag components.
#[derive(Debug)]
pub struct Addr {
    pub offset: usize,
    pub set: usize,
    pub tag: usize,
}

#[derive(Debug)]
struct BitSection {
    shift: usize,
    mask: usize,
}

impl BitSection {
    fn apply(&self, num: usize) -> usize {
        (num >> self.shift) & self.mask
    }
}

#[derive(Serialize)]
pub struct CacheStats {
    name: String,
    hits: u64,
    misses: u64,
    miss_rate: f64,
    mpki: f64,
}

/// One cache block, externally owned relative to the policy engine. The
/// policies only read the tag, validity, and security-domain attributes and
/// reorder block slots; they never touch payload.
#[derive(Debug, Default)]
pub struct Block {
    pub valid: bool,
    pub secure: bool,
    pub tag: usize,
}

impl Block {
    fn fill(&mut self, addr: &Addr, is_secure: bool) {
        self.valid = true;
        self.secure = is_secure;
        self.tag = addr.tag;
    }
}

/// A set-associative cache level: a flat block array carved into sets of
/// `n_ways`, with one replacement-policy instance per set.
#[derive(Debug)]
pub struct Cache<P: Replace> {
    name: String,
    blocks: Vec<Block>,
    set_data: Vec<P>,
    pub n_ways: usize,
    pub n_sets: usize,
    offset_sec: BitSection,
    set_sec: BitSection,
    tag_sec: BitSection,
    hits: u64,
    misses: u64,
}

impl<P: Replace> Cache<P> {
    /// Build a cache level, constructing one policy instance per set via
    /// `make_set`. Geometry used for address slicing must be a power of two;
    /// policy-specific constraints (tree associativity, 2Q threshold) are
    /// enforced by the policy constructors themselves.
    pub fn new(
        name: String,
        block_size: usize,
        n_sets: usize,
        n_ways: usize,
        mut make_set: impl FnMut() -> Result<P, ConfigError>,
    ) -> Result<Self, ConfigError> {
        if n_ways == 0 {
            return Err(ConfigError::ZeroAssoc);
        }
        if !block_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "block_size",
                value: block_size,
            });
        }
        if !n_sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "sets",
                value: n_sets,
            });
        }

        let offset_sec = BitSection {
            shift: 0,
            mask: block_size - 1,
        };
        let set_shift = block_size.ilog2() as usize;
        let set_sec = BitSection {
            shift: set_shift,
            mask: n_sets - 1,
        };
        let tag_shift = n_sets.ilog2() as usize + set_shift;
        let tag_sec = BitSection {
            shift: tag_shift,
            mask: 0usize.not(),
        };

        let set_data = (0..n_sets)
            .map(|_| make_set())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Cache {
            name,
            blocks: std::iter::repeat_with(Block::default)
                .take(n_sets * n_ways)
                .collect(),
            set_data,
            n_ways,
            n_sets,
            offset_sec,
            set_sec,
            tag_sec,
            hits: 0,
            misses: 0,
        })
    }

    fn set_range(&self, set: usize) -> Range<usize> {
        set * self.n_ways..(set + 1) * self.n_ways
    }
}

/// Object-safe cache surface for the driver, which holds a heterogeneous
/// hierarchy of levels with different policy types.
pub trait IsCache {
    fn access(&mut self, addr: Addr, is_secure: bool) -> AccessResult;
    /// Drop the block matching `addr` from the cache, if present, notifying
    /// the set's policy. Returns whether a block was invalidated.
    fn invalidate(&mut self, addr: Addr, is_secure: bool) -> bool;
    fn split_addr(&self, addr: usize) -> Addr;
    fn hit(&mut self);
    fn miss(&mut self);
    fn clear_stats(&mut self);
    fn make_stats(&self, instr_count: u64) -> CacheStats;
}

impl<P: Replace> IsCache for Cache<P> {
    fn access(&mut self, addr: Addr, is_secure: bool) -> AccessResult {
        let range = self.set_range(addr.set);
        let ways = &mut self.blocks[range];
        let policy = &mut self.set_data[addr.set];

        if let Some(way) = set::find_way(ways, addr.tag, is_secure) {
            policy.record_access(ways, way);
            AccessResult::Hit
        } else {
            let way = match ways.iter().position(|b| !b.valid) {
                // A vacant way needs no eviction.
                Some(way) => way,
                // "Nothing to evict" from a full set only happens when a 2Q
                // policy has been drained by invalidations; fall back to the
                // first way rather than dropping the fill.
                None => policy.select_victim(ways).unwrap_or(0),
            };
            ways[way].fill(&addr, is_secure);
            policy.record_fill(ways, way);
            AccessResult::Miss
        }
    }

    fn invalidate(&mut self, addr: Addr, is_secure: bool) -> bool {
        let range = self.set_range(addr.set);
        let ways = &mut self.blocks[range];
        let policy = &mut self.set_data[addr.set];

        match set::find_way(ways, addr.tag, is_secure) {
            Some(way) => {
                ways[way].valid = false;
                policy.record_removal(ways, way);
                true
            }
            None => false,
        }
    }

    fn split_addr(&self, addr: usize) -> Addr {
        let offset = self.offset_sec.apply(addr);
        let set = self.set_sec.apply(addr);
        let tag = self.tag_sec.apply(addr);
        Addr { offset, set, tag }
    }

    fn hit(&mut self) {
        self.hits += 1;
    }

    fn miss(&mut self) {
        self.misses += 1;
    }

    fn clear_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    fn make_stats(&self, instr_count: u64) -> CacheStats {
        let total_access = (self.hits + self.misses) as f64;
        CacheStats {
            name: self.name.clone(),
            hits: self.hits,
            misses: self.misses,
            miss_rate: self.misses as f64 / total_access,
            mpki: self.misses as f64 * 1000.0 / instr_count as f64,
        }
    }
}

/// Walk one access down a hierarchy of levels: a hit at level *k* stops the
/// walk, a miss fills that level and falls through to level *k + 1*. Each
/// level's hit/miss counters are bumped along the way.
pub fn access_hierarchy(levels: &mut [Box<dyn IsCache>], addr: usize, is_secure: bool) {
    for level in levels.iter_mut() {
        match level.access(level.split_addr(addr), is_secure) {
            AccessResult::Hit => {
                level.hit();
                break;
            }
            AccessResult::Miss => level.miss(),
        }
    }
}

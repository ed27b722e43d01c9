//! JSON simulation config: geometry and replacement policy per cache level.

use serde::Deserialize;
use thiserror::Error;

use crate::{
    cache::{Cache, IsCache},
    replace::{lru::Lru, mru::MruBits, tree::TreePlru, twoq::TwoQ},
};

/// Construction-time rejection of a bad cache description. Policy operations
/// themselves never fail; everything checkable is checked here, before any
/// access runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a power of two, got {value}")]
    NotPowerOfTwo { field: &'static str, value: usize },
    #[error("a cache needs at least one way")]
    ZeroAssoc,
    #[error("a1_threshold {thres} exceeds the {assoc} ways of the set")]
    A1ThresholdOutOfRange { thres: usize, assoc: usize },
    #[error("the 2q policy requires an a1_threshold")]
    MissingA1Threshold,
    #[error("unrecognized replacement policy: {0}")]
    UnknownPolicy(String),
}

#[derive(Deserialize)]
struct CacheConfig {
    name: String,
    sets: usize,
    ways: usize,
    repl: String,
    #[serde(default)]
    a1_threshold: Option<usize>,
}

#[derive(Deserialize)]
pub struct Config {
    block_size: usize,
    caches: Vec<CacheConfig>,
}

impl Config {
    /// Instantiate every configured level, outermost policy choice fixed
    /// here once; the levels are driven uniformly through [`IsCache`].
    pub fn to_caches(self) -> Result<Vec<Box<dyn IsCache>>, ConfigError> {
        let block_size = self.block_size;
        self.caches
            .into_iter()
            .map(|cc| {
                let ways = cc.ways;
                let cache: Box<dyn IsCache> = match cc.repl.as_str() {
                    "lru" => Box::new(Cache::new(cc.name, block_size, cc.sets, ways, || {
                        Ok(Lru::new())
                    })?),
                    "mru" => Box::new(Cache::new(cc.name, block_size, cc.sets, ways, || {
                        Ok(MruBits::new(ways))
                    })?),
                    "plru" => Box::new(Cache::new(cc.name, block_size, cc.sets, ways, || {
                        TreePlru::new(ways)
                    })?),
                    "2q" => {
                        let thres = cc.a1_threshold.ok_or(ConfigError::MissingA1Threshold)?;
                        Box::new(Cache::new(cc.name, block_size, cc.sets, ways, || {
                            TwoQ::new(ways, thres)
                        })?)
                    }
                    other => return Err(ConfigError::UnknownPolicy(other.to_string())),
                };
                Ok(cache)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reduce to the level count so both unwrap and unwrap_err have a
    // Debug success type to print.
    fn parse(json: &str) -> Result<usize, ConfigError> {
        serde_json::from_str::<Config>(json)
            .unwrap()
            .to_caches()
            .map(|caches| caches.len())
    }

    #[test]
    fn builds_every_policy_variant() {
        let n_caches = parse(
            r#"{
                "block_size": 64,
                "caches": [
                    { "name": "l1", "sets": 64, "ways": 8, "repl": "lru" },
                    { "name": "l2", "sets": 256, "ways": 8, "repl": "mru" },
                    { "name": "l3", "sets": 1024, "ways": 16, "repl": "plru" },
                    { "name": "l4", "sets": 2048, "ways": 16, "repl": "2q", "a1_threshold": 8 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(n_caches, 4);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = parse(
            r#"{ "block_size": 64,
                 "caches": [{ "name": "l1", "sets": 64, "ways": 8, "repl": "fifo" }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPolicy(p) if p == "fifo"));
    }

    #[test]
    fn rejects_plru_with_non_power_of_two_ways() {
        let err = parse(
            r#"{ "block_size": 64,
                 "caches": [{ "name": "l1", "sets": 64, "ways": 12, "repl": "plru" }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotPowerOfTwo { field: "ways", value: 12 }));
    }

    #[test]
    fn non_power_of_two_ways_is_fine_outside_plru() {
        assert!(parse(
            r#"{ "block_size": 64,
                 "caches": [{ "name": "l1", "sets": 64, "ways": 12, "repl": "lru" }] }"#,
        )
        .is_ok());
    }

    #[test]
    fn two_q_threshold_is_required_and_bounded() {
        let err = parse(
            r#"{ "block_size": 64,
                 "caches": [{ "name": "l1", "sets": 64, "ways": 8, "repl": "2q" }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingA1Threshold));

        let err = parse(
            r#"{ "block_size": 64,
                 "caches": [{ "name": "l1", "sets": 64, "ways": 8, "repl": "2q",
                              "a1_threshold": 9 }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::A1ThresholdOutOfRange { thres: 9, assoc: 8 }));
    }
}

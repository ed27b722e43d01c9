//! Set-associative cache model built around a per-set replacement-policy
//! engine.
//!
//! The interesting part lives in [`replace`]: four mutually exclusive
//! eviction disciplines (strict LRU, MRU bit-vector, tree pseudo-LRU, 2Q)
//! behind one [`replace::Replace`] seam, one policy instance per set.
//! [`set`] holds the associative lookup and the array-reorder primitives the
//! strict-LRU policy is built on, [`cache`] is the tag store that drives
//! them, and [`config`]/[`trace`] wire the model into a trace-driven
//! simulator (see `src/main.rs`).

pub mod cache;
pub mod config;
pub mod replace;
pub mod set;
pub mod trace;

//! Real-world scenario benchmarks.
//!
//! Whole cores driven block by block, as a host would.

mod mix;
mod voices;

pub use mix::bench_effects;
pub use voices::bench_padsynth;

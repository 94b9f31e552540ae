//! Criterion benches for the primitives and the host-facing cores.
//!
//! Run with: cargo bench
//!
//! Every group sweeps the block sizes a host is likely to hand a plugin.
//! At 48kHz the callback deadline per block is:
//!   - 64 samples  = 1.33ms
//!   - 128 samples = 2.67ms
//!   - 256 samples = 5.33ms
//!   - 512 samples = 10.67ms
//!
//! Groups:
//!   - dsp/*        Smoothers, PTR and table oscillators, filter, envelopes,
//!                  delays, allpass networks
//!   - scenarios/*  PADsynth chords and voice stealing, synth into reverb

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    // Low-level DSP primitives
    dsp::bench_smoother,
    dsp::bench_oscillator,
    dsp::bench_filter,
    dsp::bench_envelope,
    dsp::bench_delay,
    dsp::bench_reverb,
    // Real-world scenarios
    scenarios::bench_padsynth,
    scenarios::bench_effects,
);
criterion_main!(benches);

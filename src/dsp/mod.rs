//! Low-level DSP primitives used by the synth and effect cores.
//!
//! Everything here is allocation-free once constructed and safe to embed
//! directly inside voice structs. Sample rate and times are passed in so the
//! same primitive serves any core.

/// Power curve shared by the envelopes.
pub mod curve;
/// Fractional delay lines and feedback comb.
pub mod delay;
/// Schroeder allpass, nested allpass chain and stability diagnostics.
pub mod allpass;
/// Multi-level nested allpass lattice.
pub mod lattice;
/// Linear ADSR envelope.
pub mod envelope;
/// Parabolic attack/decay envelope.
pub mod parabolic;
/// Multi-section looping envelope.
pub mod loop_envelope;
/// State-variable filter with per-sample cutoff.
pub mod filter;
/// Wavetable playback.
pub mod oscillator;
/// Polynomial transition region oscillators.
pub mod ptr;
/// Per-sample parameter smoothing.
pub mod smoother;
/// PADsynth octave tables.
pub mod wavetable;

pub use allpass::{stability, NestedSchroeder, SchroederAllpass, Stability};
pub use envelope::{EnvelopeState, LinearAdsr};
pub use loop_envelope::{LoopStage, PolyLoopEnvelope};
pub use parabolic::ParabolicAd;
pub use smoother::{LinearSmoother, SmootherCommon};

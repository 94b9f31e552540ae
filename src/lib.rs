pub mod config; // Construction-time sizes and limits
pub mod dsp; // Oscillators, envelopes, filters, delays and allpass networks
pub mod effect; // Reverb cores
pub mod engine; // Host-facing core trait, backends and factory
pub mod error;
pub mod io; // MIDI bytes to note events
pub mod param; // Scaled parameters and presets
pub mod synth; // PADsynth voices, unison and polyphony

pub use config::CoreConfig;
pub use engine::{DspCore, InstructionSet};
pub use error::{Error, Result};

/// Longest span a core renders in one pass. Longer host blocks are split.
pub const MAX_BLOCK_SIZE: usize = 2048;

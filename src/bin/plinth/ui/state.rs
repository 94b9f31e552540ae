//! Messages exchanged between the UI and audio threads
//!
//! Everything crossing a ring buffer is Copy so the audio callback never
//! allocates or frees.

use plinth_dsp::{dsp::Stability, InstructionSet};

/// Commands sent from the UI thread to the audio thread
#[derive(Clone, Copy, Debug)]
pub enum Control {
    /// Load a synth preset by index
    Program(usize),
    /// Route the synth around or through the reverb
    ToggleReverb,
    /// Silence every voice
    Panic,
}

/// Sent once at startup (can allocate)
#[derive(Clone, Debug)]
pub struct StaticInfo {
    pub sample_rate: f32,
    pub channels: usize,
    pub instruction_set: InstructionSet,
    pub reverb_name: &'static str,
    pub programs: Vec<String>,
}

/// Sent by the audio thread after every callback
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineStatus {
    pub active_voices: usize,
    /// Feedback diagnostics of the reverb, if it reports them
    pub stability: Option<Stability>,
    pub reverb_on: bool,
    pub program: usize,
}

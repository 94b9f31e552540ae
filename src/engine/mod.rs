//! The host-facing surface every core implements, and the factory that
//! picks a backend for it.

pub mod backend;
pub mod factory;

pub use backend::{Backend, InstructionSet};
pub use factory::{create_lattice_reverb, create_nested_reverb, create_padsynth};

use crate::dsp::Stability;
use crate::param::{ParameterStore, Preset};
use crate::synth::message::MidiNote;

/// A block-based DSP core.
///
/// Exactly one thread drives a core. `setup` and `reset` run while audio is
/// stopped; everything else runs on the audio thread and neither allocates
/// nor blocks.
pub trait DspCore: Send {
    /// Reallocates sample-rate dependent state and resets.
    fn setup(&mut self, sample_rate: f32);

    /// Silences every voice and clears every delay line.
    fn reset(&mut self);

    /// Re-seeds randomness without touching allocated memory.
    fn startup(&mut self);

    /// Pulls smoother targets from the parameter store. Call once per
    /// block, before `process`.
    fn set_parameters(&mut self, tempo: f64);

    /// Renders `length` frames. Buffers are one slice per channel; missing
    /// channels are skipped and longer slices are left untouched past
    /// `length`.
    fn process(&mut self, length: usize, inputs: &[&[f32]], outputs: &mut [&mut [f32]]);

    fn note_on(&mut self, _id: i32, _pitch: i16, _tuning: f32, _velocity: f32) {}

    fn note_off(&mut self, _id: i32) {}

    /// Stages a note for the next `process` call.
    fn push_midi_note(&mut self, _note: MidiNote) {}

    /// Samples of delay the core adds to its output.
    fn latency(&self) -> usize {
        0
    }

    fn parameters(&self) -> &ParameterStore;

    fn parameters_mut(&mut self) -> &mut ParameterStore;

    fn presets(&self) -> &[Preset];

    /// Resets to defaults, then applies preset `index` if it exists.
    fn load_program(&mut self, index: usize);

    fn instruction_set(&self) -> InstructionSet;

    /// Voices currently sounding, for instruments.
    fn active_voices(&self) -> usize {
        0
    }

    /// Feedback diagnostics of the reverb network, if the core has one.
    fn stability(&self) -> Option<Stability> {
        None
    }
}

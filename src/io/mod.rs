// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;

pub use converter::{midi_note_to_freq, midi_to_note};
pub use midi::MidiEvent;

// Purpose: PADsynth voices, polyphony and MIDI note staging
// This layer sits above the dsp primitives and owns the voice pool

pub mod core;
pub mod message;
pub mod params;
pub mod unison;
pub mod voice;

pub use self::core::PadSynthCore;
pub use message::{MidiNote, MidiNoteReceiver, MidiQueue};
pub use unison::PanMode;
pub use voice::{NoteState, Voice};

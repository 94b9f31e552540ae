use crate::{io::midi::MidiEvent, synth::message::MidiNote};

/// Turns a channel note message into a queued note stamped at `frame`.
///
/// The MIDI key doubles as the note id, so a note-off finds every voice its
/// note-on started. A note-on with velocity 0 is a note-off.
pub fn midi_to_note(midi: MidiEvent, frame: u32, channel_filter: u8) -> Option<MidiNote> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if channel == channel_filter => {
            if velocity == 0 {
                Some(MidiNote::note_off(frame, i32::from(key)))
            } else {
                Some(MidiNote::note_on(
                    frame,
                    i32::from(key),
                    i16::from(key),
                    0.0,
                    f32::from(velocity) / 127.0,
                ))
            }
        }
        MidiEvent::NoteOff { channel, key, .. } if channel == channel_filter => {
            Some(MidiNote::note_off(frame, i32::from(key)))
        }
        _ => None,
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

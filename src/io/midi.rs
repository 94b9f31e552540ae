/// Channel voice messages the cores react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Centered at 0, range -8192..=8191.
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Parses one message from raw bytes. Running status, system and
    /// truncated messages yield `None`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if !(0x80..0xF0).contains(&status) {
            return None;
        }
        let channel = status & 0x0F;
        let data1 = || data.first().map(|b| b & 0x7F);
        let data2 = || data.get(1).map(|b| b & 0x7F);

        match status & 0xF0 {
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: data1()?,
                velocity: data2()?,
            }),
            0x90 => Some(MidiEvent::NoteOn {
                channel,
                key: data1()?,
                velocity: data2()?,
            }),
            0xB0 => Some(MidiEvent::ControlChange {
                channel,
                controller: data1()?,
                value: data2()?,
            }),
            0xC0 => Some(MidiEvent::ProgramChange {
                channel,
                program: data1()?,
            }),
            0xE0 => {
                let lsb = i16::from(data1()?);
                let msb = i16::from(data2()?);
                Some(MidiEvent::PitchBend {
                    channel,
                    value: ((msb << 7) | lsb) - 8192,
                })
            }
            _ => None,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

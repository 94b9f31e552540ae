//! Audio setup and the realtime render callback

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, RingBuffer};

use plinth_dsp::{
    engine::{create_lattice_reverb, create_nested_reverb, create_padsynth},
    synth::{MidiNote, MidiNoteReceiver},
    CoreConfig, DspCore, MAX_BLOCK_SIZE,
};

use super::ui::{Control, EngineStatus, StaticInfo, UiApp};

/// Monitor samples buffered between UI frames
const AUDIO_RING_SIZE: usize = 1 << 14;
const NOTE_RING_SIZE: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReverbKind {
    Nested,
    Lattice,
}

impl ReverbKind {
    fn name(self) -> &'static str {
        match self {
            ReverbKind::Nested => "nested allpass",
            ReverbKind::Lattice => "lattice",
        }
    }
}

pub struct Plinth {
    reverb: ReverbKind,
}

impl Plinth {
    pub fn new(reverb: ReverbKind) -> Self {
        Self { reverb }
    }

    /// Opens the default output device and runs the UI until quit
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let mut synth = create_padsynth(CoreConfig::default().with_max_voice(64), sample_rate, None)
            .wrap_err("failed to build the PADsynth core")?;
        let mut reverb = match self.reverb {
            ReverbKind::Nested => create_nested_reverb(CoreConfig::default(), sample_rate, None),
            ReverbKind::Lattice => create_lattice_reverb(
                CoreConfig::default().with_max_delay_seconds(0.1),
                sample_rate,
                None,
            ),
        }
        .wrap_err("failed to build the reverb core")?;
        reverb.load_program(1);
        reverb.set_parameters(0.0);
        reverb.reset();

        synth.startup();

        let programs = synth.presets().iter().map(|preset| preset.name.clone()).collect();
        let info = StaticInfo {
            sample_rate,
            channels,
            instruction_set: synth.instruction_set(),
            reverb_name: self.reverb.name(),
            programs,
        };

        let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(AUDIO_RING_SIZE);
        let (mut status_tx, status_rx) = RingBuffer::<EngineStatus>::new(16);
        let (note_tx, note_rx) = RingBuffer::<MidiNote>::new(NOTE_RING_SIZE);
        let (control_tx, control_rx) = RingBuffer::<Control>::new(16);

        let mut renderer = Renderer {
            synth,
            reverb,
            note_rx,
            control_rx,
            reverb_on: true,
            program: 0,
            dry: [vec![0.0; MAX_BLOCK_SIZE], vec![0.0; MAX_BLOCK_SIZE]],
            wet: [vec![0.0; MAX_BLOCK_SIZE], vec![0.0; MAX_BLOCK_SIZE]],
        };

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                renderer.render(data, channels, |sample| {
                    let _ = audio_tx.push(sample);
                });
                let _ = status_tx.push(renderer.status());
            },
            |err| eprintln!("Audio error: {}", err),
            None,
        )?;
        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(info, audio_rx, status_rx, note_tx, control_tx).run(&mut terminal);
        ratatui::restore();
        result
    }
}

/// Everything the audio callback owns
struct Renderer {
    synth: Box<dyn DspCore>,
    reverb: Box<dyn DspCore>,
    note_rx: Consumer<MidiNote>,
    control_rx: Consumer<Control>,
    reverb_on: bool,
    program: usize,
    dry: [Vec<f32>; 2],
    wet: [Vec<f32>; 2],
}

impl Renderer {
    fn apply_controls(&mut self) {
        while let Ok(control) = self.control_rx.pop() {
            match control {
                Control::Program(index) => {
                    self.program = index;
                    self.synth.load_program(index);
                }
                Control::ToggleReverb => self.reverb_on = !self.reverb_on,
                Control::Panic => self.synth.reset(),
            }
        }
        while let Some(note) = MidiNoteReceiver::pop(&mut self.note_rx) {
            self.synth.push_midi_note(note);
        }
    }

    fn render(&mut self, data: &mut [f32], channels: usize, mut monitor: impl FnMut(f32)) {
        self.apply_controls();

        let total_frames = data.len() / channels.max(1);
        let mut frames_written = 0;

        while frames_written < total_frames {
            let n = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

            self.synth.set_parameters(0.0);
            let [dry_l, dry_r] = &mut self.dry;
            self.synth.process(n, &[], &mut [&mut dry_l[..n], &mut dry_r[..n]]);

            let [wet_l, wet_r] = &mut self.wet;
            if self.reverb_on {
                self.reverb.set_parameters(0.0);
                self.reverb
                    .process(n, &[&dry_l[..n], &dry_r[..n]], &mut [&mut wet_l[..n], &mut wet_r[..n]]);
            } else {
                wet_l[..n].copy_from_slice(&dry_l[..n]);
                wet_r[..n].copy_from_slice(&dry_r[..n]);
            }

            let out_off = frames_written * channels;
            for i in 0..n {
                let frame = [wet_l[i], wet_r[i]];
                for ch in 0..channels {
                    data[out_off + i * channels + ch] = frame[ch.min(1)];
                }
                monitor(0.5 * (frame[0] + frame[1]));
            }

            frames_written += n;
        }
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            active_voices: self.synth.active_voices(),
            stability: self.reverb.stability(),
            reverb_on: self.reverb_on,
            program: self.program,
        }
    }
}

//! TUI module for plinth
//!
//! Plays notes from the computer keyboard and shows the output, its
//! spectrum, and the reverb's feedback diagnostics.

mod keyboard;
mod spectrum;
pub mod state;
mod status;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

use plinth_dsp::synth::MidiNote;

pub use state::{Control, EngineStatus, StaticInfo};

use keyboard::{key_to_semitone, render_keyboard, HIGHEST_OCTAVE, LOWEST_OCTAVE};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::render_status;
use waveform::render_waveform;

/// Monitor window, also the FFT length
const VIS_BUFFER_SIZE: usize = 2048;
const VELOCITY: f32 = 0.8;

pub struct UiApp {
    info: StaticInfo,
    audio_rx: Consumer<f32>,
    status_rx: Consumer<EngineStatus>,
    note_tx: Producer<MidiNote>,
    control_tx: Producer<Control>,
    status: EngineStatus,
    audio_buffer: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    octave: i16,
    /// Pitches currently latched on
    held: Vec<i16>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        info: StaticInfo,
        audio_rx: Consumer<f32>,
        status_rx: Consumer<EngineStatus>,
        note_tx: Producer<MidiNote>,
        control_tx: Producer<Control>,
    ) -> Self {
        let analyzer = SpectrumAnalyzer::new(VIS_BUFFER_SIZE, info.sample_rate);
        Self {
            info,
            audio_rx,
            status_rx,
            note_tx,
            control_tx,
            status: EngineStatus {
                reverb_on: true,
                ..EngineStatus::default()
            },
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            analyzer,
            octave: 4,
            held: Vec::new(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_status();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.release_all();
        Ok(())
    }

    /// Keeps the newest VIS_BUFFER_SIZE monitor samples
    fn poll_audio(&mut self) {
        let before = self.audio_buffer.len();
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() == before {
            return;
        }
        let excess = self.audio_buffer.len().saturating_sub(VIS_BUFFER_SIZE);
        self.audio_buffer.drain(..excess);
        self.analyzer.update(&self.audio_buffer);
    }

    fn poll_status(&mut self) {
        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    fn toggle_note(&mut self, pitch: i16) {
        let note = if let Some(index) = self.held.iter().position(|&p| p == pitch) {
            self.held.swap_remove(index);
            MidiNote::note_off(0, i32::from(pitch))
        } else {
            self.held.push(pitch);
            MidiNote::note_on(0, i32::from(pitch), pitch, 0.0, VELOCITY)
        };
        let _ = self.note_tx.push(note);
    }

    fn release_all(&mut self) {
        for pitch in std::mem::take(&mut self.held) {
            let _ = self.note_tx.push(MidiNote::note_off(0, i32::from(pitch)));
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.release_all(),
            KeyCode::Char('p') => {
                let count = self.info.programs.len().max(1);
                let _ = self.control_tx.push(Control::Program((self.status.program + 1) % count));
            }
            KeyCode::Char('r') => {
                let _ = self.control_tx.push(Control::ToggleReverb);
            }
            KeyCode::Backspace => {
                self.held.clear();
                let _ = self.control_tx.push(Control::Panic);
            }
            KeyCode::Left => self.octave = (self.octave - 1).max(LOWEST_OCTAVE),
            KeyCode::Right => self.octave = (self.octave + 1).min(HIGHEST_OCTAVE),
            KeyCode::Char(c) => {
                if let Some(semitone) = key_to_semitone(c) {
                    self.toggle_note(12 * (self.octave + 1) + semitone);
                }
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Length(8), // Waveform
                Constraint::Min(8),    // Spectrum
                Constraint::Length(3), // Keys
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_status(frame, chunks[0], &self.info, &self.status);
        render_waveform(frame, chunks[1], &self.audio_buffer);
        render_spectrum(frame, chunks[2], &self.analyzer);
        render_keyboard(frame, chunks[3], self.octave, &self.held);

        let help = Paragraph::new(
            " [z..,] Toggle note  [←/→] Octave  [Space] Release  [P] Program  [R] Reverb  [⌫] Panic  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}

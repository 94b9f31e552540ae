use crate::dsp::delay::FeedbackComb;
use crate::dsp::filter::SvFilter;
use crate::dsp::oscillator::TableOscillator;
use crate::dsp::smoother::LocalLinearSmoother;
use crate::dsp::wavetable::WaveTable;
use crate::dsp::LinearAdsr;

/// Longest comb delay a voice can be tuned to. Covers note periods down to
/// 20 Hz.
pub const COMB_MAX_SECONDS: f32 = 0.05;

const C4_HZ: f32 = 261.625_58;
const MAX_COMB_FEEDBACK: f32 = 0.99;
const MAX_FILTER_OCTAVES: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Rest,
    Active,
    Release,
}

/// Envelope and tuning settings captured once per block and applied on
/// note-on. Times are in seconds.
#[derive(Debug, Clone, Copy)]
pub struct VoiceSettings {
    pub gain_attack: f32,
    pub gain_decay: f32,
    pub gain_sustain: f32,
    pub gain_release: f32,
    pub gain_curve: f32,
    pub filter_attack: f32,
    pub filter_decay: f32,
    pub filter_sustain: f32,
    pub filter_release: f32,
    pub delay_attack: f32,
    /// Semitones added to every note.
    pub master_pitch: f32,
    /// Divisions of the octave.
    pub equal_temperament: f32,
    pub pitch_a4_hz: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            gain_attack: 0.0,
            gain_decay: 0.5,
            gain_sustain: 0.5,
            gain_release: 0.1,
            gain_curve: 0.0,
            filter_attack: 0.0,
            filter_decay: 0.5,
            filter_sustain: 0.5,
            filter_release: 0.1,
            delay_attack: 0.0,
            master_pitch: 0.0,
            equal_temperament: 12.0,
            pitch_a4_hz: 440.0,
        }
    }
}

/// One note as the core hands it to a voice.
#[derive(Debug, Clone, Copy)]
pub struct NoteTrigger {
    pub id: i32,
    /// Fractional MIDI pitch including tuning and unison detune.
    pub pitch: f32,
    pub velocity: f32,
    /// 0 is hard left, 1 hard right.
    pub pan: f32,
    /// Start phase in table cycles; `None` keeps the running phase.
    pub phase: Option<f32>,
}

/// Smoothed per-sample values shared by every voice.
#[derive(Debug, Clone, Copy)]
pub struct VoiceFrame {
    pub filter_cutoff: f32,
    pub filter_resonance: f32,
    /// -1..1, scales the filter envelope to +-8 octaves.
    pub filter_amount: f32,
    pub filter_key_follow: f32,
    pub delay_mix: f32,
    /// Comb pitch relative to the note, in semitones.
    pub delay_detune: f32,
    pub delay_feedback: f32,
}

impl Default for VoiceFrame {
    fn default() -> Self {
        Self {
            filter_cutoff: 20_000.0,
            filter_resonance: 0.0,
            filter_amount: 0.0,
            filter_key_follow: 0.0,
            delay_mix: 0.0,
            delay_detune: 0.0,
            delay_feedback: 0.0,
        }
    }
}

pub fn note_to_freq(pitch: f32, equal_temperament: f32, a4_hz: f32) -> f32 {
    a4_hz * ((pitch - 69.0) / equal_temperament).exp2()
}

#[derive(Debug, Clone)]
pub struct Voice {
    sample_rate: f32,
    state: NoteState,
    id: i32,
    note_freq: f32,
    /// Octaves above C4, for key follow.
    key_octaves: f32,
    velocity: f32,
    pan: f32,
    gain: f32,
    osc: TableOscillator,
    gain_env: LinearAdsr,
    filter_env: LinearAdsr,
    filter: SvFilter,
    comb: FeedbackComb,
    comb_wet: LocalLinearSmoother,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            state: NoteState::Rest,
            id: -1,
            note_freq: 0.0,
            key_octaves: 0.0,
            velocity: 0.0,
            pan: 0.5,
            gain: 0.0,
            osc: TableOscillator::new(),
            gain_env: LinearAdsr::new(sample_rate),
            filter_env: LinearAdsr::new(sample_rate),
            filter: SvFilter::lowpass(sample_rate),
            comb: FeedbackComb::new(sample_rate, COMB_MAX_SECONDS),
            comb_wet: LocalLinearSmoother::new(sample_rate, 0.0, 0.0),
        }
    }

    pub fn setup(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.gain_env.setup(sample_rate);
        self.filter_env.setup(sample_rate);
        self.filter.setup(sample_rate);
        self.comb.setup(sample_rate, COMB_MAX_SECONDS);
        self.comb_wet.set_sample_rate(sample_rate);
        self.reset();
    }

    pub fn reset(&mut self) {
        self.state = NoteState::Rest;
        self.id = -1;
        self.gain = 0.0;
        self.osc.reset();
        self.gain_env.reset();
        self.filter_env.reset();
        self.filter.reset();
        self.comb.reset();
        self.comb_wet.reset(0.0);
    }

    pub fn note_on(&mut self, trigger: &NoteTrigger, settings: &VoiceSettings, table: &WaveTable) {
        self.state = NoteState::Active;
        self.id = trigger.id;
        self.velocity = trigger.velocity;
        self.pan = trigger.pan.clamp(0.0, 1.0);

        self.note_freq = note_to_freq(
            trigger.pitch + settings.master_pitch,
            settings.equal_temperament,
            settings.pitch_a4_hz,
        );
        self.key_octaves = (self.note_freq / C4_HZ).log2();

        self.osc.set_table_index(table.table_index(self.note_freq));
        self.osc.set_frequency(self.note_freq, table.base_freq());
        if let Some(phase) = trigger.phase {
            self.osc.set_phase(phase, table.size());
        }

        self.gain_env.set_curve(settings.gain_curve);
        self.gain_env.trigger(
            settings.gain_attack,
            settings.gain_decay,
            settings.gain_sustain,
            settings.gain_release,
            self.note_freq,
        );
        self.filter_env.trigger(
            settings.filter_attack,
            settings.filter_decay,
            settings.filter_sustain,
            settings.filter_release,
            self.note_freq,
        );

        self.comb.reset();
        self.comb_wet.set_time(settings.delay_attack);
        self.comb_wet.reset(0.0);
        self.comb_wet.push(1.0);
    }

    /// Moves an active voice to its release phase. Voices already releasing
    /// or resting are left alone.
    pub fn release(&mut self) {
        if self.state != NoteState::Active {
            return;
        }
        self.state = NoteState::Release;
        self.gain_env.release();
        self.filter_env.release();
    }

    /// Silences the voice immediately.
    pub fn rest(&mut self) {
        self.state = NoteState::Rest;
        self.gain_env.terminate();
        self.filter_env.terminate();
        self.gain = 0.0;
    }

    pub fn state(&self) -> NoteState {
        self.state
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn is_resting(&self) -> bool {
        self.state == NoteState::Rest
    }

    pub fn is_attacking(&self) -> bool {
        self.gain_env.is_attacking()
    }

    /// Amplitude of the last rendered frame, before panning.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn note_freq(&self) -> f32 {
        self.note_freq
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// Renders one stereo frame. A resting voice outputs silence.
    pub fn process(&mut self, table: &WaveTable, frame: &VoiceFrame) -> [f32; 2] {
        if self.state == NoteState::Rest {
            return [0.0; 2];
        }

        let env = self.gain_env.process();
        if self.gain_env.is_terminated() {
            self.rest();
            return [0.0; 2];
        }
        self.gain = self.velocity * env;

        let sig = self.osc.process(table.table(self.osc.table_index()));

        let filter_env = self.filter_env.process();
        let octaves = frame.filter_key_follow * self.key_octaves
            + MAX_FILTER_OCTAVES * frame.filter_amount * filter_env;
        let cutoff = frame.filter_cutoff * octaves.exp2();
        let sig = self.filter.process(sig, cutoff, frame.filter_resonance);

        let comb_seconds = 1.0 / (self.note_freq * (frame.delay_detune / 12.0).exp2());
        let feedback = frame.delay_feedback.clamp(-MAX_COMB_FEEDBACK, MAX_COMB_FEEDBACK);
        let comb = self.comb.process(sig, self.sample_rate, comb_seconds, feedback);
        let wet = frame.delay_mix * self.comb_wet.process();
        let sig = sig + wet * (comb - sig);

        let out = self.gain * sig;
        [out - out * self.pan, out * self.pan]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::wavetable::{PadSynthOptions, PeakInfo};

    const SAMPLE_RATE: f32 = 8000.0;

    fn table() -> WaveTable {
        let mut table = WaveTable::new(1 << 10);
        let peaks = [PeakInfo {
            frequency: 10.0,
            gain: 1.0,
            bandwidth: 0.0,
            phase: 0.0,
        }];
        table.padsynth(SAMPLE_RATE, 10.0, &peaks, &PadSynthOptions::default());
        table
    }

    fn trigger(id: i32) -> NoteTrigger {
        NoteTrigger {
            id,
            pitch: 69.0,
            velocity: 1.0,
            pan: 0.5,
            phase: Some(0.0),
        }
    }

    fn settings() -> VoiceSettings {
        VoiceSettings {
            gain_attack: 0.001,
            gain_decay: 0.01,
            gain_sustain: 0.8,
            gain_release: 0.01,
            ..VoiceSettings::default()
        }
    }

    #[test]
    fn pitch_maps_through_tuning() {
        assert!((note_to_freq(69.0, 12.0, 440.0) - 440.0).abs() < 1e-3);
        assert!((note_to_freq(81.0, 12.0, 440.0) - 880.0).abs() < 1e-2);
        assert!((note_to_freq(75.0, 6.0, 440.0) - 880.0).abs() < 1e-2);
    }

    #[test]
    fn note_lifecycle() {
        let table = table();
        let mut voice = Voice::new(SAMPLE_RATE);
        assert!(voice.is_resting());

        voice.note_on(&trigger(7), &settings(), &table);
        assert_eq!(voice.state(), NoteState::Active);
        assert_eq!(voice.id(), 7);
        assert!((voice.note_freq() - 440.0).abs() < 1e-2);

        let frame = VoiceFrame::default();
        let peak = (0..800)
            .map(|_| voice.process(&table, &frame)[0].abs())
            .fold(0.0, f32::max);
        assert!(peak > 0.05, "held note should sound, peak {peak}");

        voice.release();
        assert_eq!(voice.state(), NoteState::Release);
        for _ in 0..8000 {
            voice.process(&table, &frame);
        }
        assert!(voice.is_resting(), "voice should rest after its release");
        assert_eq!(voice.process(&table, &frame), [0.0; 2]);
    }

    #[test]
    fn pan_splits_gain() {
        let table = table();
        let mut voice = Voice::new(SAMPLE_RATE);
        let mut hard_left = trigger(1);
        hard_left.pan = 0.0;
        voice.note_on(&hard_left, &settings(), &table);
        for _ in 0..200 {
            let [_, right] = voice.process(&table, &VoiceFrame::default());
            assert_eq!(right, 0.0);
        }
    }

    #[test]
    fn release_ignores_resting_voice() {
        let mut voice = Voice::new(SAMPLE_RATE);
        voice.release();
        assert!(voice.is_resting());
    }
}

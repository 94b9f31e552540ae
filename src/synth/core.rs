//! PADsynth instrument core.
//!
//! ```text
//!  MidiQueue ──→ note_on / note_off ──→ voice pool ──┬──→ Σ ──→ (+) ──→ × gain ──→ out
//!                       │                            │          ↑
//!                       └── steal ──→ render tail ───┴──→ transition ring
//! ```
//!
//! A block is split at every queued MIDI frame. Within a span the shared
//! smoothers advance once per sample into a frame buffer, each sounding
//! voice renders the span into scratch, and the backend accumulates it.
//!
//! Stealing renders the stolen voice's remaining sound, faded out linearly,
//! into a short ring before the voice is reassigned. The ring plays back
//! alongside the pool until its stop index is reached.

use std::marker::PhantomData;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::CoreConfig;
use crate::dsp::smoother::{LinearSmoother, SmootherCommon};
use crate::dsp::wavetable::{PadSynthOptions, PeakInfo, WaveTable};
use crate::engine::{Backend, DspCore, InstructionSet};
use crate::error::{Error, Result};
use crate::param::{ParameterStore, Preset};
use crate::MAX_BLOCK_SIZE;

use super::message::{MidiNote, MidiNoteReceiver, MidiQueue};
use super::params::{
    padsynth_parameters, padsynth_presets, param_id, Scales, EQUAL_TEMPERAMENT_OFFSET,
    MILLI_CENTER, N_OVERTONE, OCTAVE_CENTER, PITCH_A4_OFFSET, SEMI_CENTER,
};
use super::unison::{spread_pans, PanMode};
use super::voice::{note_to_freq, NoteState, NoteTrigger, Voice, VoiceFrame, VoiceSettings};

pub const MAX_UNISON: usize = 16;
/// Voices per step of the voice count parameter.
const VOICES_PER_STEP: usize = 16;
const DEFAULT_SMOOTHING_SECONDS: f32 = 0.04;
const PITCH_BEND_RANGE: f32 = 4.0;

#[derive(Debug, Clone, Default)]
struct FrameSmoothers {
    filter_cutoff: LinearSmoother,
    filter_resonance: LinearSmoother,
    filter_amount: LinearSmoother,
    filter_key_follow: LinearSmoother,
    delay_mix: LinearSmoother,
    delay_detune: LinearSmoother,
    delay_feedback: LinearSmoother,
}

impl FrameSmoothers {
    fn push(&mut self, common: &SmootherCommon, target: &VoiceFrame) {
        self.filter_cutoff.push(common, target.filter_cutoff);
        self.filter_resonance.push(common, target.filter_resonance);
        self.filter_amount.push(common, target.filter_amount);
        self.filter_key_follow.push(common, target.filter_key_follow);
        self.delay_mix.push(common, target.delay_mix);
        self.delay_detune.push(common, target.delay_detune);
        self.delay_feedback.push(common, target.delay_feedback);
    }

    fn snap(&mut self) {
        for s in [
            &mut self.filter_cutoff,
            &mut self.filter_resonance,
            &mut self.filter_amount,
            &mut self.filter_key_follow,
            &mut self.delay_mix,
            &mut self.delay_detune,
            &mut self.delay_feedback,
        ] {
            let target = s.target();
            s.reset(target);
        }
    }

    fn process(&mut self) -> VoiceFrame {
        VoiceFrame {
            filter_cutoff: self.filter_cutoff.process(),
            filter_resonance: self.filter_resonance.process(),
            filter_amount: self.filter_amount.process(),
            filter_key_follow: self.filter_key_follow.process(),
            delay_mix: self.delay_mix.process(),
            delay_detune: self.delay_detune.process(),
            delay_feedback: self.delay_feedback.process(),
        }
    }

    fn current(&self) -> VoiceFrame {
        VoiceFrame {
            filter_cutoff: self.filter_cutoff.value(),
            filter_resonance: self.filter_resonance.value(),
            filter_amount: self.filter_amount.value(),
            filter_key_follow: self.filter_key_follow.value(),
            delay_mix: self.delay_mix.value(),
            delay_detune: self.delay_detune.value(),
            delay_feedback: self.delay_feedback.value(),
        }
    }
}

pub struct PadSynthCore<B: Backend> {
    config: CoreConfig,
    sample_rate: f32,
    scales: Scales,
    params: ParameterStore,
    presets: Vec<Preset>,

    wavetable: WaveTable,
    peaks: Vec<PeakInfo>,
    refresh_latch: bool,

    voices: Vec<Voice>,
    n_voice: usize,
    settings: VoiceSettings,
    slots: [usize; MAX_UNISON],
    unison_pans: [f32; MAX_UNISON],
    pan_counter: usize,
    rng: Pcg32,

    common: SmootherCommon,
    master_gain: LinearSmoother,
    frame_smoothers: FrameSmoothers,

    midi: MidiQueue,

    transition: Vec<[f32; 2]>,
    tr_index: usize,
    tr_stop: usize,
    is_transitioning: bool,

    frames: Vec<VoiceFrame>,
    gain_buffer: Vec<f32>,
    mix: [Vec<f32>; 2],
    scratch: [Vec<f32>; 2],

    _backend: PhantomData<B>,
}

impl<B: Backend> PadSynthCore<B> {
    pub fn new(config: CoreConfig, sample_rate: f32) -> Result<Self> {
        config.validate()?;
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::config("sample_rate", format!("{sample_rate} is not a positive rate")));
        }

        let scales = Scales::new((config.table_size / 2) as u32);
        let params = padsynth_parameters(&scales);
        let presets = padsynth_presets(&scales);

        let mut core = Self {
            sample_rate,
            params,
            presets,
            wavetable: WaveTable::new(config.table_size),
            peaks: vec![PeakInfo::default(); N_OVERTONE],
            refresh_latch: false,
            voices: (0..config.max_voice).map(|_| Voice::new(sample_rate)).collect(),
            n_voice: config.max_voice,
            settings: VoiceSettings::default(),
            slots: [0; MAX_UNISON],
            unison_pans: [0.5; MAX_UNISON],
            pan_counter: 0,
            rng: Pcg32::seed_from_u64(0),
            common: SmootherCommon::new(sample_rate, DEFAULT_SMOOTHING_SECONDS),
            master_gain: LinearSmoother::default(),
            frame_smoothers: FrameSmoothers::default(),
            midi: MidiQueue::with_capacity(config.midi_capacity),
            transition: Vec::new(),
            tr_index: 0,
            tr_stop: 0,
            is_transitioning: false,
            frames: vec![VoiceFrame::default(); MAX_BLOCK_SIZE],
            gain_buffer: vec![0.0; MAX_BLOCK_SIZE],
            mix: [vec![0.0; MAX_BLOCK_SIZE], vec![0.0; MAX_BLOCK_SIZE]],
            scratch: [vec![0.0; MAX_BLOCK_SIZE], vec![0.0; MAX_BLOCK_SIZE]],
            scales,
            config,
            _backend: PhantomData,
        };
        core.set_parameters(0.0);
        core.setup(sample_rate);
        Ok(core)
    }

    /// Reallocates the transition ring and rebuilds the wavetable for
    /// `sample_rate`. Not realtime safe.
    pub fn setup(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.common.set_sample_rate(sample_rate);
        for voice in self.voices.iter_mut() {
            voice.setup(sample_rate);
        }

        let length = 1 + (sample_rate * self.config.transition_seconds) as usize;
        self.transition.clear();
        self.transition.resize(length, [0.0; 2]);

        self.refresh_table();
    }

    pub fn reset(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.reset();
        }
        self.transition.fill([0.0; 2]);
        self.tr_index = 0;
        self.tr_stop = 0;
        self.is_transitioning = false;

        let gain = self.master_gain.target();
        self.master_gain.reset(gain);
        self.frame_smoothers.snap();

        self.startup();
    }

    pub fn startup(&mut self) {
        let seed = self.params.get_int(param_id::SEED).max(0) as u64;
        self.rng = Pcg32::seed_from_u64(seed);
        self.pan_counter = 0;
    }

    pub fn set_parameters(&mut self, _tempo: f64) {
        let p = &self.params;
        let float = |index: usize| p.get_float(index) as f32;

        self.common.set_time(float(param_id::SMOOTHNESS));
        self.master_gain.push(&self.common, float(param_id::GAIN));

        let delay_detune = (p.get_int(param_id::DELAY_DETUNE_SEMI) - SEMI_CENTER) as f32
            + (p.get_int(param_id::DELAY_DETUNE_MILLI) - MILLI_CENTER) as f32 / 1000.0;
        let frame = VoiceFrame {
            filter_cutoff: float(param_id::FILTER_CUTOFF),
            filter_resonance: float(param_id::FILTER_RESONANCE),
            filter_amount: float(param_id::FILTER_AMOUNT),
            filter_key_follow: float(param_id::FILTER_KEY_FOLLOW),
            delay_mix: float(param_id::DELAY_MIX),
            delay_detune,
            delay_feedback: float(param_id::DELAY_FEEDBACK),
        };
        self.frame_smoothers.push(&self.common, &frame);

        let master_pitch = 12.0 * (p.get_int(param_id::OSC_OCTAVE) - OCTAVE_CENTER) as f32
            + (p.get_int(param_id::OSC_SEMI) - SEMI_CENTER) as f32
            + (p.get_int(param_id::OSC_MILLI) - MILLI_CENTER) as f32 / 1000.0
            + (float(param_id::PITCH_BEND) - 0.5) * PITCH_BEND_RANGE;
        self.settings = VoiceSettings {
            gain_attack: float(param_id::GAIN_A),
            gain_decay: float(param_id::GAIN_D),
            gain_sustain: float(param_id::GAIN_S),
            gain_release: float(param_id::GAIN_R),
            gain_curve: float(param_id::GAIN_CURVE),
            filter_attack: float(param_id::FILTER_A),
            filter_decay: float(param_id::FILTER_D),
            filter_sustain: float(param_id::FILTER_S),
            filter_release: float(param_id::FILTER_R),
            delay_attack: float(param_id::DELAY_ATTACK),
            master_pitch,
            equal_temperament: (p.get_float(param_id::EQUAL_TEMPERAMENT) + EQUAL_TEMPERAMENT_OFFSET) as f32,
            pitch_a4_hz: (p.get_float(param_id::PITCH_A4_HZ) + PITCH_A4_OFFSET) as f32,
        };

        let steps = p.get_int(param_id::N_VOICE).max(0) as usize + 1;
        self.n_voice = (VOICES_PER_STEP * steps).min(self.voices.len());

        let refresh = p.get_bool(param_id::REFRESH_TABLE);
        if refresh && !self.refresh_latch {
            self.refresh_table();
        }
        self.refresh_latch = refresh;
    }

    /// Rebuilds the PADsynth tables from the overtone parameters and
    /// silences every voice. Allocation-free but expensive; the core only
    /// calls it on setup and on a rising edge of the refresh parameter.
    pub fn refresh_table(&mut self) {
        self.reset();

        let p = &self.params;
        let float = |index: usize| p.get_float(index) as f32;

        let base_freq = float(param_id::TABLE_BASE_FREQUENCY);
        let pitch_multiply = float(param_id::OVERTONE_PITCH_MULTIPLY);
        let pitch_modulo = float(param_id::OVERTONE_PITCH_MODULO);
        let gain_power = float(param_id::OVERTONE_GAIN_POWER);
        let width_multiply = float(param_id::OVERTONE_WIDTH_MULTIPLY);

        for (idx, peak) in self.peaks.iter_mut().enumerate() {
            let mut frequency =
                (pitch_multiply * idx as f32 + 1.0) * base_freq * float(param_id::OVERTONE_PITCH0 + idx);
            if pitch_modulo != 0.0 {
                frequency %= note_to_freq(pitch_modulo, 12.0, 440.0);
            }
            *peak = PeakInfo {
                frequency,
                gain: float(param_id::OVERTONE_GAIN0 + idx).powf(gain_power),
                bandwidth: width_multiply * float(param_id::OVERTONE_WIDTH0 + idx),
                phase: float(param_id::OVERTONE_PHASE0 + idx),
            };
        }

        let options = PadSynthOptions {
            seed: p.get_int(param_id::PADSYNTH_SEED).max(0) as u64,
            expand: float(param_id::SPECTRUM_EXPAND),
            shift: (p.get_int(param_id::SPECTRUM_SHIFT) - i64::from(self.scales.spectrum_size)) as i32,
            comb: p.get_int(param_id::PROFILE_COMB).max(0) as usize + 1,
            shape: float(param_id::PROFILE_SHAPE),
            uniform_phase: p.get_bool(param_id::UNIFORM_PHASE_PROFILE),
        };
        self.wavetable.padsynth(self.sample_rate, base_freq, &self.peaks, &options);
    }

    /// Stages a note for the next `process` call. Returns false when the
    /// queue is full and the note was dropped.
    pub fn push_midi_note(&mut self, note: MidiNote) -> bool {
        self.midi.push(note)
    }

    /// Moves pending notes from `rx` into the queue until either runs out.
    pub fn drain_midi<R: MidiNoteReceiver + ?Sized>(&mut self, rx: &mut R) {
        while !self.midi.is_full() {
            match rx.pop() {
                Some(note) => {
                    self.midi.push(note);
                }
                None => break,
            }
        }
    }

    pub fn note_on(&mut self, id: i32, pitch: i16, tuning: f32, velocity: f32) {
        let pool = self.n_voice.min(self.voices.len());
        let n_unison = (self.params.get_int(param_id::N_UNISON).max(0) as usize + 1)
            .min(MAX_UNISON)
            .min(pool);
        if n_unison == 0 {
            return;
        }

        let mut count = 0;
        for (index, voice) in self.voices[..pool].iter().enumerate() {
            if count >= n_unison {
                break;
            }
            if voice.id() == id || voice.is_resting() {
                self.slots[count] = index;
                count += 1;
            }
        }

        // Steal the quietest voices that are not attacking. Ties keep the
        // lowest index.
        while count < n_unison {
            let taken = &self.slots[..count];
            let steal = self.voices[..pool]
                .iter()
                .enumerate()
                .filter(|(index, _)| !taken.contains(index))
                .min_by(|(_, a), (_, b)| {
                    a.is_attacking()
                        .cmp(&b.is_attacking())
                        .then(a.gain().total_cmp(&b.gain()))
                })
                .map(|(index, _)| index);
            let Some(index) = steal else {
                break;
            };
            self.fill_transition_buffer(index);
            self.slots[count] = index;
            count += 1;
        }

        let pitch = f32::from(pitch) + tuning;
        if count == 1 {
            let trigger = NoteTrigger {
                id,
                pitch,
                velocity,
                pan: 0.5,
                phase: self.start_phase(0.0),
            };
            self.voices[self.slots[0]].note_on(&trigger, &self.settings, &self.wavetable);
            return;
        }

        let mode = PanMode::from_index(self.params.get_int(param_id::UNISON_PAN_TYPE).max(0) as u32);
        let width = self.params.get_float(param_id::UNISON_PAN) as f32;
        spread_pans(mode, &mut self.unison_pans[..count], width, &mut self.pan_counter, &mut self.rng);

        let detune = self.params.get_float(param_id::UNISON_DETUNE) as f32;
        let unison_phase = self.params.get_float(param_id::UNISON_PHASE) as f32;
        let gain_random = self.params.get_float(param_id::UNISON_GAIN_RANDOM) as f32;
        let detune_random = self.params.get_bool(param_id::UNISON_DETUNE_RANDOM);

        for unison in 0..count {
            let spread = if detune_random { self.rng.gen::<f32>() } else { 1.0 };
            let unison_detune = unison as f32 * detune * spread;
            let gain = 1.0 - gain_random * self.rng.gen::<f32>();
            let trigger = NoteTrigger {
                id,
                pitch: pitch * (1.0 + unison_detune),
                velocity: gain * velocity,
                pan: self.unison_pans[unison],
                phase: self.start_phase(unison_phase * unison as f32 / count as f32),
            };
            self.voices[self.slots[unison]].note_on(&trigger, &self.settings, &self.wavetable);
        }
    }

    /// Releases every voice playing `id`. Unknown ids are ignored.
    pub fn note_off(&mut self, id: i32) {
        for voice in self.voices.iter_mut().filter(|v| v.id() == id) {
            voice.release();
        }
    }

    fn start_phase(&mut self, offset: f32) -> Option<f32> {
        if !self.params.get_bool(param_id::OSC_PHASE_RESET) {
            return None;
        }
        let random = if self.params.get_bool(param_id::OSC_PHASE_RANDOM) {
            self.rng.gen::<f32>()
        } else {
            1.0
        };
        Some(offset + random * self.params.get_float(param_id::OSC_INITIAL_PHASE) as f32)
    }

    fn apply_midi_note(&mut self, note: MidiNote) {
        if note.is_note_on {
            self.note_on(note.id, note.pitch, note.tuning, note.velocity);
        } else {
            self.note_off(note.id);
        }
    }

    /// Renders the rest of voice `index` into the transition ring with a
    /// linear fade, starting at the ring's read position.
    fn fill_transition_buffer(&mut self, index: usize) {
        let len = self.transition.len();
        if len == 0 {
            return;
        }

        let frame = self.frame_smoothers.current();
        let voice = &mut self.voices[index];
        let mut stop = (self.tr_index + len - 1) % len;
        let mut rendered = 0;
        for i in 0..len {
            if voice.is_resting() {
                stop = (self.tr_index + i) % len;
                break;
            }
            let [left, right] = voice.process(&self.wavetable, &frame);
            let fade = 1.0 - i as f32 / len as f32;
            let slot = &mut self.transition[(self.tr_index + i) % len];
            slot[0] += left * fade;
            slot[1] += right * fade;
            rendered += 1;
        }
        // The tail now lives in the ring; the next note attacks from silence.
        voice.rest();

        if rendered > 0 {
            self.tr_stop = stop;
            self.is_transitioning = true;
        }
    }

    /// Renders `length` frames into the first two `outputs`. MIDI events at
    /// or beyond `length` are dropped; the queue is empty afterwards.
    pub fn process(&mut self, length: usize, outputs: &mut [&mut [f32]]) {
        let length = outputs.iter().map(|out| out.len()).fold(length, usize::min);
        self.common.set_buffer_size(length);

        let mut start = 0;
        let mut cursor = 0;
        while start < length {
            while let Some(&note) = self.midi.get(cursor) {
                if note.frame as usize > start {
                    break;
                }
                self.apply_midi_note(note);
                cursor += 1;
            }

            let next = self.midi.get(cursor).map_or(length, |note| note.frame as usize);
            let end = next.min(length).min(start + MAX_BLOCK_SIZE);
            self.render_span(start, end, outputs);
            start = end;
        }

        self.midi.clear();
    }

    fn render_span(&mut self, start: usize, end: usize, outputs: &mut [&mut [f32]]) {
        let n = end - start;

        for (i, frame) in self.frames[..n].iter_mut().enumerate() {
            self.common.set_buffer_index(start + i);
            *frame = self.frame_smoothers.process();
            self.gain_buffer[i] = self.master_gain.process();
        }

        let [mix_l, mix_r] = &mut self.mix;
        let [voice_l, voice_r] = &mut self.scratch;
        mix_l[..n].fill(0.0);
        mix_r[..n].fill(0.0);

        for voice in self.voices.iter_mut().filter(|v| !v.is_resting()) {
            for (i, frame) in self.frames[..n].iter().enumerate() {
                let [left, right] = voice.process(&self.wavetable, frame);
                voice_l[i] = left;
                voice_r[i] = right;
            }
            B::accumulate(&mut mix_l[..n], &voice_l[..n]);
            B::accumulate(&mut mix_r[..n], &voice_r[..n]);
        }

        if self.is_transitioning {
            let len = self.transition.len();
            for i in 0..n {
                let slot = &mut self.transition[self.tr_index];
                mix_l[i] += slot[0];
                mix_r[i] += slot[1];
                *slot = [0.0; 2];
                self.tr_index = (self.tr_index + 1) % len;
                if self.tr_index == self.tr_stop {
                    self.is_transitioning = false;
                    break;
                }
            }
        }

        B::multiply(&mut mix_l[..n], &self.gain_buffer[..n]);
        B::multiply(&mut mix_r[..n], &self.gain_buffer[..n]);
        B::sanitize(&mut mix_l[..n]);
        B::sanitize(&mut mix_r[..n]);

        for (out, mix) in outputs.iter_mut().zip([&*mix_l, &*mix_r]) {
            out[start..end].copy_from_slice(&mix[..n]);
        }
    }

    pub fn load_program(&mut self, index: usize) {
        self.params.load_program(&self.presets, index);
    }

    pub fn set_presets(&mut self, presets: Vec<Preset>) {
        self.presets = presets;
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.params
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    pub fn scales(&self) -> &Scales {
        &self.scales
    }

    pub fn voice_states(&self) -> impl Iterator<Item = NoteState> + '_ {
        self.voices.iter().map(Voice::state)
    }

    /// Voices not at rest.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_resting()).count()
    }

    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    pub fn wavetable(&self) -> &WaveTable {
        &self.wavetable
    }
}

impl<B: Backend> DspCore for PadSynthCore<B> {
    fn setup(&mut self, sample_rate: f32) {
        PadSynthCore::setup(self, sample_rate);
    }

    fn reset(&mut self) {
        PadSynthCore::reset(self);
    }

    fn startup(&mut self) {
        PadSynthCore::startup(self);
    }

    fn set_parameters(&mut self, tempo: f64) {
        PadSynthCore::set_parameters(self, tempo);
    }

    fn process(&mut self, length: usize, _inputs: &[&[f32]], outputs: &mut [&mut [f32]]) {
        PadSynthCore::process(self, length, outputs);
    }

    fn note_on(&mut self, id: i32, pitch: i16, tuning: f32, velocity: f32) {
        PadSynthCore::note_on(self, id, pitch, tuning, velocity);
    }

    fn note_off(&mut self, id: i32) {
        PadSynthCore::note_off(self, id);
    }

    fn push_midi_note(&mut self, note: MidiNote) {
        PadSynthCore::push_midi_note(self, note);
    }

    fn parameters(&self) -> &ParameterStore {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    fn presets(&self) -> &[Preset] {
        &self.presets
    }

    fn load_program(&mut self, index: usize) {
        PadSynthCore::load_program(self, index);
    }

    fn instruction_set(&self) -> InstructionSet {
        B::SET
    }

    fn active_voices(&self) -> usize {
        PadSynthCore::active_voices(self)
    }
}

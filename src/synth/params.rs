//! Parameter layout of the PADsynth instrument.
//!
//! Integer parameters whose musical value can be negative are stored with an
//! offset (octave 12 is "no shift") so every raw value stays non-negative.

use std::f64::consts::TAU;

use crate::param::{
    DecibelScale, IntScale, LinearScale, LogScale, ParamFlags, ParameterStore, Preset, Scale,
    Value,
};

pub const N_OVERTONE: usize = 360;

/// Flat indices into the PADsynth [`ParameterStore`].
pub mod param_id {
    use super::N_OVERTONE;

    pub const BYPASS: usize = 0;

    pub const OVERTONE_GAIN0: usize = 1;
    pub const OVERTONE_WIDTH0: usize = OVERTONE_GAIN0 + N_OVERTONE;
    pub const OVERTONE_PITCH0: usize = OVERTONE_WIDTH0 + N_OVERTONE;
    pub const OVERTONE_PHASE0: usize = OVERTONE_PITCH0 + N_OVERTONE;

    pub const TABLE_BASE_FREQUENCY: usize = OVERTONE_PHASE0 + N_OVERTONE;
    pub const PADSYNTH_SEED: usize = TABLE_BASE_FREQUENCY + 1;
    pub const OVERTONE_GAIN_POWER: usize = TABLE_BASE_FREQUENCY + 2;
    pub const OVERTONE_WIDTH_MULTIPLY: usize = TABLE_BASE_FREQUENCY + 3;
    pub const OVERTONE_PITCH_MULTIPLY: usize = TABLE_BASE_FREQUENCY + 4;
    pub const OVERTONE_PITCH_MODULO: usize = TABLE_BASE_FREQUENCY + 5;
    pub const SPECTRUM_EXPAND: usize = TABLE_BASE_FREQUENCY + 6;
    pub const SPECTRUM_SHIFT: usize = TABLE_BASE_FREQUENCY + 7;
    pub const PROFILE_COMB: usize = TABLE_BASE_FREQUENCY + 8;
    pub const PROFILE_SHAPE: usize = TABLE_BASE_FREQUENCY + 9;
    pub const UNIFORM_PHASE_PROFILE: usize = TABLE_BASE_FREQUENCY + 10;

    pub const GAIN: usize = UNIFORM_PHASE_PROFILE + 1;
    pub const GAIN_A: usize = GAIN + 1;
    pub const GAIN_D: usize = GAIN + 2;
    pub const GAIN_S: usize = GAIN + 3;
    pub const GAIN_R: usize = GAIN + 4;
    pub const GAIN_CURVE: usize = GAIN + 5;

    pub const FILTER_CUTOFF: usize = GAIN_CURVE + 1;
    pub const FILTER_RESONANCE: usize = FILTER_CUTOFF + 1;
    pub const FILTER_A: usize = FILTER_CUTOFF + 2;
    pub const FILTER_D: usize = FILTER_CUTOFF + 3;
    pub const FILTER_S: usize = FILTER_CUTOFF + 4;
    pub const FILTER_R: usize = FILTER_CUTOFF + 5;
    pub const FILTER_AMOUNT: usize = FILTER_CUTOFF + 6;
    pub const FILTER_KEY_FOLLOW: usize = FILTER_CUTOFF + 7;

    pub const DELAY_MIX: usize = FILTER_KEY_FOLLOW + 1;
    pub const DELAY_DETUNE_SEMI: usize = DELAY_MIX + 1;
    pub const DELAY_DETUNE_MILLI: usize = DELAY_MIX + 2;
    pub const DELAY_FEEDBACK: usize = DELAY_MIX + 3;
    pub const DELAY_ATTACK: usize = DELAY_MIX + 4;

    pub const OSC_OCTAVE: usize = DELAY_ATTACK + 1;
    pub const OSC_SEMI: usize = OSC_OCTAVE + 1;
    pub const OSC_MILLI: usize = OSC_OCTAVE + 2;
    pub const EQUAL_TEMPERAMENT: usize = OSC_OCTAVE + 3;
    pub const PITCH_A4_HZ: usize = OSC_OCTAVE + 4;

    pub const OSC_INITIAL_PHASE: usize = PITCH_A4_HZ + 1;
    pub const OSC_PHASE_RESET: usize = OSC_INITIAL_PHASE + 1;
    pub const OSC_PHASE_RANDOM: usize = OSC_INITIAL_PHASE + 2;

    pub const N_UNISON: usize = OSC_PHASE_RANDOM + 1;
    pub const UNISON_DETUNE: usize = N_UNISON + 1;
    pub const UNISON_PAN: usize = N_UNISON + 2;
    pub const UNISON_PHASE: usize = N_UNISON + 3;
    pub const UNISON_GAIN_RANDOM: usize = N_UNISON + 4;
    pub const UNISON_DETUNE_RANDOM: usize = N_UNISON + 5;
    pub const UNISON_PAN_TYPE: usize = N_UNISON + 6;

    pub const N_VOICE: usize = UNISON_PAN_TYPE + 1;
    pub const SMOOTHNESS: usize = N_VOICE + 1;
    pub const SEED: usize = N_VOICE + 2;
    pub const PITCH_BEND: usize = N_VOICE + 3;
    pub const REFRESH_TABLE: usize = N_VOICE + 4;

    pub const LEN: usize = REFRESH_TABLE + 1;
}

/// Raw offsets of the centered integer parameters.
pub const OCTAVE_CENTER: i64 = 12;
pub const SEMI_CENTER: i64 = 120;
pub const MILLI_CENTER: i64 = 1000;
pub const EQUAL_TEMPERAMENT_OFFSET: f64 = 1.0;
pub const PITCH_A4_OFFSET: f64 = 100.0;

/// Every scale of the instrument, built once per core.
#[derive(Debug, Clone)]
pub struct Scales {
    pub spectrum_size: u32,
    pub bool_scale: IntScale,
    pub default_scale: LinearScale,

    pub overtone_gain: DecibelScale,
    pub overtone_width: LinearScale,
    pub overtone_pitch: LogScale,
    pub overtone_phase: LinearScale,

    pub table_base_frequency: LogScale,
    pub seed: IntScale,
    pub overtone_gain_power: LogScale,
    pub overtone_width_multiply: LogScale,
    pub overtone_pitch_multiply: LogScale,
    pub overtone_pitch_modulo: LinearScale,
    pub spectrum_expand: LogScale,
    pub spectrum_shift: IntScale,
    pub profile_comb: IntScale,
    pub profile_shape: LogScale,

    pub gain: LogScale,
    pub envelope_a: LogScale,
    pub envelope_d: LogScale,
    pub envelope_s: LogScale,
    pub envelope_r: LogScale,
    pub envelope_curve: LinearScale,

    pub filter_cutoff: LogScale,
    pub filter_resonance: LinearScale,
    pub filter_amount: LinearScale,

    pub delay_detune_semi: IntScale,
    pub delay_feedback: LinearScale,

    pub osc_octave: IntScale,
    pub osc_semi: IntScale,
    pub osc_milli: IntScale,
    pub equal_temperament: IntScale,
    pub pitch_a4_hz: IntScale,

    pub n_unison: IntScale,
    pub unison_detune: LogScale,
    pub unison_pan_type: IntScale,
    pub n_voice: IntScale,
    pub smoothness: LogScale,
}

impl Scales {
    /// `spectrum_size` is half the table size; the shift scale spans
    /// `-spectrum_size..=spectrum_size` bins.
    pub fn new(spectrum_size: u32) -> Self {
        Self {
            spectrum_size,
            bool_scale: IntScale::new(1),
            default_scale: LinearScale::new(0.0, 1.0),

            overtone_gain: DecibelScale::new(-60.0, 0.0, true),
            overtone_width: LinearScale::new(0.0, 100.0),
            overtone_pitch: LogScale::new(0.0625, 16.0, 0.5, 1.0),
            overtone_phase: LinearScale::new(0.0, TAU),

            table_base_frequency: LogScale::new(1.0, 100.0, 0.5, 10.0),
            seed: IntScale::new(16_777_215),
            overtone_gain_power: LogScale::new(0.2, 10.0, 0.5, 1.0),
            overtone_width_multiply: LogScale::new(0.05, 12.0, 0.5, 1.0),
            overtone_pitch_multiply: LogScale::new(0.0001, 16.0, 0.5, 1.0),
            overtone_pitch_modulo: LinearScale::new(0.0, 136.0),
            spectrum_expand: LogScale::new(0.03125, 32.0, 0.5, 1.0),
            spectrum_shift: IntScale::new(2 * spectrum_size),
            profile_comb: IntScale::new(255),
            profile_shape: LogScale::new(0.0, 16.0, 0.5, 1.0),

            gain: LogScale::new(0.0, 16.0, 0.5, 2.0),
            envelope_a: LogScale::new(0.0001, 16.0, 0.5, 2.0),
            envelope_d: LogScale::new(0.0001, 16.0, 0.5, 4.0),
            envelope_s: LogScale::new(0.0001, 0.9995, 0.5, 0.3),
            envelope_r: LogScale::new(0.001, 16.0, 0.5, 2.0),
            envelope_curve: LinearScale::new(-4.0, 4.0),

            filter_cutoff: LogScale::new(20.0, 20_000.0, 0.5, 800.0),
            filter_resonance: LinearScale::new(0.0, 1.0),
            filter_amount: LinearScale::new(-1.0, 1.0),

            delay_detune_semi: IntScale::new(240),
            delay_feedback: LinearScale::new(-1.0, 1.0),

            osc_octave: IntScale::new(16),
            osc_semi: IntScale::new(168),
            osc_milli: IntScale::new(2000),
            equal_temperament: IntScale::new(119),
            pitch_a4_hz: IntScale::new(900),

            n_unison: IntScale::new(15),
            unison_detune: LogScale::new(0.0, 1.0, 0.5, 0.05),
            unison_pan_type: IntScale::new(9),
            n_voice: IntScale::new(7),
            smoothness: LogScale::new(0.0, 0.5, 0.1, 0.04),
        }
    }
}

fn automable() -> ParamFlags {
    ParamFlags::AUTOMABLE
}

fn linear(name: impl Into<String>, scale: LinearScale, default_normalized: f64) -> Value {
    Value::new(name, scale, default_normalized, automable())
}

fn log(name: impl Into<String>, scale: LogScale, default_normalized: f64) -> Value {
    Value::new(name, scale, default_normalized, automable() | ParamFlags::LOGARITHMIC)
}

fn log_at(name: impl Into<String>, scale: LogScale, default_raw: f64) -> Value {
    let normalized = scale.invmap(default_raw);
    log(name, scale, normalized)
}

/// Builds the instrument's store at default values.
pub fn padsynth_parameters(scales: &Scales) -> ParameterStore {
    let s = scales;
    let mut values = Vec::with_capacity(param_id::LEN);

    values.push(Value::boolean("bypass", s.bool_scale, false));

    for i in 0..N_OVERTONE {
        let gain = s.overtone_gain.invmap(1.0 / (i + 1) as f64);
        values.push(Value::new(
            format!("overtoneGain{i}"),
            s.overtone_gain,
            gain,
            automable(),
        ));
    }
    for i in 0..N_OVERTONE {
        values.push(linear(format!("overtoneWidth{i}"), s.overtone_width, 0.5));
    }
    for i in 0..N_OVERTONE {
        values.push(log_at(format!("overtonePitch{i}"), s.overtone_pitch, 1.0));
    }
    for i in 0..N_OVERTONE {
        values.push(linear(format!("overtonePhase{i}"), s.overtone_phase, 1.0));
    }

    values.push(log_at("tableBaseFrequency", s.table_base_frequency, 10.0));
    values.push(Value::int("padSynthSeed", s.seed, 0));
    values.push(log("overtoneGainPower", s.overtone_gain_power, 0.5));
    values.push(log("overtoneWidthMultiply", s.overtone_width_multiply, 0.5));
    values.push(log_at("overtonePitchMultiply", s.overtone_pitch_multiply, 1.0));
    values.push(linear("overtonePitchModulo", s.overtone_pitch_modulo, 0.0));
    values.push(log_at("spectrumExpand", s.spectrum_expand, 1.0));
    values.push(Value::int("spectrumShift", s.spectrum_shift, s.spectrum_size));
    values.push(Value::int("profileComb", s.profile_comb, 0));
    values.push(log_at("profileShape", s.profile_shape, 1.0));
    values.push(Value::boolean("uniformPhaseProfile", s.bool_scale, false));

    values.push(log("gain", s.gain, 0.5));
    values.push(log("gainA", s.envelope_a, 0.0));
    values.push(log("gainD", s.envelope_d, 0.5));
    values.push(log("gainS", s.envelope_s, 0.5));
    values.push(log("gainR", s.envelope_r, 0.3));
    values.push(linear("gainCurve", s.envelope_curve, 0.5));

    values.push(log("filterCutoff", s.filter_cutoff, 1.0));
    values.push(linear("filterResonance", s.filter_resonance, 0.0));
    values.push(log("filterA", s.envelope_a, 0.0));
    values.push(log("filterD", s.envelope_d, 0.5));
    values.push(log("filterS", s.envelope_s, 0.5));
    values.push(log("filterR", s.envelope_r, 1.0));
    values.push(linear("filterAmount", s.filter_amount, 0.5));
    values.push(linear("filterKeyFollow", s.default_scale, 0.0));

    values.push(linear("delayMix", s.default_scale, 0.0));
    values.push(Value::int("delayDetuneSemi", s.delay_detune_semi, SEMI_CENTER as u32));
    values.push(Value::int("delayDetuneMilli", s.osc_milli, MILLI_CENTER as u32));
    values.push(linear("delayFeedback", s.delay_feedback, 0.5));
    values.push(log("delayAttack", s.envelope_a, 0.0));

    values.push(Value::int("oscOctave", s.osc_octave, OCTAVE_CENTER as u32));
    values.push(Value::int("oscSemi", s.osc_semi, SEMI_CENTER as u32));
    values.push(Value::int("oscMilli", s.osc_milli, MILLI_CENTER as u32));
    values.push(Value::int("equalTemperament", s.equal_temperament, 11));
    values.push(Value::int("pitchA4Hz", s.pitch_a4_hz, 340));

    values.push(linear("oscInitialPhase", s.default_scale, 1.0));
    values.push(Value::boolean("oscPhaseReset", s.bool_scale, true));
    values.push(Value::boolean("oscPhaseRandom", s.bool_scale, true));

    values.push(Value::int("nUnison", s.n_unison, 0));
    values.push(log("unisonDetune", s.unison_detune, 0.2));
    values.push(linear("unisonPan", s.default_scale, 1.0));
    values.push(linear("unisonPhase", s.default_scale, 1.0));
    values.push(linear("unisonGainRandom", s.default_scale, 0.0));
    values.push(Value::boolean("unisonDetuneRandom", s.bool_scale, true));
    values.push(Value::int("unisonPanType", s.unison_pan_type, 0));

    values.push(Value::int("nVoice", s.n_voice, 1));
    values.push(log("smoothness", s.smoothness, 0.1));
    values.push(Value::int("seed", s.seed, 0));
    values.push(linear("pitchBend", s.default_scale, 0.5));
    values.push(Value::boolean("refreshTable", s.bool_scale, false));

    debug_assert_eq!(values.len(), param_id::LEN);
    ParameterStore::new(values)
}

/// Built-in programs. Index 0 is the default patch.
pub fn padsynth_presets(scales: &Scales) -> Vec<Preset> {
    let s = scales;
    vec![
        Preset::new("Init", Vec::new()),
        Preset::new(
            "Slow Strings",
            vec![
                (param_id::GAIN_A, s.envelope_a.invmap(0.4)),
                (param_id::GAIN_S, s.envelope_s.invmap(0.7)),
                (param_id::GAIN_R, s.envelope_r.invmap(1.2)),
                (param_id::FILTER_CUTOFF, s.filter_cutoff.invmap(2400.0)),
                (param_id::FILTER_AMOUNT, s.filter_amount.invmap(0.25)),
                (param_id::N_UNISON, s.n_unison.invmap(3.0)),
                (param_id::UNISON_PAN_TYPE, s.unison_pan_type.invmap(4.0)),
            ],
        ),
        Preset::new(
            "Wide Shimmer",
            vec![
                (param_id::OVERTONE_WIDTH_MULTIPLY, s.overtone_width_multiply.invmap(4.0)),
                (param_id::N_UNISON, s.n_unison.invmap(7.0)),
                (param_id::UNISON_DETUNE, s.unison_detune.invmap(0.01)),
                (param_id::UNISON_PAN_TYPE, s.unison_pan_type.invmap(9.0)),
                (param_id::DELAY_MIX, 0.35),
                (param_id::DELAY_DETUNE_SEMI, s.delay_detune_semi.invmap(132.0)),
                (param_id::DELAY_ATTACK, s.envelope_a.invmap(0.8)),
            ],
        ),
    ]
}

//! Four-level allpass lattice reverb.
//!
//! ```text
//!  in L ─┬──────────────────────────────────── × dry ─┐
//!        ├─(+ cross · in R)─→ Lattice4 ─┐             ├─→ out L
//!                                       ├─ mid/side ─ × wet ─┘
//!        ├─(+ cross · in L)─→ Lattice4 ─┘             ├─→ out R
//!  in R ─┴──────────────────────────────────── × dry ─┘
//! ```
//!
//! Both channels share every parameter. Leaf times are decorrelated with a
//! fixed table of small offsets drawn from a generator seeded with zero, so
//! the same parameters always give the same stereo image.
//!
//! Memory grows with `2 · 256 · 2 · sample_rate · max_delay_seconds` floats.

use std::marker::PhantomData;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::CoreConfig;
use crate::dsp::allpass::{stability, Stability};
use crate::dsp::lattice::{calc_offset, AllpassNode, Lattice4, LATTICE_DEPTH, LATTICE_WIDTH};
use crate::dsp::smoother::{LinearSmoother, SmootherCommon};
use crate::engine::{Backend, DspCore, InstructionSet};
use crate::error::{Error, Result};
use crate::param::{ParameterStore, Preset};

use super::params::{lattice_id, lattice_parameters, lattice_presets, EffectScales, N_LEAF};

const DEFAULT_SMOOTHING_SECONDS: f32 = 0.2;
const OFFSET_SEED: u64 = 0;
const MAX_TIME_OFFSET: f32 = 0.05;

const W: usize = LATTICE_WIDTH;

fn targets(feeds: &[LinearSmoother; W]) -> [f32; W] {
    std::array::from_fn(|i| feeds[i].target())
}

/// Component-wise worst of two diagnostics.
fn worst(a: Stability, b: Stability) -> Stability {
    Stability {
        sum_abs: a.sum_abs.max(b.sum_abs),
        sum_sq: a.sum_sq.max(b.sum_sq),
        max_abs: a.max_abs.max(b.max_abs),
        stages: a.stages.max(b.stages),
    }
}

fn worst_of<'a>(feeds: impl Iterator<Item = &'a [LinearSmoother; W]>) -> Stability {
    feeds.map(|f| stability(&targets(f))).fold(stability(&[0.0; W]), worst)
}

pub struct LatticeReverbCore<B: Backend> {
    sample_rate: f32,
    max_delay_seconds: f32,
    scales: EffectScales,
    params: ParameterStore,
    presets: Vec<Preset>,

    common: SmootherCommon,
    cross: LinearSmoother,
    spread: LinearSmoother,
    dry: LinearSmoother,
    wet: LinearSmoother,
    bypass: bool,
    lattice: [Box<Lattice4>; 2],

    _backend: PhantomData<B>,
}

impl<B: Backend> LatticeReverbCore<B> {
    pub fn new(config: CoreConfig, sample_rate: f32) -> Result<Self> {
        config.validate()?;
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::config("sample_rate", format!("{sample_rate} is not a positive rate")));
        }

        let scales = EffectScales::new(config.max_delay_seconds);
        let params = lattice_parameters(&scales);
        let presets = lattice_presets(&scales);
        let max_delay_seconds = config.max_delay_seconds;

        let mut core = Self {
            sample_rate,
            max_delay_seconds,
            scales,
            params,
            presets,
            common: SmootherCommon::new(sample_rate, DEFAULT_SMOOTHING_SECONDS),
            cross: LinearSmoother::default(),
            spread: LinearSmoother::default(),
            dry: LinearSmoother::default(),
            wet: LinearSmoother::default(),
            bypass: false,
            lattice: std::array::from_fn(|_| Box::new(Lattice4::new(sample_rate, max_delay_seconds))),
            _backend: PhantomData,
        };
        core.set_parameters(0.0);
        core.setup(sample_rate);
        Ok(core)
    }

    /// Reallocates both lattices for `sample_rate`. Not realtime safe.
    pub fn setup(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.common.set_sample_rate(sample_rate);
        for lattice in self.lattice.iter_mut() {
            lattice.setup(sample_rate, self.max_delay_seconds);
        }
        self.reset();
    }

    /// Clears both lattices and jumps every smoother to the current
    /// parameters.
    pub fn reset(&mut self) {
        self.assign(true);
        for lattice in self.lattice.iter_mut() {
            lattice.reset();
        }
        for s in [&mut self.cross, &mut self.spread, &mut self.dry, &mut self.wet] {
            let target = s.target();
            s.reset(target);
        }
    }

    pub fn startup(&mut self) {}

    pub fn set_parameters(&mut self, _tempo: f64) {
        let p = &self.params;
        let float = |index: usize| p.get_float(index) as f32;

        self.common.set_time(float(lattice_id::SMOOTHNESS));
        self.cross.push(&self.common, float(lattice_id::STEREO_CROSS));
        self.spread.push(&self.common, float(lattice_id::STEREO_SPREAD));
        self.dry.push(&self.common, float(lattice_id::DRY));
        self.wet.push(&self.common, float(lattice_id::WET));
        self.bypass = p.get_bool(lattice_id::BYPASS);

        self.assign(false);
    }

    /// Sends every time and feed parameter to both lattices, either ramping
    /// or jumping. Offsets are redrawn from the fixed seed each call.
    fn assign(&mut self, snap: bool) {
        let p = &self.params;
        let float = |index: usize| p.get_float(index) as f32;

        let time_mul = float(lattice_id::TIME_MULTIPLY);
        let inner_mul = float(lattice_id::INNER_FEED_MULTIPLY);
        let d1_mul = float(lattice_id::D1_FEED_MULTIPLY);
        let d2_mul = float(lattice_id::D2_FEED_MULTIPLY);
        let d3_mul = float(lattice_id::D3_FEED_MULTIPLY);
        let d4_mul = float(lattice_id::D4_FEED_MULTIPLY);

        let mut rng = Pcg32::seed_from_u64(OFFSET_SEED);
        let offsets: [f32; N_LEAF] =
            std::array::from_fn(|_| rng.gen_range(-MAX_TIME_OFFSET..MAX_TIME_OFFSET));

        let common = &self.common;
        let set = |s: &mut LinearSmoother, value: f32| {
            if snap {
                s.reset(value);
            } else {
                s.push(common, value);
            }
        };

        for (ch, lattice) in self.lattice.iter_mut().enumerate() {
            for (i4, s) in lattice.feed.iter_mut().enumerate() {
                set(s, d4_mul * float(lattice_id::D4_FEED0 + i4));
            }
            for (i4, node3) in lattice.children.iter_mut().enumerate() {
                for (d3, s) in node3.feed.iter_mut().enumerate() {
                    set(s, d3_mul * float(lattice_id::D3_FEED0 + i4 * W + d3));
                }
                for (d3, node2) in node3.children.iter_mut().enumerate() {
                    let i3 = i4 * W + d3;
                    for (d2, s) in node2.feed.iter_mut().enumerate() {
                        set(s, d2_mul * float(lattice_id::D2_FEED0 + i3 * W + d2));
                    }
                    for (d2, leaf) in node2.children.iter_mut().enumerate() {
                        let i2 = i3 * W + d2;
                        for d1 in 0..W {
                            let i1 = i2 * W + d1;
                            let time = calc_offset(offsets[i1], time_mul)[ch] * float(lattice_id::TIME0 + i1);
                            set(&mut leaf.seconds[d1], time);
                            set(&mut leaf.inner_feed[d1], inner_mul * float(lattice_id::INNER_FEED0 + i1));
                            set(&mut leaf.outer_feed[d1], d1_mul * float(lattice_id::D1_FEED0 + i1));
                        }
                    }
                }
            }
        }
    }

    /// Reverberates the first two `inputs` into the first two `outputs`. A
    /// single input feeds both sides; missing inputs are silence.
    pub fn process(&mut self, length: usize, inputs: &[&[f32]], outputs: &mut [&mut [f32]]) {
        let length = inputs
            .iter()
            .take(2)
            .map(|x| x.len())
            .chain(outputs.iter().take(2).map(|x| x.len()))
            .fold(length, usize::min);
        self.common.set_buffer_size(length);

        for i in 0..length {
            self.common.set_buffer_index(i);
            let in0 = inputs.first().map_or(0.0, |x| x[i]);
            let in1 = inputs.get(1).map_or(in0, |x| x[i]);

            let cross = self.cross.process();
            let spread = self.spread.process();
            let dry = self.dry.process();
            let wet = self.wet.process();

            let frame = if self.bypass {
                [in0, in1]
            } else {
                let [left, right] = &mut self.lattice;
                let l = left.process(in0 + cross * in1, self.sample_rate);
                let r = right.process(in1 + cross * in0, self.sample_rate);

                let mid = l + r;
                let side = l - r;
                let l = mid - spread * (mid - side);
                let r = mid - spread * (mid + side);
                [dry * in0 + wet * l, dry * in1 + wet * r]
            };

            for (out, value) in outputs.iter_mut().zip(frame) {
                out[i] = value;
            }
        }

        for out in outputs.iter_mut().take(2) {
            B::sanitize(&mut out[..length]);
        }
    }

    /// Worst S/T/A diagnostics per level, innermost first. Feeds are read at
    /// their targets.
    pub fn level_stability(&self) -> [Stability; LATTICE_DEPTH] {
        let l4 = &self.lattice[0];
        let nodes3 = || l4.children.iter();
        let nodes2 = || nodes3().flat_map(|n| n.children.iter());
        let leaves = || nodes2().flat_map(|n| n.children.iter());
        [
            worst_of(leaves().map(|leaf| &leaf.outer_feed)),
            worst_of(nodes2().map(|n| &n.feed)),
            worst_of(nodes3().map(|n| &n.feed)),
            worst_of(std::iter::once(&l4.feed)),
        ]
    }

    pub fn stability(&self) -> Stability {
        let [first, rest @ ..] = self.level_stability();
        rest.into_iter().fold(first, worst)
    }

    pub fn load_program(&mut self, index: usize) {
        self.params.load_program(&self.presets, index);
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn scales(&self) -> &EffectScales {
        &self.scales
    }
}

impl<B: Backend> DspCore for LatticeReverbCore<B> {
    fn setup(&mut self, sample_rate: f32) {
        LatticeReverbCore::setup(self, sample_rate);
    }

    fn reset(&mut self) {
        LatticeReverbCore::reset(self);
    }

    fn startup(&mut self) {
        LatticeReverbCore::startup(self);
    }

    fn set_parameters(&mut self, tempo: f64) {
        LatticeReverbCore::set_parameters(self, tempo);
    }

    fn process(&mut self, length: usize, inputs: &[&[f32]], outputs: &mut [&mut [f32]]) {
        LatticeReverbCore::process(self, length, inputs, outputs);
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
        LatticeReverbCore::load_program(self, index);
    }

    fn instruction_set(&self) -> InstructionSet {
        B::SET
    }

    fn stability(&self) -> Option<Stability> {
        Some(LatticeReverbCore::stability(self))
    }
}

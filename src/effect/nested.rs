//! Eight-stage nested Schroeder allpass as a stereo effect core.
//!
//! Each channel runs its own chain. Stage settings are shared: every sample
//! the smoothers produce one set of stages and both chains take it.
//!
//! ```text
//! time[i]  × timeMultiply      ─┐
//! outer[i] × outerFeedMultiply ─┼─→ smoothers ─→ stage i of both chains
//! inner[i] × innerFeedMultiply ─┘
//! ```

use std::marker::PhantomData;

use crate::config::CoreConfig;
use crate::dsp::allpass::{stability, AllpassStage, NestedSchroeder, Stability};
use crate::dsp::smoother::{LinearSmoother, SmootherCommon};
use crate::engine::{Backend, DspCore, InstructionSet};
use crate::error::{Error, Result};
use crate::param::{ParameterStore, Preset};

use super::params::{nested_id, nested_parameters, nested_presets, EffectScales, NESTING_DEPTH};

const DEFAULT_SMOOTHING_SECONDS: f32 = 0.01;

type Smoothers = [LinearSmoother; NESTING_DEPTH];

pub struct NestedAllpassCore<B: Backend> {
    sample_rate: f32,
    max_delay_seconds: f32,
    scales: EffectScales,
    params: ParameterStore,
    presets: Vec<Preset>,

    common: SmootherCommon,
    seconds: Smoothers,
    outer_feed: Smoothers,
    inner_feed: Smoothers,
    chains: [NestedSchroeder<NESTING_DEPTH>; 2],

    _backend: PhantomData<B>,
}

impl<B: Backend> NestedAllpassCore<B> {
    pub fn new(config: CoreConfig, sample_rate: f32) -> Result<Self> {
        config.validate()?;
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::config("sample_rate", format!("{sample_rate} is not a positive rate")));
        }

        let scales = EffectScales::new(config.max_delay_seconds);
        let params = nested_parameters(&scales);
        let presets = nested_presets(&scales);
        let max_delay_seconds = config.max_delay_seconds;

        let mut core = Self {
            sample_rate,
            max_delay_seconds,
            scales,
            params,
            presets,
            common: SmootherCommon::new(sample_rate, DEFAULT_SMOOTHING_SECONDS),
            seconds: Default::default(),
            outer_feed: Default::default(),
            inner_feed: Default::default(),
            chains: std::array::from_fn(|_| NestedSchroeder::new(sample_rate, max_delay_seconds)),
            _backend: PhantomData,
        };
        core.set_parameters(0.0);
        core.setup(sample_rate);
        Ok(core)
    }

    /// Reallocates both chains for `sample_rate`. Not realtime safe.
    pub fn setup(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.common.set_sample_rate(sample_rate);
        for chain in self.chains.iter_mut() {
            chain.setup(sample_rate, self.max_delay_seconds);
        }
        self.reset();
    }

    /// Clears both chains and jumps every stage to its target.
    pub fn reset(&mut self) {
        for s in self
            .seconds
            .iter_mut()
            .chain(self.outer_feed.iter_mut())
            .chain(self.inner_feed.iter_mut())
        {
            let target = s.target();
            s.reset(target);
        }

        let stages = self.current_stages();
        for chain in self.chains.iter_mut() {
            chain.reset();
            chain.stages = stages;
        }
    }

    pub fn startup(&mut self) {}

    pub fn set_parameters(&mut self, _tempo: f64) {
        let p = &self.params;
        let float = |index: usize| p.get_float(index) as f32;

        self.common.set_time(float(nested_id::SMOOTHNESS));

        let time_mul = float(nested_id::TIME_MULTIPLY);
        let outer_mul = float(nested_id::OUTER_FEED_MULTIPLY);
        let inner_mul = float(nested_id::INNER_FEED_MULTIPLY);
        for idx in 0..NESTING_DEPTH {
            self.seconds[idx].push(&self.common, time_mul * float(nested_id::TIME0 + idx));
            self.outer_feed[idx].push(&self.common, outer_mul * float(nested_id::OUTER_FEED0 + idx));
            self.inner_feed[idx].push(&self.common, inner_mul * float(nested_id::INNER_FEED0 + idx));
        }
    }

    fn current_stages(&self) -> [AllpassStage; NESTING_DEPTH] {
        std::array::from_fn(|idx| AllpassStage {
            seconds: self.seconds[idx].value(),
            outer_feed: self.outer_feed[idx].value(),
            inner_feed: self.inner_feed[idx].value(),
        })
    }

    /// Filters up to two channels in place of `outputs`. Channel `c` reads
    /// `inputs[c]`; outputs without a matching input are left untouched.
    pub fn process(&mut self, length: usize, inputs: &[&[f32]], outputs: &mut [&mut [f32]]) {
        let channels = inputs.len().min(outputs.len()).min(self.chains.len());
        let length = inputs[..channels]
            .iter()
            .map(|x| x.len())
            .chain(outputs[..channels].iter().map(|x| x.len()))
            .fold(length, usize::min);
        self.common.set_buffer_size(length);

        for i in 0..length {
            self.common.set_buffer_index(i);
            let stages: [AllpassStage; NESTING_DEPTH] = std::array::from_fn(|idx| AllpassStage {
                seconds: self.seconds[idx].process(),
                outer_feed: self.outer_feed[idx].process(),
                inner_feed: self.inner_feed[idx].process(),
            });
            for (ch, chain) in self.chains[..channels].iter_mut().enumerate() {
                chain.stages = stages;
                outputs[ch][i] = chain.process(inputs[ch][i], self.sample_rate);
            }
        }

        for out in outputs[..channels].iter_mut() {
            B::sanitize(&mut out[..length]);
        }
    }

    /// S/T/A diagnostics of the outer feeds the chain is heading to.
    pub fn stability(&self) -> Stability {
        let feeds: [f32; NESTING_DEPTH] = std::array::from_fn(|idx| self.outer_feed[idx].target());
        stability(&feeds)
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

impl<B: Backend> DspCore for NestedAllpassCore<B> {
    fn setup(&mut self, sample_rate: f32) {
        NestedAllpassCore::setup(self, sample_rate);
    }

    fn reset(&mut self) {
        NestedAllpassCore::reset(self);
    }

    fn startup(&mut self) {
        NestedAllpassCore::startup(self);
    }

    fn set_parameters(&mut self, tempo: f64) {
        NestedAllpassCore::set_parameters(self, tempo);
    }

    fn process(&mut self, length: usize, inputs: &[&[f32]], outputs: &mut [&mut [f32]]) {
        NestedAllpassCore::process(self, length, inputs, outputs);
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
        NestedAllpassCore::load_program(self, index);
    }

    fn instruction_set(&self) -> InstructionSet {
        B::SET
    }

    fn stability(&self) -> Option<Stability> {
        Some(NestedAllpassCore::stability(self))
    }
}

//! Per-sample parameter smoothing.

use std::f32::consts::TAU;

/*
Parameter Smoothing
===================

Host automation and UI knobs deliver parameter values once per block. Jumping
straight to a new value makes an audible click, so every parameter that
reaches the signal path goes through a smoother that spreads the change over
a few milliseconds.

Vocabulary
----------

  target      The value most recently pushed. The smoother moves toward it.

  ramp        A straight line from the value at push time to the target,
              lasting a fixed number of samples. Ends EXACTLY on target.

  one-pole    A lowpass on the parameter stream:
                  value += kp * (target - value)
              Approaches the target asymptotically, never overshoots.

  common      Sample rate, ramp length and the one-pole coefficient are the
              same for dozens of parameters. `SmootherCommon` holds them once
              and each smoother reads from it, so there is one divide and one
              `cos` per configuration change instead of one per parameter.

  local       A smoother that carries its own timing, for places where the
              ramp length differs from the shared one (envelope sustain,
              delay attack).


One-pole Coefficient
--------------------

For a cutoff fc at sample rate fs:

    y  = 1 - cos(2π fc / fs)
    kp = -y + sqrt(y² + 2y)

This places the -3 dB point of the recursive lowpass exactly at fc. The
smoothing time in seconds maps to a cutoff of 1 / time.


Block Ratio
-----------

`BlockSmoother` interpolates across the current block instead of a fixed
ramp: at position i of an n-sample block the value is

    start + (target - start) * (i + 1) / n

The ratio lives in `SmootherCommon` and is advanced by the block loop with
`set_buffer_index`. Every block smoother in a core reads the same ratio, so
the loop must call `set_buffer_index` once per sample, before any smoother
of that sample is processed.
*/

/// Maps a cutoff frequency to a one-pole feedback coefficient in (0, 1].
pub fn cutoff_to_p(sample_rate: f32, cutoff_hz: f32) -> f32 {
    let cutoff = cutoff_hz.clamp(0.0, sample_rate * 0.5);
    let y = 1.0 - (TAU * cutoff / sample_rate).cos();
    -y + (y * y + 2.0 * y).sqrt()
}

fn time_to_p(sample_rate: f32, seconds: f32) -> f32 {
    if seconds <= 0.0 {
        return 1.0;
    }
    cutoff_to_p(sample_rate, 1.0 / seconds)
}

/// Timing shared by every smoother of one core.
#[derive(Debug, Clone)]
pub struct SmootherCommon {
    sample_rate: f32,
    time: f32,
    time_in_samples: u32,
    ramp_fraction: f32,
    kp: f32,
    buffer_size: usize,
    buffer_index: usize,
    block_step: f32,
    block_ratio: f32,
}

impl SmootherCommon {
    pub fn new(sample_rate: f32, seconds: f32) -> Self {
        let mut common = Self {
            sample_rate,
            time: seconds,
            time_in_samples: 0,
            ramp_fraction: 0.0,
            kp: 1.0,
            buffer_size: 1,
            buffer_index: 0,
            block_step: 1.0,
            block_ratio: 1.0,
        };
        common.refresh();
        common
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.refresh();
    }

    pub fn set_time(&mut self, seconds: f32) {
        if seconds == self.time {
            return;
        }
        self.time = seconds;
        self.refresh();
    }

    /// Call once per block before any smoother of that block is processed.
    pub fn set_buffer_size(&mut self, length: usize) {
        self.buffer_size = length.max(1);
        self.block_step = 1.0 / self.buffer_size as f32;
        self.set_buffer_index(0);
    }

    pub fn set_buffer_index(&mut self, index: usize) {
        self.buffer_index = index.min(self.buffer_size - 1);
        self.block_ratio = (self.buffer_index + 1) as f32 * self.block_step;
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn time_in_samples(&self) -> u32 {
        self.time_in_samples
    }

    pub fn kp(&self) -> f32 {
        self.kp
    }

    pub fn buffer_index(&self) -> usize {
        self.buffer_index
    }

    pub fn block_ratio(&self) -> f32 {
        self.block_ratio
    }

    fn refresh(&mut self) {
        let samples = (self.time.max(0.0) * self.sample_rate).round();
        self.time_in_samples = samples as u32;
        self.ramp_fraction = if self.time_in_samples == 0 {
            0.0
        } else {
            1.0 / self.time_in_samples as f32
        };
        self.kp = time_to_p(self.sample_rate, self.time);
    }
}

/// Linear ramp with a fixed length read from `SmootherCommon`.
#[derive(Debug, Clone, Default)]
pub struct LinearSmoother {
    value: f32,
    target: f32,
    delta: f32,
    fraction: f32,
    remaining: u32,
}

impl LinearSmoother {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            ..Self::default()
        }
    }

    pub fn reset(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.delta = 0.0;
        self.remaining = 0;
    }

    /// Starts a new ramp from the current value. Pushing the current target
    /// again does not restart the ramp.
    pub fn push(&mut self, common: &SmootherCommon, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;
        self.remaining = common.time_in_samples;
        if self.remaining == 0 {
            self.value = target;
            self.delta = 0.0;
            return;
        }
        self.delta = self.value - target;
        self.fraction = common.ramp_fraction;
    }

    pub fn process(&mut self) -> f32 {
        if self.remaining == 0 {
            return self.value;
        }
        self.remaining -= 1;
        self.value = self.target + self.delta * (self.remaining as f32 * self.fraction);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.remaining == 0
    }
}

/// One-pole smoother driven by the common coefficient.
#[derive(Debug, Clone, Default)]
pub struct ExpSmoother {
    value: f32,
    target: f32,
}

impl ExpSmoother {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
        }
    }

    pub fn reset(&mut self, value: f32) {
        self.value = value;
        self.target = value;
    }

    pub fn push(&mut self, target: f32) {
        self.target = target;
    }

    pub fn process(&mut self, common: &SmootherCommon) -> f32 {
        self.value += common.kp * (self.target - self.value);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

/// Interpolates across the current block using the common block ratio.
#[derive(Debug, Clone, Default)]
pub struct BlockSmoother {
    value: f32,
    start: f32,
    target: f32,
}

impl BlockSmoother {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            start: value,
            target: value,
        }
    }

    pub fn reset(&mut self, value: f32) {
        self.value = value;
        self.start = value;
        self.target = value;
    }

    pub fn push(&mut self, target: f32) {
        self.start = self.value;
        self.target = target;
    }

    pub fn process(&mut self, common: &SmootherCommon) -> f32 {
        self.value = self.start + (self.target - self.start) * common.block_ratio;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

/// Linear ramp that owns its timing.
#[derive(Debug, Clone)]
pub struct LocalLinearSmoother {
    common: SmootherCommon,
    inner: LinearSmoother,
}

impl LocalLinearSmoother {
    pub fn new(sample_rate: f32, seconds: f32, value: f32) -> Self {
        Self {
            common: SmootherCommon::new(sample_rate, seconds),
            inner: LinearSmoother::new(value),
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.common.set_sample_rate(sample_rate);
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.common.set_time(seconds);
    }

    pub fn reset(&mut self, value: f32) {
        self.inner.reset(value);
    }

    pub fn push(&mut self, target: f32) {
        self.inner.push(&self.common, target);
    }

    pub fn process(&mut self) -> f32 {
        self.inner.process()
    }

    pub fn value(&self) -> f32 {
        self.inner.value()
    }
}

/// One-pole smoother that owns its coefficient.
#[derive(Debug, Clone)]
pub struct LocalExpSmoother {
    sample_rate: f32,
    kp: f32,
    value: f32,
    target: f32,
}

impl LocalExpSmoother {
    pub fn new(sample_rate: f32, seconds: f32, value: f32) -> Self {
        Self {
            sample_rate,
            kp: time_to_p(sample_rate, seconds),
            value,
            target: value,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32, seconds: f32) {
        self.sample_rate = sample_rate;
        self.set_time(seconds);
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.kp = time_to_p(self.sample_rate, seconds);
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.kp = cutoff_to_p(self.sample_rate, cutoff_hz);
    }

    pub fn reset(&mut self, value: f32) {
        self.value = value;
        self.target = value;
    }

    pub fn push(&mut self, target: f32) {
        self.target = target;
    }

    pub fn process(&mut self) -> f32 {
        self.value += self.kp * (self.target - self.value);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

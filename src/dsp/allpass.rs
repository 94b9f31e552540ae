//! Schroeder Allpass and Nested Allpass Diffusion
//!
//! A Schroeder allpass passes every frequency at unit gain and only smears
//! phase. Cascading a few of them gives diffusion, but the echoes stay
//! comb-like. Nesting them, so each stage sits inside the feedback loop of
//! the stage before it, makes echo density grow with every round trip.
//!
//! # Single Stage
//!
//! ```text
//!            ┌─────────── g ───────────┐
//!            │                         ↓
//! x ──→ (+) ─┴──→ [z^-M] ──┬──→ (+) ──→ y
//!        ↑                 │
//!        └────── -g ───────┘
//!
//! H(z) = (g + z^-M) / (1 + g z^-M)
//! ```
//!
//! The delay `M` is fractional (see [`Delay`]) so the stage time can be
//! smoothed while audio runs.
//!
//! # Nesting
//!
//! `NestedSchroeder<N>` runs in two passes. The forward pass subtracts each
//! stage's outer feedback from the running input. The reverse pass feeds the
//! innermost input through its allpass and walks outward, adding the outer
//! feedforward at each stage:
//!
//! ```text
//! forward:  u[i] = u[i-1] - a[i] * b[i]           (u[-1] = x)
//! reverse:  b[i] = AP_i(b[i+1]) + a[i] * u[i]     (b[N] = u[N-1])
//! output:   b[0]
//! ```
//!
//! # Stability
//!
//! The outer feeds `a[i]` form a lattice. Three sufficient conditions bound
//! its loop gain:
//!
//! - **S**: `Σ|a|  < 1`
//! - **T**: `Σa²   < 1/n`
//! - **A**: `max|a| < 1/n`
//!
//! None of them are enforced. [`Stability`] reports them so a UI can warn.

use super::delay::Delay;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stability {
    pub sum_abs: f32,
    pub sum_sq: f32,
    pub max_abs: f32,
    pub stages: usize,
}

impl Stability {
    pub fn stable_s(&self) -> bool {
        self.sum_abs < 1.0
    }

    pub fn stable_t(&self) -> bool {
        self.sum_sq < 1.0 / self.stages as f32
    }

    pub fn stable_a(&self) -> bool {
        self.max_abs < 1.0 / self.stages as f32
    }

    pub fn is_stable(&self) -> bool {
        self.stable_s() && self.stable_t() && self.stable_a()
    }
}

/// S/T/A diagnostics for a set of outer feed coefficients.
pub fn stability(feeds: &[f32]) -> Stability {
    let mut sum_abs = 0.0;
    let mut sum_sq = 0.0;
    let mut max_abs = 0.0f32;
    for &a in feeds {
        sum_abs += a.abs();
        sum_sq += a * a;
        max_abs = max_abs.max(a.abs());
    }
    Stability {
        sum_abs,
        sum_sq,
        max_abs,
        stages: feeds.len().max(1),
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchroederAllpass {
    buffer: f32,
    delay: Delay,
}

impl SchroederAllpass {
    pub fn new(sample_rate: f32, max_seconds: f32) -> Self {
        Self {
            buffer: 0.0,
            delay: Delay::new(sample_rate, max_seconds),
        }
    }

    pub fn setup(&mut self, sample_rate: f32, max_seconds: f32) {
        self.delay.setup(sample_rate, max_seconds);
        self.buffer = 0.0;
    }

    pub fn reset(&mut self) {
        self.buffer = 0.0;
        self.delay.reset();
    }

    /// `gain` in [-1, 1].
    pub fn process(&mut self, input: f32, sample_rate: f32, seconds: f32, gain: f32) -> f32 {
        let input = input - gain * self.buffer;
        let output = self.buffer + gain * input;
        self.buffer = self.delay.process(input, sample_rate, seconds);
        output
    }
}

/// Per-stage settings of a [`NestedSchroeder`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AllpassStage {
    pub seconds: f32,
    /// Nesting coefficient in [-1, 1].
    pub outer_feed: f32,
    /// Allpass gain in [-1, 1].
    pub inner_feed: f32,
}

#[derive(Debug, Clone)]
pub struct NestedSchroeder<const N: usize> {
    input: [f32; N],
    buffer: [f32; N],
    allpass: [SchroederAllpass; N],
    pub stages: [AllpassStage; N],
}

impl<const N: usize> NestedSchroeder<N> {
    pub fn new(sample_rate: f32, max_seconds: f32) -> Self {
        Self {
            input: [0.0; N],
            buffer: [0.0; N],
            allpass: std::array::from_fn(|_| SchroederAllpass::new(sample_rate, max_seconds)),
            stages: [AllpassStage::default(); N],
        }
    }

    pub fn setup(&mut self, sample_rate: f32, max_seconds: f32) {
        for ap in self.allpass.iter_mut() {
            ap.setup(sample_rate, max_seconds);
        }
    }

    /// Clears the signal path. Stage settings are kept.
    pub fn reset(&mut self) {
        self.input.fill(0.0);
        self.buffer.fill(0.0);
        for ap in self.allpass.iter_mut() {
            ap.reset();
        }
    }

    pub fn stability(&self) -> Stability {
        let feeds: [f32; N] = std::array::from_fn(|i| self.stages[i].outer_feed);
        stability(&feeds)
    }

    pub fn process(&mut self, mut input: f32, sample_rate: f32) -> f32 {
        if N == 0 {
            return input;
        }

        for idx in 0..N {
            input -= self.stages[idx].outer_feed * self.buffer[idx];
            self.input[idx] = input;
        }

        let mut out = self.input[N - 1];
        for idx in (0..N).rev() {
            let stage = self.stages[idx];
            self.buffer[idx] = self.allpass[idx].process(out, sample_rate, stage.seconds, stage.inner_feed)
                + stage.outer_feed * self.input[idx];
            out = self.buffer[idx];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 8000.0;

    #[test]
    fn diagnostics_match_direct_computation() {
        let feeds = [0.3, -0.2, 0.05, -0.4];
        let s = stability(&feeds);
        assert!((s.sum_abs - 0.95).abs() < 1e-6);
        assert!((s.sum_sq - (0.09 + 0.04 + 0.0025 + 0.16)).abs() < 1e-6);
        assert_eq!(s.max_abs, 0.4);
        assert!(s.stable_s());
        assert!(!s.stable_t(), "0.2925 >= 1/4");
        assert!(!s.stable_a(), "0.4 >= 1/4");
        assert!(!s.is_stable());
    }

    #[test]
    fn eight_stages_at_one_tenth_are_stable() {
        let mut nested = NestedSchroeder::<8>::new(SAMPLE_RATE, 0.1);
        for stage in nested.stages.iter_mut() {
            stage.outer_feed = 0.1;
        }
        let s = nested.stability();
        assert!((s.sum_abs - 0.8).abs() < 1e-6);
        assert!((s.sum_sq - 0.08).abs() < 1e-6);
        assert!(s.stable_s() && s.stable_t() && s.stable_a());
    }

    #[test]
    fn allpass_preserves_energy() {
        let mut ap = SchroederAllpass::new(SAMPLE_RATE, 0.1);
        let seconds = 0.003;
        let mut energy = 0.0;
        for n in 0..(SAMPLE_RATE as usize) {
            let input = if n == 0 { 1.0 } else { 0.0 };
            let y = ap.process(input, SAMPLE_RATE, seconds, 0.5);
            energy += y * y;
        }
        assert!((energy - 1.0).abs() < 0.02, "energy {energy}");
    }

    #[test]
    fn stable_nest_decays() {
        let mut nested = NestedSchroeder::<8>::new(SAMPLE_RATE, 0.1);
        for (i, stage) in nested.stages.iter_mut().enumerate() {
            *stage = AllpassStage {
                seconds: 0.001 * (i as f32 + 1.3),
                outer_feed: 0.1,
                inner_feed: 0.5,
            };
        }
        let mut late_peak = 0.0f32;
        for n in 0..(4 * SAMPLE_RATE as usize) {
            let input = if n == 0 { 1.0 } else { 0.0 };
            let y = nested.process(input, SAMPLE_RATE);
            assert!(y.is_finite());
            if n > 3 * SAMPLE_RATE as usize {
                late_peak = late_peak.max(y.abs());
            }
        }
        assert!(late_peak < 1e-3, "tail still at {late_peak}");
    }

    #[test]
    fn reset_keeps_stage_settings() {
        let mut nested = NestedSchroeder::<2>::new(SAMPLE_RATE, 0.1);
        nested.stages[0].outer_feed = 0.3;
        nested.process(1.0, SAMPLE_RATE);
        nested.reset();
        assert_eq!(nested.stages[0].outer_feed, 0.3);
        assert_eq!(nested.process(0.0, SAMPLE_RATE), 0.0);
    }
}

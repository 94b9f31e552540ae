//! Multi-section envelope with a looping sub-range.
//!
//! Each section ramps from the previous level to its own `level` over
//! `decay_time`, then holds for `hold_time`. Sections `loop_start..=loop_end`
//! repeat until `release`, which ramps to zero over `release_time`. Setting
//! `loop_end` past the last section makes the envelope one-shot: it runs
//! through every section into release on its own.

use super::curve::power_curve;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStage {
    Section(usize),
    Release,
    Terminated,
}

#[derive(Debug, Clone)]
pub struct PolyLoopEnvelope<const N: usize = 8> {
    sample_rate: f32,
    stage: LoopStage,
    loop_start: usize,
    loop_end: LoopStage,
    counter: u32,
    value: f32,
    prev_level: f32,
    release_time: f32,
    release_curve: f32,
    decay_time: [f32; N],
    hold_time: [f32; N],
    level: [f32; N],
    curve: [f32; N],
}

impl<const N: usize> PolyLoopEnvelope<N> {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            stage: LoopStage::Terminated,
            loop_start: 1.min(N.saturating_sub(1)),
            loop_end: LoopStage::Section(2.min(N.saturating_sub(1))),
            counter: 0,
            value: 0.0,
            prev_level: 0.0,
            release_time: 1.0,
            release_curve: 1.0,
            decay_time: [0.0; N],
            hold_time: [0.0; N],
            level: [0.0; N],
            curve: [0.0; N],
        }
    }

    pub fn setup(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    pub fn trigger(&mut self) {
        if N == 0 {
            return;
        }
        self.stage = LoopStage::Section(0);
        self.counter = 0;
        self.prev_level = self.value;
    }

    /// Ignored when `start > end`. An `end` past the last section is one-shot.
    pub fn set_loop(&mut self, start: usize, end: usize) {
        if start > end || start >= N {
            return;
        }
        self.loop_start = start;
        self.loop_end = if end < N {
            LoopStage::Section(end)
        } else {
            LoopStage::Release
        };
    }

    /// All times are in cycles of `rate` (Hz). `rate` must be positive.
    #[allow(clippy::too_many_arguments)]
    pub fn set(
        &mut self,
        rate: f32,
        release_time: f32,
        release_curve: f32,
        decay_time: [f32; N],
        hold_time: [f32; N],
        level: [f32; N],
        curve: [f32; N],
    ) {
        let period = 1.0 / rate;
        self.release_time = release_time * period;
        self.release_curve = release_curve;
        self.decay_time = decay_time.map(|t| t * period);
        self.hold_time = hold_time.map(|t| t * period);
        self.level = level;
        self.curve = curve;
    }

    pub fn release(&mut self) {
        if self.loop_end != LoopStage::Release && self.stage != LoopStage::Terminated {
            self.stage = LoopStage::Release;
        }
        self.counter = 0;
        self.prev_level = self.value;
    }

    pub fn terminate(&mut self) {
        self.stage = LoopStage::Terminated;
        self.value = 0.0;
    }

    pub fn stage(&self) -> LoopStage {
        self.stage
    }

    pub fn is_terminated(&self) -> bool {
        self.stage == LoopStage::Terminated
    }

    /// Seconds spent before the loop is first entered.
    pub fn attack_time(&self) -> f32 {
        (0..self.loop_start)
            .map(|i| self.decay_time[i] + self.hold_time[i])
            .sum()
    }

    /// Seconds per loop cycle.
    pub fn loop_time(&self) -> f32 {
        let end = match self.loop_end {
            LoopStage::Section(end) => end,
            _ => N.saturating_sub(1),
        };
        (self.loop_start..=end)
            .map(|i| self.decay_time[i] + self.hold_time[i])
            .sum()
    }

    pub fn release_time(&self) -> f32 {
        self.release_time
    }

    fn next_stage(&self, stage: LoopStage) -> LoopStage {
        match stage {
            s if s == self.loop_end => LoopStage::Section(self.loop_start),
            LoopStage::Section(i) if i + 1 < N => LoopStage::Section(i + 1),
            LoopStage::Section(_) => LoopStage::Release,
            _ => LoopStage::Terminated,
        }
    }

    fn ramp_ratio(&self, transition_time: f32, curve: f32) -> Option<f32> {
        let tr_len = self.sample_rate * transition_time;
        if self.counter < tr_len as u32 {
            Some(power_curve(self.counter as f32 / tr_len, curve))
        } else {
            None
        }
    }

    fn process_section(&mut self, index: usize) -> f32 {
        let level = self.level[index];
        let decay = self.decay_time[index];
        let section_time = decay + self.hold_time[index];

        self.counter += 1;
        if self.counter >= (self.sample_rate * section_time) as u32 {
            self.stage = self.next_stage(self.stage);
            self.counter = 0;
            self.prev_level = level;
        }

        match self.ramp_ratio(decay, self.curve[index]) {
            Some(ratio) => self.prev_level + ratio * (level - self.prev_level),
            None => level,
        }
    }

    fn process_release(&mut self) -> f32 {
        self.counter += 1;
        if self.counter >= (self.sample_rate * self.release_time) as u32 {
            self.stage = LoopStage::Terminated;
            self.counter = 0;
            self.prev_level = 0.0;
        }

        match self.ramp_ratio(self.release_time, self.release_curve) {
            Some(ratio) => self.prev_level - ratio * self.prev_level,
            None => 0.0,
        }
    }

    pub fn process(&mut self) -> f32 {
        self.value = match self.stage {
            LoopStage::Section(index) => self.process_section(index),
            LoopStage::Release => self.process_release(),
            LoopStage::Terminated => return 0.0,
        };
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1000.0;

    fn envelope() -> PolyLoopEnvelope<4> {
        let mut env = PolyLoopEnvelope::<4>::new(SAMPLE_RATE);
        // rate 1 Hz keeps times in seconds.
        env.set(
            1.0,
            0.1,
            0.0,
            [0.01, 0.02, 0.02, 0.01],
            [0.01, 0.0, 0.0, 0.0],
            [1.0, 0.2, 0.8, 0.5],
            [0.0, 0.0, 0.0, 0.0],
        );
        env.set_loop(1, 2);
        env
    }

    #[test]
    fn first_section_ramps_to_its_level() {
        let mut env = envelope();
        env.trigger();
        let mut last = 0.0;
        for _ in 0..15 {
            last = env.process();
        }
        assert_eq!(last, 1.0);
        assert_eq!(env.stage(), LoopStage::Section(0));
    }

    #[test]
    fn loops_until_release() {
        let mut env = envelope();
        env.trigger();
        let mut visited_section_three = false;
        for _ in 0..1000 {
            env.process();
            if env.stage() == LoopStage::Section(3) {
                visited_section_three = true;
            }
        }
        assert!(!visited_section_three, "loop should never reach section 3");
        assert!(matches!(env.stage(), LoopStage::Section(1 | 2)));

        env.release();
        assert_eq!(env.stage(), LoopStage::Release);
        let start = env.process();
        for _ in 0..200 {
            let value = env.process();
            assert!(value <= start + 1e-6);
        }
        assert!(env.is_terminated());
        assert_eq!(env.process(), 0.0);
    }

    #[test]
    fn one_shot_runs_into_release() {
        let mut env = envelope();
        env.set_loop(0, 8);
        env.trigger();
        for _ in 0..500 {
            env.process();
        }
        assert!(env.is_terminated());
    }

    #[test]
    fn inverted_loop_is_ignored() {
        let mut env = envelope();
        env.set_loop(3, 1);
        assert!((env.loop_time() - 0.04).abs() < 1e-6);
        assert!((env.attack_time() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn transitions_follow_curve() {
        let mut linear = envelope();
        let mut convex = envelope();
        convex.set(
            1.0,
            0.1,
            0.0,
            [0.01, 0.02, 0.02, 0.01],
            [0.01, 0.0, 0.0, 0.0],
            [1.0, 0.2, 0.8, 0.5],
            [2.0, 0.0, 0.0, 0.0],
        );
        linear.trigger();
        convex.trigger();
        for _ in 0..4 {
            linear.process();
            convex.process();
        }
        assert!(convex.process() < linear.process());
    }
}

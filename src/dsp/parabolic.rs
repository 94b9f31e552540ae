//! Attack/decay envelope that moves like a ball thrown and caught.
//!
//! Each stage accelerates for `curve` of its length and brakes for the rest,
//! so the level follows two parabolas glued at zero velocity. Position is
//! integrated sample by sample from the acceleration, which lands exactly on
//! the peak at the end of the attack.

const MIN_CURVE: f32 = 1e-4;

#[derive(Debug, Clone, Default)]
pub struct ParabolicAd {
    sample_rate: f32,
    counter: u32,
    position: f32,
    velocity: f32,
    accel_a: f32,
    brake_a: f32,
    time_a: u32,
    time_p: u32,
    accel_d: f32,
    brake_d: f32,
    time_d: u32,
    time_e: u32,
    terminated: bool,
}

impl ParabolicAd {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            terminated: true,
            ..Self::default()
        }
    }

    pub fn setup(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Restarts from zero. Curves are the accelerating share of each stage,
    /// in (0, 1).
    pub fn reset(&mut self, attack_seconds: f32, attack_curve: f32, decay_seconds: f32, decay_curve: f32) {
        let fs = self.sample_rate;
        let min_seconds = 1.0 / fs;
        let attack = attack_seconds.max(min_seconds);
        let decay = decay_seconds.max(min_seconds);
        let attack_curve = attack_curve.clamp(MIN_CURVE, 1.0 - MIN_CURVE);
        let decay_curve = decay_curve.clamp(MIN_CURVE, 1.0 - MIN_CURVE);

        self.counter = 0;
        self.position = 0.0;
        self.velocity = 0.0;
        self.terminated = false;

        let fs2 = fs * fs;

        let temp_a = 2.0 / (attack * attack) / fs2;
        self.accel_a = temp_a / attack_curve;
        self.brake_a = temp_a / (1.0 - attack_curve);
        self.time_a = (attack * attack_curve * fs) as u32;
        self.time_p = (attack * fs) as u32;

        let temp_d = 2.0 / (decay * decay) / fs2;
        self.accel_d = temp_d / decay_curve;
        self.brake_d = temp_d / (1.0 - decay_curve);
        self.time_d = self.time_p + (decay * decay_curve * fs) as u32;
        self.time_e = self.time_p + (decay * fs) as u32;
    }

    pub fn terminate(&mut self) {
        self.counter = self.time_e;
        self.terminated = true;
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Sample index of the attack peak.
    pub fn peak_sample(&self) -> u32 {
        self.time_p
    }

    pub fn process(&mut self) -> f32 {
        if self.counter < self.time_a {
            self.velocity += self.accel_a;
        } else if self.counter < self.time_p {
            self.velocity -= self.brake_a;
        } else if self.counter == self.time_p {
            self.velocity = 0.0;
        } else if self.counter < self.time_d {
            self.velocity -= self.accel_d;
        } else if self.counter < self.time_e && self.position > 0.0 {
            self.velocity += self.brake_d;
        } else {
            self.terminated = true;
            return 0.0;
        }
        self.counter += 1;
        self.position += self.velocity;
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn peaks_at_one_after_attack() {
        let mut env = ParabolicAd::new(SAMPLE_RATE);
        env.reset(0.1, 0.5, 0.2, 0.5);

        let mut peak = 0.0f32;
        let mut peak_index = 0;
        for i in 0..=env.peak_sample() {
            let value = env.process();
            if value > peak {
                peak = value;
                peak_index = i;
            }
        }
        assert!((peak - 1.0).abs() < 0.01, "peak {peak}");
        assert!(peak_index + 10 >= env.peak_sample(), "peak came early at {peak_index}");
    }

    #[test]
    fn decays_to_silence_and_terminates() {
        let mut env = ParabolicAd::new(SAMPLE_RATE);
        env.reset(0.01, 0.3, 0.05, 0.7);
        assert!(!env.is_terminated());

        let total = ((0.01 + 0.05) * SAMPLE_RATE) as usize + 16;
        for _ in 0..total {
            let value = env.process();
            assert!(value > -0.01 && value < 1.02, "out of range: {value}");
        }
        assert!(env.is_terminated());
        assert_eq!(env.process(), 0.0);
    }

    #[test]
    fn degenerate_curves_stay_finite() {
        let mut env = ParabolicAd::new(SAMPLE_RATE);
        env.reset(0.0, 0.0, 0.01, 1.0);
        for _ in 0..1000 {
            assert!(env.process().is_finite());
        }
    }

    #[test]
    fn terminate_silences() {
        let mut env = ParabolicAd::new(SAMPLE_RATE);
        env.reset(0.1, 0.5, 0.1, 0.5);
        env.process();
        env.terminate();
        assert_eq!(env.process(), 0.0);
    }
}

/*
Fractional Delay
================

Every reverb stage and the per-voice comb read their delay line at a time
that is smoothed sample by sample, so the read position almost never lands
on an integer. Linear interpolation between two taps is cheap but dulls the
highs when the fraction sits near 0.5. Writing the line at twice the sample
rate halves that error: each input writes two cells, the midpoint with the
previous input and the input itself, and the read interpolates between two
neighbouring half-samples.

    write:  ... │ mid(x[n-1], x[n]) │ x[n] │ ...
                                      ↑ wptr advances by 2 per sample

    read:   out = buf[i0] - frac * (buf[i0] - buf[i1])
            where i1 = wptr - round_down(2 * fs * seconds)

A delay of zero seconds reads the input just written, so the line is
transparent at time zero. Times longer than the line are clamped.
*/

#[derive(Debug, Clone, Default)]
pub struct Delay {
    buf: Vec<f32>,
    w1: f32,
    wptr: usize,
}

impl Delay {
    pub fn new(sample_rate: f32, max_seconds: f32) -> Self {
        let mut delay = Self::default();
        delay.setup(sample_rate, max_seconds);
        delay
    }

    /// Allocates room for `max_seconds`. Not realtime safe.
    pub fn setup(&mut self, sample_rate: f32, max_seconds: f32) {
        let size = (2.0 * sample_rate * max_seconds) as usize + 1;
        self.buf.resize(size.max(4), 0.0);
        self.reset();
    }

    pub fn reset(&mut self) {
        self.w1 = 0.0;
        self.wptr = 0;
        self.buf.fill(0.0);
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    fn advance(&self, index: usize) -> usize {
        let next = index + 1;
        if next >= self.buf.len() {
            next - self.buf.len()
        } else {
            next
        }
    }

    pub fn process(&mut self, input: f32, sample_rate: f32, seconds: f32) -> f32 {
        let len = self.buf.len();
        let time_in_sample = (2.0 * sample_rate * seconds).clamp(0.0, (len - 2) as f32);
        let time_int = time_in_sample as usize;
        let fraction = time_in_sample - time_int as f32;

        let mut rptr = (self.wptr + len - time_int) % len;

        self.buf[self.wptr] = input - 0.5 * (input - self.w1);
        self.wptr = self.advance(self.wptr);
        self.buf[self.wptr] = input;
        self.wptr = self.advance(self.wptr);
        self.w1 = input;

        let i1 = rptr;
        rptr = self.advance(rptr);
        let i0 = rptr;

        self.buf[i0] - fraction * (self.buf[i0] - self.buf[i1])
    }
}

/// Feedback comb around a [`Delay`]. The voice tunes it to the note period.
#[derive(Debug, Clone, Default)]
pub struct FeedbackComb {
    delay: Delay,
    last: f32,
}

impl FeedbackComb {
    pub fn new(sample_rate: f32, max_seconds: f32) -> Self {
        Self {
            delay: Delay::new(sample_rate, max_seconds),
            last: 0.0,
        }
    }

    pub fn setup(&mut self, sample_rate: f32, max_seconds: f32) {
        self.delay.setup(sample_rate, max_seconds);
        self.last = 0.0;
    }

    pub fn reset(&mut self) {
        self.delay.reset();
        self.last = 0.0;
    }

    /// `feedback` in (-1, 1).
    pub fn process(&mut self, input: f32, sample_rate: f32, seconds: f32, feedback: f32) -> f32 {
        self.last = self.delay.process(input + feedback * self.last, sample_rate, seconds);
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1000.0;

    #[test]
    fn zero_delay_is_transparent() {
        let mut delay = Delay::new(SAMPLE_RATE, 0.1);
        for x in [0.3, -0.5, 1.0, 0.25] {
            assert_eq!(delay.process(x, SAMPLE_RATE, 0.0), x);
        }
    }

    #[test]
    fn integer_delay_shifts_impulse() {
        let mut delay = Delay::new(SAMPLE_RATE, 0.1);
        let seconds = 10.0 / SAMPLE_RATE;
        let mut out = Vec::new();
        for n in 0..20 {
            let input = if n == 0 { 1.0 } else { 0.0 };
            out.push(delay.process(input, SAMPLE_RATE, seconds));
        }
        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(10));
        assert!((out[10] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn half_sample_delay_reads_midpoint() {
        let mut delay = Delay::new(SAMPLE_RATE, 0.1);
        delay.process(0.0, SAMPLE_RATE, 0.0);
        let out = delay.process(1.0, SAMPLE_RATE, 0.5 / SAMPLE_RATE);
        assert!((out - 0.5).abs() < 1e-6, "{out}");
    }

    #[test]
    fn long_times_are_clamped() {
        let mut delay = Delay::new(SAMPLE_RATE, 0.01);
        for _ in 0..100 {
            assert!(delay.process(1.0, SAMPLE_RATE, 10.0).is_finite());
        }
    }

    #[test]
    fn comb_decays_with_feedback_below_one() {
        let mut comb = FeedbackComb::new(SAMPLE_RATE, 0.1);
        let seconds = 5.0 / SAMPLE_RATE;
        let mut energy_early = 0.0;
        let mut energy_late = 0.0;
        for n in 0..400 {
            let input = if n == 0 { 1.0 } else { 0.0 };
            let y = comb.process(input, SAMPLE_RATE, seconds, 0.8);
            if n < 100 {
                energy_early += y * y;
            } else if n >= 300 {
                energy_late += y * y;
            }
        }
        assert!(energy_late < energy_early * 1e-3);
    }
}

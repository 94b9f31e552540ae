//! Polynomial transition regularized (PTR) oscillators.

/*
PTR Oscillators
===============

A naive sawtooth jumps from +1 to -1 in a single sample. That jump has
energy at every frequency, and everything above Nyquist folds back down as
aliasing. PTR replaces the jump with a short polynomial segment that spans a
few samples, so the waveform becomes smooth enough that the folded energy
drops below audibility. No oversampling is needed.

Vocabulary
----------

  phase     Position within one cycle, always wrapped into [0, 1) with
            `phase -= phase.floor()`.

  tick      Phase advance per sample, frequency / sample_rate.

  n         Phase measured in samples since the last wrap: phase / tick.
            The transition occupies n in [0, order).

  order     Length of the transition in samples. Higher order means less
            aliasing and a wider transition. The saw here uses order 10; the
            trapezoid uses up to order 5 and drops order when a ramp would
            not fit into a quarter cycle.

  height    Amplitude the saw jumps by at the wrap. It is 1 for a free
            running oscillator. Under hard sync the slave wraps early, and
            the jump is only as large as the slave had risen by then.


The Tables
----------

Each table row is one polynomial piece for n in [k, k+1), coefficients from
the highest power down to the constant. The rows are exact rationals of an
integrated B-spline kernel. They are written out as fractions and must not
be refitted: the rows of adjacent pieces agree on value and derivatives at
every integer breakpoint, and that agreement is the whole anti-aliasing
effect.

Past the last row the waveform is the plain linear ramp 2·T·n - order·T.

    value
      1 ┤            ╱        ╱
        │          ╱        ╱
        │        ╱        ╱
      0 ┤      ╱        ╱
        │    ╱        ╱
        │  ╱ ╮      ╱
     -1 ┤╱   ╰─╯  ╱            PTR segment spans `order` samples
        └──────────────────→ n


Hard Sync
---------

A second phase (the master) runs at the sync frequency. When it wraps, the
slave phase jumps to the master phase and the jump height becomes the
fractional part of slave_tick / sync_tick. That fraction is exactly how far
the slave rose during its last incomplete cycle, which gives the staircase
pitch pattern of classic hard sync.
*/

const SAW10_ORDER: f64 = 10.0;

#[rustfmt::skip]
const PTR_SAW10: [[f64; 11]; 10] = [
    [-1.0 / 1814400.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0],
    [1.0 / 201600.0, -1.0 / 18144.0, 1.0 / 4032.0, -1.0 / 1512.0, 1.0 / 864.0,
     -1.0 / 720.0, 1.0 / 864.0, -1.0 / 1512.0, 1.0 / 4032.0, -1.0 / 18144.0,
     362881.0 / 181440.0],
    [-1.0 / 50400.0, 1.0 / 2268.0, -17.0 / 4032.0, 5.0 / 216.0, -71.0 / 864.0,
     143.0 / 720.0, -287.0 / 864.0, 575.0 / 1512.0, -1151.0 / 4032.0, 329.0 / 2592.0,
     358273.0 / 181440.0],
    [1.0 / 21600.0, -1.0 / 648.0, 13.0 / 576.0, -289.0 / 1512.0, 901.0 / 864.0,
     -2773.0 / 720.0, 8461.0 / 864.0, -3667.0 / 216.0, 11083.0 / 576.0,
     -233893.0 / 18144.0, 1066861.0 / 181440.0],
    [-1.0 / 14400.0, 1.0 / 324.0, -35.0 / 576.0, 1055.0 / 1512.0, -4475.0 / 864.0,
     18731.0 / 720.0, -77555.0 / 864.0, 45485.0 / 216.0, -185525.0 / 576.0,
     5271131.0 / 18144.0, -4190647.0 / 36288.0],
    [1.0 / 14400.0, -5.0 / 1296.0, 55.0 / 576.0, -2095.0 / 1512.0, 11275.0 / 864.0,
     -60019.0 / 720.0, 316195.0 / 864.0, -235765.0 / 216.0, 1220725.0 / 576.0,
     -43947619.0 / 18144.0, 45028103.0 / 36288.0],
    [-1.0 / 21600.0, 1.0 / 324.0, -53.0 / 576.0, 2441.0 / 1512.0, -15941.0 / 864.0,
     103277.0 / 720.0, -663581.0 / 864.0, 604043.0 / 216.0, -3818123.0 / 576.0,
     167683997.0 / 18144.0, -1044649181.0 / 181440.0],
    [1.0 / 50400.0, -1.0 / 648.0, 31.0 / 576.0, -1675.0 / 1512.0, 12871.0 / 864.0,
     -98407.0 / 720.0, 748207.0 / 864.0, -807745.0 / 216.0, 6064393.0 / 576.0,
     -316559287.0 / 18144.0, 2345053807.0 / 181440.0],
    [-1.0 / 201600.0, 1.0 / 2268.0, -71.0 / 4032.0, 629.0 / 1512.0, -5561.0 / 864.0,
     49049.0 / 720.0, -431441.0 / 864.0, 3782969.0 / 1512.0, -33046721.0 / 4032.0,
     287420489.0 / 18144.0, -2486784401.0 / 181440.0],
    [1.0 / 1814400.0, -1.0 / 18144.0, 5.0 / 2016.0, -25.0 / 378.0, 125.0 / 108.0,
     -125.0 / 9.0, 3125.0 / 27.0, -125000.0 / 189.0, 156250.0 / 63.0,
     -3125000.0 / 567.0, 3125000.0 / 567.0],
];

const PTR_RAMP1: [[f32; 3]; 1] = [[1.0, 0.0, 0.0]];

#[rustfmt::skip]
const PTR_RAMP2: [[f32; 4]; 2] = [
    [1.0 / 3.0, 0.0, 0.0, 0.0],
    [-1.0 / 3.0, 2.0, -2.0, 2.0 / 3.0],
];

#[rustfmt::skip]
const PTR_RAMP3: [[f32; 5]; 3] = [
    [1.0 / 12.0, 0.0, 0.0, 0.0, 0.0],
    [-1.0 / 6.0, 1.0, -3.0 / 2.0, 1.0, -1.0 / 4.0],
    [1.0 / 12.0, -1.0, 9.0 / 2.0, -7.0, 15.0 / 4.0],
];

#[rustfmt::skip]
const PTR_RAMP4: [[f32; 6]; 4] = [
    [1.0 / 60.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [-1.0 / 20.0, 1.0 / 3.0, -2.0 / 3.0, 2.0 / 3.0, -1.0 / 3.0, 1.0 / 15.0],
    [1.0 / 20.0, -2.0 / 3.0, 10.0 / 3.0, -22.0 / 3.0, 23.0 / 3.0, -47.0 / 15.0],
    [-1.0 / 60.0, 1.0 / 3.0, -8.0 / 3.0, 32.0 / 3.0, -58.0 / 3.0, 196.0 / 15.0],
];

#[rustfmt::skip]
const PTR_RAMP5: [[f32; 7]; 5] = [
    [1.0 / 360.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [-1.0 / 90.0, 1.0 / 12.0, -5.0 / 24.0, 5.0 / 18.0, -5.0 / 24.0, 1.0 / 12.0, -1.0 / 72.0],
    [1.0 / 60.0, -1.0 / 4.0, 35.0 / 24.0, -25.0 / 6.0, 155.0 / 24.0, -21.0 / 4.0, 127.0 / 72.0],
    [-1.0 / 90.0, 1.0 / 4.0, -55.0 / 24.0, 65.0 / 6.0, -655.0 / 24.0, 141.0 / 4.0, -1331.0 / 72.0],
    [1.0 / 360.0, -1.0 / 12.0, 25.0 / 24.0, -125.0 / 18.0, 625.0 / 24.0, -601.0 / 12.0, 2765.0 / 72.0],
];

fn horner64(row: &[f64], x: f64) -> f64 {
    row.iter().fold(0.0, |acc, &c| acc * x + c)
}

fn horner32(row: &[f32], x: f32) -> f32 {
    row.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Order 10 PTR saw. `h` is the jump height at the wrap.
pub fn ptr_saw10(phi: f64, tick: f64, h: f64) -> f64 {
    let n = phi / tick;
    let ramp = 2.0 * tick * n - SAW10_ORDER * tick - 1.0;
    if n >= SAW10_ORDER {
        return ramp;
    }
    let segment = (n.max(0.0) as usize).min(PTR_SAW10.len() - 1);
    h * horner64(&PTR_SAW10[segment], n) + ramp
}

fn ptr_ramp<const W: usize>(phi: f32, tick: f32, table: &[[f32; W]]) -> f32 {
    let n = phi / tick;
    let order = table.len() as f32;
    if table.is_empty() || n >= order {
        return 2.0 * tick * n - order * tick;
    }
    let segment = (n.max(0.0) as usize).min(table.len() - 1);
    tick * horner32(&table[segment], n)
}

/// Naive ramp, the zeroth order member of the family.
pub fn ptr_ramp0(phi: f32, tick: f32) -> f32 {
    ptr_ramp::<1>(phi, tick, &[])
}

pub fn ptr_ramp1(phi: f32, tick: f32) -> f32 {
    ptr_ramp(phi, tick, &PTR_RAMP1)
}

pub fn ptr_ramp2(phi: f32, tick: f32) -> f32 {
    ptr_ramp(phi, tick, &PTR_RAMP2)
}

pub fn ptr_ramp3(phi: f32, tick: f32) -> f32 {
    ptr_ramp(phi, tick, &PTR_RAMP3)
}

pub fn ptr_ramp4(phi: f32, tick: f32) -> f32 {
    ptr_ramp(phi, tick, &PTR_RAMP4)
}

pub fn ptr_ramp5(phi: f32, tick: f32) -> f32 {
    ptr_ramp(phi, tick, &PTR_RAMP5)
}

/// Hard-syncable PTR sawtooth, run in double precision because the order 10
/// polynomials cancel large terms.
#[derive(Debug, Clone)]
pub struct PtrSyncSaw {
    sample_rate: f64,
    osc_phase: f64,
    osc_tick: f64,
    height: f64,
    sync_phase: f64,
    sync_tick: f64,
    last_sig: f64,
}

impl Default for PtrSyncSaw {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            osc_phase: 0.0,
            osc_tick: 0.0,
            height: 1.0,
            sync_phase: 0.0,
            sync_tick: 0.0,
            last_sig: 0.0,
        }
    }
}

impl PtrSyncSaw {
    pub fn new(sample_rate: f64) -> Self {
        let mut osc = Self::default();
        osc.setup(sample_rate);
        osc
    }

    pub fn setup(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.set_osc_freq(0.0);
        self.set_sync_freq(0.0);
    }

    pub fn set_osc_freq(&mut self, hz: f64) {
        self.osc_tick = hz.abs() / self.sample_rate;
    }

    pub fn set_sync_freq(&mut self, hz: f64) {
        self.sync_tick = hz.abs() / self.sample_rate;
    }

    pub fn set_phase(&mut self, phase: f64) {
        self.osc_phase = phase - phase.floor();
    }

    pub fn reset(&mut self) {
        self.osc_phase = 0.0;
        self.height = 0.0;
        self.sync_phase = 0.0;
        self.last_sig = 0.0;
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn phase(&self) -> f64 {
        self.osc_phase
    }

    /// Advances one sample. `mod_osc` and `mod_sync` are added to the phase
    /// increments (FM).
    pub fn process(&mut self, mod_osc: f64, mod_sync: f64) -> f64 {
        self.sync_phase += self.sync_tick + mod_sync;
        if self.sync_phase >= 1.0 || self.sync_phase < 0.0 {
            self.sync_phase -= self.sync_phase.floor();
            self.osc_phase = self.sync_phase;

            if self.sync_tick == 0.0 {
                // Sync wrapped only through modulation, there is no ratio.
                self.height = self.last_sig;
                let sig = ptr_saw10(self.osc_phase, self.osc_tick, self.height);
                self.last_sig = if sig.is_finite() {
                    sig.clamp(-1.0, 1.0)
                } else {
                    0.0
                };
                return self.last_sig;
            }
            let ratio = self.osc_tick / self.sync_tick;
            self.height = ratio - ratio.floor();
        } else {
            self.osc_phase += self.osc_tick + mod_osc;
            if self.osc_phase >= 1.0 || self.osc_phase < 0.0 {
                self.height = 1.0;
                self.osc_phase -= self.osc_phase.floor();
            }
        }

        if !self.osc_phase.is_finite() || !self.sync_phase.is_finite() {
            self.osc_phase = 0.0;
            self.sync_phase = 0.0;
        }

        self.last_sig = ptr_saw10(self.osc_phase, self.osc_tick, self.height);
        if !self.last_sig.is_finite() {
            self.last_sig = 0.0;
        }
        self.last_sig
    }
}

/// PTR trapezoid with adjustable slope and pulse width.
#[derive(Debug, Clone)]
pub struct PtrTrapezoid {
    sample_rate: f32,
    phase: f32,
    tick: f32,
    slope: f32,
    pulse_width: f32,
    last_sig: f32,
}

impl PtrTrapezoid {
    pub fn new(sample_rate: f32, frequency_hz: f32) -> Self {
        let mut osc = Self {
            sample_rate,
            phase: 0.0,
            tick: 0.0,
            slope: 8.0,
            pulse_width: 0.5,
            last_sig: 0.0,
        };
        osc.set_freq(frequency_hz);
        osc
    }

    /// Negative frequencies are ignored.
    pub fn set_freq(&mut self, hz: f32) {
        if hz >= 0.0 {
            self.tick = hz / self.sample_rate;
        }
    }

    pub fn set_phase(&mut self, phase: f32) {
        self.phase = phase;
    }

    pub fn add_phase(&mut self, phase: f32) {
        self.phase += phase;
    }

    pub fn set_slope(&mut self, slope: f32) {
        self.slope = slope;
    }

    pub fn set_pulse_width(&mut self, pulse_width: f32) {
        self.pulse_width = pulse_width;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.last_sig = 0.0;
    }

    pub fn process(&mut self) -> f32 {
        if self.tick <= 0.0 {
            return 0.0;
        }
        self.phase += self.tick;
        self.phase -= self.phase.floor();
        if !self.phase.is_finite() {
            self.phase = 0.0;
            return self.last_sig;
        }

        let sig = ptr_tpz5(self.phase, self.tick, self.slope, self.pulse_width);
        if sig.is_finite() {
            self.last_sig = sig;
        }
        self.last_sig
    }
}

fn ptr_tpz5(phase: f32, tick: f32, slope: f32, pulse_width: f32) -> f32 {
    let order = (0.25 / tick).floor().min(5.0);
    let ptr_len = order * tick;

    let max_slope = 0.25 / ptr_len;
    let slope = if slope > max_slope {
        max_slope
    } else {
        slope.max(1.0)
    };

    let max_pw = 1.0 - 1.0 / slope;
    let pw = if pulse_width > max_pw {
        max_pw.max(0.0)
    } else {
        pulse_width
    };

    let y = 1.0 - 2.0 * slope * ptr_len;
    let dc = (y * y + pw * slope * y) / (2.0 * y + slope - 1.0);
    let ramp: fn(f32, f32) -> f32 = match order as u32 {
        5 => ptr_ramp5,
        4 => ptr_ramp4,
        3 => ptr_ramp3,
        2 => ptr_ramp2,
        1 => ptr_ramp1,
        _ => ptr_ramp0,
    };
    tpz_branch(ramp, slope, pw, y, phase, tick) - dc
}

fn tpz_branch(ramp: fn(f32, f32) -> f32, slope: f32, pw: f32, y: f32, phase: f32, tick: f32) -> f32 {
    if phase <= 0.25 / slope {
        slope * ramp(phase, tick)
    } else if phase <= 0.5 / slope {
        y - slope * ramp(0.5 / slope - phase, tick)
    } else if phase <= 0.5 / slope + pw {
        y
    } else if phase <= 0.75 / slope + pw {
        y - slope * ramp(phase - 0.5 / slope - pw, tick)
    } else if phase <= 1.0 / slope + pw {
        slope * ramp(1.0 / slope + pw - phase, tick)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 48_000.0;

    #[test]
    fn saw_pieces_meet_at_breakpoints() {
        let tick = 1.0 / 128.0;
        for k in 1..=10 {
            let n = k as f64;
            let below = ptr_saw10((n - 1e-9) * tick, tick, 1.0);
            let at = ptr_saw10(n * tick, tick, 1.0);
            assert!(
                (below - at).abs() < 1e-6,
                "discontinuity at n = {k}: {below} vs {at}"
            );
        }
    }

    #[test]
    fn ramp_pieces_meet_at_breakpoints() {
        let tick = 0.01;
        let ramps: [fn(f32, f32) -> f32; 5] = [ptr_ramp1, ptr_ramp2, ptr_ramp3, ptr_ramp4, ptr_ramp5];
        for (order, ramp) in (1..=5).zip(ramps) {
            for k in 1..=order {
                let n = k as f32;
                let below = ramp((n - 1e-4) * tick, tick);
                let at = ramp(n * tick, tick);
                assert!(
                    (below - at).abs() < 1e-4,
                    "ramp{order} jumps at n = {k}: {below} vs {at}"
                );
            }
        }
    }

    #[test]
    fn linear_ramp_takes_over_at_full_order() {
        // Power of two tick, so phi / tick recovers n exactly.
        let tick = 1.0 / 128.0;
        for n in [10.0, 10.5, 64.0] {
            let phi = n * tick;
            assert_eq!(ptr_saw10(phi, tick, 1.0), 2.0 * tick * n - 10.0 * tick - 1.0);
        }

        let tick = 1.0f32 / 128.0;
        let ramps: [fn(f32, f32) -> f32; 6] = [ptr_ramp0, ptr_ramp1, ptr_ramp2, ptr_ramp3, ptr_ramp4, ptr_ramp5];
        for (order, ramp) in (0..=5).zip(ramps) {
            for n in [order as f32, order as f32 + 0.5, 32.0] {
                let expected = 2.0 * tick * n - order as f32 * tick;
                assert_eq!(ramp(n * tick, tick), expected, "ramp{order} at n = {n}");
            }
        }

        // The last piece before the handover is still polynomial.
        let curved = ptr_ramp2(1.5 * tick, tick) / tick;
        assert!((curved - 1.0 - 1.0 / 24.0).abs() < 1e-4, "ramp2 at n = 1.5: {curved}");
    }

    #[test]
    fn saw_is_periodic() {
        // 375 Hz at 48 kHz is a tick of exactly 2^-7.
        let mut osc = PtrSyncSaw::new(SAMPLE_RATE);
        osc.set_osc_freq(375.0);

        let period = 128;
        let samples: Vec<f64> = (0..period * 3).map(|_| osc.process(0.0, 0.0)).collect();
        for i in period..period * 2 {
            assert!(
                (samples[i] - samples[i + period]).abs() < 1e-12,
                "sample {i} differs from one period later"
            );
        }
    }

    #[test]
    fn saw_has_no_step_discontinuity() {
        let mut osc = PtrSyncSaw::new(SAMPLE_RATE);
        osc.set_osc_freq(110.0);
        let mut previous = osc.process(0.0, 0.0);
        // The first cycle starts with height 1 and a fresh transition.
        for _ in 0..SAMPLE_RATE as usize / 10 {
            let value = osc.process(0.0, 0.0);
            assert!(value.abs() <= 1.01, "out of range: {value}");
            assert!((value - previous).abs() < 0.6, "step of {}", value - previous);
            previous = value;
        }
    }

    #[test]
    fn hard_sync_sets_fractional_height() {
        let mut osc = PtrSyncSaw::new(SAMPLE_RATE);
        osc.set_osc_freq(250.0);
        osc.set_sync_freq(100.0);
        for _ in 0..1000 {
            osc.process(0.0, 0.0);
        }
        assert!((osc.height() - 0.5).abs() < 1e-9, "height {}", osc.height());
    }

    #[test]
    fn modulated_sync_without_sync_tick_stays_finite() {
        let mut osc = PtrSyncSaw::new(SAMPLE_RATE);
        osc.set_osc_freq(440.0);
        // 0.5 per sample wraps the sync phase on every other sample.
        for i in 0..100 {
            let value = osc.process(0.0, 0.5);
            assert!(value.is_finite());
            if i % 2 == 1 {
                assert!((-1.0..=1.0).contains(&value), "wrap sample {i}: {value}");
            }
        }
    }

    #[test]
    fn non_finite_input_yields_zero() {
        let mut osc = PtrSyncSaw::new(SAMPLE_RATE);
        osc.set_osc_freq(f64::INFINITY);
        for _ in 0..4 {
            assert_eq!(osc.process(0.0, 0.0), 0.0);
        }
        osc.set_osc_freq(440.0);
        assert!(osc.process(0.0, 0.0).is_finite());
    }

    #[test]
    fn trapezoid_is_bounded_and_periodic() {
        let mut osc = PtrTrapezoid::new(48_000.0, 375.0);
        osc.set_slope(4.0);
        osc.set_pulse_width(0.3);
        let samples: Vec<f32> = (0..384).map(|_| osc.process()).collect();
        for (i, value) in samples.iter().enumerate() {
            assert!(value.is_finite() && value.abs() <= 1.5, "sample {i}: {value}");
        }
        for i in 128..256 {
            assert!((samples[i] - samples[i + 128]).abs() < 1e-5);
        }
    }

    #[test]
    fn trapezoid_survives_high_frequency() {
        let mut osc = PtrTrapezoid::new(48_000.0, 20_000.0);
        for _ in 0..256 {
            assert!(osc.process().is_finite());
        }
    }
}

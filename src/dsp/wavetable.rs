use std::f32::consts::TAU;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/*
PADsynth Wavetables
===================

PADsynth builds a long, seamlessly looping table by drawing partials in the
frequency domain and running one inverse FFT. Each partial is not a single
bin but a bell-shaped band of bins with random phases, which turns a static
harmonic spectrum into a slowly beating ensemble sound.

Vocabulary
----------

  peak        One partial: frequency (Hz, relative to the table's base
              frequency), linear gain, bandwidth in cents and a phase
              amount in [0, 2π] that scales its random phases.

  profile     Shape of a peak across bins. `exp(-|d / bw|^(2 * shape))`,
              so shape 1 is a Gaussian and larger shapes flatten the top.

  comb        The profile split into `comb` narrower sub-peaks spread over
              the same bandwidth.

  expand      Multiplies every bin index, stretching the spectrum.
  shift       Adds a whole number of bins after expansion.

  uniform     One random phase per peak instead of one per bin.
  phase


Octave Tables
-------------

Playing the table `r` times faster moves every bin up by `r`. To keep the
top partials under Nyquist one table is rendered per octave: table `k`
keeps only bins below `(N / 2) / 2^k`, and a note picks the table

    k = ceil(log2(note_freq / base_freq))

clamped to the available range. Every table is normalized by the peak of
table 0 so switching tables does not change loudness. Tables carry one
extra sample equal to the first so the oscillator can interpolate across
the loop point without a branch.
*/

/// Amplitude below which a profile tail is cut.
const PROFILE_FLOOR: f32 = 1e-4;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeakInfo {
    pub frequency: f32,
    pub gain: f32,
    /// Cents.
    pub bandwidth: f32,
    /// Scales the random phase, in [0, 2π].
    pub phase: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadSynthOptions {
    pub seed: u64,
    pub expand: f32,
    pub shift: i32,
    pub comb: usize,
    pub shape: f32,
    pub uniform_phase: bool,
}

impl Default for PadSynthOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            expand: 1.0,
            shift: 0,
            comb: 1,
            shape: 1.0,
            uniform_phase: false,
        }
    }
}

pub struct WaveTable {
    size: usize,
    base_freq: f32,
    tables: Vec<Vec<f32>>,
    amplitude: Vec<f32>,
    phase: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    fft: Arc<dyn Fft<f32>>,
}

impl std::fmt::Debug for WaveTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveTable")
            .field("size", &self.size)
            .field("base_freq", &self.base_freq)
            .field("tables", &self.tables.len())
            .finish()
    }
}

impl WaveTable {
    /// `size` must be a power of two of at least 4. Allocates every table.
    pub fn new(size: usize) -> Self {
        let size = size.max(4).next_power_of_two();
        let half = size / 2;
        let n_tables = half.ilog2() as usize;
        let mut planner = FftPlanner::new();
        Self {
            size,
            base_freq: 1.0,
            tables: vec![vec![0.0; size + 1]; n_tables],
            amplitude: vec![0.0; half + 1],
            phase: vec![0.0; half + 1],
            spectrum: vec![Complex::new(0.0, 0.0); size],
            fft: planner.plan_fft_inverse(size),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn base_freq(&self) -> f32 {
        self.base_freq
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table for octave `index`, `size + 1` samples long.
    pub fn table(&self, index: usize) -> &[f32] {
        let index = index.min(self.tables.len().saturating_sub(1));
        self.tables.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Octave table that keeps `note_freq` free of aliasing.
    pub fn table_index(&self, note_freq: f32) -> usize {
        let ratio = note_freq / self.base_freq;
        if !ratio.is_finite() || ratio <= 1.0 {
            return 0;
        }
        let octave = ratio.log2().ceil() as usize;
        octave.min(self.tables.len().saturating_sub(1))
    }

    /// Renders every octave table. Not realtime safe.
    pub fn padsynth(&mut self, sample_rate: f32, base_freq: f32, peaks: &[PeakInfo], options: &PadSynthOptions) {
        self.base_freq = base_freq.max(f32::EPSILON);
        self.amplitude.fill(0.0);
        self.phase.fill(0.0);

        let mut rng = Pcg32::seed_from_u64(options.seed);
        let bins_per_hz = self.size as f32 / sample_rate;
        let comb = options.comb.max(1);
        let shape = options.shape.max(1e-3);
        let reach = PROFILE_FLOOR.recip().ln().powf(0.5 / shape);
        let last_bin = (self.amplitude.len() - 1) as f32;

        for peak in peaks {
            if peak.gain <= 0.0 || !(peak.frequency > 0.0) {
                continue;
            }
            let center = peak.frequency * bins_per_hz * options.expand + options.shift as f32;
            let bw_hz = (2.0f32.powf(peak.bandwidth / 1200.0) - 1.0) * peak.frequency;
            let bw = bw_hz * bins_per_hz * options.expand;
            if !center.is_finite() || !bw.is_finite() {
                continue;
            }
            let peak_phase = rng.gen::<f32>() * peak.phase;

            if bw < 1.0 {
                // Saturating cast; out-of-range centers are dropped by `add_bin`.
                let bin = center.round().max(0.0) as usize;
                self.add_bin(bin, peak.gain, peak_phase, peak.phase, options.uniform_phase, &mut rng);
                continue;
            }

            let sub_bw = bw / comb as f32;
            for c in 0..comb {
                let sub_center = if comb == 1 {
                    center
                } else {
                    center + bw * (2.0 * c as f32 / (comb - 1) as f32 - 1.0)
                };
                let range = sub_bw * reach;
                let lo = (sub_center - range).floor().max(1.0);
                let hi = (sub_center + range).ceil().min(last_bin);
                if lo > hi {
                    continue;
                }
                for bin in lo as usize..=hi as usize {
                    let d = ((bin as f32 - sub_center) / sub_bw).abs();
                    let profile = (-d.powf(2.0 * shape)).exp();
                    let amp = peak.gain * profile / sub_bw.sqrt();
                    self.add_bin(bin, amp, peak_phase, peak.phase, options.uniform_phase, &mut rng);
                }
            }
        }

        self.render_tables();
        log::debug!(
            "padsynth: {} peaks, {} tables of {} samples",
            peaks.len(),
            self.tables.len(),
            self.size
        );
    }

    fn add_bin(&mut self, bin: usize, amp: f32, peak_phase: f32, phase_amount: f32, uniform: bool, rng: &mut Pcg32) {
        if bin == 0 || bin >= self.amplitude.len() {
            return;
        }
        self.amplitude[bin] += amp;
        self.phase[bin] = if uniform {
            peak_phase
        } else {
            rng.gen::<f32>() * phase_amount
        };
    }

    fn render_tables(&mut self) {
        let half = self.size / 2;
        let mut normalize = 0.0f32;

        for k in 0..self.tables.len() {
            let cutoff = (half >> k).max(1);
            self.spectrum.fill(Complex::new(0.0, 0.0));
            for bin in 1..cutoff.min(half) {
                let c = Complex::from_polar(self.amplitude[bin], self.phase[bin] % TAU);
                self.spectrum[bin] = c;
                self.spectrum[self.size - bin] = c.conj();
            }
            self.fft.process(&mut self.spectrum);

            if k == 0 {
                let peak = self.spectrum.iter().fold(0.0f32, |acc, c| acc.max(c.re.abs()));
                normalize = if peak > 0.0 { 1.0 / peak } else { 0.0 };
            }

            let table = &mut self.tables[k];
            for (dst, src) in table.iter_mut().zip(self.spectrum.iter()) {
                *dst = src.re * normalize;
            }
            table[self.size] = table[0];
        }
    }
}

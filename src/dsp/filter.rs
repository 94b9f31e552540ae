use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type              | output of the SVF     | passes          | rejects      |
| ----------------- | --------------------- | --------------- | ------------ |
| low-pass          | v2                    | below cutoff    | above cutoff |
| high-pass         | x - k v1 - v2         | above cutoff    | below cutoff |
| band-pass         | v1                    | around cutoff   | elsewhere    |
| notch / band-stop | x - k v1              | elsewhere       | around cutoff|

Trapezoidal (TPT) state-variable filter. The cutoff is an argument of every
sample so envelopes and key follow can sweep it without zipper noise; the
`tan` prewarp is recomputed per sample for that reason.
*/

/// Highest resonance before the filter self-oscillates.
const MAX_RESONANCE: f32 = 0.99;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

#[derive(Debug, Clone, Copy)]
pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

#[derive(Debug, Clone)]
pub struct SvFilter {
    ic1eq: f32,
    ic2eq: f32,
    sample_rate: f32,
    filter_type: FilterType,
}

impl SvFilter {
    pub fn new(sample_rate: f32, filter_type: FilterType) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            sample_rate,
            filter_type,
        }
    }

    pub fn lowpass(sample_rate: f32) -> Self {
        Self::new(sample_rate, FilterType::LowPass)
    }

    pub fn setup(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    #[inline]
    fn prewarp(&self, cutoff_hz: f32) -> f32 {
        let cutoff = cutoff_hz.clamp(1.0, 0.49 * self.sample_rate);
        (PI * cutoff / self.sample_rate).tan()
    }

    /// `resonance` in [0, 1). 0 is a flat Butterworth-like response.
    pub fn process_all(&mut self, sample: f32, cutoff_hz: f32, resonance: f32) -> FilterOutputs {
        let g = self.prewarp(cutoff_hz);
        let k = 2.0 - 2.0 * resonance.clamp(0.0, MAX_RESONANCE);

        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    pub fn process(&mut self, sample: f32, cutoff_hz: f32, resonance: f32) -> f32 {
        let outputs = self.process_all(sample, cutoff_hz, resonance);
        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
            FilterType::BandPass => outputs.bandpass,
            FilterType::Notch => outputs.notch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn sine(freq: f32, length: usize) -> Vec<f32> {
        (0..length)
            .map(|n| (TAU * freq * n as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    fn peak_after_transient(filter: &mut SvFilter, input: &[f32], cutoff: f32, resonance: f32) -> f32 {
        let skip = input.len() / 2;
        input
            .iter()
            .map(|&x| filter.process(x, cutoff, resonance))
            .skip(skip)
            .fold(0.0f32, |acc, y| acc.max(y.abs()))
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut filter = SvFilter::lowpass(SAMPLE_RATE);
        let mut last = 0.0;
        for _ in 0..512 {
            last = filter.process(1.0, 500.0, 0.0);
        }
        assert!(last > 0.99, "dc gain {last}");
    }

    #[test]
    fn highpass_rejects_dc() {
        let mut filter = SvFilter::new(SAMPLE_RATE, FilterType::HighPass);
        let mut last = 1.0;
        for _ in 0..512 {
            last = filter.process(1.0, 500.0, 0.0);
        }
        assert!(last.abs() < 0.001, "dc leak {last}");
    }

    #[test]
    fn lowpass_attenuates_high_frequencies() {
        let mut filter = SvFilter::lowpass(SAMPLE_RATE);
        let peak = peak_after_transient(&mut filter, &sine(5_000.0, 1024), 500.0, 0.0);
        assert!(peak < 0.05, "Expected high freq attenuation, got peak: {peak}");
    }

    #[test]
    fn bandpass_emphasizes_cutoff_frequency() {
        let mut filter = SvFilter::new(SAMPLE_RATE, FilterType::BandPass);
        let pass_peak = peak_after_transient(&mut filter, &sine(1_000.0, 2048), 1_000.0, 0.5);
        filter.reset();
        let off_peak = peak_after_transient(&mut filter, &sine(100.0, 2048), 1_000.0, 0.5);
        assert!(
            pass_peak > off_peak * 2.0,
            "expected bandpass to emphasize cutoff freq, got pass_peak={pass_peak}, off_peak={off_peak}"
        );
    }

    #[test]
    fn notch_rejects_cutoff_frequency() {
        let mut filter = SvFilter::new(SAMPLE_RATE, FilterType::Notch);
        let center_peak = peak_after_transient(&mut filter, &sine(1_000.0, 4096), 1_000.0, 0.5);
        filter.reset();
        let off_peak = peak_after_transient(&mut filter, &sine(100.0, 4096), 1_000.0, 0.5);
        assert!(
            center_peak * 2.0 < off_peak,
            "expected notch to reject center freq, got center_peak={center_peak}, off_peak={off_peak}"
        );
    }

    #[test]
    fn resonance_boosts_cutoff() {
        let input = sine(1_000.0, 2048);
        let mut filter = SvFilter::lowpass(SAMPLE_RATE);
        let flat = peak_after_transient(&mut filter, &input, 1_000.0, 0.0);
        filter.reset();
        let resonant = peak_after_transient(&mut filter, &input, 1_000.0, 0.8);
        assert!(
            resonant > flat * 1.5,
            "High resonance should boost signal: resonant={resonant}, flat={flat}"
        );
    }

    #[test]
    fn extreme_cutoffs_stay_finite() {
        let mut filter = SvFilter::lowpass(SAMPLE_RATE);
        for n in 0..256 {
            let cutoff = if n % 2 == 0 { 0.0 } else { 1e9 };
            assert!(filter.process(1.0, cutoff, 1.0).is_finite());
        }
    }
}

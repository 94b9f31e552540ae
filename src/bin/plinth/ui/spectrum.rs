//! Spectrum analyzer widget
//!
//! Hann-windowed FFT of the monitor buffer, sampled at log-spaced
//! frequencies and drawn against log10(Hz) so PADsynth partials spread
//! evenly across the width.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Points on the displayed curve
const SPECTRUM_POINTS: usize = 96;
const MIN_FREQ: f64 = 20.0;
const FLOOR_DB: f64 = -100.0;
/// Per-frame decay of the displayed level, in dB
const FALL_DB: f64 = 1.5;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin read for each displayed point
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 Hz, dB), held peaks falling by FALL_DB per update
    spectrum: Vec<(f64, f64)>,
    max_log_freq: f64,
}

impl SpectrumAnalyzer {
    /// `fft_len` must equal the length of buffers passed to `update`
    pub fn new(fft_len: usize, sample_rate: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_len);

        let window: Vec<f32> = (0..fft_len)
            .map(|i| {
                let denom = fft_len.saturating_sub(1).max(1) as f32;
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
            })
            .collect();

        let nyquist = (sample_rate as f64 / 2.0).clamp(MIN_FREQ + 1.0, 20_000.0);
        let ratio = nyquist / MIN_FREQ;
        let half = (fft_len / 2).max(1);

        let mut bin_indices = Vec::with_capacity(SPECTRUM_POINTS);
        let mut spectrum = Vec::with_capacity(SPECTRUM_POINTS);
        for i in 0..SPECTRUM_POINTS {
            let t = i as f64 / (SPECTRUM_POINTS - 1) as f64;
            let freq = MIN_FREQ * ratio.powf(t);
            let index = (freq * fft_len as f64 / sample_rate as f64).round() as usize;
            bin_indices.push(index.min(half - 1));
            spectrum.push((freq.log10(), FLOOR_DB));
        }

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            spectrum,
            max_log_freq: nyquist.log10(),
        }
    }

    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let norm = 2.0 / self.window.len() as f32;
        for ((_, level), &index) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            let bin = self.scratch[index] * norm;
            let db = 10.0 * (bin.norm_sqr().max(1e-12) as f64).log10();
            *level = db.max(*level - FALL_DB).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }

    pub fn max_log_freq(&self) -> f64 {
        self.max_log_freq
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, analyzer: &SpectrumAnalyzer) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(analyzer.data());

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([MIN_FREQ.log10(), analyzer.max_log_freq()])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use plinth_dsp::dsp::filter::{FilterType, SvFilter};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        // Fixed cutoff
        let mut filter = SvFilter::lowpass(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("lowpass_fixed", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&input) {
                    *out = filter.process(x, black_box(1000.0), 0.5);
                }
            })
        });

        // Cutoff swept every sample, as an envelope drives it in a voice
        let mut filter = SvFilter::lowpass(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("lowpass_swept", size), &size, |b, _| {
            b.iter(|| {
                for (i, (out, &x)) in buffer.iter_mut().zip(&input).enumerate() {
                    let cutoff = 200.0 + 4000.0 * i as f32 / size as f32;
                    *out = filter.process(x, black_box(cutoff), 0.7);
                }
            })
        });

        // All four responses at once
        let mut filter = SvFilter::new(SAMPLE_RATE, FilterType::BandPass);
        group.bench_with_input(BenchmarkId::new("process_all", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&input) {
                    let all = filter.process_all(x, black_box(1000.0), 0.5);
                    *out = all.lowpass + all.highpass;
                }
            })
        });
    }

    group.finish();
}

//! Benchmarks for the fractional delay and feedback comb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use plinth_dsp::dsp::delay::{Delay, FeedbackComb};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    let delay_times: &[f32] = &[0.01, 0.1, 1.0];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut buffer = input.clone();

        for &seconds in delay_times {
            let mut delay = Delay::new(SAMPLE_RATE, 1.0);
            group.bench_with_input(
                BenchmarkId::new(format!("fixed_{}ms", (seconds * 1000.0) as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        for (out, &x) in buffer.iter_mut().zip(&input) {
                            *out = delay.process(x, SAMPLE_RATE, black_box(seconds));
                        }
                    })
                },
            );
        }

        // Time moving every sample, as behind a smoother
        let mut delay = Delay::new(SAMPLE_RATE, 0.1);
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                for (i, (out, &x)) in buffer.iter_mut().zip(&input).enumerate() {
                    let seconds = 0.01 + (i as f32 * 0.1).sin() * 0.001;
                    *out = delay.process(x, SAMPLE_RATE, black_box(seconds));
                }
            })
        });

        // Per-voice comb at A4
        let mut comb = FeedbackComb::new(SAMPLE_RATE, 0.05);
        group.bench_with_input(BenchmarkId::new("comb", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&input) {
                    *out = comb.process(x, SAMPLE_RATE, black_box(1.0 / 440.0), 0.9);
                }
            })
        });
    }

    group.finish();
}

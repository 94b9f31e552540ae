//! Benchmarks for the envelope generators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use plinth_dsp::dsp::{LinearAdsr, ParabolicAd, PolyLoopEnvelope};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase with a curved output
        let mut adsr = LinearAdsr::new(SAMPLE_RATE);
        adsr.set_curve(2.0);
        adsr.trigger(1.0, 0.1, 0.7, 0.3, 440.0);
        group.bench_with_input(BenchmarkId::new("adsr_attack", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = adsr.process();
                }
                black_box(&buffer);
            })
        });

        // Sustain phase (holding steady)
        let mut adsr = LinearAdsr::new(SAMPLE_RATE);
        adsr.trigger(0.001, 0.001, 0.7, 0.3, 440.0);
        for _ in 0..500 {
            adsr.process();
        }
        group.bench_with_input(BenchmarkId::new("adsr_sustain", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = adsr.process();
                }
                black_box(&buffer);
            })
        });

        // Parabolic attack/decay
        let mut ad = ParabolicAd::new(SAMPLE_RATE);
        ad.reset(0.5, 0.5, 2.0, 0.5);
        group.bench_with_input(BenchmarkId::new("parabolic_ad", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = ad.process();
                }
                black_box(&buffer);
            })
        });

        // Looping multi-section envelope
        let mut looped = PolyLoopEnvelope::<8>::new(SAMPLE_RATE);
        let levels: [f32; 8] = std::array::from_fn(|i| 1.0 - i as f32 / 8.0);
        looped.set(1.0, 0.5, 0.5, [0.05; 8], [0.02; 8], levels, [0.5; 8]);
        looped.set_loop(2, 5);
        looped.trigger();
        group.bench_with_input(BenchmarkId::new("poly_loop", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = looped.process();
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}

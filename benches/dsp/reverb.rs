//! Benchmarks for the allpass building blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use plinth_dsp::dsp::lattice::{AllpassNode, Lattice2};
use plinth_dsp::dsp::smoother::SmootherCommon;
use plinth_dsp::dsp::{NestedSchroeder, SchroederAllpass};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for &size in BLOCK_SIZES {
        // Impulse followed by a quiet tail
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0)
                } else {
                    (i as f32 * 0.05).sin() * 0.1
                }
            })
            .collect();

        let mut allpass = SchroederAllpass::new(SAMPLE_RATE, 0.1);
        group.bench_with_input(BenchmarkId::new("schroeder", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &x in &input {
                    sum += allpass.process(black_box(x), SAMPLE_RATE, 0.013, 0.6);
                }
                sum
            })
        });

        let mut nested = NestedSchroeder::<8>::new(SAMPLE_RATE, 0.1);
        for (i, stage) in nested.stages.iter_mut().enumerate() {
            stage.seconds = 0.003 * (i + 1) as f32;
            stage.outer_feed = 0.1;
            stage.inner_feed = 0.6;
        }
        group.bench_with_input(BenchmarkId::new("nested_8", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &x in &input {
                    sum += nested.process(black_box(x), SAMPLE_RATE);
                }
                sum
            })
        });

        // Two levels: 16 smoothed leaf allpasses
        let common = SmootherCommon::new(SAMPLE_RATE, 0.0);
        let mut lattice = Lattice2::new(SAMPLE_RATE, 0.1);
        for (c, child) in lattice.children.iter_mut().enumerate() {
            lattice.feed[c].push(&common, 0.1);
            for i in 0..child.seconds.len() {
                child.seconds[i].push(&common, 0.002 * (1 + c * 4 + i) as f32);
                child.inner_feed[i].push(&common, 0.5);
                child.outer_feed[i].push(&common, 0.1);
            }
        }
        group.bench_with_input(BenchmarkId::new("lattice_2", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &x in &input {
                    sum += lattice.process(black_box(x), SAMPLE_RATE);
                }
                sum
            })
        });
    }

    group.finish();
}

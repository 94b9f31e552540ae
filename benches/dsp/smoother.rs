//! Benchmarks for parameter smoothers.
//!
//! A core pushes dozens of targets per block and reads every smoother once
//! per sample, so these run a bank of 64 rather than a single instance.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use plinth_dsp::dsp::smoother::{BlockSmoother, ExpSmoother, LinearSmoother, SmootherCommon};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;
const BANK: usize = 64;

pub fn bench_smoother(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/smoother");

    for &size in BLOCK_SIZES {
        let mut common = SmootherCommon::new(SAMPLE_RATE, 0.02);
        common.set_buffer_size(size);
        let mut flip = false;

        let mut linear: Vec<LinearSmoother> = (0..BANK).map(|_| LinearSmoother::new(0.0)).collect();
        group.bench_with_input(BenchmarkId::new("linear_64", size), &size, |b, _| {
            b.iter(|| {
                flip = !flip;
                let target = if flip { 1.0 } else { 0.0 };
                for s in linear.iter_mut() {
                    s.push(&common, target);
                }
                let mut sum = 0.0f32;
                for _ in 0..size {
                    for s in linear.iter_mut() {
                        sum += s.process();
                    }
                }
                black_box(sum)
            })
        });

        let mut exp: Vec<ExpSmoother> = (0..BANK).map(|_| ExpSmoother::new(0.0)).collect();
        group.bench_with_input(BenchmarkId::new("one_pole_64", size), &size, |b, _| {
            b.iter(|| {
                flip = !flip;
                let target = if flip { 1.0 } else { 0.0 };
                for s in exp.iter_mut() {
                    s.push(target);
                }
                let mut sum = 0.0f32;
                for _ in 0..size {
                    for s in exp.iter_mut() {
                        sum += s.process(&common);
                    }
                }
                black_box(sum)
            })
        });

        let mut block: Vec<BlockSmoother> = (0..BANK).map(|_| BlockSmoother::new(0.0)).collect();
        group.bench_with_input(BenchmarkId::new("block_64", size), &size, |b, _| {
            b.iter(|| {
                flip = !flip;
                let target = if flip { 1.0 } else { 0.0 };
                for s in block.iter_mut() {
                    s.push(target);
                }
                let mut sum = 0.0f32;
                for i in 0..size {
                    common.set_buffer_index(i);
                    for s in block.iter_mut() {
                        sum += s.process(&common);
                    }
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}

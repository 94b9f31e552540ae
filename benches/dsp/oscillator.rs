//! Benchmarks for PTR and wavetable oscillators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use plinth_dsp::dsp::oscillator::TableOscillator;
use plinth_dsp::dsp::ptr::{PtrSyncSaw, PtrTrapezoid};
use plinth_dsp::dsp::wavetable::{PadSynthOptions, PeakInfo, WaveTable};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    let peaks: Vec<PeakInfo> = (1..=32)
        .map(|n| PeakInfo {
            frequency: 110.0 * n as f32,
            gain: 1.0 / n as f32,
            bandwidth: 10.0,
            phase: 0.0,
        })
        .collect();
    let mut table = WaveTable::new(1 << 14);
    table.padsynth(SAMPLE_RATE, 110.0, &peaks, &PadSynthOptions::default());

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Hard sync saw - PTR correction at both discontinuities
        let mut saw = PtrSyncSaw::new(SAMPLE_RATE as f64);
        saw.set_osc_freq(440.0);
        saw.set_sync_freq(150.0);
        group.bench_with_input(BenchmarkId::new("ptr_sync_saw", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = saw.process(0.0, 0.0) as f32;
                }
                black_box(&buffer);
            })
        });

        // Trapezoid - four corners per cycle
        let mut trapezoid = PtrTrapezoid::new(SAMPLE_RATE, 440.0);
        trapezoid.set_slope(4.0);
        trapezoid.set_pulse_width(0.3);
        group.bench_with_input(BenchmarkId::new("ptr_trapezoid", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = trapezoid.process();
                }
                black_box(&buffer);
            })
        });

        // PADsynth table playback - interpolated read
        let mut osc = TableOscillator::new();
        osc.set_frequency(440.0, table.base_freq());
        osc.set_table_index(table.table_index(440.0));
        group.bench_with_input(BenchmarkId::new("padsynth_table", size), &size, |b, _| {
            b.iter(|| {
                let samples = table.table(osc.table_index());
                for out in buffer.iter_mut() {
                    *out = osc.process(samples);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}

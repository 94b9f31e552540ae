//! Benchmarks for the PADsynth instrument core.
//!
//! Chords of sustained notes with and without unison, and a pool small
//! enough that every note on steals a voice through the transition buffer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use plinth_dsp::engine::backend::Scalar;
use plinth_dsp::synth::params::param_id;
use plinth_dsp::synth::PadSynthCore;
use plinth_dsp::CoreConfig;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;
const CHORD: [i16; 8] = [48, 52, 55, 59, 60, 64, 67, 71];

fn padsynth(max_voice: usize, n_unison: i64) -> PadSynthCore<Scalar> {
    let config = CoreConfig::default()
        .with_max_voice(max_voice)
        .with_table_size(1 << 14);
    let mut core = match PadSynthCore::<Scalar>::new(config, SAMPLE_RATE) {
        Ok(core) => core,
        Err(e) => panic!("padsynth core: {e}"),
    };
    core.parameters_mut().set_from_int(param_id::N_UNISON, n_unison);
    core.set_parameters(0.0);
    core.reset();
    core
}

pub fn bench_padsynth(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/padsynth");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // === SINGLE NOTE ===
        let mut single = padsynth(32, 1);
        single.note_on(0, 57, 0.0, 0.8);
        group.bench_with_input(BenchmarkId::new("single_note", size), &size, |b, _| {
            b.iter(|| {
                single.set_parameters(0.0);
                single.process(size, &mut [black_box(&mut left[..]), black_box(&mut right[..])]);
            })
        });

        // === CHORD ===
        let mut chord = padsynth(32, 1);
        for (id, &pitch) in CHORD.iter().enumerate() {
            chord.note_on(id as i32, pitch, 0.0, 0.8);
        }
        group.bench_with_input(BenchmarkId::new("chord_8", size), &size, |b, _| {
            b.iter(|| {
                chord.set_parameters(0.0);
                chord.process(size, &mut [black_box(&mut left[..]), black_box(&mut right[..])]);
            })
        });

        // === UNISON CHORD ===
        // 8 notes x 4 unison voices
        let mut unison = padsynth(32, 4);
        for (id, &pitch) in CHORD.iter().enumerate() {
            unison.note_on(id as i32, pitch, 0.0, 0.8);
        }
        group.bench_with_input(BenchmarkId::new("chord_8_unison_4", size), &size, |b, _| {
            b.iter(|| {
                unison.set_parameters(0.0);
                unison.process(size, &mut [black_box(&mut left[..]), black_box(&mut right[..])]);
            })
        });

        // === VOICE STEALING ===
        // Pool of 4, a new note every block
        let mut stealing = padsynth(4, 1);
        let mut next_id = 0i32;
        group.bench_with_input(BenchmarkId::new("steal_every_block", size), &size, |b, _| {
            b.iter(|| {
                let pitch = CHORD[next_id as usize % CHORD.len()];
                stealing.note_on(next_id, pitch, 0.0, 0.8);
                next_id = next_id.wrapping_add(1) & 0xffff;
                stealing.set_parameters(0.0);
                stealing.process(size, &mut [black_box(&mut left[..]), black_box(&mut right[..])]);
            })
        });
    }

    group.finish();
}

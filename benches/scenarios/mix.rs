//! Benchmarks for an instrument feeding a reverb, the way the demo
//! binary renders a block.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use plinth_dsp::effect::{LatticeReverbCore, NestedAllpassCore};
use plinth_dsp::engine::backend::Scalar;
use plinth_dsp::synth::PadSynthCore;
use plinth_dsp::{CoreConfig, DspCore};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

fn render_chain(
    synth: &mut dyn DspCore,
    reverb: &mut dyn DspCore,
    dry: &mut [Vec<f32>; 2],
    wet: &mut [Vec<f32>; 2],
    size: usize,
) {
    synth.set_parameters(0.0);
    reverb.set_parameters(0.0);

    let [dry_l, dry_r] = dry;
    synth.process(size, &[], &mut [&mut dry_l[..], &mut dry_r[..]]);

    let [wet_l, wet_r] = wet;
    reverb.process(size, &[&dry_l[..], &dry_r[..]], &mut [&mut wet_l[..], &mut wet_r[..]]);
}

pub fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/effects");

    let synth_config = CoreConfig::default().with_max_voice(32).with_table_size(1 << 14);
    let mut synth = match PadSynthCore::<Scalar>::new(synth_config, SAMPLE_RATE) {
        Ok(core) => core,
        Err(e) => panic!("padsynth core: {e}"),
    };
    for (id, pitch) in [48i16, 55, 60, 64].into_iter().enumerate() {
        synth.note_on(id as i32, pitch, 0.0, 0.8);
    }

    let mut nested = match NestedAllpassCore::<Scalar>::new(CoreConfig::default(), SAMPLE_RATE) {
        Ok(core) => core,
        Err(e) => panic!("nested reverb: {e}"),
    };
    nested.load_program(1);
    nested.set_parameters(0.0);
    nested.reset();

    // Short delay range keeps the 512 leaf lines small
    let lattice_config = CoreConfig::default().with_max_delay_seconds(0.05);
    let mut lattice = match LatticeReverbCore::<Scalar>::new(lattice_config, SAMPLE_RATE) {
        Ok(core) => core,
        Err(e) => panic!("lattice reverb: {e}"),
    };
    lattice.load_program(1);
    lattice.set_parameters(0.0);
    lattice.reset();

    for &size in BLOCK_SIZES {
        let mut dry = [vec![0.0f32; size], vec![0.0f32; size]];
        let mut wet = [vec![0.0f32; size], vec![0.0f32; size]];

        group.bench_with_input(BenchmarkId::new("padsynth_nested", size), &size, |b, _| {
            b.iter(|| {
                render_chain(
                    black_box(&mut synth),
                    black_box(&mut nested),
                    &mut dry,
                    &mut wet,
                    size,
                );
            })
        });

        group.bench_with_input(BenchmarkId::new("padsynth_lattice", size), &size, |b, _| {
            b.iter(|| {
                render_chain(
                    black_box(&mut synth),
                    black_box(&mut lattice),
                    &mut dry,
                    &mut wet,
                    size,
                );
            })
        });
    }

    group.finish();
}

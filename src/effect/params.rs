//! Parameter layouts of the reverb cores.

use crate::dsp::lattice::{LATTICE_DEPTH, LATTICE_WIDTH};
use crate::param::{IntScale, LinearScale, LogScale, ParamFlags, ParameterStore, Preset, Scale, Value};

/// Stages of the nested allpass chain.
pub const NESTING_DEPTH: usize = 8;

pub const N_LEAF: usize = LATTICE_WIDTH * LATTICE_WIDTH * LATTICE_WIDTH * LATTICE_WIDTH;
pub const N_LEVEL2: usize = N_LEAF / LATTICE_WIDTH;
pub const N_LEVEL3: usize = N_LEVEL2 / LATTICE_WIDTH;
pub const N_LEVEL4: usize = N_LEVEL3 / LATTICE_WIDTH;

const _: () = assert!(LATTICE_DEPTH == 4);

pub mod nested_id {
    use super::NESTING_DEPTH;

    pub const TIME0: usize = 0;
    pub const OUTER_FEED0: usize = TIME0 + NESTING_DEPTH;
    pub const INNER_FEED0: usize = OUTER_FEED0 + NESTING_DEPTH;

    pub const TIME_MULTIPLY: usize = INNER_FEED0 + NESTING_DEPTH;
    pub const OUTER_FEED_MULTIPLY: usize = TIME_MULTIPLY + 1;
    pub const INNER_FEED_MULTIPLY: usize = TIME_MULTIPLY + 2;

    pub const SMOOTHNESS: usize = INNER_FEED_MULTIPLY + 1;

    pub const LEN: usize = SMOOTHNESS + 1;
}

pub mod lattice_id {
    use super::{N_LEAF, N_LEVEL2, N_LEVEL3, N_LEVEL4};

    pub const TIME0: usize = 0;
    pub const INNER_FEED0: usize = TIME0 + N_LEAF;
    pub const D1_FEED0: usize = INNER_FEED0 + N_LEAF;
    pub const D2_FEED0: usize = D1_FEED0 + N_LEAF;
    pub const D3_FEED0: usize = D2_FEED0 + N_LEVEL2;
    pub const D4_FEED0: usize = D3_FEED0 + N_LEVEL3;

    pub const TIME_MULTIPLY: usize = D4_FEED0 + N_LEVEL4;
    pub const INNER_FEED_MULTIPLY: usize = TIME_MULTIPLY + 1;
    pub const D1_FEED_MULTIPLY: usize = TIME_MULTIPLY + 2;
    pub const D2_FEED_MULTIPLY: usize = TIME_MULTIPLY + 3;
    pub const D3_FEED_MULTIPLY: usize = TIME_MULTIPLY + 4;
    pub const D4_FEED_MULTIPLY: usize = TIME_MULTIPLY + 5;

    pub const STEREO_CROSS: usize = D4_FEED_MULTIPLY + 1;
    pub const STEREO_SPREAD: usize = STEREO_CROSS + 1;

    pub const DRY: usize = STEREO_SPREAD + 1;
    pub const WET: usize = DRY + 1;

    pub const SMOOTHNESS: usize = WET + 1;
    pub const BYPASS: usize = SMOOTHNESS + 1;

    pub const LEN: usize = BYPASS + 1;
}

#[derive(Debug, Clone)]
pub struct EffectScales {
    pub bool_scale: IntScale,
    pub default_scale: LinearScale,
    /// Top end is the configured delay capacity.
    pub time: LogScale,
    pub feed: LinearScale,
    pub multiply: LinearScale,
    pub gain: LogScale,
    pub smoothness: LogScale,
}

impl EffectScales {
    pub fn new(max_delay_seconds: f32) -> Self {
        let max_time = f64::from(max_delay_seconds);
        Self {
            bool_scale: IntScale::new(1),
            default_scale: LinearScale::new(0.0, 1.0),
            time: LogScale::new(0.0, max_time, 0.5, 0.2 * max_time),
            feed: LinearScale::new(-1.0, 1.0),
            multiply: LinearScale::new(0.0, 1.0),
            gain: LogScale::new(0.0, 2.0, 0.5, 0.5),
            smoothness: LogScale::new(0.0, 8.0, 0.5, 0.2),
        }
    }
}

fn linear(name: impl Into<String>, scale: LinearScale, default_normalized: f64) -> Value {
    Value::new(name, scale, default_normalized, ParamFlags::AUTOMABLE)
}

fn log(name: impl Into<String>, scale: LogScale, default_normalized: f64) -> Value {
    Value::new(
        name,
        scale,
        default_normalized,
        ParamFlags::AUTOMABLE | ParamFlags::LOGARITHMIC,
    )
}

pub fn nested_parameters(scales: &EffectScales) -> ParameterStore {
    let s = scales;
    let default_time = s.time.invmap(0.1 * s.time.max());
    let mut values = Vec::with_capacity(nested_id::LEN);

    for i in 0..NESTING_DEPTH {
        values.push(log(format!("time{i}"), s.time, default_time));
    }
    for i in 0..NESTING_DEPTH {
        values.push(linear(format!("outerFeed{i}"), s.feed, 0.5));
    }
    for i in 0..NESTING_DEPTH {
        values.push(linear(format!("innerFeed{i}"), s.feed, 0.5));
    }
    values.push(linear("timeMultiply", s.multiply, 1.0));
    values.push(linear("outerFeedMultiply", s.multiply, 1.0));
    values.push(linear("innerFeedMultiply", s.multiply, 1.0));
    values.push(log("smoothness", s.smoothness, 0.5));

    debug_assert_eq!(values.len(), nested_id::LEN);
    ParameterStore::new(values)
}

pub fn lattice_parameters(scales: &EffectScales) -> ParameterStore {
    let s = scales;
    let default_time = s.time.invmap(0.1 * s.time.max());
    let mut values = Vec::with_capacity(lattice_id::LEN);

    for i in 0..N_LEAF {
        values.push(log(format!("time{i}"), s.time, default_time));
    }
    for i in 0..N_LEAF {
        values.push(linear(format!("innerFeed{i}"), s.feed, 0.5));
    }
    for i in 0..N_LEAF {
        values.push(linear(format!("d1Feed{i}"), s.feed, 0.5));
    }
    for i in 0..N_LEVEL2 {
        values.push(linear(format!("d2Feed{i}"), s.feed, 0.5));
    }
    for i in 0..N_LEVEL3 {
        values.push(linear(format!("d3Feed{i}"), s.feed, 0.5));
    }
    for i in 0..N_LEVEL4 {
        values.push(linear(format!("d4Feed{i}"), s.feed, 0.5));
    }

    values.push(linear("timeMultiply", s.multiply, 1.0));
    values.push(linear("innerFeedMultiply", s.multiply, 1.0));
    values.push(linear("d1FeedMultiply", s.multiply, 1.0));
    values.push(linear("d2FeedMultiply", s.multiply, 1.0));
    values.push(linear("d3FeedMultiply", s.multiply, 1.0));
    values.push(linear("d4FeedMultiply", s.multiply, 1.0));

    values.push(linear("stereoCross", s.default_scale, 0.0));
    values.push(linear("stereoSpread", s.default_scale, 0.5));

    values.push(log("dry", s.gain, 0.5));
    values.push(log("wet", s.gain, 0.5));

    values.push(log("smoothness", s.smoothness, 0.5));
    values.push(Value::boolean("bypass", s.bool_scale, false));

    debug_assert_eq!(values.len(), lattice_id::LEN);
    ParameterStore::new(values)
}

pub fn nested_presets(scales: &EffectScales) -> Vec<Preset> {
    let s = scales;
    let max = s.time.max();
    // Mutually prime-ish stage times, longest outermost.
    let diffuse = (0..NESTING_DEPTH)
        .map(|i| (nested_id::TIME0 + i, s.time.invmap(max * 0.02 * (NESTING_DEPTH - i) as f64 + 0.0031)))
        .chain((0..NESTING_DEPTH).map(|i| (nested_id::OUTER_FEED0 + i, s.feed.invmap(0.1))))
        .chain((0..NESTING_DEPTH).map(|i| (nested_id::INNER_FEED0 + i, s.feed.invmap(0.6))))
        .collect();
    vec![
        Preset::new("Init", Vec::new()),
        Preset::new("Diffuse", diffuse),
        Preset::new(
            "Short Smear",
            vec![
                (nested_id::TIME_MULTIPLY, s.multiply.invmap(0.1)),
                (nested_id::INNER_FEED_MULTIPLY, s.multiply.invmap(0.8)),
            ],
        ),
    ]
}

pub fn lattice_presets(scales: &EffectScales) -> Vec<Preset> {
    let s = scales;
    let feeds = |start: usize, count: usize, value: f64| {
        (start..start + count).map(move |i| (i, s.feed.invmap(value)))
    };
    let hall = feeds(lattice_id::INNER_FEED0, N_LEAF, 0.6)
        .chain(feeds(lattice_id::D1_FEED0, N_LEAF, 0.1))
        .chain(feeds(lattice_id::D2_FEED0, N_LEVEL2, 0.1))
        .chain(feeds(lattice_id::D3_FEED0, N_LEVEL3, 0.1))
        .chain(feeds(lattice_id::D4_FEED0, N_LEVEL4, 0.1))
        .chain([
            (lattice_id::STEREO_SPREAD, s.default_scale.invmap(0.8)),
            (lattice_id::WET, s.gain.invmap(0.8)),
        ])
        .collect();
    vec![
        Preset::new("Init", Vec::new()),
        Preset::new("Hall", hall),
        Preset::new(
            "Mono Room",
            vec![
                (lattice_id::TIME_MULTIPLY, s.multiply.invmap(0.25)),
                (lattice_id::STEREO_SPREAD, s.default_scale.invmap(0.0)),
            ],
        ),
    ]
}

//! Multi-level nested allpass lattice.
//!
//! The leaf level is a nested Schroeder chain whose stage settings are
//! smoothed per sample. Each level above nests its children the same way a
//! chain nests allpass stages: a child takes the place of the allpass and
//! the level adds one feed coefficient per child. Four levels of four give
//! 256 leaf allpasses per channel.
//!
//! ```text
//! level 4:  ┌ L3 ┬ L3 ┬ L3 ┬ L3 ┐          feed4[0..4]
//! level 3:    └ L2 ┬ L2 ┬ L2 ┬ L2 ┘       feed3[0..16]
//! level 2:      └ L1 ┬ L1 ┬ L1 ┬ L1 ┘     feed2[0..64]
//! level 1:        └ AP ┬ AP ┬ AP ┬ AP ┘   time, inner, feed1[0..256]
//! ```

use super::allpass::SchroederAllpass;
use super::smoother::LinearSmoother;

/// Fan-out of every lattice level.
pub const LATTICE_WIDTH: usize = 4;
/// Number of levels in [`Lattice4`].
pub const LATTICE_DEPTH: usize = 4;

/// Asymmetric left/right multipliers for decorrelating stereo channels.
///
/// The channel on the side of the offset's sign is stretched by
/// `1 + offset`, the other keeps `mul`.
pub fn calc_offset(offset: f32, mul: f32) -> [f32; 2] {
    if offset >= 0.0 {
        [mul, (1.0 + offset) * mul]
    } else {
        [(1.0 + offset) * mul, mul]
    }
}

pub trait AllpassNode {
    fn new(sample_rate: f32, max_seconds: f32) -> Self
    where
        Self: Sized;
    fn setup(&mut self, sample_rate: f32, max_seconds: f32);
    /// Clears the signal path and snaps every smoother to its target.
    fn reset(&mut self);
    fn process(&mut self, input: f32, sample_rate: f32) -> f32;
}

#[derive(Debug, Clone)]
pub struct LatticeLeaf<const N: usize> {
    input: [f32; N],
    buffer: [f32; N],
    allpass: [SchroederAllpass; N],
    pub seconds: [LinearSmoother; N],
    pub inner_feed: [LinearSmoother; N],
    pub outer_feed: [LinearSmoother; N],
}

impl<const N: usize> AllpassNode for LatticeLeaf<N> {
    fn new(sample_rate: f32, max_seconds: f32) -> Self {
        Self {
            input: [0.0; N],
            buffer: [0.0; N],
            allpass: std::array::from_fn(|_| SchroederAllpass::new(sample_rate, max_seconds)),
            seconds: std::array::from_fn(|_| LinearSmoother::default()),
            inner_feed: std::array::from_fn(|_| LinearSmoother::default()),
            outer_feed: std::array::from_fn(|_| LinearSmoother::default()),
        }
    }

    fn setup(&mut self, sample_rate: f32, max_seconds: f32) {
        for ap in self.allpass.iter_mut() {
            ap.setup(sample_rate, max_seconds);
        }
    }

    fn reset(&mut self) {
        self.input.fill(0.0);
        self.buffer.fill(0.0);
        for ap in self.allpass.iter_mut() {
            ap.reset();
        }
        for s in self
            .seconds
            .iter_mut()
            .chain(self.inner_feed.iter_mut())
            .chain(self.outer_feed.iter_mut())
        {
            let target = s.target();
            s.reset(target);
        }
    }

    fn process(&mut self, mut input: f32, sample_rate: f32) -> f32 {
        if N == 0 {
            return input;
        }

        let outer: [f32; N] = std::array::from_fn(|i| self.outer_feed[i].process());
        for idx in 0..N {
            input -= outer[idx] * self.buffer[idx];
            self.input[idx] = input;
        }

        let mut out = self.input[N - 1];
        for idx in (0..N).rev() {
            let seconds = self.seconds[idx].process();
            let inner = self.inner_feed[idx].process();
            self.buffer[idx] =
                self.allpass[idx].process(out, sample_rate, seconds, inner) + outer[idx] * self.input[idx];
            out = self.buffer[idx];
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct LatticeNode<C, const N: usize> {
    input: [f32; N],
    buffer: [f32; N],
    pub children: [C; N],
    pub feed: [LinearSmoother; N],
}

impl<C: AllpassNode, const N: usize> AllpassNode for LatticeNode<C, N> {
    fn new(sample_rate: f32, max_seconds: f32) -> Self {
        Self {
            input: [0.0; N],
            buffer: [0.0; N],
            children: std::array::from_fn(|_| C::new(sample_rate, max_seconds)),
            feed: std::array::from_fn(|_| LinearSmoother::default()),
        }
    }

    fn setup(&mut self, sample_rate: f32, max_seconds: f32) {
        for child in self.children.iter_mut() {
            child.setup(sample_rate, max_seconds);
        }
    }

    fn reset(&mut self) {
        self.input.fill(0.0);
        self.buffer.fill(0.0);
        for child in self.children.iter_mut() {
            child.reset();
        }
        for s in self.feed.iter_mut() {
            let target = s.target();
            s.reset(target);
        }
    }

    fn process(&mut self, mut input: f32, sample_rate: f32) -> f32 {
        if N == 0 {
            return input;
        }

        let feed: [f32; N] = std::array::from_fn(|i| self.feed[i].process());
        for idx in 0..N {
            input -= feed[idx] * self.buffer[idx];
            self.input[idx] = input;
        }

        let mut out = self.input[N - 1];
        for idx in (0..N).rev() {
            self.buffer[idx] = self.children[idx].process(out, sample_rate) + feed[idx] * self.input[idx];
            out = self.buffer[idx];
        }
        out
    }
}

pub type Lattice1 = LatticeLeaf<LATTICE_WIDTH>;
pub type Lattice2 = LatticeNode<Lattice1, LATTICE_WIDTH>;
pub type Lattice3 = LatticeNode<Lattice2, LATTICE_WIDTH>;
pub type Lattice4 = LatticeNode<Lattice3, LATTICE_WIDTH>;

//! Unison pan spreading.
//!
//! Every mode places `n` pans evenly over `[0.5 - w/2, 0.5 + w/2]` for a
//! spread width `w`, and differs only in which unison voice gets which
//! slot. Voice 0 is the least detuned, so "high on mid" puts the most
//! detuned voices in the center and "high on side" pushes them outward.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand::seq::SliceRandom;
use rand::Rng;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanMode {
    /// Flips between ascending left-to-right and right-to-left per note.
    #[default]
    AlternateLr,
    /// Flips between high-on-mid and high-on-side per note.
    AlternateMs,
    AscendLr,
    AscendRl,
    HighOnMid,
    HighOnSide,
    Random,
    RotateL,
    RotateR,
    Shuffle,
}

impl PanMode {
    pub const ALL: [PanMode; 10] = [
        PanMode::AlternateLr,
        PanMode::AlternateMs,
        PanMode::AscendLr,
        PanMode::AscendRl,
        PanMode::HighOnMid,
        PanMode::HighOnSide,
        PanMode::Random,
        PanMode::RotateL,
        PanMode::RotateR,
        PanMode::Shuffle,
    ];

    /// Out-of-range indices fall back to `Shuffle`.
    pub fn from_index(index: u32) -> Self {
        Self::ALL
            .get(index as usize)
            .copied()
            .unwrap_or(PanMode::Shuffle)
    }

    pub fn name(self) -> &'static str {
        match self {
            PanMode::AlternateLr => "Alternate L-R",
            PanMode::AlternateMs => "Alternate M-S",
            PanMode::AscendLr => "Ascend L -> R",
            PanMode::AscendRl => "Ascend R -> L",
            PanMode::HighOnMid => "High on Mid",
            PanMode::HighOnSide => "High on Side",
            PanMode::Random => "Random",
            PanMode::RotateL => "Rotate L",
            PanMode::RotateR => "Rotate R",
            PanMode::Shuffle => "Shuffle",
        }
    }
}

/// Even slot grid: slot `i` sits at `step * i + offset`.
#[derive(Debug, Clone, Copy)]
struct Grid {
    step: f32,
    offset: f32,
}

impl Grid {
    fn new(width: f32, n: usize) -> Self {
        Self {
            step: width / (n.max(2) - 1) as f32,
            offset: 0.5 - 0.5 * width,
        }
    }

    fn at(self, slot: usize) -> f32 {
        self.step * slot as f32 + self.offset
    }
}

fn ascend_lr(pans: &mut [f32], grid: Grid) {
    for (i, pan) in pans.iter_mut().enumerate() {
        *pan = grid.at(i);
    }
}

fn ascend_rl(pans: &mut [f32], grid: Grid) {
    for (i, pan) in pans.iter_mut().rev().enumerate() {
        *pan = grid.at(i);
    }
}

/// Slots walk outward from the center, alternating sides.
fn center_out(n: usize) -> impl Iterator<Item = usize> {
    let mut slot = (n / 2) as isize;
    let mut sign = 1isize;
    (0..n).map(move |step| {
        slot += sign * step as isize;
        sign = -sign;
        slot.clamp(0, n as isize - 1) as usize
    })
}

fn high_on_mid(pans: &mut [f32], grid: Grid) {
    let n = pans.len();
    for (pan, slot) in pans.iter_mut().rev().zip(center_out(n)) {
        *pan = grid.at(slot);
    }
}

fn high_on_side(pans: &mut [f32], grid: Grid) {
    let n = pans.len();
    for (pan, slot) in pans.iter_mut().zip(center_out(n)) {
        *pan = grid.at(slot);
    }
}

fn random<R: Rng>(pans: &mut [f32], width: f32, rng: &mut R) {
    let low = 0.5 - 0.5 * width;
    for pan in pans.iter_mut() {
        *pan = low + width * rng.gen::<f32>();
    }
}

fn rotate_l(pans: &mut [f32], grid: Grid, counter: usize) {
    let n = pans.len();
    for (i, pan) in pans.iter_mut().enumerate() {
        *pan = grid.at((i + counter) % n);
    }
}

fn rotate_r(pans: &mut [f32], grid: Grid, counter: usize) {
    let n = pans.len();
    for (i, pan) in pans.iter_mut().rev().enumerate() {
        *pan = grid.at((i + counter) % n);
    }
}

fn shuffle<R: Rng>(pans: &mut [f32], grid: Grid, rng: &mut R) {
    ascend_lr(pans, grid);
    pans.shuffle(rng);
}

/// Fills `pans` for one note.
///
/// `Random` draws each pan uniformly over the whole spread width. It does
/// not shrink the range to one grid step (`width / (n - 1)`) around each
/// slot, so unison voices may bunch up or swap sides from note to note.
///
/// `counter` carries the alternation/rotation state between notes and is
/// shared by every mode, as switching modes mid-performance keeps rotating
/// from where it was.
pub fn spread_pans<R: Rng>(mode: PanMode, pans: &mut [f32], width: f32, counter: &mut usize, rng: &mut R) {
    let n = pans.len();
    if n == 0 {
        return;
    }
    if n == 1 {
        pans[0] = 0.5;
        return;
    }

    let grid = Grid::new(width, n);
    match mode {
        PanMode::AlternateLr => {
            *counter = usize::from(*counter == 0);
            if *counter != 0 {
                ascend_lr(pans, grid)
            } else {
                ascend_rl(pans, grid)
            }
        }
        PanMode::AlternateMs => {
            *counter = usize::from(*counter == 0);
            if *counter != 0 {
                high_on_mid(pans, grid)
            } else {
                high_on_side(pans, grid)
            }
        }
        PanMode::AscendLr => ascend_lr(pans, grid),
        PanMode::AscendRl => ascend_rl(pans, grid),
        PanMode::HighOnMid => high_on_mid(pans, grid),
        PanMode::HighOnSide => high_on_side(pans, grid),
        PanMode::Random => random(pans, width, rng),
        PanMode::RotateL => {
            *counter = (*counter + 1) % n;
            rotate_l(pans, grid, *counter)
        }
        PanMode::RotateR => {
            *counter = (*counter + 1) % n;
            rotate_r(pans, grid, *counter)
        }
        PanMode::Shuffle => shuffle(pans, grid, rng),
    }
}

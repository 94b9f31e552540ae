//! plinth - play the PADsynth core through a reverb core from the terminal
//!
//! Run with: cargo run -- [nested|lattice]

mod app;
mod ui;

use app::{Plinth, ReverbKind};
use color_eyre::eyre::eyre;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let reverb = match std::env::args().nth(1).as_deref() {
        None | Some("nested") => ReverbKind::Nested,
        Some("lattice") => ReverbKind::Lattice,
        Some(other) => return Err(eyre!("unknown reverb `{other}`, expected `nested` or `lattice`")),
    };

    Plinth::new(reverb).run()
}

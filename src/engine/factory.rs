//! Builds cores behind `Box<dyn DspCore>` for a chosen or detected backend.

use crate::config::CoreConfig;
use crate::effect::{LatticeReverbCore, NestedAllpassCore};
use crate::error::{Error, Result};
use crate::synth::PadSynthCore;

use super::backend::{Avx2, Avx512, Scalar, Sse2, Sse41};
use super::{DspCore, InstructionSet};

/// Signature shared by every `create_*` function.
pub type CoreFactory = fn(CoreConfig, f32, Option<InstructionSet>) -> Result<Box<dyn DspCore>>;

/// Resolves the requested set, or detects the best one when `None`.
pub fn select_instruction_set(requested: Option<InstructionSet>) -> Result<InstructionSet> {
    match requested {
        Some(set) if set.is_supported() => Ok(set),
        Some(set) => {
            log::warn!("Requested instruction set {set} is not supported by this CPU");
            Err(Error::UnsupportedInstructionSet(set))
        }
        None => Ok(InstructionSet::detect()),
    }
}

fn rejected(error: Error) -> Error {
    log::warn!("Core construction rejected: {error}");
    error
}

macro_rules! dispatch {
    ($core:ident, $config:expr, $sample_rate:expr, $set:expr) => {{
        let core: Box<dyn DspCore> = match $set {
            InstructionSet::Scalar => Box::new($core::<Scalar>::new($config, $sample_rate).map_err(rejected)?),
            InstructionSet::Sse2 => Box::new($core::<Sse2>::new($config, $sample_rate).map_err(rejected)?),
            InstructionSet::Sse41 => Box::new($core::<Sse41>::new($config, $sample_rate).map_err(rejected)?),
            InstructionSet::Avx2 => Box::new($core::<Avx2>::new($config, $sample_rate).map_err(rejected)?),
            InstructionSet::Avx512 => Box::new($core::<Avx512>::new($config, $sample_rate).map_err(rejected)?),
        };
        core
    }};
}

pub fn create_padsynth(
    config: CoreConfig,
    sample_rate: f32,
    requested: Option<InstructionSet>,
) -> Result<Box<dyn DspCore>> {
    let set = select_instruction_set(requested)?;
    let core = dispatch!(PadSynthCore, config, sample_rate, set);
    log::info!("PADsynth core created with {set} backend at {sample_rate} Hz");
    Ok(core)
}

pub fn create_nested_reverb(
    config: CoreConfig,
    sample_rate: f32,
    requested: Option<InstructionSet>,
) -> Result<Box<dyn DspCore>> {
    let set = select_instruction_set(requested)?;
    let core = dispatch!(NestedAllpassCore, config, sample_rate, set);
    log::info!("Nested allpass core created with {set} backend at {sample_rate} Hz");
    Ok(core)
}

pub fn create_lattice_reverb(
    config: CoreConfig,
    sample_rate: f32,
    requested: Option<InstructionSet>,
) -> Result<Box<dyn DspCore>> {
    let set = select_instruction_set(requested)?;
    let core = dispatch!(LatticeReverbCore, config, sample_rate, set);
    log::info!("Lattice reverb core created with {set} backend at {sample_rate} Hz");
    Ok(core)
}

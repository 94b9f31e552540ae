use std::fmt;

use crate::engine::backend::InstructionSet;

pub type Result<T> = std::result::Result<T, Error>;

/// Construction-time failures. Everything that can go wrong while audio is
/// running is recovered in place instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    InvalidConfig { field: &'static str, reason: String },
    UnsupportedInstructionSet(InstructionSet),
}

impl Error {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig { field, reason } => {
                write!(f, "Invalid config `{field}`: {reason}")
            }
            Error::UnsupportedInstructionSet(set) => {
                write!(f, "Instruction set {set} is not supported by this CPU")
            }
        }
    }
}

impl std::error::Error for Error {}

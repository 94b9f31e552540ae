//! Typed, scaled parameter cells and the flat store the cores read from.

pub mod preset;
pub mod scale;
pub mod store;
pub mod value;

pub use preset::Preset;
pub use scale::{DecibelScale, IntScale, LinearScale, LogScale, Scale, ScaleKind};
pub use store::ParameterStore;
pub use value::{ParamFlags, Value};

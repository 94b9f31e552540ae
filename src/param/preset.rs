#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::store::ParameterStore;

/// A named dump of normalized parameter assignments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Preset {
    pub name: String,
    pub values: Vec<(usize, f64)>,
}

impl Preset {
    pub fn new(name: impl Into<String>, values: Vec<(usize, f64)>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Captures every parameter of `params` as it currently stands.
    pub fn capture(name: impl Into<String>, params: &ParameterStore) -> Self {
        let values = params
            .iter()
            .enumerate()
            .map(|(index, value)| (index, value.get_normalized()))
            .collect();
        Self::new(name, values)
    }
}

impl ParameterStore {
    /// Resets to defaults, then applies `presets[index]` if it exists.
    /// Assignments to unknown parameter indices are skipped.
    pub fn load_program(&mut self, presets: &[Preset], index: usize) {
        self.reset_to_defaults();
        let Some(preset) = presets.get(index) else {
            return;
        };
        for &(param, normalized) in &preset.values {
            self.set_from_normalized(param, normalized);
        }
    }
}

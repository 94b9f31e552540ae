//! Construction-time configuration shared by the instrument and effect cores.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MIN_TABLE_SIZE: usize = 1 << 10;
pub const MAX_TABLE_SIZE: usize = 1 << 20;

/// Sizes every buffer a core allocates. Nothing here changes after
/// construction; `setup` only reallocates what depends on the sample rate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoreConfig {
    /// Voice pool size.
    pub max_voice: usize,
    /// PADsynth table length in samples. Power of two.
    pub table_size: usize,
    /// Length of the voice stealing crossfade.
    pub transition_seconds: f32,
    /// Pending MIDI notes kept per block before new ones are dropped.
    pub midi_capacity: usize,
    /// Longest delay time any reverb stage may be set to.
    pub max_delay_seconds: f32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_voice: 128,
            table_size: 1 << 18,
            transition_seconds: 0.01,
            midi_capacity: 256,
            max_delay_seconds: 0.5,
        }
    }
}

impl CoreConfig {
    pub fn with_max_voice(mut self, max_voice: usize) -> Self {
        self.max_voice = max_voice;
        self
    }

    pub fn with_table_size(mut self, table_size: usize) -> Self {
        self.table_size = table_size;
        self
    }

    pub fn with_transition_seconds(mut self, seconds: f32) -> Self {
        self.transition_seconds = seconds;
        self
    }

    pub fn with_midi_capacity(mut self, capacity: usize) -> Self {
        self.midi_capacity = capacity;
        self
    }

    pub fn with_max_delay_seconds(mut self, seconds: f32) -> Self {
        self.max_delay_seconds = seconds;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_voice == 0 {
            return Err(Error::config("max_voice", "must be at least 1"));
        }
        if !self.table_size.is_power_of_two()
            || !(MIN_TABLE_SIZE..=MAX_TABLE_SIZE).contains(&self.table_size)
        {
            return Err(Error::config(
                "table_size",
                format!(
                    "{} is not a power of two in {MIN_TABLE_SIZE}..={MAX_TABLE_SIZE}",
                    self.table_size
                ),
            ));
        }
        if !(self.transition_seconds > 0.0 && self.transition_seconds <= 0.1) {
            return Err(Error::config("transition_seconds", "must be in (0, 0.1]"));
        }
        if self.midi_capacity == 0 {
            return Err(Error::config("midi_capacity", "must be at least 1"));
        }
        if !(self.max_delay_seconds > 0.0 && self.max_delay_seconds.is_finite()) {
            return Err(Error::config("max_delay_seconds", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CoreConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_empty_pool_and_odd_table() {
        let err = CoreConfig::default().with_max_voice(0).validate();
        assert!(matches!(err, Err(Error::InvalidConfig { field: "max_voice", .. })));

        let err = CoreConfig::default().with_table_size(3000).validate();
        assert!(matches!(err, Err(Error::InvalidConfig { field: "table_size", .. })));
    }

    #[test]
    fn rejects_long_transition() {
        let err = CoreConfig::default().with_transition_seconds(0.5).validate();
        assert!(err.is_err(), "transition longer than 100 ms should be rejected");
    }
}

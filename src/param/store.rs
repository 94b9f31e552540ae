use super::value::{ParamFlags, Value};

/// Flat, index-addressed parameter array. Out-of-range indices read as zero
/// and writes to them are dropped.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    values: Vec<Value>,
}

impl ParameterStore {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: impl Into<usize>) -> Option<&Value> {
        self.values.get(index.into())
    }

    pub fn name(&self, index: impl Into<usize>) -> Option<&str> {
        self.value(index).map(Value::name)
    }

    pub fn flags(&self, index: impl Into<usize>) -> ParamFlags {
        self.value(index).map(Value::flags).unwrap_or_default()
    }

    pub fn get_float(&self, index: impl Into<usize>) -> f64 {
        self.value(index).map_or(0.0, Value::get_float)
    }

    pub fn get_int(&self, index: impl Into<usize>) -> i64 {
        self.value(index).map_or(0, Value::get_int)
    }

    pub fn get_bool(&self, index: impl Into<usize>) -> bool {
        self.get_int(index) != 0
    }

    pub fn get_normalized(&self, index: impl Into<usize>) -> f64 {
        self.value(index).map_or(0.0, Value::get_normalized)
    }

    pub fn set_from_float(&mut self, index: impl Into<usize>, raw: f64) {
        if let Some(value) = self.values.get_mut(index.into()) {
            value.set_from_float(raw);
        }
    }

    pub fn set_from_int(&mut self, index: impl Into<usize>, raw: i64) {
        if let Some(value) = self.values.get_mut(index.into()) {
            value.set_from_int(raw);
        }
    }

    pub fn set_from_normalized(&mut self, index: impl Into<usize>, normalized: f64) {
        if let Some(value) = self.values.get_mut(index.into()) {
            value.set_from_normalized(normalized);
        }
    }

    pub fn reset_to_defaults(&mut self) {
        for value in &mut self.values {
            value.reset_to_default();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::scale::{DecibelScale, IntScale, LinearScale};

    fn store() -> ParameterStore {
        ParameterStore::new(vec![
            Value::boolean("bypass", IntScale::new(1), false),
            Value::new(
                "gain",
                DecibelScale::new(-60.0, 0.0, true),
                1.0,
                ParamFlags::AUTOMABLE,
            ),
            Value::new(
                "mix",
                LinearScale::new(0.0, 1.0),
                0.5,
                ParamFlags::AUTOMABLE,
            ),
        ])
    }

    #[test]
    fn out_of_range_index_is_silent() {
        let mut params = store();
        assert_eq!(params.get_float(99usize), 0.0);
        assert_eq!(params.get_int(99usize), 0);
        params.set_from_float(99usize, 1.0);
        params.set_from_normalized(99usize, 1.0);
        assert_eq!(params.len(), 3);
        assert_eq!(params.flags(99usize), ParamFlags::NONE);
    }

    #[test]
    fn normalized_and_raw_agree() {
        let mut params = store();
        params.set_from_normalized(2usize, 0.25);
        assert_eq!(params.get_float(2usize), 0.25);
        params.set_from_float(1usize, 0.0);
        assert_eq!(params.get_normalized(1usize), 0.0);
        params.set_from_int(0usize, 1);
        assert!(params.get_bool(0usize));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut params = store();
        params.set_from_float(2usize, 0.9);
        params.reset_to_defaults();
        assert_eq!(params.get_float(2usize), 0.5);
        assert_eq!(params.name(2usize), Some("mix"));
    }
}

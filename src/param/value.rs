use std::ops::BitOr;

use super::scale::{Scale, ScaleKind};

/// Host hints carried by each parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParamFlags(u32);

impl ParamFlags {
    pub const NONE: ParamFlags = ParamFlags(0);
    pub const AUTOMABLE: ParamFlags = ParamFlags(0x01);
    pub const BOOLEAN: ParamFlags = ParamFlags(0x02);
    pub const INTEGER: ParamFlags = ParamFlags(0x04);
    pub const LOGARITHMIC: ParamFlags = ParamFlags(0x08);

    pub fn contains(self, other: ParamFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for ParamFlags {
    type Output = ParamFlags;

    fn bitor(self, rhs: ParamFlags) -> ParamFlags {
        ParamFlags(self.0 | rhs.0)
    }
}

/// One typed, scaled parameter cell.
#[derive(Debug, Clone)]
pub struct Value {
    name: String,
    scale: ScaleKind,
    flags: ParamFlags,
    default_normalized: f64,
    raw: f64,
}

impl Value {
    pub fn new(
        name: impl Into<String>,
        scale: impl Into<ScaleKind>,
        default_normalized: f64,
        flags: ParamFlags,
    ) -> Self {
        let scale = scale.into();
        let default_normalized = default_normalized.clamp(0.0, 1.0);
        Self {
            name: name.into(),
            raw: scale.map(default_normalized),
            scale,
            flags,
            default_normalized,
        }
    }

    /// Shorthand for an automable integer step parameter with a raw default.
    pub fn int(name: impl Into<String>, scale: impl Into<ScaleKind>, default_raw: u32) -> Self {
        let scale = scale.into();
        let normalized = scale.invmap(default_raw as f64);
        Self::new(
            name,
            scale,
            normalized,
            ParamFlags::AUTOMABLE | ParamFlags::INTEGER,
        )
    }

    /// Shorthand for an automable on/off switch.
    pub fn boolean(name: impl Into<String>, scale: impl Into<ScaleKind>, on: bool) -> Self {
        Self::new(
            name,
            scale,
            if on { 1.0 } else { 0.0 },
            ParamFlags::AUTOMABLE | ParamFlags::BOOLEAN,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> ParamFlags {
        self.flags
    }

    pub fn scale(&self) -> &ScaleKind {
        &self.scale
    }

    pub fn get_float(&self) -> f64 {
        self.raw
    }

    pub fn get_int(&self) -> i64 {
        self.raw.round() as i64
    }

    pub fn get_normalized(&self) -> f64 {
        self.scale.invmap(self.raw)
    }

    pub fn default_normalized(&self) -> f64 {
        self.default_normalized
    }

    pub fn set_from_float(&mut self, raw: f64) {
        if raw.is_nan() {
            return;
        }
        let raw = raw.clamp(self.scale.min(), self.scale.max());
        self.raw = if self.flags.contains(ParamFlags::INTEGER)
            || self.flags.contains(ParamFlags::BOOLEAN)
        {
            raw.round()
        } else {
            raw
        };
    }

    pub fn set_from_int(&mut self, raw: i64) {
        self.set_from_float(raw as f64);
    }

    pub fn set_from_normalized(&mut self, normalized: f64) {
        if normalized.is_nan() {
            return;
        }
        self.raw = self.scale.map(normalized.clamp(0.0, 1.0));
    }

    pub fn reset_to_default(&mut self) {
        self.raw = self.scale.map(self.default_normalized);
    }
}

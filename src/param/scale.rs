//! Mappings between the normalized [0, 1] host range and raw parameter units.

/// A bidirectional mapping. `map(invmap(raw)) == raw` for every raw value in
/// `min()..=max()` (integer scales round).
pub trait Scale {
    fn map(&self, normalized: f64) -> f64;
    fn invmap(&self, raw: f64) -> f64;
    fn min(&self) -> f64;
    fn max(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    min: f64,
    max: f64,
    range: f64,
}

impl LinearScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            range: max - min,
        }
    }
}

impl Scale for LinearScale {
    fn map(&self, normalized: f64) -> f64 {
        normalized.clamp(0.0, 1.0) * self.range + self.min
    }

    fn invmap(&self, raw: f64) -> f64 {
        if self.range == 0.0 {
            return 0.0;
        }
        ((raw - self.min) / self.range).clamp(0.0, 1.0)
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }
}

/// Power curve that sends `in_value` (normalized) to `out_value` (raw).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    min: f64,
    max: f64,
    range: f64,
    expo: f64,
}

impl LogScale {
    pub fn new(min: f64, max: f64, in_value: f64, out_value: f64) -> Self {
        let range = max - min;
        let expo = ((out_value - min) / range).ln() / in_value.ln();
        Self {
            min,
            max,
            range,
            expo,
        }
    }
}

impl Scale for LogScale {
    fn map(&self, normalized: f64) -> f64 {
        normalized.clamp(0.0, 1.0).powf(self.expo) * self.range + self.min
    }

    fn invmap(&self, raw: f64) -> f64 {
        let ratio = ((raw - self.min) / self.range).clamp(0.0, 1.0);
        ratio.powf(1.0 / self.expo)
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }
}

/// Integer steps `0..=max`, each owning an equal share of the normalized range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntScale {
    max: f64,
}

impl IntScale {
    pub fn new(max: u32) -> Self {
        Self { max: max as f64 }
    }
}

impl Scale for IntScale {
    fn map(&self, normalized: f64) -> f64 {
        (normalized.clamp(0.0, 1.0) * (self.max + 1.0))
            .floor()
            .min(self.max)
    }

    fn invmap(&self, raw: f64) -> f64 {
        if self.max == 0.0 {
            return 0.0;
        }
        (raw.round() / self.max).clamp(0.0, 1.0)
    }

    fn min(&self) -> f64 {
        0.0
    }

    fn max(&self) -> f64 {
        self.max
    }
}

/// Linear in decibels, raw values are amplitudes. With `min_to_zero` the
/// bottom of the range is silence instead of `min_db`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecibelScale {
    min_db: f64,
    max_db: f64,
    range_db: f64,
    min_amp: f64,
    max_amp: f64,
    min_to_zero: bool,
}

pub fn db_to_amp(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

pub fn amp_to_db(amp: f64) -> f64 {
    20.0 * amp.log10()
}

impl DecibelScale {
    pub fn new(min_db: f64, max_db: f64, min_to_zero: bool) -> Self {
        Self {
            min_db,
            max_db,
            range_db: max_db - min_db,
            min_amp: if min_to_zero { 0.0 } else { db_to_amp(min_db) },
            max_amp: db_to_amp(max_db),
            min_to_zero,
        }
    }

    pub fn min_db(&self) -> f64 {
        self.min_db
    }

    pub fn max_db(&self) -> f64 {
        self.max_db
    }
}

impl Scale for DecibelScale {
    fn map(&self, normalized: f64) -> f64 {
        if self.min_to_zero && normalized <= 0.0 {
            return 0.0;
        }
        db_to_amp(normalized.clamp(0.0, 1.0) * self.range_db + self.min_db)
    }

    fn invmap(&self, raw: f64) -> f64 {
        if self.min_to_zero && raw <= db_to_amp(self.min_db) {
            return 0.0;
        }
        let amp = raw.clamp(db_to_amp(self.min_db), self.max_amp);
        ((amp_to_db(amp) - self.min_db) / self.range_db).clamp(0.0, 1.0)
    }

    fn min(&self) -> f64 {
        self.min_amp
    }

    fn max(&self) -> f64 {
        self.max_amp
    }
}

/// Closed set of scales a parameter store can hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleKind {
    Linear(LinearScale),
    Log(LogScale),
    Int(IntScale),
    Decibel(DecibelScale),
}

impl Scale for ScaleKind {
    fn map(&self, normalized: f64) -> f64 {
        match self {
            ScaleKind::Linear(s) => s.map(normalized),
            ScaleKind::Log(s) => s.map(normalized),
            ScaleKind::Int(s) => s.map(normalized),
            ScaleKind::Decibel(s) => s.map(normalized),
        }
    }

    fn invmap(&self, raw: f64) -> f64 {
        match self {
            ScaleKind::Linear(s) => s.invmap(raw),
            ScaleKind::Log(s) => s.invmap(raw),
            ScaleKind::Int(s) => s.invmap(raw),
            ScaleKind::Decibel(s) => s.invmap(raw),
        }
    }

    fn min(&self) -> f64 {
        match self {
            ScaleKind::Linear(s) => s.min(),
            ScaleKind::Log(s) => s.min(),
            ScaleKind::Int(s) => s.min(),
            ScaleKind::Decibel(s) => s.min(),
        }
    }

    fn max(&self) -> f64 {
        match self {
            ScaleKind::Linear(s) => s.max(),
            ScaleKind::Log(s) => s.max(),
            ScaleKind::Int(s) => s.max(),
            ScaleKind::Decibel(s) => s.max(),
        }
    }
}

impl From<LinearScale> for ScaleKind {
    fn from(s: LinearScale) -> Self {
        ScaleKind::Linear(s)
    }
}

impl From<LogScale> for ScaleKind {
    fn from(s: LogScale) -> Self {
        ScaleKind::Log(s)
    }
}

impl From<IntScale> for ScaleKind {
    fn from(s: IntScale) -> Self {
        ScaleKind::Int(s)
    }
}

impl From<DecibelScale> for ScaleKind {
    fn from(s: DecibelScale) -> Self {
        ScaleKind::Decibel(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(scale: &impl Scale, raw: f64) {
        let back = scale.map(scale.invmap(raw));
        let tolerance = 1e-9 * raw.abs().max(1.0);
        assert!(
            (back - raw).abs() <= tolerance,
            "round trip of {raw} gave {back}"
        );
    }

    #[test]
    fn linear_round_trip() {
        let scale = LinearScale::new(-12.0, 36.0);
        for raw in [-12.0, -3.5, 0.0, 17.25, 36.0] {
            assert_round_trip(&scale, raw);
        }
        assert_eq!(scale.map(0.5), 12.0);
    }

    #[test]
    fn log_scale_hits_center() {
        let scale = LogScale::new(0.0001, 16.0, 0.5, 2.0);
        assert!((scale.map(0.5) - 2.0).abs() < 1e-9);
        for raw in [0.0001, 0.01, 0.5, 2.0, 9.0, 16.0] {
            assert_round_trip(&scale, raw);
        }
    }

    #[test]
    fn log_scale_with_zero_min() {
        let scale = LogScale::new(0.0, 0.5, 0.1, 0.04);
        assert!((scale.map(0.1) - 0.04).abs() < 1e-12);
        assert_round_trip(&scale, 0.2);
    }

    #[test]
    fn int_scale_round_trip() {
        let scale = IntScale::new(15);
        for n in 0..=15 {
            let back = scale.map(scale.invmap(n as f64));
            assert_eq!(back, n as f64, "step {n}");
        }
        assert_eq!(scale.map(1.0), 15.0);
        assert_eq!(scale.map(0.0), 0.0);
    }

    #[test]
    fn bool_scale_splits_at_half() {
        let scale = IntScale::new(1);
        assert_eq!(scale.map(0.49), 0.0);
        assert_eq!(scale.map(0.5), 1.0);
    }

    #[test]
    fn decibel_scale_min_to_zero() {
        let scale = DecibelScale::new(-60.0, 0.0, true);
        assert_eq!(scale.map(0.0), 0.0);
        assert_eq!(scale.invmap(0.0), 0.0);
        assert_eq!(scale.min(), 0.0);
        assert!((scale.map(1.0) - 1.0).abs() < 1e-12);
        for raw in [0.0, 0.002, 0.1, 0.5, 1.0] {
            assert_round_trip(&scale, raw);
        }
    }

    #[test]
    fn decibel_scale_keeps_floor() {
        let scale = DecibelScale::new(-40.0, 20.0, false);
        assert!((scale.min() - 0.01).abs() < 1e-12);
        assert!(scale.map(0.0) > 0.0);
        assert_round_trip(&scale, 3.0);
    }
}

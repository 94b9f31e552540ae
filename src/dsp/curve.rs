//! Asymmetric power curve shared by the envelopes.

/// Shapes a ramp position `x` in [0, 1], pinned at (0, 0) and (1, 1).
///
/// `curve >= 0` gives `x^(curve + 1)`, slow start and fast finish.
/// `curve < 0` mirrors it, `1 - (1 - x)^(|curve| + 1)`.
pub fn power_curve(x: f32, curve: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    if curve >= 0.0 {
        x.powf(curve + 1.0)
    } else {
        1.0 - (1.0 - x).powf(1.0 - curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_pinned() {
        for curve in [-4.0, -1.0, -0.5, 0.0, 0.5, 3.0] {
            assert_eq!(power_curve(0.0, curve), 0.0, "curve {curve}");
            assert_eq!(power_curve(1.0, curve), 1.0, "curve {curve}");
        }
    }

    #[test]
    fn sign_selects_convexity() {
        assert_eq!(power_curve(0.5, 0.0), 0.5);
        assert!(power_curve(0.5, 1.0) < 0.5);
        assert!(power_curve(0.5, -1.0) > 0.5);
        assert!((power_curve(0.5, 1.0) - 0.25).abs() < 1e-7);
        assert!((power_curve(0.5, -1.0) - 0.75).abs() < 1e-7);
    }
}

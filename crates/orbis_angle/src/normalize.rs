//! Degree normalization and signed angular differences.

/// Values this close to 360° are coerced to 0° by [`normalize_degrees`].
pub const WRAP_EPSILON_DEG: f64 = 1e-9;

/// Normalize an angle to [0, 360) degrees.
///
/// Results within [`WRAP_EPSILON_DEG`] of 360 are returned as 0, so that
/// `normalize_degrees(-1e-12)` does not come back as `359.999999999999`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    if 360.0 - r < WRAP_EPSILON_DEG { 0.0 } else { r }
}

/// Signed angular difference in [-180, 180).
///
/// The input is normalized first, then values at or above 180 are folded
/// down by one turn. Exactly +180 maps to -180.
pub fn signed_delta(deg: f64) -> f64 {
    let n = normalize_degrees(deg);
    if n >= 180.0 { n - 360.0 } else { n }
}

/// Smallest unsigned angle between two directions, in [0, 180].
pub fn angular_distance(a_deg: f64, b_deg: f64) -> f64 {
    signed_delta(a_deg - b_deg).abs()
}

/// Half-angle root metric: `sin(signed_delta(delta) / 2)`.
///
/// Zero only when `delta` is a whole number of turns. The raw signed delta
/// also passes through zero magnitude-wise at the antipode (±180°) via its
/// wrap; this metric sits at ±1 there instead, so a sign flip at the
/// antipode shows up as a jump of ~2 rather than a small crossing.
pub fn half_angle_metric(delta_deg: f64) -> f64 {
    (0.5 * signed_delta(delta_deg).to_radians()).sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_zero() {
        assert!((normalize_degrees(0.0) - 0.0).abs() < 1e-15);
    }

    #[test]
    fn normalize_360_wraps() {
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
    }

    #[test]
    fn normalize_negative() {
        assert!((normalize_degrees(-10.0) - 350.0).abs() < 1e-12);
        assert!((normalize_degrees(-370.0) - 350.0).abs() < 1e-10);
    }

    #[test]
    fn normalize_tiny_negative_coerces_to_zero() {
        assert_eq!(normalize_degrees(-1e-12), 0.0);
    }

    #[test]
    fn normalize_large() {
        assert!((normalize_degrees(730.0) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn signed_delta_folds() {
        assert!((signed_delta(270.0) - (-90.0)).abs() < 1e-12);
        assert!((signed_delta(-270.0) - 90.0).abs() < 1e-12);
        assert!((signed_delta(450.0) - 90.0).abs() < 1e-12);
        assert!((signed_delta(179.5) - 179.5).abs() < 1e-12);
    }

    #[test]
    fn signed_delta_plus_180_is_minus_180() {
        assert_eq!(signed_delta(180.0), -180.0);
        assert_eq!(signed_delta(-180.0), -180.0);
    }

    #[test]
    fn angular_distance_across_zero() {
        assert!((angular_distance(359.0, 1.0) - 2.0).abs() < 1e-12);
        assert!((angular_distance(10.0, 190.0) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn half_angle_zero_only_at_coincidence() {
        assert!(half_angle_metric(0.0).abs() < 1e-15);
        assert!(half_angle_metric(360.0).abs() < 1e-15);
        assert!((half_angle_metric(180.0).abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn half_angle_sign_follows_delta() {
        assert!(half_angle_metric(10.0) > 0.0);
        assert!(half_angle_metric(-10.0) < 0.0);
        assert!(half_angle_metric(350.0) < 0.0);
    }

    proptest! {
        #[test]
        fn prop_wrap_invariance(x in -1e6..1e6f64) {
            let a = normalize_degrees(x);
            let b = normalize_degrees(x + 360.0);
            let d = (a - b).abs();
            // Either equal, or split across the 0/360 seam by float rounding.
            prop_assert!(d < 1e-6 || (360.0 - d) < 1e-6, "x={x} a={a} b={b}");
        }

        #[test]
        fn prop_normalize_range(x in -1e9..1e9f64) {
            let n = normalize_degrees(x);
            prop_assert!((0.0..360.0).contains(&n), "x={x} n={n}");
        }

        #[test]
        fn prop_signed_delta_range(x in -1e9..1e9f64) {
            let d = signed_delta(x);
            prop_assert!((-180.0..180.0).contains(&d), "x={x} d={d}");
        }

        #[test]
        fn prop_half_angle_bounded(x in -1e6..1e6f64) {
            let m = half_angle_metric(x);
            prop_assert!((-1.0..=1.0).contains(&m));
        }
    }
}

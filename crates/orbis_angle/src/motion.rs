//! Applying / separating classification for two moving longitudes.

use serde::{Deserialize, Serialize};

use crate::normalize::signed_delta;

/// Whether an angular separation is closing on, leaving, or holding at a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeMotion {
    Applying,
    Separating,
    Stationary,
}

/// Classify the motion of `separation = lon_a - lon_b` relative to `target_deg`.
///
/// `offset = signed_delta(separation - target)` and
/// `relative_speed = speed_a - speed_b` (deg/day). Offset and speed of
/// opposite sign close the gap (applying), the same sign widens it
/// (separating). Either magnitude under `tolerance` is stationary.
pub fn classify_relative_motion(
    separation_deg: f64,
    target_deg: f64,
    speed_a: f64,
    speed_b: f64,
    tolerance: f64,
) -> RelativeMotion {
    let offset = signed_delta(separation_deg - target_deg);
    let relative_speed = speed_a - speed_b;
    if offset.abs() < tolerance || relative_speed.abs() < tolerance {
        return RelativeMotion::Stationary;
    }
    if offset.signum() * relative_speed.signum() < 0.0 {
        RelativeMotion::Applying
    } else {
        RelativeMotion::Separating
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behind_and_faster_applies() {
        // a is 5° short of the trine and gaining.
        let m = classify_relative_motion(115.0, 120.0, 1.0, 0.1, 1e-6);
        assert_eq!(m, RelativeMotion::Applying);
    }

    #[test]
    fn past_and_faster_separates() {
        let m = classify_relative_motion(125.0, 120.0, 1.0, 0.1, 1e-6);
        assert_eq!(m, RelativeMotion::Separating);
    }

    #[test]
    fn past_but_retrograde_applies() {
        let m = classify_relative_motion(125.0, 120.0, -0.5, 0.0, 1e-6);
        assert_eq!(m, RelativeMotion::Applying);
    }

    #[test]
    fn wraps_across_zero() {
        // separation 358° against target 0°: offset -2°, closing with positive speed.
        let m = classify_relative_motion(358.0, 0.0, 13.0, 1.0, 1e-6);
        assert_eq!(m, RelativeMotion::Applying);
    }

    #[test]
    fn equal_speeds_are_stationary() {
        let m = classify_relative_motion(100.0, 90.0, 1.0, 1.0, 1e-6);
        assert_eq!(m, RelativeMotion::Stationary);
    }

    #[test]
    fn exact_aspect_is_stationary() {
        let m = classify_relative_motion(90.0, 90.0, 1.0, 0.0, 1e-6);
        assert_eq!(m, RelativeMotion::Stationary);
    }
}

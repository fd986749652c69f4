//! Continuity tracking for wrapped angle series.

use crate::normalize::normalize_degrees;

/// Unwraps a time-ordered series of angles into a continuous value.
///
/// Each [`update`](Self::update) normalizes the raw angle and compares it
/// with the previously recorded normalized value. A step of more than +180°
/// is read as a backward wrap through 0° and a step of less than -180° as a
/// forward wrap; the turn counter absorbs either, so the returned sequence
/// never jumps by more than 180° between calls.
///
/// Precondition: the true angular motion between two updates stays under
/// 180°. The tracker cannot detect a violation; callers pick the cadence.
///
/// ```
/// use orbis_angle::AngleTracker;
///
/// let mut t = AngleTracker::new();
/// assert_eq!(t.update(359.0), 359.0);
/// assert_eq!(t.update(1.0), 361.0);
/// assert_eq!(t.update(3.0), 363.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngleTracker {
    turn_count: i64,
    last_normalized: Option<f64>,
}

impl AngleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next raw angle (degrees) and get the unwrapped value.
    pub fn update(&mut self, raw_deg: f64) -> f64 {
        let n = normalize_degrees(raw_deg);
        if let Some(prev) = self.last_normalized {
            let delta = n - prev;
            if delta > 180.0 {
                self.turn_count -= 1;
            } else if delta < -180.0 {
                self.turn_count += 1;
            }
        }
        self.last_normalized = Some(n);
        n + 360.0 * self.turn_count as f64
    }

    /// Net number of whole turns absorbed so far (signed).
    pub fn turn_count(&self) -> i64 {
        self.turn_count
    }

    /// Last recorded normalized angle, `None` before the first update.
    pub fn last_normalized(&self) -> Option<f64> {
        self.last_normalized
    }

    /// Last unwrapped value, `None` before the first update.
    pub fn current(&self) -> Option<f64> {
        self.last_normalized
            .map(|n| n + 360.0 * self.turn_count as f64)
    }

    /// Forget all history; the next update starts a new series.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

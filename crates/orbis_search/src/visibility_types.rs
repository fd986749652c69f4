//! Types for visibility-window extraction.

use std::collections::BTreeMap;

use orbis_core::{Body, GeoLocation};
use serde::{Deserialize, Serialize};

/// Upper altitude limit on a second body (e.g. "Moon below the horizon").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondaryLimit {
    pub body: Body,
    pub max_altitude_deg: f64,
}

/// Compound predicate a visibility window must satisfy throughout.
///
/// The primary altitude floor always applies; each optional limit is
/// checked only when set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityConstraints {
    pub observer: GeoLocation,
    pub min_altitude_deg: f64,
    /// Sun must be at or below this altitude (darkness).
    pub max_solar_altitude_deg: Option<f64>,
    /// Target must be at least this far from the Sun.
    pub min_solar_separation_deg: Option<f64>,
    pub secondary: Option<SecondaryLimit>,
    /// Boundary refinement tolerance, seconds (default 60).
    pub refine_tolerance_seconds: f64,
    pub max_iterations: u32,
}

impl VisibilityConstraints {
    pub fn new(observer: GeoLocation) -> Self {
        Self {
            observer,
            min_altitude_deg: 0.0,
            max_solar_altitude_deg: None,
            min_solar_separation_deg: None,
            secondary: None,
            refine_tolerance_seconds: 60.0,
            max_iterations: 40,
        }
    }

    pub fn with_min_altitude(mut self, deg: f64) -> Self {
        self.min_altitude_deg = deg;
        self
    }

    pub fn with_max_solar_altitude(mut self, deg: f64) -> Self {
        self.max_solar_altitude_deg = Some(deg);
        self
    }

    pub fn with_min_solar_separation(mut self, deg: f64) -> Self {
        self.min_solar_separation_deg = Some(deg);
        self
    }

    pub fn with_secondary(mut self, body: Body, max_altitude_deg: f64) -> Self {
        self.secondary = Some(SecondaryLimit {
            body,
            max_altitude_deg,
        });
        self
    }

    /// Whether the Sun has to be sampled.
    pub fn needs_sun(&self) -> bool {
        self.max_solar_altitude_deg.is_some() || self.min_solar_separation_deg.is_some()
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        let altitude_ok = |a: f64| a.is_finite() && (-90.0..=90.0).contains(&a);
        if !altitude_ok(self.min_altitude_deg) {
            return Err("min_altitude_deg must be within [-90, 90]");
        }
        if self.max_solar_altitude_deg.is_some_and(|a| !altitude_ok(a)) {
            return Err("max_solar_altitude_deg must be within [-90, 90]");
        }
        if self
            .min_solar_separation_deg
            .is_some_and(|s| !s.is_finite() || !(0.0..=180.0).contains(&s))
        {
            return Err("min_solar_separation_deg must be within [0, 180]");
        }
        if self.secondary.is_some_and(|s| !altitude_ok(s.max_altitude_deg)) {
            return Err("secondary max_altitude_deg must be within [-90, 90]");
        }
        if !self.refine_tolerance_seconds.is_finite() || self.refine_tolerance_seconds <= 0.0 {
            return Err("refine_tolerance_seconds must be positive");
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be > 0");
        }
        Ok(())
    }

    /// Evaluate the predicate on one sample. A configured limit whose input
    /// is missing from the sample counts as violated.
    pub fn is_satisfied(&self, s: &ConstraintSample) -> bool {
        if s.primary_altitude_deg < self.min_altitude_deg {
            return false;
        }
        if let Some(max) = self.max_solar_altitude_deg {
            if s.solar_altitude_deg.is_none_or(|a| a > max) {
                return false;
            }
        }
        if let Some(min) = self.min_solar_separation_deg {
            if s.solar_separation_deg.is_none_or(|d| d < min) {
                return false;
            }
        }
        if let Some(limit) = self.secondary {
            if s.secondary_altitude_deg.is_none_or(|a| a > limit.max_altitude_deg) {
                return false;
            }
        }
        true
    }
}

/// Constraint inputs at one instant. Auxiliary values are present only
/// when a configured constraint needs them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSample {
    pub jd: f64,
    pub primary_altitude_deg: f64,
    pub solar_altitude_deg: Option<f64>,
    pub solar_separation_deg: Option<f64>,
    pub secondary_altitude_deg: Option<f64>,
}

impl ConstraintSample {
    pub fn new(jd: f64, primary_altitude_deg: f64) -> Self {
        Self {
            jd,
            primary_altitude_deg,
            solar_altitude_deg: None,
            solar_separation_deg: None,
            secondary_altitude_deg: None,
        }
    }

    /// Linear interpolation toward `other` at `jd`. Optional fields stay
    /// `None` unless both ends have them.
    pub fn lerp(&self, other: &Self, jd: f64) -> Self {
        let span = other.jd - self.jd;
        let w = if span == 0.0 { 0.0 } else { (jd - self.jd) / span };
        let mix = |a: f64, b: f64| a + (b - a) * w;
        let mix_opt = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => Some(mix(a, b)),
            _ => None,
        };
        Self {
            jd,
            primary_altitude_deg: mix(self.primary_altitude_deg, other.primary_altitude_deg),
            solar_altitude_deg: mix_opt(self.solar_altitude_deg, other.solar_altitude_deg),
            solar_separation_deg: mix_opt(self.solar_separation_deg, other.solar_separation_deg),
            secondary_altitude_deg: mix_opt(
                self.secondary_altitude_deg,
                other.secondary_altitude_deg,
            ),
        }
    }
}

/// A maximal interval in which the visibility predicate holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibilityWindow {
    pub start_jd: f64,
    pub end_jd: f64,
    pub duration_hours: f64,
    pub peak_altitude_deg: f64,
    pub peak_jd: f64,
    pub min_solar_separation_deg: Option<f64>,
    pub max_solar_separation_deg: Option<f64>,
    pub max_solar_altitude_deg: Option<f64>,
    pub max_secondary_altitude_deg: Option<f64>,
    /// `peak_altitude_deg + 2 × duration_hours`.
    pub score: f64,
    /// Named statistics; absent inputs stay `None`.
    pub details: BTreeMap<String, Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints() -> VisibilityConstraints {
        VisibilityConstraints::new(GeoLocation::new(30.0, 0.0, 0.0))
            .with_min_altitude(20.0)
            .with_max_solar_altitude(-12.0)
            .with_min_solar_separation(30.0)
    }

    #[test]
    fn defaults_validate() {
        let c = VisibilityConstraints::new(GeoLocation::new(0.0, 0.0, 0.0));
        assert!(c.validate().is_ok());
        assert!(!c.needs_sun());
        assert!(constraints().needs_sun());
    }

    #[test]
    fn validation_rejects_out_of_range() {
        assert!(constraints().with_min_altitude(100.0).validate().is_err());
        assert!(constraints().with_min_solar_separation(-1.0).validate().is_err());
        assert!(constraints().with_secondary(Body::Moon, f64::NAN).validate().is_err());
        let mut c = constraints();
        c.refine_tolerance_seconds = 0.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn predicate_requires_every_configured_limit() {
        let c = constraints();
        let mut s = ConstraintSample::new(0.0, 45.0);
        s.solar_altitude_deg = Some(-20.0);
        s.solar_separation_deg = Some(90.0);
        assert!(c.is_satisfied(&s));

        let mut low = s;
        low.primary_altitude_deg = 10.0;
        assert!(!c.is_satisfied(&low));

        let mut bright = s;
        bright.solar_altitude_deg = Some(-5.0);
        assert!(!c.is_satisfied(&bright));

        let mut missing = s;
        missing.solar_separation_deg = None;
        assert!(!c.is_satisfied(&missing));
    }

    #[test]
    fn lerp_interpolates_and_keeps_missing() {
        let mut a = ConstraintSample::new(0.0, 10.0);
        a.solar_altitude_deg = Some(-10.0);
        let mut b = ConstraintSample::new(1.0, 20.0);
        b.solar_altitude_deg = Some(-20.0);
        b.secondary_altitude_deg = Some(5.0);
        let m = a.lerp(&b, 0.25);
        assert_eq!(m.jd, 0.25);
        assert!((m.primary_altitude_deg - 12.5).abs() < 1e-12);
        assert!((m.solar_altitude_deg.unwrap() + 12.5).abs() < 1e-12);
        assert!(m.secondary_altitude_deg.is_none());
    }
}

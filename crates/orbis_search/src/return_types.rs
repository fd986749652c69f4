//! Types for return-instant search.

use orbis_core::{Body, TimeScale};
use serde::{Deserialize, Serialize};

use crate::bracket::Bracket;
use crate::decorate::{AspectHit, HouseCusps};

/// Precision outcome of a return search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Ok,
    /// Iteration cap reached before the requested tolerance.
    Degraded,
    NotFound,
}

/// Configuration for [`find_return_instant`](crate::find_return_instant).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnConfig {
    /// Target width of the refined bracket, seconds (default 0.5).
    pub tolerance_seconds: f64,
    /// Bisection cap (default 60).
    pub max_iterations: u32,
    /// Coarse scan step override, days. `None` derives it from the body's period.
    pub step_days: Option<f64>,
}

impl Default for ReturnConfig {
    fn default() -> Self {
        Self {
            tolerance_seconds: 0.5,
            max_iterations: 60,
            step_days: None,
        }
    }
}

impl ReturnConfig {
    pub fn with_tolerance(mut self, tolerance_seconds: f64) -> Self {
        self.tolerance_seconds = tolerance_seconds;
        self
    }

    pub fn with_step_days(mut self, step_days: f64) -> Self {
        self.step_days = Some(step_days);
        self
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.tolerance_seconds.is_finite() || self.tolerance_seconds <= 0.0 {
            return Err("tolerance_seconds must be positive");
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be > 0");
        }
        if let Some(step) = self.step_days {
            if !step.is_finite() || step <= 0.0 {
                return Err("step_days must be positive");
            }
        }
        Ok(())
    }
}

/// A located return of a body to a target longitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnInstant {
    pub body: Body,
    pub target_longitude_deg: f64,
    /// Refined instant, Julian Date in [`time_scale`](Self::time_scale).
    pub exact_jd: f64,
    /// Body longitude sampled at `exact_jd`.
    pub longitude_deg: f64,
    /// `|signed_delta(longitude - target)|` in arc-seconds.
    pub residual_arcsec: f64,
    /// Coarse bracket the refinement started from.
    pub bracket: Bracket,
    pub iterations: u32,
    /// Provider samples spent, scan plus refinement plus the residual check.
    pub evaluations: u32,
    pub requested_tolerance_seconds: f64,
    pub achieved_tolerance_seconds: f64,
    pub status: ReturnStatus,
    pub time_scale: TimeScale,
    /// `exact_jd` shifted by the scan's UTC-offset hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_jd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub houses: Option<HouseCusps>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aspects: Vec<AspectHit>,
}

/// A search window in which no return occurs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnNotFound {
    pub body: Body,
    pub target_longitude_deg: f64,
    pub window_start_jd: f64,
    pub window_end_jd: f64,
    pub evaluations: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReturnOutcome {
    Found(ReturnInstant),
    NotFound(ReturnNotFound),
}

impl ReturnOutcome {
    pub fn found(&self) -> Option<&ReturnInstant> {
        match self {
            Self::Found(r) => Some(r),
            Self::NotFound(_) => None,
        }
    }

    pub fn into_found(self) -> Option<ReturnInstant> {
        match self {
            Self::Found(r) => Some(r),
            Self::NotFound(_) => None,
        }
    }

    pub fn status(&self) -> ReturnStatus {
        match self {
            Self::Found(r) => r.status,
            Self::NotFound(_) => ReturnStatus::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ReturnConfig::default();
        assert_eq!(c.tolerance_seconds, 0.5);
        assert_eq!(c.max_iterations, 60);
        assert!(c.step_days.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ReturnConfig::default().with_tolerance(0.0).validate().is_err());
        assert!(ReturnConfig::default().with_tolerance(f64::NAN).validate().is_err());
        assert!(ReturnConfig::default().with_step_days(-1.0).validate().is_err());
        let c = ReturnConfig {
            max_iterations: 0,
            ..ReturnConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn not_found_status() {
        let o = ReturnOutcome::NotFound(ReturnNotFound {
            body: Body::Sun,
            target_longitude_deg: 0.0,
            window_start_jd: 0.0,
            window_end_jd: 1.0,
            evaluations: 3,
        });
        assert_eq!(o.status(), ReturnStatus::NotFound);
        assert!(o.found().is_none());
        assert!(o.into_found().is_none());
    }
}

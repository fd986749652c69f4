//! Types for the multi-body return scan.

use orbis_core::{Body, GeoLocation};
use serde::{Deserialize, Serialize};

use crate::return_types::ReturnConfig;

/// Natal chart the scan measures returns against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatalContext {
    /// Birth instant, in the provider's time scale.
    pub jd: f64,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    /// Natal points aspects are measured to.
    #[serde(default)]
    pub points: Vec<Body>,
}

impl NatalContext {
    pub fn new(jd: f64) -> Self {
        Self {
            jd,
            location: None,
            points: Vec::new(),
        }
    }
}

/// Minimum gap between accepted hits of the same body:
/// `max(min_days, period_fraction × period)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingPolicy {
    pub min_days: f64,
    pub period_fraction: f64,
}

impl Default for SpacingPolicy {
    fn default() -> Self {
        Self {
            min_days: 1.0,
            period_fraction: 0.1,
        }
    }
}

impl SpacingPolicy {
    pub fn spacing_days(&self, period_days: f64) -> f64 {
        self.min_days.max(self.period_fraction * period_days)
    }
}

/// Options for [`scan_returns`](crate::scan_returns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// House location; falls back to the natal location.
    pub location: Option<GeoLocation>,
    /// Harmonics whose aspects are reported. Empty disables aspects.
    pub harmonics: Vec<u32>,
    pub aspect_orb_deg: f64,
    /// Transiting bodies checked for aspects; empty uses the natal points.
    pub aspect_bodies: Vec<Body>,
    pub spacing: SpacingPolicy,
    /// Time-zone hint for `local_jd`, hours east of UTC.
    pub utc_offset_hours: Option<f64>,
    /// Provider time scale minus UT1, seconds. Used for house cusps and
    /// `local_jd`.
    pub delta_t_seconds: f64,
    pub return_config: ReturnConfig,
    /// Refined hits with a larger residual are discarded.
    pub max_residual_arcsec: f64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            location: None,
            harmonics: vec![1, 2, 3, 4, 6],
            aspect_orb_deg: 1.0,
            aspect_bodies: Vec::new(),
            spacing: SpacingPolicy::default(),
            utc_offset_hours: None,
            delta_t_seconds: 0.0,
            return_config: ReturnConfig::default(),
            max_residual_arcsec: 5.0,
        }
    }
}

impl ScanOptions {
    pub fn validate(&self) -> Result<(), &'static str> {
        self.return_config.validate()?;
        if self.harmonics.contains(&0) {
            return Err("harmonics must be positive");
        }
        if !self.aspect_orb_deg.is_finite() || self.aspect_orb_deg < 0.0 {
            return Err("aspect_orb_deg must be non-negative");
        }
        if !self.spacing.min_days.is_finite() || self.spacing.min_days < 0.0 {
            return Err("spacing.min_days must be non-negative");
        }
        if !self.spacing.period_fraction.is_finite() || self.spacing.period_fraction < 0.0 {
            return Err("spacing.period_fraction must be non-negative");
        }
        if self
            .utc_offset_hours
            .is_some_and(|h| !h.is_finite() || h.abs() > 14.0)
        {
            return Err("utc_offset_hours must be within [-14, 14]");
        }
        if !self.delta_t_seconds.is_finite() {
            return Err("delta_t_seconds must be finite");
        }
        if !self.max_residual_arcsec.is_finite() || self.max_residual_arcsec <= 0.0 {
            return Err("max_residual_arcsec must be positive");
        }
        Ok(())
    }
}

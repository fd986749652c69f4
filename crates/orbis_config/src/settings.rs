//! Settings tables and their conversion into search configs.

use std::path::Path;

use orbis_core::{Body, GeoLocation};
use orbis_search::{
    ReturnConfig, RiseSetConfig, ScanOptions, SecondaryLimit, SpacingPolicy, VisibilityConstraints,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default LRU capacity for the position cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub returns: ReturnConfig,
    pub rise_set: RiseSetConfig,
    pub visibility: VisibilitySettings,
    /// Default observer for horizon searches and scan houses.
    pub observer: Option<GeoLocation>,
    pub cache: CacheSettings,
    pub scan: ScanSettings,
}

/// `[visibility]`: constraint defaults; the observer comes from `[observer]`
/// or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilitySettings {
    pub min_altitude_deg: f64,
    pub max_solar_altitude_deg: Option<f64>,
    pub min_solar_separation_deg: Option<f64>,
    pub secondary: Option<SecondaryLimit>,
    /// Sampling step, minutes.
    pub step_minutes: f64,
    pub refine_tolerance_seconds: f64,
    pub max_iterations: u32,
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        Self {
            min_altitude_deg: 0.0,
            max_solar_altitude_deg: None,
            min_solar_separation_deg: None,
            secondary: None,
            step_minutes: 10.0,
            refine_tolerance_seconds: 60.0,
            max_iterations: 40,
        }
    }
}

impl VisibilitySettings {
    pub fn step_days(&self) -> f64 {
        self.step_minutes / 1440.0
    }

    pub fn constraints(&self, observer: GeoLocation) -> VisibilityConstraints {
        VisibilityConstraints {
            observer,
            min_altitude_deg: self.min_altitude_deg,
            max_solar_altitude_deg: self.max_solar_altitude_deg,
            min_solar_separation_deg: self.min_solar_separation_deg,
            secondary: self.secondary,
            refine_tolerance_seconds: self.refine_tolerance_seconds,
            max_iterations: self.max_iterations,
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.step_minutes.is_finite() || self.step_minutes <= 0.0 {
            return Err("step_minutes must be positive");
        }
        // The observer is checked separately; any valid one will do here.
        self.constraints(GeoLocation::new(0.0, 0.0, 0.0)).validate()
    }
}

/// `[cache]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// `[scan]`: decoration and filtering defaults for the return scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub bodies: Vec<Body>,
    pub harmonics: Vec<u32>,
    pub aspect_orb_deg: f64,
    pub aspect_bodies: Vec<Body>,
    pub spacing: SpacingPolicy,
    pub utc_offset_hours: Option<f64>,
    pub max_residual_arcsec: f64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        let options = ScanOptions::default();
        Self {
            bodies: vec![Body::Sun, Body::Moon],
            harmonics: options.harmonics,
            aspect_orb_deg: options.aspect_orb_deg,
            aspect_bodies: options.aspect_bodies,
            spacing: options.spacing,
            utc_offset_hours: options.utc_offset_hours,
            max_residual_arcsec: options.max_residual_arcsec,
        }
    }
}

impl Settings {
    /// Read and validate a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.returns
            .validate()
            .map_err(ConfigError::invalid("returns"))?;
        self.rise_set
            .validate()
            .map_err(ConfigError::invalid("rise_set"))?;
        self.visibility
            .validate()
            .map_err(ConfigError::invalid("visibility"))?;
        if let Some(observer) = &self.observer {
            observer.validate().map_err(ConfigError::invalid("observer"))?;
        }
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(ConfigError::Invalid {
                section: "cache",
                reason: "capacity must be > 0 when the cache is enabled",
            });
        }
        self.scan_options()
            .validate()
            .map_err(ConfigError::invalid("scan"))?;
        Ok(())
    }

    /// Scan options from `[scan]`, `[returns]`, and `[observer]`.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            location: self.observer,
            harmonics: self.scan.harmonics.clone(),
            aspect_orb_deg: self.scan.aspect_orb_deg,
            aspect_bodies: self.scan.aspect_bodies.clone(),
            spacing: self.scan.spacing,
            utc_offset_hours: self.scan.utc_offset_hours,
            delta_t_seconds: 0.0,
            return_config: self.returns,
            max_residual_arcsec: self.scan.max_residual_arcsec,
        }
    }

    /// Visibility constraints for `observer`, or the configured observer.
    pub fn visibility_constraints(
        &self,
        observer: Option<GeoLocation>,
    ) -> Option<VisibilityConstraints> {
        observer
            .or(self.observer)
            .map(|o| self.visibility.constraints(o))
    }
}

//! Types for rise/set and transit search.

use serde::{Deserialize, Serialize};

use crate::bracket::RefineStatus;

/// Solar horizon events, including twilight variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonEvent {
    /// Upper limb at the horizon: Sun center at -50'.
    Sunrise,
    Sunset,
    /// Sun center at -6°.
    CivilDawn,
    CivilDusk,
    /// Sun center at -12°.
    NauticalDawn,
    NauticalDusk,
    /// Sun center at -18°.
    AstronomicalDawn,
    AstronomicalDusk,
}

impl HorizonEvent {
    /// Altitude of the Sun's center at the event, degrees.
    pub fn altitude_deg(self) -> f64 {
        match self {
            Self::Sunrise | Self::Sunset => -50.0 / 60.0,
            Self::CivilDawn | Self::CivilDusk => -6.0,
            Self::NauticalDawn | Self::NauticalDusk => -12.0,
            Self::AstronomicalDawn | Self::AstronomicalDusk => -18.0,
        }
    }

    /// Dawn-side events happen while the Sun climbs.
    pub fn is_rising(self) -> bool {
        matches!(
            self,
            Self::Sunrise | Self::CivilDawn | Self::NauticalDawn | Self::AstronomicalDawn
        )
    }
}

/// Configuration for [`find_rise_set`](crate::find_rise_set) and
/// [`find_transit`](crate::find_transit).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiseSetConfig {
    /// Altitude threshold override, degrees. `None` uses the body's
    /// standard altitude.
    pub threshold_altitude_deg: Option<f64>,
    /// Coarse scan step, minutes (default 10).
    pub step_minutes: f64,
    /// Refinement tolerance, seconds (default 1).
    pub tolerance_seconds: f64,
    pub max_iterations: u32,
}

impl Default for RiseSetConfig {
    fn default() -> Self {
        Self {
            threshold_altitude_deg: None,
            step_minutes: 10.0,
            tolerance_seconds: 1.0,
            max_iterations: 60,
        }
    }
}

impl RiseSetConfig {
    /// Default config with the threshold of a solar horizon event.
    pub fn for_event(event: HorizonEvent) -> Self {
        Self {
            threshold_altitude_deg: Some(event.altitude_deg()),
            ..Self::default()
        }
    }

    pub fn step_days(&self) -> f64 {
        self.step_minutes / 1440.0
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.step_minutes.is_finite() || self.step_minutes <= 0.0 {
            return Err("step_minutes must be positive");
        }
        if self.step_minutes > 720.0 {
            return Err("step_minutes must not exceed half a day");
        }
        if !self.tolerance_seconds.is_finite() || self.tolerance_seconds <= 0.0 {
            return Err("tolerance_seconds must be positive");
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be > 0");
        }
        if let Some(t) = self.threshold_altitude_deg {
            if !t.is_finite() || !(-90.0..=90.0).contains(&t) {
                return Err("threshold_altitude_deg must be within [-90, 90]");
            }
        }
        Ok(())
    }
}

/// How the body behaved against the threshold over the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCondition {
    Normal,
    /// Above the threshold at every sample (polar day).
    AlwaysAbove,
    /// Below the threshold at every sample (polar night).
    AlwaysBelow,
}

/// First rise and first set within one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiseSetEvents {
    pub rise_jd: Option<f64>,
    pub set_jd: Option<f64>,
    pub condition: DayCondition,
    /// Threshold actually used, degrees.
    pub threshold_altitude_deg: f64,
}

impl RiseSetEvents {
    /// The crossing `event` refers to: the rise for dawn-side events, the
    /// set otherwise.
    pub fn instant_of(&self, event: HorizonEvent) -> Option<f64> {
        if event.is_rising() {
            self.rise_jd
        } else {
            self.set_jd
        }
    }
}

/// Upper culmination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitEvent {
    pub jd: f64,
    pub altitude_deg: f64,
    pub status: RefineStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twilight_altitudes() {
        assert!((HorizonEvent::Sunrise.altitude_deg() + 0.8333).abs() < 1e-3);
        assert_eq!(HorizonEvent::CivilDusk.altitude_deg(), -6.0);
        assert_eq!(HorizonEvent::NauticalDawn.altitude_deg(), -12.0);
        assert_eq!(HorizonEvent::AstronomicalDusk.altitude_deg(), -18.0);
    }

    #[test]
    fn rising_events() {
        assert!(HorizonEvent::Sunrise.is_rising());
        assert!(HorizonEvent::AstronomicalDawn.is_rising());
        assert!(!HorizonEvent::Sunset.is_rising());
        assert!(!HorizonEvent::CivilDusk.is_rising());

        let events = RiseSetEvents {
            rise_jd: Some(10.25),
            set_jd: Some(10.75),
            condition: DayCondition::Normal,
            threshold_altitude_deg: -6.0,
        };
        assert_eq!(events.instant_of(HorizonEvent::CivilDawn), Some(10.25));
        assert_eq!(events.instant_of(HorizonEvent::CivilDusk), Some(10.75));
    }

    #[test]
    fn config_defaults_and_validation() {
        let c = RiseSetConfig::default();
        assert!(c.validate().is_ok());
        assert!((c.step_days() - 10.0 / 1440.0).abs() < 1e-15);
        let civil = RiseSetConfig::for_event(HorizonEvent::CivilDawn);
        assert_eq!(civil.threshold_altitude_deg, Some(-6.0));

        let mut bad = c;
        bad.step_minutes = 0.0;
        assert!(bad.validate().is_err());
        let mut bad = c;
        bad.threshold_altitude_deg = Some(95.0);
        assert!(bad.validate().is_err());
        let mut bad = c;
        bad.max_iterations = 0;
        assert!(bad.validate().is_err());
    }
}

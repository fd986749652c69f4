//! Position samples, time windows, and time-scale provenance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Equatorial direction of date (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equatorial {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

/// One provider answer: where a body is at a given epoch.
///
/// Longitudes and latitudes are ecliptic, in degrees. Speed and equatorial
/// coordinates are optional; horizon work needs the latter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularSample {
    pub jd: f64,
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub speed_deg_per_day: Option<f64>,
    pub equatorial: Option<Equatorial>,
}

impl AngularSample {
    pub fn new(jd: f64, longitude_deg: f64) -> Self {
        Self {
            jd,
            longitude_deg,
            latitude_deg: 0.0,
            speed_deg_per_day: None,
            equatorial: None,
        }
    }

    pub fn with_latitude(mut self, latitude_deg: f64) -> Self {
        self.latitude_deg = latitude_deg;
        self
    }

    pub fn with_speed(mut self, speed_deg_per_day: f64) -> Self {
        self.speed_deg_per_day = Some(speed_deg_per_day);
        self
    }

    pub fn with_equatorial(mut self, equatorial: Equatorial) -> Self {
        self.equatorial = Some(equatorial);
        self
    }
}

/// Time scale a provider's Julian Dates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeScale {
    #[default]
    Tdb,
    Tt,
    Ut1,
    Utc,
}

/// Rejected window bounds.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid time window: start {start} must be finite and before end {end}")]
pub struct InvalidWindow {
    pub start: f64,
    pub end: f64,
}

/// Closed search interval `[start, end]` in Julian Dates, `end > start`.
///
/// Fields are private so the ordering invariant holds for every value;
/// derived windows are new values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeWindow {
    start: f64,
    end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Result<Self, InvalidWindow> {
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window of `days` length beginning at `start`.
    pub fn from_duration(start: f64, days: f64) -> Result<Self, InvalidWindow> {
        Self::new(start, start + days)
    }

    /// Window of `half_width_days` either side of `center`.
    pub fn around(center: f64, half_width_days: f64) -> Result<Self, InvalidWindow> {
        Self::new(center - half_width_days, center + half_width_days)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration_days(&self) -> f64 {
        self.end - self.start
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_days() * crate::julian::SECONDS_PER_DAY
    }

    /// Inclusive on both ends.
    pub fn contains(&self, jd: f64) -> bool {
        jd >= self.start && jd <= self.end
    }

    /// Widen both ends by `margin_days` (negative margins are ignored).
    pub fn expanded(&self, margin_days: f64) -> Self {
        let m = margin_days.max(0.0);
        Self {
            start: self.start - m,
            end: self.end + m,
        }
    }

    /// Remainder of this window from `jd` on; `None` when nothing is left.
    pub fn starting_at(&self, jd: f64) -> Option<Self> {
        let start = jd.max(self.start);
        if start < self.end {
            Some(Self {
                start,
                end: self.end,
            })
        } else {
            None
        }
    }

    /// Overlap of two windows, `None` when they are disjoint or touch.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        Self::new(self.start.max(other.start), self.end.min(other.end)).ok()
    }
}

//! Synthetic constant-rate provider.
//!
//! Every body moves along the ecliptic at a fixed rate from a fixed
//! epoch, so return instants, periods, and horizon geometry are known in
//! closed form. Used by the integration tests, benches, and CLI demos.

use std::collections::HashMap;

use orbis_angle::normalize_degrees;

use crate::body::Body;
use crate::horizon::{OBLIQUITY_J2000_DEG, ecliptic_to_equatorial};
use crate::provider::{Provider, ProviderError};
use crate::sample::{AngularSample, TimeScale};

/// `longitude(t) = longitude_deg + speed_deg_per_day · (t − epoch_jd)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrack {
    pub epoch_jd: f64,
    pub longitude_deg: f64,
    pub speed_deg_per_day: f64,
    pub latitude_deg: f64,
}

impl LinearTrack {
    pub fn new(epoch_jd: f64, longitude_deg: f64, speed_deg_per_day: f64) -> Self {
        Self {
            epoch_jd,
            longitude_deg,
            speed_deg_per_day,
            latitude_deg: 0.0,
        }
    }

    pub fn with_latitude(mut self, latitude_deg: f64) -> Self {
        self.latitude_deg = latitude_deg;
        self
    }

    pub fn longitude_at(&self, jd: f64) -> f64 {
        normalize_degrees(self.longitude_deg + self.speed_deg_per_day * (jd - self.epoch_jd))
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinearProvider {
    tracks: HashMap<Body, LinearTrack>,
    time_scale: TimeScale,
}

impl LinearProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, body: Body, track: LinearTrack) -> Self {
        self.tracks.insert(body, track);
        self
    }

    pub fn with_time_scale(mut self, time_scale: TimeScale) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn insert(&mut self, body: Body, track: LinearTrack) {
        self.tracks.insert(body, track);
    }

    pub fn track(&self, body: Body) -> Option<&LinearTrack> {
        self.tracks.get(&body)
    }
}

impl Provider for LinearProvider {
    fn sample(&self, body: Body, jd: f64) -> Result<AngularSample, ProviderError> {
        if !jd.is_finite() {
            return Err(ProviderError::InvalidQuery("epoch must be finite"));
        }
        let track = self
            .tracks
            .get(&body)
            .ok_or(ProviderError::UnsupportedBody(body))?;
        let lon = track.longitude_at(jd);
        let eq = ecliptic_to_equatorial(lon, track.latitude_deg, OBLIQUITY_J2000_DEG);
        Ok(AngularSample::new(jd, lon)
            .with_latitude(track.latitude_deg)
            .with_speed(track.speed_deg_per_day)
            .with_equatorial(eq))
    }

    fn supports(&self, body: Body) -> bool {
        self.tracks.contains_key(&body)
    }

    /// One full turn at the track's rate; the body table for stationary tracks.
    fn mean_period_days(&self, body: Body) -> Option<f64> {
        match self.tracks.get(&body) {
            Some(t) if t.speed_deg_per_day.abs() > 1e-12 => Some(360.0 / t.speed_deg_per_day.abs()),
            _ => body.mean_period_days(),
        }
    }

    fn time_scale(&self) -> TimeScale {
        self.time_scale
    }
}

//! Per-hit decoration collaborators: houses and aspects.
//!
//! The scan orchestrator only calls these through their traits; the
//! implementations here (equal houses, harmonic aspects) are the defaults
//! used by [`scan_returns`](crate::scan_returns).

use orbis_angle::{RelativeMotion, classify_relative_motion, normalize_degrees, signed_delta};
use orbis_core::{Body, GeoLocation, OBLIQUITY_J2000_DEG, SECONDS_PER_DAY, gmst_deg};
use serde::Serialize;

use crate::error::SearchError;

/// Speeds below this (deg/day) count as stationary when classifying aspects.
const MOTION_TOLERANCE: f64 = 1e-6;

/// House cusps at an instant and place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HouseCusps {
    pub ascendant_deg: f64,
    pub midheaven_deg: f64,
    /// Cusps of houses 1..=12, degrees [0, 360).
    pub cusps_deg: [f64; 12],
}

/// Ecliptic position used for aspect matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyPosition {
    pub body: Body,
    pub longitude_deg: f64,
    pub speed_deg_per_day: Option<f64>,
}

/// A transiting body within orb of an aspect to a natal point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AspectHit {
    pub transiting: Body,
    pub natal: Body,
    /// Lowest harmonic producing this aspect angle.
    pub harmonic: u32,
    pub aspect_angle_deg: f64,
    /// Distance from exact, degrees.
    pub orb_deg: f64,
    pub motion: RelativeMotion,
}

pub trait HouseCalculator: Send + Sync {
    fn houses(&self, jd: f64, location: &GeoLocation) -> Result<HouseCusps, SearchError>;
}

pub trait AspectCalculator: Send + Sync {
    fn aspects(&self, transiting: &[BodyPosition], natal: &[BodyPosition]) -> Vec<AspectHit>;
}

/// Optional collaborators for [`scan_returns_with`](crate::scan_returns_with).
#[derive(Clone, Copy, Default)]
pub struct Decorators<'a> {
    pub houses: Option<&'a dyn HouseCalculator>,
    pub aspects: Option<&'a dyn AspectCalculator>,
}

// ---------------------------------------------------------------------------
// Equal houses
// ---------------------------------------------------------------------------

/// Equal houses from the ascendant, using mean sidereal time and a fixed
/// obliquity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqualHouses {
    pub obliquity_deg: f64,
    /// Epoch scale minus UT1, seconds.
    pub delta_t_seconds: f64,
}

impl Default for EqualHouses {
    fn default() -> Self {
        Self {
            obliquity_deg: OBLIQUITY_J2000_DEG,
            delta_t_seconds: 0.0,
        }
    }
}

impl EqualHouses {
    /// Ascendant and midheaven for a local sidereal time (RAMC), degrees.
    pub fn angles(&self, ramc_deg: f64, latitude_deg: f64) -> (f64, f64) {
        let (st, ct) = ramc_deg.to_radians().sin_cos();
        let (se, ce) = self.obliquity_deg.to_radians().sin_cos();
        let tan_phi = latitude_deg.to_radians().tan();
        let mc = st.atan2(ct * ce);
        let asc = ct.atan2(-(st * ce + tan_phi * se));
        (
            normalize_degrees(asc.to_degrees()),
            normalize_degrees(mc.to_degrees()),
        )
    }
}

impl HouseCalculator for EqualHouses {
    fn houses(&self, jd: f64, location: &GeoLocation) -> Result<HouseCusps, SearchError> {
        location.validate().map_err(SearchError::InvalidLocation)?;
        if location.latitude_deg.abs() >= 90.0 {
            return Err(SearchError::InvalidLocation(
                "houses are undefined at the poles",
            ));
        }
        let jd_ut1 = jd - self.delta_t_seconds / SECONDS_PER_DAY;
        let ramc = normalize_degrees(gmst_deg(jd_ut1) + location.longitude_deg);
        let (asc, mc) = self.angles(ramc, location.latitude_deg);
        let mut cusps_deg = [0.0; 12];
        for (i, c) in cusps_deg.iter_mut().enumerate() {
            *c = normalize_degrees(asc + 30.0 * i as f64);
        }
        Ok(HouseCusps {
            ascendant_deg: asc,
            midheaven_deg: mc,
            cusps_deg,
        })
    }
}

// ---------------------------------------------------------------------------
// Harmonic aspects
// ---------------------------------------------------------------------------

/// Aspects at multiples of `360 / h` for each harmonic `h`.
///
/// Harmonic 1 is the conjunction, 2 adds the opposition, 3 the trine, 4
/// the square, 6 the sextile. An angle reachable from several harmonics
/// is reported once, under the lowest.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicAspects {
    pub harmonics: Vec<u32>,
    pub orb_deg: f64,
}

impl Default for HarmonicAspects {
    fn default() -> Self {
        Self {
            harmonics: vec![1, 2, 3, 4, 6],
            orb_deg: 1.0,
        }
    }
}

impl HarmonicAspects {
    pub fn new(harmonics: Vec<u32>, orb_deg: f64) -> Self {
        Self { harmonics, orb_deg }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.harmonics.contains(&0) {
            return Err("harmonics must be positive");
        }
        if !self.orb_deg.is_finite() || self.orb_deg < 0.0 {
            return Err("aspect orb must be non-negative");
        }
        Ok(())
    }

    /// Distinct aspect angles in [0, 180] with the harmonic that first yields each.
    fn angles(&self) -> Vec<(u32, f64)> {
        let mut harmonics = self.harmonics.clone();
        harmonics.sort_unstable();
        harmonics.dedup();
        let mut out: Vec<(u32, f64)> = Vec::new();
        for h in harmonics.into_iter().filter(|&h| h > 0) {
            for k in 0..=h / 2 {
                let angle = 360.0 * f64::from(k) / f64::from(h);
                if !out.iter().any(|(_, a)| (a - angle).abs() < 1e-9) {
                    out.push((h, angle));
                }
            }
        }
        out
    }
}

impl AspectCalculator for HarmonicAspects {
    fn aspects(&self, transiting: &[BodyPosition], natal: &[BodyPosition]) -> Vec<AspectHit> {
        let angles = self.angles();
        let mut hits = Vec::new();
        for t in transiting {
            for n in natal {
                let separation = signed_delta(t.longitude_deg - n.longitude_deg);
                let distance = separation.abs();
                for &(harmonic, angle) in &angles {
                    let orb = (distance - angle).abs();
                    if orb > self.orb_deg {
                        continue;
                    }
                    let target = if separation < 0.0 { -angle } else { angle };
                    let motion = classify_relative_motion(
                        separation,
                        target,
                        t.speed_deg_per_day.unwrap_or(0.0),
                        0.0,
                        MOTION_TOLERANCE,
                    );
                    hits.push(AspectHit {
                        transiting: t.body,
                        natal: n.body,
                        harmonic,
                        aspect_angle_deg: angle,
                        orb_deg: orb,
                        motion,
                    });
                }
            }
        }
        hits
    }
}

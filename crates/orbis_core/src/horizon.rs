//! Observer location, sidereal time, and the horizon-coordinate collaborator.

use std::f64::consts::TAU;

use orbis_angle::{normalize_degrees, signed_delta};
use serde::{Deserialize, Serialize};

use crate::julian::{J2000_JD, SECONDS_PER_DAY};
use crate::sample::Equatorial;

/// Mean obliquity of the ecliptic at J2000.0 (IAU 2006), degrees.
pub const OBLIQUITY_J2000_DEG: f64 = 23.439_279_444;

const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / 648_000.0;

/// Geographic location on Earth's surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Geodetic latitude in degrees, north positive. Range: [-90, 90].
    pub latitude_deg: f64,
    /// Geodetic longitude in degrees, east positive. Range: [-180, 180].
    pub longitude_deg: f64,
    /// Altitude above mean sea level in meters.
    #[serde(default)]
    pub altitude_m: f64,
}

impl GeoLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    pub fn latitude_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    /// Longitude in radians (east positive).
    pub fn longitude_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.latitude_deg.is_finite() || !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err("latitude must be within [-90, 90] degrees");
        }
        if !self.longitude_deg.is_finite() || !(-180.0..=180.0).contains(&self.longitude_deg) {
            return Err("longitude must be within [-180, 180] degrees");
        }
        if !self.altitude_m.is_finite() {
            return Err("altitude must be finite");
        }
        Ok(())
    }
}

/// Local horizon direction of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Horizontal {
    pub altitude_deg: f64,
    /// Azimuth from north through east, [0, 360).
    pub azimuth_deg: f64,
    /// Local hour angle in [-180, 180); negative east of the meridian.
    pub hour_angle_deg: f64,
}

/// Converts an equatorial direction to horizon coordinates for an observer.
pub trait HorizonTransform: Send + Sync {
    fn to_horizontal(&self, jd: f64, location: &GeoLocation, eq: &Equatorial) -> Horizontal;
}

/// Greenwich Mean Sidereal Time at a UT1 Julian Date, degrees in [0, 360).
///
/// ERA plus the Capitaine et al. 2003 polynomial (arcseconds):
/// `0.014506 + 4612.156534·T + 1.3915817·T² − 0.00000044·T³`
/// `− 0.000029956·T⁴ − 0.0000000368·T⁵`.
pub fn gmst_deg(jd_ut1: f64) -> f64 {
    let du = jd_ut1 - J2000_JD;
    let era = TAU * (0.779_057_273_264_0 + 1.002_737_811_911_354_6 * du);
    let t = du / 36525.0;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;
    let poly_arcsec = 0.014506 + 4612.156534 * t + 1.3915817 * t2
        - 0.00000044 * t3
        - 0.000029956 * t4
        - 0.0000000368 * t5;
    normalize_degrees((era + poly_arcsec * ARCSEC_TO_RAD).to_degrees())
}

/// Rotate ecliptic (lon, lat) to equatorial (RA, Dec) for a given obliquity.
pub fn ecliptic_to_equatorial(lon_deg: f64, lat_deg: f64, obliquity_deg: f64) -> Equatorial {
    let (sl, cl) = lon_deg.to_radians().sin_cos();
    let (sb, cb) = lat_deg.to_radians().sin_cos();
    let (se, ce) = obliquity_deg.to_radians().sin_cos();
    let sin_dec = sb * ce + cb * se * sl;
    let ra = (sl * cb * ce - sb * se).atan2(cl * cb);
    Equatorial {
        ra_deg: normalize_degrees(ra.to_degrees()),
        dec_deg: sin_dec.clamp(-1.0, 1.0).asin().to_degrees(),
    }
}

/// Great-circle separation of two equatorial directions, degrees in [0, 180].
pub fn angular_separation_deg(a: &Equatorial, b: &Equatorial) -> f64 {
    let (s1, c1) = a.dec_deg.to_radians().sin_cos();
    let (s2, c2) = b.dec_deg.to_radians().sin_cos();
    let (sd, cd) = (b.ra_deg - a.ra_deg).to_radians().sin_cos();
    // Vincenty form, stable near 0 and 180.
    let x = c2 * sd;
    let y = c1 * s2 - s1 * c2 * cd;
    let z = s1 * s2 + c1 * c2 * cd;
    x.hypot(y).atan2(z).to_degrees()
}

/// Mean-sidereal horizon transform.
///
/// Provider epochs are shifted by `delta_t_seconds` (provider scale minus
/// UT1) before the sidereal time is taken; zero treats them as UT1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SiderealHorizon {
    pub delta_t_seconds: f64,
}

impl SiderealHorizon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delta_t(delta_t_seconds: f64) -> Self {
        Self { delta_t_seconds }
    }

    /// Local hour angle of a right ascension, degrees in [-180, 180).
    pub fn hour_angle_deg(&self, jd: f64, location: &GeoLocation, ra_deg: f64) -> f64 {
        let jd_ut1 = jd - self.delta_t_seconds / SECONDS_PER_DAY;
        let lst = gmst_deg(jd_ut1) + location.longitude_deg;
        signed_delta(lst - ra_deg)
    }
}

impl HorizonTransform for SiderealHorizon {
    fn to_horizontal(&self, jd: f64, location: &GeoLocation, eq: &Equatorial) -> Horizontal {
        let ha = self.hour_angle_deg(jd, location, eq.ra_deg);
        let (sh, ch) = ha.to_radians().sin_cos();
        let (sd, cd) = eq.dec_deg.to_radians().sin_cos();
        let (sp, cp) = location.latitude_rad().sin_cos();

        let sin_alt = (sp * sd + cp * cd * ch).clamp(-1.0, 1.0);
        let az = (-cd * sh).atan2(sd * cp - cd * ch * sp);
        Horizontal {
            altitude_deg: sin_alt.asin().to_degrees(),
            azimuth_deg: normalize_degrees(az.to_degrees()),
            hour_angle_deg: ha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gmst_j2000_midnight() {
        // 2000-Jan-01 0h UT1: GMST ≈ 6h 39m 51s ≈ 99.97°.
        let g = gmst_deg(2_451_544.5);
        assert!((g - 99.97).abs() < 0.1, "gmst = {g}");
    }

    #[test]
    fn gmst_advances_about_a_degree_per_day() {
        let d = signed_delta(gmst_deg(2_451_546.0) - gmst_deg(2_451_545.0));
        assert!((d - 0.9856).abs() < 1e-3, "daily advance = {d}");
    }

    #[test]
    fn location_validation() {
        assert!(GeoLocation::new(51.5, -0.1, 10.0).validate().is_ok());
        assert!(GeoLocation::new(91.0, 0.0, 0.0).validate().is_err());
        assert!(GeoLocation::new(0.0, 181.0, 0.0).validate().is_err());
        assert!(GeoLocation::new(f64::NAN, 0.0, 0.0).validate().is_err());
    }

    #[test]
    fn ecliptic_cardinal_points() {
        let e = OBLIQUITY_J2000_DEG;
        let eq0 = ecliptic_to_equatorial(0.0, 0.0, e);
        assert!(eq0.ra_deg.abs() < 1e-9 && eq0.dec_deg.abs() < 1e-9);
        let eq90 = ecliptic_to_equatorial(90.0, 0.0, e);
        assert!((eq90.ra_deg - 90.0).abs() < 1e-9);
        assert!((eq90.dec_deg - e).abs() < 1e-9);
        let eq270 = ecliptic_to_equatorial(270.0, 0.0, e);
        assert!((eq270.dec_deg + e).abs() < 1e-9);
    }

    #[test]
    fn separation_basics() {
        let a = Equatorial { ra_deg: 10.0, dec_deg: 0.0 };
        let b = Equatorial { ra_deg: 40.0, dec_deg: 0.0 };
        assert!((angular_separation_deg(&a, &b) - 30.0).abs() < 1e-9);
        let pole = Equatorial { ra_deg: 123.0, dec_deg: 90.0 };
        assert!((angular_separation_deg(&a, &pole) - 90.0).abs() < 1e-9);
        assert!(angular_separation_deg(&a, &a).abs() < 1e-12);
    }

    #[test]
    fn body_on_meridian_culminates() {
        let t = SiderealHorizon::new();
        let loc = GeoLocation::new(40.0, 0.0, 0.0);
        let jd = 2_451_545.0;
        let ra = gmst_deg(jd);
        let h = t.to_horizontal(jd, &loc, &Equatorial { ra_deg: ra, dec_deg: 10.0 });
        assert!(h.hour_angle_deg.abs() < 1e-9);
        // Upper culmination altitude = 90 - |lat - dec|.
        assert!((h.altitude_deg - 60.0).abs() < 1e-9);
        assert!((h.azimuth_deg - 180.0).abs() < 1e-6);
    }

    #[test]
    fn pole_star_altitude_equals_latitude() {
        let t = SiderealHorizon::new();
        let loc = GeoLocation::new(35.0, 20.0, 0.0);
        let pole = Equatorial { ra_deg: 0.0, dec_deg: 90.0 };
        for k in 0..6 {
            let h = t.to_horizontal(2_451_545.0 + k as f64 * 0.17, &loc, &pole);
            assert!((h.altitude_deg - 35.0).abs() < 1e-9);
        }
    }

    #[test]
    fn east_of_meridian_has_negative_hour_angle() {
        let t = SiderealHorizon::new();
        let loc = GeoLocation::new(0.0, 0.0, 0.0);
        let jd = 2_451_545.0;
        let ra = normalize_degrees(gmst_deg(jd) + 30.0);
        let h = t.to_horizontal(jd, &loc, &Equatorial { ra_deg: ra, dec_deg: 0.0 });
        assert!((h.hour_angle_deg + 30.0).abs() < 1e-9);
        assert!((h.azimuth_deg - 90.0).abs() < 1e-6);
        assert!((h.altitude_deg - 60.0).abs() < 1e-9);
    }
}

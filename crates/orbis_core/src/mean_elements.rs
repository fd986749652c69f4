//! Low-precision analytic Sun and Moon.
//!
//! Truncated Meeus series: the Sun is good to about 0.01°, the Moon to a
//! few hundredths of a degree in longitude. Enough to drive the CLI and
//! golden-date tests without an ephemeris kernel. Epochs are TT.

use orbis_angle::{normalize_degrees, signed_delta};

use crate::body::Body;
use crate::horizon::ecliptic_to_equatorial;
use crate::julian::J2000_JD;
use crate::provider::{Provider, ProviderError};
use crate::sample::{AngularSample, TimeScale};

/// Half-width of the central difference used for speeds, days.
const SPEED_STEP_DAYS: f64 = 0.01;

/// Validity span of the truncated series: ±2000 years around J2000.
const MAX_CENTURIES: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct MeanElementsProvider;

impl MeanElementsProvider {
    pub fn new() -> Self {
        Self
    }
}

fn centuries(jd: f64) -> f64 {
    (jd - J2000_JD) / 36525.0
}

fn sin_deg(x: f64) -> f64 {
    x.to_radians().sin()
}

/// Mean obliquity of date (degrees), Meeus 22.2 truncated.
fn mean_obliquity_deg(t: f64) -> f64 {
    23.439_291_1 - 0.013_004_2 * t - 1.64e-7 * t * t
}

/// Apparent geocentric ecliptic longitude of the Sun.
fn sun_longitude(t: f64) -> f64 {
    let l0 = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let m = 357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t;
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * sin_deg(m)
        + (0.019_993 - 0.000_101 * t) * sin_deg(2.0 * m)
        + 0.000_289 * sin_deg(3.0 * m);
    let omega = 125.04 - 1_934.136 * t;
    normalize_degrees(l0 + c - 0.005_69 - 0.004_78 * sin_deg(omega))
}

/// Geocentric ecliptic longitude and latitude of the Moon.
fn moon_position(t: f64) -> (f64, f64) {
    let lp = 218.316_447_7 + 481_267.881_234_21 * t;
    let d = 297.850_192_1 + 445_267.111_403_4 * t;
    let m = 357.529_109_2 + 35_999.050_290_9 * t;
    let mp = 134.963_396_4 + 477_198.867_505_5 * t;
    let f = 93.272_095_0 + 483_202.017_523_3 * t;

    let lon = lp
        + 6.288_774 * sin_deg(mp)
        + 1.274_027 * sin_deg(2.0 * d - mp)
        + 0.658_314 * sin_deg(2.0 * d)
        + 0.213_618 * sin_deg(2.0 * mp)
        - 0.185_116 * sin_deg(m)
        - 0.114_332 * sin_deg(2.0 * f)
        + 0.058_793 * sin_deg(2.0 * d - 2.0 * mp)
        + 0.057_066 * sin_deg(2.0 * d - m - mp)
        + 0.053_322 * sin_deg(2.0 * d + mp)
        + 0.045_758 * sin_deg(2.0 * d - m)
        - 0.040_923 * sin_deg(m - mp)
        - 0.034_720 * sin_deg(d)
        - 0.030_383 * sin_deg(m + mp);

    let lat = 5.128_122 * sin_deg(f)
        + 0.280_602 * sin_deg(mp + f)
        + 0.277_693 * sin_deg(mp - f)
        + 0.173_237 * sin_deg(2.0 * d - f)
        + 0.055_413 * sin_deg(2.0 * d - mp + f)
        + 0.046_271 * sin_deg(2.0 * d - mp - f);

    (normalize_degrees(lon), lat)
}

fn ecliptic(body: Body, t: f64) -> Option<(f64, f64)> {
    match body {
        Body::Sun => Some((sun_longitude(t), 0.0)),
        Body::Moon => Some(moon_position(t)),
        _ => None,
    }
}

impl Provider for MeanElementsProvider {
    fn sample(&self, body: Body, jd: f64) -> Result<AngularSample, ProviderError> {
        if !jd.is_finite() {
            return Err(ProviderError::InvalidQuery("epoch must be finite"));
        }
        let t = centuries(jd);
        if t.abs() > MAX_CENTURIES {
            return Err(ProviderError::EpochOutOfRange { jd });
        }
        let (lon, lat) = ecliptic(body, t).ok_or(ProviderError::UnsupportedBody(body))?;

        let h = SPEED_STEP_DAYS / 36525.0;
        let (ahead, _) = ecliptic(body, t + h).ok_or(ProviderError::UnsupportedBody(body))?;
        let (behind, _) = ecliptic(body, t - h).ok_or(ProviderError::UnsupportedBody(body))?;
        let speed = signed_delta(ahead - behind) / (2.0 * SPEED_STEP_DAYS);

        let eq = ecliptic_to_equatorial(lon, lat, mean_obliquity_deg(t));
        Ok(AngularSample::new(jd, lon)
            .with_latitude(lat)
            .with_speed(speed)
            .with_equatorial(eq))
    }

    fn supports(&self, body: Body) -> bool {
        matches!(body, Body::Sun | Body::Moon)
    }

    fn time_scale(&self) -> TimeScale {
        TimeScale::Tt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::julian::calendar_to_jd;
    use orbis_angle::angular_distance;

    #[test]
    fn sun_meeus_example_25a() {
        // 1992 Oct 13.0 TD: apparent longitude 199.90895° (Meeus 25.a).
        let jd = calendar_to_jd(1992, 10, 13.0);
        let s = MeanElementsProvider.sample(Body::Sun, jd).unwrap();
        assert!(angular_distance(s.longitude_deg, 199.909) < 0.01, "{}", s.longitude_deg);
        let speed = s.speed_deg_per_day.unwrap();
        assert!((speed - 0.99).abs() < 0.05, "speed = {speed}");
    }

    #[test]
    fn moon_meeus_example_47a() {
        // 1992 Apr 12.0 TD: λ = 133.162655°, β = -3.229126° (Meeus 47.a).
        let jd = calendar_to_jd(1992, 4, 12.0);
        let m = MeanElementsProvider.sample(Body::Moon, jd).unwrap();
        assert!(angular_distance(m.longitude_deg, 133.163) < 0.1, "{}", m.longitude_deg);
        assert!((m.latitude_deg + 3.229).abs() < 0.1, "{}", m.latitude_deg);
        let speed = m.speed_deg_per_day.unwrap();
        assert!((11.5..15.5).contains(&speed), "speed = {speed}");
    }

    #[test]
    fn sun_near_equinox_at_march_20() {
        // 2024 March equinox: Mar 20 03:06 UTC.
        let jd = calendar_to_jd(2024, 3, 20.0 + 3.1 / 24.0);
        let s = MeanElementsProvider.sample(Body::Sun, jd).unwrap();
        assert!(angular_distance(s.longitude_deg, 0.0) < 0.02, "{}", s.longitude_deg);
    }

    #[test]
    fn planets_are_unsupported() {
        let p = MeanElementsProvider;
        assert!(!p.supports(Body::Mars));
        assert_eq!(
            p.sample(Body::Mars, J2000_JD),
            Err(ProviderError::UnsupportedBody(Body::Mars))
        );
        assert_eq!(p.time_scale(), TimeScale::Tt);
    }

    #[test]
    fn far_epochs_are_out_of_range() {
        let jd = J2000_JD + 36525.0 * 25.0;
        assert!(matches!(
            MeanElementsProvider.sample(Body::Sun, jd),
            Err(ProviderError::EpochOutOfRange { .. })
        ));
    }
}

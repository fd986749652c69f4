//! Rise, set, and upper transit of a body for one observer and day.
//!
//! Rise/set: roots of `altitude(t) − threshold` over `[day, day + 1]`.
//! Transit: roots of `sin(hour_angle(t))` crossing upward (hour angle
//! passing from east to west of the meridian); the downward roots are
//! lower culminations and are ignored.

use orbis_core::{
    Body, GeoLocation, HorizonTransform, Horizontal, Provider, SECONDS_PER_DAY, TimeWindow,
};
use tracing::debug;

use crate::bracket::{Bracket, CrossingPolicy, refine, scan_all_brackets};
use crate::error::SearchError;
use crate::riseset_types::{DayCondition, RiseSetConfig, RiseSetEvents, TransitEvent};

/// Offset used to read the direction of a root hit exactly on the grid.
const PROBE_DAYS: f64 = 1.0 / SECONDS_PER_DAY;

fn horizontal_at<P, H>(
    provider: &P,
    transform: &H,
    body: Body,
    jd: f64,
    observer: &GeoLocation,
) -> Result<Horizontal, SearchError>
where
    P: Provider + ?Sized,
    H: HorizonTransform + ?Sized,
{
    let sample = provider.sample(body, jd)?;
    let eq = sample.equatorial.ok_or(SearchError::MissingEquatorial(body))?;
    Ok(transform.to_horizontal(jd, observer, &eq))
}

fn check_inputs<P: Provider + ?Sized>(
    provider: &P,
    body: Body,
    observer: &GeoLocation,
    config: &RiseSetConfig,
) -> Result<(), SearchError> {
    config.validate().map_err(SearchError::InvalidConfig)?;
    observer.validate().map_err(SearchError::InvalidLocation)?;
    if !provider.supports(body) {
        return Err(SearchError::UnsupportedBody(body));
    }
    Ok(())
}

/// Whether `f` increases through the bracket's root. Degenerate brackets
/// are probed one second either side.
fn is_upward<F>(f: &mut F, bracket: &Bracket) -> Result<bool, SearchError>
where
    F: FnMut(f64) -> Result<f64, SearchError>,
{
    if bracket.is_degenerate() {
        let before = f(bracket.t_low - PROBE_DAYS)?;
        let after = f(bracket.t_low + PROBE_DAYS)?;
        Ok(after > before)
    } else {
        Ok(bracket.is_rising())
    }
}

/// First rise and first set of `body` within `[day_jd, day_jd + 1]`.
pub fn find_rise_set<P, H>(
    provider: &P,
    transform: &H,
    body: Body,
    day_jd: f64,
    observer: &GeoLocation,
    config: &RiseSetConfig,
) -> Result<RiseSetEvents, SearchError>
where
    P: Provider + ?Sized,
    H: HorizonTransform + ?Sized,
{
    check_inputs(provider, body, observer, config)?;
    let threshold = config
        .threshold_altitude_deg
        .unwrap_or_else(|| body.standard_altitude_deg());
    let window = TimeWindow::new(day_jd, day_jd + 1.0)?;

    let mut f = |t: f64| -> Result<f64, SearchError> {
        Ok(horizontal_at(provider, transform, body, t, observer)?.altitude_deg - threshold)
    };
    let sweep = scan_all_brackets(&mut f, &window, config.step_days(), &CrossingPolicy::default())?;

    let mut rise_jd = None;
    let mut set_jd = None;
    for bracket in &sweep.brackets {
        if rise_jd.is_some() && set_jd.is_some() {
            break;
        }
        let rising = is_upward(&mut f, bracket)?;
        let slot = if rising { &mut rise_jd } else { &mut set_jd };
        if slot.is_some() {
            continue;
        }
        let r = refine(&mut f, bracket, config.tolerance_seconds, config.max_iterations)?;
        *slot = Some(r.jd);
    }

    let condition = if !sweep.brackets.is_empty() {
        DayCondition::Normal
    } else if sweep.min_value > 0.0 {
        DayCondition::AlwaysAbove
    } else {
        DayCondition::AlwaysBelow
    };
    debug!(%body, ?rise_jd, ?set_jd, ?condition, "rise/set");

    Ok(RiseSetEvents {
        rise_jd,
        set_jd,
        condition,
        threshold_altitude_deg: threshold,
    })
}

/// Upper transit of `body` within `[day_jd, day_jd + 1]`.
///
/// With more than one upper culmination in the day, the one nearest local
/// mean noon (`day_jd + 0.5 − longitude/360`) is returned.
pub fn find_transit<P, H>(
    provider: &P,
    transform: &H,
    body: Body,
    day_jd: f64,
    observer: &GeoLocation,
    config: &RiseSetConfig,
) -> Result<Option<TransitEvent>, SearchError>
where
    P: Provider + ?Sized,
    H: HorizonTransform + ?Sized,
{
    check_inputs(provider, body, observer, config)?;
    let window = TimeWindow::new(day_jd, day_jd + 1.0)?;

    let mut f = |t: f64| -> Result<f64, SearchError> {
        let h = horizontal_at(provider, transform, body, t, observer)?;
        Ok(h.hour_angle_deg.to_radians().sin())
    };
    let sweep = scan_all_brackets(&mut f, &window, config.step_days(), &CrossingPolicy::default())?;

    let mut upward = Vec::new();
    for bracket in &sweep.brackets {
        if is_upward(&mut f, bracket)? {
            upward.push(*bracket);
        }
    }

    let noon = day_jd + 0.5 - observer.longitude_deg / 360.0;
    let Some(best) = upward
        .into_iter()
        .min_by(|a, b| (a.midpoint() - noon).abs().total_cmp(&(b.midpoint() - noon).abs()))
    else {
        return Ok(None);
    };

    let r = refine(&mut f, &best, config.tolerance_seconds, config.max_iterations)?;
    let altitude_deg = horizontal_at(provider, transform, body, r.jd, observer)?.altitude_deg;
    debug!(%body, jd = r.jd, altitude_deg, "transit");
    Ok(Some(TransitEvent {
        jd: r.jd,
        altitude_deg,
        status: r.status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::{AngularSample, LinearProvider, LinearTrack, ProviderError, SiderealHorizon};

    struct NoEquatorial;

    impl Provider for NoEquatorial {
        fn sample(&self, _body: Body, jd: f64) -> Result<AngularSample, ProviderError> {
            Ok(AngularSample::new(jd, 0.0))
        }
    }

    fn still_sun(lon: f64) -> LinearProvider {
        LinearProvider::new().with_track(Body::Sun, LinearTrack::new(2_451_545.0, lon, 0.0))
    }

    #[test]
    fn missing_equatorial_is_an_error() {
        let err = find_rise_set(
            &NoEquatorial,
            &SiderealHorizon::new(),
            Body::Sun,
            2_451_544.5,
            &GeoLocation::new(0.0, 0.0, 0.0),
            &RiseSetConfig::default(),
        );
        assert_eq!(err, Err(SearchError::MissingEquatorial(Body::Sun)));
    }

    #[test]
    fn invalid_observer_is_rejected() {
        let err = find_transit(
            &still_sun(0.0),
            &SiderealHorizon::new(),
            Body::Sun,
            2_451_544.5,
            &GeoLocation::new(95.0, 0.0, 0.0),
            &RiseSetConfig::default(),
        );
        assert!(matches!(err, Err(SearchError::InvalidLocation(_))));
    }

    #[test]
    fn threshold_override_is_reported() {
        let ev = find_rise_set(
            &still_sun(0.0),
            &SiderealHorizon::new(),
            Body::Sun,
            2_451_544.5,
            &GeoLocation::new(0.0, 0.0, 0.0),
            &RiseSetConfig::for_event(crate::HorizonEvent::CivilDawn),
        )
        .unwrap();
        assert_eq!(ev.threshold_altitude_deg, -6.0);
        assert_eq!(ev.condition, DayCondition::Normal);
    }
}

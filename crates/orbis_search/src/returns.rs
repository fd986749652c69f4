//! Return-instant search: when does a body reach a longitude again?
//!
//! The root function is the half-angle metric
//! `m(t) = sin(signed_delta(lon(t) − target) / 2)`. It is zero only where
//! the body sits on the target, and it jumps by about 2 (not through a
//! small value) when the body passes the antipode, so the scan rejects
//! that jump with [`CrossingPolicy::max_jump`] instead of bracketing it.

use orbis_angle::{half_angle_metric, normalize_degrees, signed_delta};
use orbis_core::{Body, Provider, SECONDS_PER_DAY, TROPICAL_YEAR_DAYS, TimeWindow};
use tracing::{debug, warn};

use crate::bracket::{CrossingPolicy, RefineStatus, refine, scan_for_bracket_with};
use crate::error::SearchError;
use crate::return_types::{
    ReturnConfig, ReturnInstant, ReturnNotFound, ReturnOutcome, ReturnStatus,
};

/// Gap after a found return before the next search starts, seconds.
pub const RESCAN_EPSILON_SECONDS: f64 = 1.0;

/// The body must arrive at the target again, so a root at the window
/// start is not a return. The metric's antipodal jump is ~2, a genuine
/// crossing at any sane step is far below 1.
const RETURN_POLICY: CrossingPolicy = CrossingPolicy {
    include_start_root: false,
    max_jump: Some(1.0),
};

/// Coarse steps per period, by body class.
fn step_divisor(body: Body) -> f64 {
    match body {
        Body::Moon => 120.0,
        Body::Sun => 180.0,
        Body::Mercury | Body::Venus | Body::Mars => 360.0,
        Body::Jupiter | Body::Saturn | Body::Uranus | Body::Neptune | Body::Pluto => 500.0,
        Body::Asteroid(_) => 180.0,
    }
}

/// Mean longitude period the provider reports, else one tropical year.
pub fn period_for<P: Provider + ?Sized>(provider: &P, body: Body) -> f64 {
    provider
        .mean_period_days(body)
        .filter(|p| p.is_finite() && *p > 0.0)
        .unwrap_or(TROPICAL_YEAR_DAYS)
}

/// Scan step for `body`: the configured override or `period / divisor`.
pub fn coarse_step_days<P: Provider + ?Sized>(
    provider: &P,
    body: Body,
    config: &ReturnConfig,
) -> f64 {
    config
        .step_days
        .unwrap_or_else(|| period_for(provider, body) / step_divisor(body))
}

/// Find the first return of `body` to `target_longitude_deg` inside `window`.
///
/// A window without a return yields [`ReturnOutcome::NotFound`]; errors are
/// reserved for invalid input and provider failures.
pub fn find_return_instant<P: Provider + ?Sized>(
    provider: &P,
    body: Body,
    target_longitude_deg: f64,
    window: &TimeWindow,
    config: &ReturnConfig,
) -> Result<ReturnOutcome, SearchError> {
    config.validate().map_err(SearchError::InvalidConfig)?;
    if !target_longitude_deg.is_finite() {
        return Err(SearchError::InvalidConfig("target longitude must be finite"));
    }
    if !provider.supports(body) {
        return Err(SearchError::UnsupportedBody(body));
    }

    let target = normalize_degrees(target_longitude_deg);
    let step = coarse_step_days(provider, body, config);
    let mut evaluations = 0u32;
    let mut metric = |t: f64| -> Result<f64, SearchError> {
        evaluations += 1;
        let s = provider.sample(body, t)?;
        Ok(half_angle_metric(s.longitude_deg - target))
    };

    let scan = scan_for_bracket_with(&mut metric, window, step, &RETURN_POLICY)?;
    let Some(bracket) = scan.bracket else {
        debug!(
            %body,
            target_deg = target,
            start = window.start(),
            end = window.end(),
            "no return in window"
        );
        return Ok(ReturnOutcome::NotFound(ReturnNotFound {
            body,
            target_longitude_deg: target,
            window_start_jd: window.start(),
            window_end_jd: window.end(),
            evaluations,
        }));
    };
    debug!(%body, t_low = bracket.t_low, t_high = bracket.t_high, "return bracketed");

    let refinement =
        refine(&mut metric, &bracket, config.tolerance_seconds, config.max_iterations)?;

    let sample = provider.sample(body, refinement.jd)?;
    evaluations += 1;
    let residual_arcsec = signed_delta(sample.longitude_deg - target).abs() * 3600.0;

    let status = match refinement.status {
        RefineStatus::Ok => ReturnStatus::Ok,
        RefineStatus::Degraded => {
            warn!(
                %body,
                jd = refinement.jd,
                achieved_s = refinement.achieved_tolerance_seconds,
                requested_s = config.tolerance_seconds,
                "return refinement hit the iteration cap"
            );
            ReturnStatus::Degraded
        }
    };

    Ok(ReturnOutcome::Found(ReturnInstant {
        body,
        target_longitude_deg: target,
        exact_jd: refinement.jd,
        longitude_deg: sample.longitude_deg,
        residual_arcsec,
        bracket,
        iterations: refinement.iterations,
        evaluations,
        requested_tolerance_seconds: config.tolerance_seconds,
        achieved_tolerance_seconds: refinement.achieved_tolerance_seconds,
        status,
        time_scale: provider.time_scale(),
        local_jd: None,
        houses: None,
        aspects: Vec::new(),
    }))
}

/// Every return of `body` to the target inside `window`, in time order.
///
/// Each follow-up search starts past the previous instant by
/// [`RESCAN_EPSILON_SECONDS`], or by the achieved tolerance when that is
/// wider, so the same root is never reported twice.
pub fn find_all_returns_in_window<P: Provider + ?Sized>(
    provider: &P,
    body: Body,
    target_longitude_deg: f64,
    window: &TimeWindow,
    config: &ReturnConfig,
) -> Result<Vec<ReturnInstant>, SearchError> {
    let mut out: Vec<ReturnInstant> = Vec::new();
    let mut remaining = Some(*window);

    while let Some(w) = remaining {
        let hit = match find_return_instant(provider, body, target_longitude_deg, &w, config)? {
            ReturnOutcome::Found(hit) => hit,
            ReturnOutcome::NotFound(_) => break,
        };
        if out.last().is_some_and(|prev| hit.exact_jd <= prev.exact_jd) {
            break;
        }
        let gap_s = RESCAN_EPSILON_SECONDS.max(hit.achieved_tolerance_seconds);
        remaining = window.starting_at(hit.exact_jd + gap_s / SECONDS_PER_DAY);
        out.push(hit);
    }

    debug!(%body, count = out.len(), "returns in window");
    Ok(out)
}

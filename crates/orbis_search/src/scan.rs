//! Multi-body return scan against a natal chart.
//!
//! Per body: take the natal longitude once, widen the caller's window by
//! one period each side, find approximate crossings with a cheap coarse
//! scan of the raw signed delta, refine each through
//! [`find_return_instant`] in a ±25%-of-period window, then filter,
//! de-duplicate, and decorate the accepted hits.

use orbis_angle::signed_delta;
use orbis_core::{Body, GeoLocation, Provider, SECONDS_PER_DAY, TimeWindow};
use tracing::{debug, info, warn};

use crate::bracket::{ZERO_EPSILON, grid_points};
use crate::decorate::{BodyPosition, Decorators, EqualHouses, HarmonicAspects};
use crate::error::SearchError;
use crate::return_types::{ReturnInstant, ReturnOutcome};
use crate::returns::{coarse_step_days, find_return_instant, period_for};
use crate::scan_types::{NatalContext, ScanOptions};

/// Half-width of each refinement window, as a fraction of the period.
const REFINE_WINDOW_FRACTION: f64 = 0.25;

/// Sign changes of the raw signed delta with a jump at least this large
/// are the ±180° wrap, not a crossing of the target.
const WRAP_JUMP_DEG: f64 = 270.0;

/// Scan with the default decorators: equal houses (when a location is
/// known, with `options.delta_t_seconds`) and harmonic aspects from
/// `options`.
pub fn scan_returns<P: Provider + ?Sized>(
    provider: &P,
    bodies: &[Body],
    window: &TimeWindow,
    natal: &NatalContext,
    options: &ScanOptions,
) -> Result<Vec<ReturnInstant>, SearchError> {
    let houses = EqualHouses {
        delta_t_seconds: options.delta_t_seconds,
        ..EqualHouses::default()
    };
    let aspects = HarmonicAspects::new(options.harmonics.clone(), options.aspect_orb_deg);
    let decorators = Decorators {
        houses: Some(&houses),
        aspects: if options.harmonics.is_empty() {
            None
        } else {
            Some(&aspects)
        },
    };
    scan_returns_with(provider, bodies, window, natal, options, &decorators)
}

/// Scan with caller-supplied decorators. Hits from all bodies are
/// returned in time order.
pub fn scan_returns_with<P: Provider + ?Sized>(
    provider: &P,
    bodies: &[Body],
    window: &TimeWindow,
    natal: &NatalContext,
    options: &ScanOptions,
    decorators: &Decorators<'_>,
) -> Result<Vec<ReturnInstant>, SearchError> {
    options.validate().map_err(SearchError::InvalidConfig)?;
    if !natal.jd.is_finite() {
        return Err(SearchError::InvalidConfig("natal jd must be finite"));
    }
    let location = options.location.or(natal.location);
    if let Some(loc) = &location {
        loc.validate().map_err(SearchError::InvalidLocation)?;
    }
    for &body in bodies {
        if !provider.supports(body) {
            return Err(SearchError::UnsupportedBody(body));
        }
    }

    let natal_positions = positions(provider, &natal.points, natal.jd)?;
    let aspect_bodies = if options.aspect_bodies.is_empty() {
        &natal.points
    } else {
        &options.aspect_bodies
    };

    let mut all = Vec::new();
    for &body in bodies {
        let hits = scan_body(provider, body, window, natal.jd, options)?;
        for mut hit in hits {
            decorate(
                provider,
                &mut hit,
                location.as_ref(),
                &natal_positions,
                aspect_bodies,
                options,
                decorators,
            )?;
            all.push(hit);
        }
    }

    all.sort_by(|a, b| a.exact_jd.total_cmp(&b.exact_jd));
    info!(
        bodies = bodies.len(),
        hits = all.len(),
        start = window.start(),
        end = window.end(),
        "return scan complete"
    );
    Ok(all)
}

/// Accepted, undecorated returns of one body inside `window`.
fn scan_body<P: Provider + ?Sized>(
    provider: &P,
    body: Body,
    window: &TimeWindow,
    natal_jd: f64,
    options: &ScanOptions,
) -> Result<Vec<ReturnInstant>, SearchError> {
    let target = provider.sample(body, natal_jd)?.longitude_deg;
    let period = period_for(provider, body);
    let step = coarse_step_days(provider, body, &options.return_config);
    let spacing = options.spacing.spacing_days(period);

    let margin = window.expanded(period);
    let approx = approximate_hits(provider, body, target, &margin, step)?;
    debug!(%body, target_deg = target, candidates = approx.len(), "coarse return scan");

    let mut accepted: Vec<ReturnInstant> = Vec::new();
    for t in approx {
        let refine_window = TimeWindow::around(t, REFINE_WINDOW_FRACTION * period)?;
        let hit = match find_return_instant(
            provider,
            body,
            target,
            &refine_window,
            &options.return_config,
        )? {
            ReturnOutcome::Found(hit) => hit,
            ReturnOutcome::NotFound(_) => {
                debug!(%body, approx_jd = t, "candidate did not refine");
                continue;
            }
        };
        if !window.contains(hit.exact_jd) {
            continue;
        }
        if (hit.exact_jd - natal_jd).abs() < spacing {
            // The natal instant itself.
            continue;
        }
        if hit.residual_arcsec > options.max_residual_arcsec {
            warn!(
                %body,
                jd = hit.exact_jd,
                residual_arcsec = hit.residual_arcsec,
                "discarding return with excessive residual"
            );
            continue;
        }
        if accepted
            .iter()
            .any(|a| (a.exact_jd - hit.exact_jd).abs() < spacing)
        {
            debug!(%body, jd = hit.exact_jd, "duplicate return");
            continue;
        }
        accepted.push(hit);
    }
    accepted.sort_by(|a, b| a.exact_jd.total_cmp(&b.exact_jd));
    Ok(accepted)
}

/// A sign change of the raw signed delta that is a real crossing of the
/// target rather than the wrap at the antipode.
fn is_genuine_crossing(d_a: f64, d_b: f64) -> bool {
    (d_a < 0.0) != (d_b < 0.0) && (d_a - d_b).abs() < WRAP_JUMP_DEG
}

/// Approximate crossing times from a coarse scan of
/// `signed_delta(lon − target)`, linearly interpolated within each step.
fn approximate_hits<P: Provider + ?Sized>(
    provider: &P,
    body: Body,
    target: f64,
    window: &TimeWindow,
    step_days: f64,
) -> Result<Vec<f64>, SearchError> {
    let mut hits = Vec::new();
    let mut prev: Option<(f64, f64)> = None;
    for t in grid_points(window, step_days)? {
        let d = signed_delta(provider.sample(body, t)?.longitude_deg - target);
        if d.abs() < ZERO_EPSILON {
            hits.push(t);
        } else if let Some((t_prev, d_prev)) = prev {
            if d_prev.abs() >= ZERO_EPSILON && is_genuine_crossing(d_prev, d) {
                hits.push(t_prev + (t - t_prev) * d_prev / (d_prev - d));
            }
        }
        prev = Some((t, d));
    }
    Ok(hits)
}

fn positions<P: Provider + ?Sized>(
    provider: &P,
    bodies: &[Body],
    jd: f64,
) -> Result<Vec<BodyPosition>, SearchError> {
    bodies
        .iter()
        .map(|&body| {
            if !provider.supports(body) {
                return Err(SearchError::UnsupportedBody(body));
            }
            let s = provider.sample(body, jd)?;
            Ok(BodyPosition {
                body,
                longitude_deg: s.longitude_deg,
                speed_deg_per_day: s.speed_deg_per_day,
            })
        })
        .collect()
}

fn decorate<P: Provider + ?Sized>(
    provider: &P,
    hit: &mut ReturnInstant,
    location: Option<&GeoLocation>,
    natal_positions: &[BodyPosition],
    aspect_bodies: &[Body],
    options: &ScanOptions,
    decorators: &Decorators<'_>,
) -> Result<(), SearchError> {
    if let Some(hours) = options.utc_offset_hours {
        hit.local_jd =
            Some(hit.exact_jd - options.delta_t_seconds / SECONDS_PER_DAY + hours / 24.0);
    }
    if let (Some(calc), Some(loc)) = (decorators.houses, location) {
        hit.houses = Some(calc.houses(hit.exact_jd, loc)?);
    }
    if let Some(calc) = decorators.aspects {
        if !natal_positions.is_empty() {
            let transiting = positions(provider, aspect_bodies, hit.exact_jd)?;
            hit.aspects = calc.aspects(&transiting, natal_positions);
        }
    }
    Ok(())
}

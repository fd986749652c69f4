//! Visibility-window extraction.
//!
//! The range is sampled on a fixed grid, each sample is tested against a
//! compound predicate, consecutive passing samples are merged into runs,
//! and each interior run boundary is refined by bisection on quantities
//! interpolated between the two bracketing samples (no extra provider
//! calls).

use std::collections::BTreeMap;

use orbis_core::{Body, HorizonTransform, Provider, TimeWindow, angular_separation_deg};
use tracing::debug;

use crate::bracket::{grid_points, refine_transition};
use crate::error::SearchError;
use crate::visibility_types::{ConstraintSample, VisibilityConstraints, VisibilityWindow};

/// Produces the constraint inputs at an instant.
pub trait ConstraintEvaluator {
    fn evaluate(&self, jd: f64) -> Result<ConstraintSample, SearchError>;
}

/// Evaluator backed by a [`Provider`] and a [`HorizonTransform`].
pub struct ProviderEvaluator<'a, P: ?Sized, H: ?Sized> {
    provider: &'a P,
    transform: &'a H,
    body: Body,
    constraints: &'a VisibilityConstraints,
}

impl<'a, P, H> ProviderEvaluator<'a, P, H>
where
    P: Provider + ?Sized,
    H: HorizonTransform + ?Sized,
{
    pub fn new(
        provider: &'a P,
        transform: &'a H,
        body: Body,
        constraints: &'a VisibilityConstraints,
    ) -> Self {
        Self {
            provider,
            transform,
            body,
            constraints,
        }
    }
}

impl<P, H> ConstraintEvaluator for ProviderEvaluator<'_, P, H>
where
    P: Provider + ?Sized,
    H: HorizonTransform + ?Sized,
{
    fn evaluate(&self, jd: f64) -> Result<ConstraintSample, SearchError> {
        let observer = &self.constraints.observer;
        let target = self.provider.sample(self.body, jd)?;
        let target_eq = target
            .equatorial
            .ok_or(SearchError::MissingEquatorial(self.body))?;
        let mut out = ConstraintSample::new(
            jd,
            self.transform
                .to_horizontal(jd, observer, &target_eq)
                .altitude_deg,
        );

        if self.constraints.needs_sun() {
            let sun = self.provider.sample(Body::Sun, jd)?;
            let sun_eq = sun.equatorial.ok_or(SearchError::MissingEquatorial(Body::Sun))?;
            if self.constraints.max_solar_altitude_deg.is_some() {
                out.solar_altitude_deg =
                    Some(self.transform.to_horizontal(jd, observer, &sun_eq).altitude_deg);
            }
            if self.constraints.min_solar_separation_deg.is_some() {
                out.solar_separation_deg = Some(angular_separation_deg(&target_eq, &sun_eq));
            }
        }

        if let Some(limit) = self.constraints.secondary {
            let s = self.provider.sample(limit.body, jd)?;
            let eq = s.equatorial.ok_or(SearchError::MissingEquatorial(limit.body))?;
            out.secondary_altitude_deg =
                Some(self.transform.to_horizontal(jd, observer, &eq).altitude_deg);
        }
        Ok(out)
    }
}

/// Visibility windows of `body` within `range`, best score first.
pub fn extract_visibility_windows<P, H>(
    provider: &P,
    transform: &H,
    body: Body,
    range: &TimeWindow,
    step_days: f64,
    constraints: &VisibilityConstraints,
) -> Result<Vec<VisibilityWindow>, SearchError>
where
    P: Provider + ?Sized,
    H: HorizonTransform + ?Sized,
{
    constraints.validate().map_err(SearchError::InvalidConfig)?;
    constraints
        .observer
        .validate()
        .map_err(SearchError::InvalidLocation)?;
    if !step_days.is_finite() || step_days <= 0.0 {
        return Err(SearchError::InvalidConfig("step_days must be positive"));
    }
    for b in required_bodies(body, constraints) {
        if !provider.supports(b) {
            return Err(SearchError::UnsupportedBody(b));
        }
    }

    let evaluator = ProviderEvaluator::new(provider, transform, body, constraints);
    let samples = sample_range(&evaluator, range, step_days)?;
    let windows = extract_windows_from_samples(&samples, constraints)?;
    debug!(%body, samples = samples.len(), windows = windows.len(), "visibility");
    Ok(windows)
}

fn required_bodies(body: Body, constraints: &VisibilityConstraints) -> Vec<Body> {
    let mut bodies = vec![body];
    if constraints.needs_sun() {
        bodies.push(Body::Sun);
    }
    if let Some(limit) = constraints.secondary {
        bodies.push(limit.body);
    }
    bodies
}

/// Evaluate `evaluator` on the scan grid of `range`.
pub fn sample_range<E: ConstraintEvaluator + ?Sized>(
    evaluator: &E,
    range: &TimeWindow,
    step_days: f64,
) -> Result<Vec<ConstraintSample>, SearchError> {
    grid_points(range, step_days)?
        .map(|t| evaluator.evaluate(t))
        .collect()
}

/// Merge passing samples into windows and refine their boundaries.
///
/// Samples must be in strictly increasing time order. Boundaries at the
/// first or last sample are left unrefined (the range edge closes them).
pub fn extract_windows_from_samples(
    samples: &[ConstraintSample],
    constraints: &VisibilityConstraints,
) -> Result<Vec<VisibilityWindow>, SearchError> {
    if samples.windows(2).any(|w| w[1].jd <= w[0].jd) {
        return Err(SearchError::InvalidConfig(
            "samples must be in increasing time order",
        ));
    }

    let pass: Vec<bool> = samples.iter().map(|s| constraints.is_satisfied(s)).collect();
    let mut windows = Vec::new();
    let mut i = 0;
    while i < samples.len() {
        if !pass[i] {
            i += 1;
            continue;
        }
        let first = i;
        while i + 1 < samples.len() && pass[i + 1] {
            i += 1;
        }
        let last = i;
        windows.push(build_window(samples, first, last, constraints)?);
        i += 1;
    }

    windows.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(windows)
}

/// Refine the transition between a failing sample and a passing one.
fn refine_boundary(
    failing: &ConstraintSample,
    passing: &ConstraintSample,
    constraints: &VisibilityConstraints,
) -> Result<f64, SearchError> {
    let pred = |t: f64| Ok(constraints.is_satisfied(&failing.lerp(passing, t)));
    let r = refine_transition(
        pred,
        failing.jd,
        passing.jd,
        constraints.refine_tolerance_seconds,
        constraints.max_iterations,
    )?;
    Ok(r.jd)
}

fn build_window(
    samples: &[ConstraintSample],
    first: usize,
    last: usize,
    constraints: &VisibilityConstraints,
) -> Result<VisibilityWindow, SearchError> {
    let start_jd = if first > 0 {
        refine_boundary(&samples[first - 1], &samples[first], constraints)?
    } else {
        samples[first].jd
    };
    let end_jd = if last + 1 < samples.len() {
        refine_boundary(&samples[last + 1], &samples[last], constraints)?
    } else {
        samples[last].jd
    };

    let run = &samples[first..=last];
    let mut peak = run[0];
    for s in run {
        if s.primary_altitude_deg > peak.primary_altitude_deg {
            peak = *s;
        }
    }
    let min_of = |get: fn(&ConstraintSample) -> Option<f64>| {
        run.iter().filter_map(get).reduce(f64::min)
    };
    let max_of = |get: fn(&ConstraintSample) -> Option<f64>| {
        run.iter().filter_map(get).reduce(f64::max)
    };
    let min_solar_separation_deg = min_of(|s| s.solar_separation_deg);
    let max_solar_separation_deg = max_of(|s| s.solar_separation_deg);
    let max_solar_altitude_deg = max_of(|s| s.solar_altitude_deg);
    let max_secondary_altitude_deg = max_of(|s| s.secondary_altitude_deg);

    let duration_hours = (end_jd - start_jd) * 24.0;
    let score = peak.primary_altitude_deg + 2.0 * duration_hours;

    let mut details = BTreeMap::new();
    details.insert("duration_hours".to_string(), Some(duration_hours));
    details.insert("peak_altitude_deg".to_string(), Some(peak.primary_altitude_deg));
    details.insert("min_solar_separation_deg".to_string(), min_solar_separation_deg);
    details.insert("max_solar_separation_deg".to_string(), max_solar_separation_deg);
    details.insert("max_solar_altitude_deg".to_string(), max_solar_altitude_deg);
    details.insert("max_secondary_altitude_deg".to_string(), max_secondary_altitude_deg);
    details.insert("sample_count".to_string(), Some(run.len() as f64));

    Ok(VisibilityWindow {
        start_jd,
        end_jd,
        duration_hours,
        peak_altitude_deg: peak.primary_altitude_deg,
        peak_jd: peak.jd,
        min_solar_separation_deg,
        max_solar_separation_deg,
        max_solar_altitude_deg,
        max_secondary_altitude_deg,
        score,
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::GeoLocation;

    fn constraints() -> VisibilityConstraints {
        VisibilityConstraints::new(GeoLocation::new(0.0, 0.0, 0.0)).with_min_altitude(10.0)
    }

    fn series(alts: &[f64]) -> Vec<ConstraintSample> {
        alts.iter()
            .enumerate()
            .map(|(i, &a)| ConstraintSample::new(i as f64 / 24.0, a))
            .collect()
    }

    #[test]
    fn merges_runs_and_refines_edges() {
        // Hourly samples; passes at hours 2..=4 and 7.
        let s = series(&[0.0, 5.0, 15.0, 30.0, 20.0, 5.0, 0.0, 12.0, 0.0]);
        let w = extract_windows_from_samples(&s, &constraints()).unwrap();
        assert_eq!(w.len(), 2);

        let long = &w[0];
        // 10° is reached halfway between hour 1 (5°) and hour 2 (15°).
        assert!((long.start_jd - 1.5 / 24.0).abs() * 86_400.0 <= 60.0);
        // ...and a third of the way from hour 4 (20°) to hour 5 (5°).
        assert!((long.end_jd - (4.0 + 10.0 / 15.0) / 24.0).abs() * 86_400.0 <= 60.0);
        assert_eq!(long.peak_altitude_deg, 30.0);
        assert_eq!(long.peak_jd, 3.0 / 24.0);
        assert!((long.score - (30.0 + 2.0 * long.duration_hours)).abs() < 1e-9);
        assert_eq!(long.details["sample_count"], Some(3.0));
        assert_eq!(long.details["min_solar_separation_deg"], None);

        let short = &w[1];
        assert_eq!(short.peak_altitude_deg, 12.0);
        assert!(short.start_jd < 7.0 / 24.0 && short.end_jd > 7.0 / 24.0);
        assert!(long.score > short.score);
    }

    #[test]
    fn range_edges_close_windows() {
        let s = series(&[20.0, 25.0, 5.0, 15.0]);
        let w = extract_windows_from_samples(&s, &constraints()).unwrap();
        assert_eq!(w.len(), 2);
        let mut by_start = w.clone();
        by_start.sort_by(|a, b| a.start_jd.total_cmp(&b.start_jd));
        assert_eq!(by_start[0].start_jd, 0.0);
        assert_eq!(by_start[1].end_jd, 3.0 / 24.0);
    }

    #[test]
    fn nothing_passes() {
        let s = series(&[0.0, 1.0, 2.0]);
        assert!(extract_windows_from_samples(&s, &constraints()).unwrap().is_empty());
        assert!(extract_windows_from_samples(&[], &constraints()).unwrap().is_empty());
    }

    #[test]
    fn unordered_samples_are_rejected() {
        let mut s = series(&[20.0, 20.0]);
        s.swap(0, 1);
        assert!(matches!(
            extract_windows_from_samples(&s, &constraints()),
            Err(SearchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn auxiliary_extrema_are_collected() {
        let c = constraints().with_min_solar_separation(20.0);
        let mut s = series(&[15.0, 25.0, 18.0]);
        for (k, sep) in [40.0, 55.0, 35.0].iter().enumerate() {
            s[k].solar_separation_deg = Some(*sep);
        }
        let w = extract_windows_from_samples(&s, &c).unwrap();
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].min_solar_separation_deg, Some(35.0));
        assert_eq!(w[0].max_solar_separation_deg, Some(55.0));
        assert_eq!(w[0].max_secondary_altitude_deg, None);
    }
}

//! Coarse bracketing and bisection refinement over time.
//!
//! Every finder in this crate reduces its question to a scalar function of
//! time, `f(jd) -> Result<f64, SearchError>`, and uses the two halves here:
//! a fixed-step scan that brackets a sign change, then bisection down to a
//! tolerance in seconds.

use orbis_core::{SECONDS_PER_DAY, TimeWindow};
use serde::Serialize;
use tracing::trace;

use crate::error::SearchError;

/// `|f| < ZERO_EPSILON` is treated as an exact root.
pub const ZERO_EPSILON: f64 = 1e-9;

/// Time interval known to contain a root (or a boolean transition).
///
/// `t_low == t_high` marks a direct hit found on the scan grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bracket {
    pub t_low: f64,
    pub t_high: f64,
    pub f_low: f64,
    pub f_high: f64,
}

impl Bracket {
    pub fn degenerate(t: f64, f: f64) -> Self {
        Self {
            t_low: t,
            t_high: t,
            f_low: f,
            f_high: f,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.t_low == self.t_high
    }

    pub fn width_seconds(&self) -> f64 {
        (self.t_high - self.t_low) * SECONDS_PER_DAY
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.t_low + self.t_high)
    }

    /// `f` increases across the bracket.
    pub fn is_rising(&self) -> bool {
        self.f_high > self.f_low
    }
}

/// Which grid observations count as roots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingPolicy {
    /// Whether a zero exactly at `window.start` is reported.
    pub include_start_root: bool,
    /// Sign changes with `|f_a - f_b|` above this are discontinuities
    /// (e.g. an angular wrap), not roots.
    pub max_jump: Option<f64>,
}

impl Default for CrossingPolicy {
    fn default() -> Self {
        Self {
            include_start_root: true,
            max_jump: None,
        }
    }
}

impl CrossingPolicy {
    fn accepts(&self, f_a: f64, f_b: f64) -> bool {
        if (f_a < 0.0) == (f_b < 0.0) {
            return false;
        }
        match self.max_jump {
            Some(limit) => (f_a - f_b).abs() <= limit,
            None => true,
        }
    }
}

/// Result of a single-bracket scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketScan {
    pub bracket: Option<Bracket>,
    pub evaluations: u32,
}

/// Result of a full-window scan.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketSweep {
    /// Every accepted bracket, in time order.
    pub brackets: Vec<Bracket>,
    /// Smallest and largest sampled value over the grid.
    pub min_value: f64,
    pub max_value: f64,
    pub evaluations: u32,
}

/// Refinement outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefineStatus {
    /// Tolerance reached, or an exact root hit.
    Ok,
    /// Iteration cap reached first.
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refinement {
    pub jd: f64,
    pub status: RefineStatus,
    /// Width of the final interval in seconds (0 on an exact hit).
    pub achieved_tolerance_seconds: f64,
    pub iterations: u32,
    pub evaluations: u32,
}

fn is_root(f: f64) -> bool {
    f.abs() < ZERO_EPSILON
}

fn validate_step(step_days: f64) -> Result<(), SearchError> {
    if !step_days.is_finite() || step_days <= 0.0 {
        return Err(SearchError::InvalidConfig("step_days must be positive"));
    }
    Ok(())
}

fn validate_refine(tolerance_seconds: f64, max_iterations: u32) -> Result<(), SearchError> {
    if !tolerance_seconds.is_finite() || tolerance_seconds <= 0.0 {
        return Err(SearchError::InvalidConfig("tolerance_seconds must be positive"));
    }
    if max_iterations == 0 {
        return Err(SearchError::InvalidConfig("max_iterations must be > 0"));
    }
    Ok(())
}

/// Largest number of steps a single sweep will walk.
pub const MAX_GRID_POINTS: u64 = 10_000_000;

/// Lazy scan grid `start, start + step, start + 2·step, …`, the last point
/// clamped to `end`.
#[derive(Debug, Clone)]
pub(crate) struct Grid {
    start: f64,
    end: f64,
    step_days: f64,
    k: u64,
    done: bool,
}

impl Iterator for Grid {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.done {
            return None;
        }
        if self.k == 0 {
            self.k = 1;
            return Some(self.start);
        }
        let t = self.start + self.k as f64 * self.step_days;
        self.k += 1;
        if t >= self.end {
            self.done = true;
            return Some(self.end);
        }
        Some(t)
    }
}

pub(crate) fn grid_points(window: &TimeWindow, step_days: f64) -> Result<Grid, SearchError> {
    validate_step(step_days)?;
    if window.duration_days() / step_days > MAX_GRID_POINTS as f64 {
        return Err(SearchError::InvalidConfig(
            "step_days is too small for the search window",
        ));
    }
    Ok(Grid {
        start: window.start(),
        end: window.end(),
        step_days,
        k: 0,
        done: false,
    })
}

// ---------------------------------------------------------------------------
// Coarse scan
// ---------------------------------------------------------------------------

/// First bracket in `window` with the default policy.
pub fn scan_for_bracket<F>(
    f: F,
    window: &TimeWindow,
    step_days: f64,
) -> Result<BracketScan, SearchError>
where
    F: FnMut(f64) -> Result<f64, SearchError>,
{
    scan_for_bracket_with(f, window, step_days, &CrossingPolicy::default())
}

/// First bracket in `window`: a grid point with `|f| < ZERO_EPSILON`
/// (degenerate bracket) or the first accepted sign change between
/// consecutive grid points.
pub fn scan_for_bracket_with<F>(
    mut f: F,
    window: &TimeWindow,
    step_days: f64,
    policy: &CrossingPolicy,
) -> Result<BracketScan, SearchError>
where
    F: FnMut(f64) -> Result<f64, SearchError>,
{
    let points = grid_points(window, step_days)?;

    let mut t_prev = window.start();
    let mut f_prev = f(t_prev)?;
    let mut evaluations = 1;
    if is_root(f_prev) && policy.include_start_root {
        return Ok(BracketScan {
            bracket: Some(Bracket::degenerate(t_prev, f_prev)),
            evaluations,
        });
    }

    for t in points.skip(1) {
        let f_t = f(t)?;
        evaluations += 1;
        if is_root(f_t) {
            return Ok(BracketScan {
                bracket: Some(Bracket::degenerate(t, f_t)),
                evaluations,
            });
        }
        if !is_root(f_prev) && policy.accepts(f_prev, f_t) {
            return Ok(BracketScan {
                bracket: Some(Bracket {
                    t_low: t_prev,
                    t_high: t,
                    f_low: f_prev,
                    f_high: f_t,
                }),
                evaluations,
            });
        }
        t_prev = t;
        f_prev = f_t;
    }

    Ok(BracketScan {
        bracket: None,
        evaluations,
    })
}

/// Every bracket in `window`, plus the sampled value range.
pub fn scan_all_brackets<F>(
    mut f: F,
    window: &TimeWindow,
    step_days: f64,
    policy: &CrossingPolicy,
) -> Result<BracketSweep, SearchError>
where
    F: FnMut(f64) -> Result<f64, SearchError>,
{
    let points = grid_points(window, step_days)?;

    let mut brackets = Vec::new();
    let mut t_prev = window.start();
    let mut f_prev = f(t_prev)?;
    let mut evaluations = 1;
    let mut min_value = f_prev;
    let mut max_value = f_prev;
    if is_root(f_prev) && policy.include_start_root {
        brackets.push(Bracket::degenerate(t_prev, f_prev));
    }

    for t in points.skip(1) {
        let f_t = f(t)?;
        evaluations += 1;
        min_value = min_value.min(f_t);
        max_value = max_value.max(f_t);
        if is_root(f_t) {
            brackets.push(Bracket::degenerate(t, f_t));
        } else if !is_root(f_prev) && policy.accepts(f_prev, f_t) {
            brackets.push(Bracket {
                t_low: t_prev,
                t_high: t,
                f_low: f_prev,
                f_high: f_t,
            });
        }
        t_prev = t;
        f_prev = f_t;
    }

    trace!(brackets = brackets.len(), evaluations, "bracket sweep");
    Ok(BracketSweep {
        brackets,
        min_value,
        max_value,
        evaluations,
    })
}

// ---------------------------------------------------------------------------
// Bisection
// ---------------------------------------------------------------------------

/// Bisect `bracket` until its width is at most `tolerance_seconds`.
///
/// Keeps the half whose ends differ in sign (the lower half on a tie). A
/// midpoint with `|f| < ZERO_EPSILON` ends the search there. The reported
/// instant is the linear interpolation of the final bracket. Running out of
/// iterations reports that estimate as [`RefineStatus::Degraded`].
pub fn refine<F>(
    mut f: F,
    bracket: &Bracket,
    tolerance_seconds: f64,
    max_iterations: u32,
) -> Result<Refinement, SearchError>
where
    F: FnMut(f64) -> Result<f64, SearchError>,
{
    validate_refine(tolerance_seconds, max_iterations)?;
    if bracket.is_degenerate() {
        return Ok(Refinement {
            jd: bracket.t_low,
            status: RefineStatus::Ok,
            achieved_tolerance_seconds: 0.0,
            iterations: 0,
            evaluations: 0,
        });
    }

    let tol_days = tolerance_seconds / SECONDS_PER_DAY;
    let (mut a, mut b) = (bracket.t_low, bracket.t_high);
    let (mut f_a, mut f_b) = (bracket.f_low, bracket.f_high);
    let mut iterations = 0;
    let mut evaluations = 0;

    loop {
        if b - a <= tol_days {
            return Ok(Refinement {
                jd: interpolate(a, f_a, b, f_b),
                status: RefineStatus::Ok,
                achieved_tolerance_seconds: (b - a) * SECONDS_PER_DAY,
                iterations,
                evaluations,
            });
        }
        if iterations >= max_iterations {
            return Ok(Refinement {
                jd: interpolate(a, f_a, b, f_b),
                status: RefineStatus::Degraded,
                achieved_tolerance_seconds: (b - a) * SECONDS_PER_DAY,
                iterations,
                evaluations,
            });
        }

        let mid = 0.5 * (a + b);
        let f_mid = f(mid)?;
        iterations += 1;
        evaluations += 1;

        if is_root(f_mid) {
            return Ok(Refinement {
                jd: mid,
                status: RefineStatus::Ok,
                achieved_tolerance_seconds: 0.0,
                iterations,
                evaluations,
            });
        }
        if (f_a < 0.0) != (f_mid < 0.0) {
            b = mid;
            f_b = f_mid;
        } else {
            a = mid;
            f_a = f_mid;
        }
    }
}

/// Zero of the chord through `(a, f_a)` and `(b, f_b)`, kept inside
/// `[a, b]`; the midpoint when the chord is flat.
fn interpolate(a: f64, f_a: f64, b: f64, f_b: f64) -> f64 {
    let slope = f_b - f_a;
    if slope == 0.0 || !slope.is_finite() {
        return 0.5 * (a + b);
    }
    let t = a - f_a * (b - a) / slope;
    if t.is_finite() {
        t.clamp(a.min(b), a.max(b))
    } else {
        0.5 * (a + b)
    }
}

/// Bisect a boolean transition between `t_false` (predicate false) and
/// `t_true` (predicate true). Either may be the later time.
pub fn refine_transition<P>(
    mut pred: P,
    t_false: f64,
    t_true: f64,
    tolerance_seconds: f64,
    max_iterations: u32,
) -> Result<Refinement, SearchError>
where
    P: FnMut(f64) -> Result<bool, SearchError>,
{
    validate_refine(tolerance_seconds, max_iterations)?;
    let tol_days = tolerance_seconds / SECONDS_PER_DAY;
    let (mut lo, mut hi) = (t_false, t_true);
    let mut iterations = 0;

    while (hi - lo).abs() > tol_days && iterations < max_iterations {
        let mid = 0.5 * (lo + hi);
        if pred(mid)? {
            hi = mid;
        } else {
            lo = mid;
        }
        iterations += 1;
    }

    let width = (hi - lo).abs();
    Ok(Refinement {
        jd: 0.5 * (lo + hi),
        status: if width <= tol_days {
            RefineStatus::Ok
        } else {
            RefineStatus::Degraded
        },
        achieved_tolerance_seconds: width * SECONDS_PER_DAY,
        iterations,
        evaluations: iterations,
    })
}

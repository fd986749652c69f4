//! Angular event search over any [`Provider`](orbis_core::Provider).
//!
//! This crate provides:
//! - Generic bracket scanning and bisection ([`scan_for_bracket`], [`refine`])
//! - Longitude returns: first in a window, or all of them
//! - Rise, set, and upper transit for an observer and day
//! - Visibility windows under compound altitude/solar constraints
//! - A multi-body return scan against a natal chart, with optional house
//!   and aspect decoration
//!
//! Every finder is deterministic for a given provider. "Nothing found" is
//! a value, not an error.

pub mod bracket;
pub mod decorate;
pub mod error;
pub mod return_types;
pub mod returns;
pub mod riseset;
pub mod riseset_types;
pub mod scan;
pub mod scan_types;
pub mod visibility;
pub mod visibility_types;

pub use bracket::{
    Bracket, BracketScan, BracketSweep, CrossingPolicy, MAX_GRID_POINTS, RefineStatus,
    Refinement, ZERO_EPSILON, refine, refine_transition, scan_all_brackets, scan_for_bracket,
    scan_for_bracket_with,
};
pub use decorate::{
    AspectCalculator, AspectHit, BodyPosition, Decorators, EqualHouses, HarmonicAspects,
    HouseCalculator, HouseCusps,
};
pub use error::SearchError;
pub use return_types::{ReturnConfig, ReturnInstant, ReturnNotFound, ReturnOutcome, ReturnStatus};
pub use returns::{
    RESCAN_EPSILON_SECONDS, coarse_step_days, find_all_returns_in_window, find_return_instant,
    period_for,
};
pub use riseset::{find_rise_set, find_transit};
pub use riseset_types::{DayCondition, HorizonEvent, RiseSetConfig, RiseSetEvents, TransitEvent};
pub use scan::{scan_returns, scan_returns_with};
pub use scan_types::{NatalContext, ScanOptions, SpacingPolicy};
pub use visibility::{
    ConstraintEvaluator, ProviderEvaluator, extract_visibility_windows,
    extract_windows_from_samples, sample_range,
};
pub use visibility_types::{
    ConstraintSample, SecondaryLimit, VisibilityConstraints, VisibilityWindow,
};

//! Wrap-safe angle arithmetic for angular event search.
//!
//! This crate provides:
//! - Degree normalization to [0, 360) and signed deltas in [-180, 180)
//! - The half-angle root metric used by longitude searches
//! - [`AngleTracker`], which removes 360° wrap discontinuities from a series
//! - Applying/separating classification for a pair of moving longitudes

pub mod motion;
pub mod normalize;
pub mod tracker;

pub use motion::{RelativeMotion, classify_relative_motion};
pub use normalize::{
    WRAP_EPSILON_DEG, angular_distance, half_angle_metric, normalize_degrees, signed_delta,
};
pub use tracker::AngleTracker;

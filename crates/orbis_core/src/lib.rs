//! Position-provider seam and shared value types for the search engine.
//!
//! This crate provides:
//! - [`Body`], the closed set of body identifiers the engine searches on
//! - [`AngularSample`] and [`TimeWindow`] value types
//! - The [`Provider`] trait, through which every position is obtained
//! - [`CachedProvider`], a bounded LRU wrapper around any provider
//! - [`LinearProvider`] (synthetic constant-rate tracks) and
//!   [`MeanElementsProvider`] (low-precision analytic Sun and Moon)
//! - Horizon coordinates through the [`HorizonTransform`] collaborator
//!
//! All epochs are Julian Dates (days). Each provider reports which time
//! scale its epochs are in via [`Provider::time_scale`].

pub mod body;
pub mod cache;
pub mod horizon;
pub mod julian;
pub mod mean_elements;
pub mod provider;
pub mod sample;
pub mod synthetic;

pub use body::{Body, CLASSICAL_BODIES, ParseBodyError};
pub use cache::{CacheStats, CachedProvider};
pub use horizon::{
    GeoLocation, HorizonTransform, Horizontal, OBLIQUITY_J2000_DEG, SiderealHorizon,
    angular_separation_deg, ecliptic_to_equatorial, gmst_deg,
};
pub use julian::{
    DateParseError, J2000_JD, SECONDS_PER_DAY, calendar_to_jd, format_iso_utc, jd_to_calendar,
    parse_iso_utc,
};
pub use mean_elements::MeanElementsProvider;
pub use provider::{Provider, ProviderError, TROPICAL_YEAR_DAYS};
pub use sample::{AngularSample, Equatorial, InvalidWindow, TimeScale, TimeWindow};
pub use synthetic::{LinearProvider, LinearTrack};

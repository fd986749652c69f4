//! The position-provider seam.

use thiserror::Error;

use crate::body::Body;
use crate::sample::{AngularSample, TimeScale};

/// Fallback period when neither the provider nor the body table knows one.
pub const TROPICAL_YEAR_DAYS: f64 = 365.242_2;

/// Failures surfaced by a [`Provider`].
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("invalid query: {0}")]
    InvalidQuery(&'static str),
    #[error("unsupported body: {0}")]
    UnsupportedBody(Body),
    #[error("epoch out of range: {jd}")]
    EpochOutOfRange { jd: f64 },
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Source of body positions at arbitrary epochs.
///
/// Every search in the engine obtains positions only through this trait.
/// Implementations must be [`Send`] + [`Sync`] so one provider (typically
/// wrapped in [`CachedProvider`](crate::CachedProvider)) can be shared by
/// threads scanning different bodies.
pub trait Provider: Send + Sync {
    /// Position of `body` at `jd` (in [`time_scale`](Self::time_scale)).
    fn sample(&self, body: Body, jd: f64) -> Result<AngularSample, ProviderError>;

    fn supports(&self, _body: Body) -> bool {
        true
    }

    /// Mean period of the body's longitude, used to size coarse scan steps.
    fn mean_period_days(&self, body: Body) -> Option<f64> {
        body.mean_period_days()
    }

    fn time_scale(&self) -> TimeScale {
        TimeScale::Tdb
    }
}

impl<P: Provider + ?Sized> Provider for &P {
    fn sample(&self, body: Body, jd: f64) -> Result<AngularSample, ProviderError> {
        (**self).sample(body, jd)
    }

    fn supports(&self, body: Body) -> bool {
        (**self).supports(body)
    }

    fn mean_period_days(&self, body: Body) -> Option<f64> {
        (**self).mean_period_days(body)
    }

    fn time_scale(&self) -> TimeScale {
        (**self).time_scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl Provider for Fixed {
        fn sample(&self, _body: Body, jd: f64) -> Result<AngularSample, ProviderError> {
            Ok(AngularSample::new(jd, 42.0))
        }
    }

    fn first_longitude<P: Provider>(p: P) -> f64 {
        p.sample(Body::Sun, 0.0).map(|s| s.longitude_deg).unwrap_or(f64::NAN)
    }

    #[test]
    fn defaults_and_reference_impl() {
        let p = Fixed;
        assert!(p.supports(Body::Asteroid(7)));
        assert_eq!(p.time_scale(), TimeScale::Tdb);
        assert_eq!(p.mean_period_days(Body::Mars), Some(686.98));
        assert_eq!(first_longitude(&p), 42.0);
    }

    #[test]
    fn provider_is_object_safe() {
        let p: Box<dyn Provider> = Box::new(Fixed);
        assert_eq!(first_longitude(&*p), 42.0);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            ProviderError::UnsupportedBody(Body::Pluto).to_string(),
            "unsupported body: pluto"
        );
        assert_eq!(
            ProviderError::EpochOutOfRange { jd: 1.5 }.to_string(),
            "epoch out of range: 1.5"
        );
    }
}

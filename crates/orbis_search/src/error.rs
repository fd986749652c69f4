//! Error type for the search engine.

use orbis_core::{Body, InvalidWindow, ProviderError};
use thiserror::Error;

/// Failures of a search call.
///
/// "Nothing found" is never an error: finders report it through
/// [`ReturnOutcome::NotFound`](crate::ReturnOutcome), `None`, or an empty
/// vector.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SearchError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    InvalidWindow(#[from] InvalidWindow),
    #[error("unsupported body: {0}")]
    UnsupportedBody(Body),
    #[error("provider returned no equatorial coordinates for {0}")]
    MissingEquatorial(Body),
    #[error("invalid location: {0}")]
    InvalidLocation(&'static str),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

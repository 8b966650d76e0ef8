//! Errors from the location and prayer-time collaborators

use thiserror::Error;

use crate::time::TimeError;

/// Failures while resolving a location or fetching prayer times
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No place matched the query, or the coordinates are not on Earth
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// The geocoding service refused the request
    #[error("Location access denied: {0}")]
    LocationAccessDenied(String),

    /// The prayer-time service failed or answered with something unusable
    #[error("Prayer time provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A time value could not be read
    #[error(transparent)]
    InvalidTime(#[from] TimeError),
}

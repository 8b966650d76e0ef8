//! Error types for clock-time parsing and window computation

use thiserror::Error;

/// Errors raised by the time-window core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// A clock-time string did not match the expected format
    #[error("invalid time format {input:?}: {reason}")]
    InvalidTimeFormat { input: String, reason: String },

    /// The night between Maghrib and Fajr has no length
    #[error("degenerate Tahajjud window at {at}")]
    DegenerateWindow { at: String },
}

impl TimeError {
    pub(crate) fn invalid(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTimeFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

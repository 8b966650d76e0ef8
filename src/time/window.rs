//! Tahajjud window calculation
//!
//! The night runs from Maghrib to Fajr. When Fajr's clock time falls earlier
//! in the day than Maghrib's, the night crosses midnight and Fajr belongs to
//! the following calendar day. The window is the final third of that night.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Clock, ClockTime, TimeError};

const MS_PER_MINUTE: i64 = 60_000;

/// The last third of the night
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TahajjudWindow {
    pub start: ClockTime,
    pub end: ClockTime,
    pub duration_minutes: i64,
}

impl TahajjudWindow {
    pub fn is_degenerate(&self) -> bool {
        self.duration_minutes == 0 && self.start == self.end
    }

    /// Err for a zero-length window. Not fatal: the window is still usable.
    pub fn check_duration(&self) -> Result<(), TimeError> {
        if self.is_degenerate() {
            return Err(TimeError::DegenerateWindow {
                at: self.start.to_string(),
            });
        }
        Ok(())
    }

    /// Duration as `"3h 10m"`
    pub fn duration_display(&self) -> String {
        format!("{}h {}m", self.duration_minutes / 60, self.duration_minutes % 60)
    }
}

/// Anchor a clock time to a calendar day
pub(crate) fn anchor(day: NaiveDate, time: ClockTime) -> NaiveDateTime {
    day.and_time(time.to_naive_time())
}

/// Seconds are dropped, not rounded
fn truncate_to_minute(instant: NaiveDateTime) -> ClockTime {
    ClockTime::from_naive_time(instant.time())
}

/// Compute the window for a night anchored on `day`
pub fn compute_window_on(day: NaiveDate, maghrib: ClockTime, fajr: ClockTime) -> TahajjudWindow {
    let maghrib_at = anchor(day, maghrib);
    let mut fajr_at = anchor(day, fajr);

    if fajr_at < maghrib_at {
        fajr_at += Duration::days(1);
    }

    let night_ms = (fajr_at - maghrib_at).num_milliseconds();
    let third_ms = night_ms / 3;
    let start_at = maghrib_at + Duration::milliseconds(2 * third_ms);

    // Round half up, night_ms is never negative here.
    let duration_minutes = (third_ms + MS_PER_MINUTE / 2) / MS_PER_MINUTE;

    debug!(
        "Night {} -> {} lasts {} min, last third starts {}",
        maghrib_at, fajr_at, night_ms / MS_PER_MINUTE, start_at
    );

    TahajjudWindow {
        start: truncate_to_minute(start_at),
        end: truncate_to_minute(fajr_at),
        duration_minutes,
    }
}

/// Compute the window for tonight using the given clock
pub fn compute_window(clock: &dyn Clock, maghrib: ClockTime, fajr: ClockTime) -> TahajjudWindow {
    compute_window_on(clock.today(), maghrib, fajr)
}

/// String form of [`compute_window`], for `"H:MM AM|PM"` inputs
pub fn calculate_window(
    clock: &dyn Clock,
    maghrib: &str,
    fajr: &str,
) -> Result<TahajjudWindow, TimeError> {
    let maghrib: ClockTime = maghrib.parse()?;
    let fajr: ClockTime = fajr.parse()?;
    Ok(compute_window(clock, maghrib, fajr))
}

/// Window calculator bound to a clock
#[derive(Clone)]
pub struct WindowCalculator {
    clock: Arc<dyn Clock>,
}

impl WindowCalculator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn compute(&self, maghrib: ClockTime, fajr: ClockTime) -> TahajjudWindow {
        compute_window(self.clock.as_ref(), maghrib, fajr)
    }
}

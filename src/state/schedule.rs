//! The night schedule currently being counted down

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    services::{Location, PrayerTimes},
    time::TahajjudWindow,
};

/// Where the prayer times came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleSource {
    City { query: String },
    Coordinates,
    Manual,
}

impl ScheduleSource {
    /// Location-sourced schedules can be fetched again for a new day
    pub fn is_refreshable(&self) -> bool {
        !matches!(self, ScheduleSource::Manual)
    }
}

/// Prayer times for one night and the Tahajjud window derived from them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightSchedule {
    pub source: ScheduleSource,
    pub location: Option<Location>,
    pub prayer_times: PrayerTimes,
    pub window: TahajjudWindow,
    pub fetched_on: NaiveDate,
}

impl NightSchedule {
    /// True once the calendar has moved past the day the times were fetched for
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.source.is_refreshable() && self.location.is_some() && today > self.fetched_on
    }
}

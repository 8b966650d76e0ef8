//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    services::{Location, PrayerTimes},
    state::NightSchedule,
    time::{ClockTime, CountdownState, TahajjudWindow},
};

/// POST /city body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityRequest {
    pub city: String,
}

/// POST /coordinates body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatesRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// POST /manual body, both times in 24-hour `"HH:MM"` form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualTimesRequest {
    pub maghrib: String,
    pub fajr: String,
}

/// API response structure for schedule-changing endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub schedule: Option<NightSchedule>,
}

impl ApiResponse {
    pub fn new(status: String, message: String, schedule: Option<NightSchedule>) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            schedule,
        }
    }

    /// A new schedule is in effect
    pub fn scheduled(message: String, schedule: NightSchedule) -> Self {
        Self::new("scheduled".to_string(), message, Some(schedule))
    }

    /// No schedule is in effect
    pub fn cleared(message: String) -> Self {
        Self::new("cleared".to_string(), message, None)
    }
}

/// Window details with the times it was derived from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowResponse {
    pub start: ClockTime,
    pub end: ClockTime,
    pub duration_minutes: i64,
    pub duration: String,
    pub maghrib: ClockTime,
    pub fajr: ClockTime,
    pub date: String,
    pub hijri_date: String,
    pub location: Option<Location>,
}

impl WindowResponse {
    pub fn new(
        window: &TahajjudWindow,
        prayer_times: &PrayerTimes,
        location: Option<Location>,
    ) -> Self {
        Self {
            start: window.start,
            end: window.end,
            duration_minutes: window.duration_minutes,
            duration: window.duration_display(),
            maghrib: prayer_times.maghrib,
            fajr: prayer_times.fajr,
            date: prayer_times.date.clone(),
            hijri_date: prayer_times.hijri_date.clone(),
            location,
        }
    }
}

impl From<&NightSchedule> for WindowResponse {
    fn from(schedule: &NightSchedule) -> Self {
        Self::new(&schedule.window, &schedule.prayer_times, schedule.location.clone())
    }
}

/// Countdown tick plus the values a display needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownResponse {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub is_active: bool,
    pub message: String,
    pub label: String,
    pub total_seconds: u64,
    pub display: String,
    pub compact: String,
    pub progress_percent: f64,
}

impl From<CountdownState> for CountdownResponse {
    fn from(state: CountdownState) -> Self {
        Self {
            label: state.label().to_string(),
            total_seconds: state.total_seconds(),
            display: state.clock_display(),
            compact: state.compact_display(),
            progress_percent: state.progress_percent(),
            hours: state.hours,
            minutes: state.minutes,
            seconds: state.seconds,
            is_active: state.is_active,
            message: state.message,
        }
    }
}

/// Status response with schedule and countdown information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub schedule: Option<NightSchedule>,
    pub countdown: Option<CountdownResponse>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

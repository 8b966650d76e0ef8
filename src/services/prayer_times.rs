//! Daily Maghrib and Fajr times

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Location, ProviderError};
use crate::time::{ClockTime, TimeError};

/// Default Aladhan API base URL
pub const DEFAULT_PRAYER_API: &str = "https://api.aladhan.com/v1";

/// Islamic Society of North America
pub const DEFAULT_METHOD: u8 = 2;

pub const PRAYER_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shown in place of a Hijri date when times were typed in by hand
pub const MANUAL_HIJRI_DATE: &str = "Manual Entry";

/// The two anchor times of a night plus the dates they belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerTimes {
    pub maghrib: ClockTime,
    pub fajr: ClockTime,
    pub date: String,
    pub hijri_date: String,
}

/// Looks up prayer times for a place and day
#[async_trait]
pub trait PrayerTimeProvider: Send + Sync {
    async fn prayer_times(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> Result<PrayerTimes, ProviderError>;
}

/// Prayer times typed in by the user as 24-hour `"HH:MM"` values
pub fn manual_prayer_times(
    maghrib: &str,
    fajr: &str,
    today: NaiveDate,
) -> Result<PrayerTimes, TimeError> {
    Ok(PrayerTimes {
        maghrib: ClockTime::parse_24h(maghrib)?,
        fajr: ClockTime::parse_24h(fajr)?,
        date: today.format("%B %-d, %Y").to_string(),
        hijri_date: MANUAL_HIJRI_DATE.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct TimingsEnvelope {
    data: TimingsData,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: Timings,
    date: DateInfo,
}

#[derive(Debug, Deserialize)]
struct Timings {
    #[serde(rename = "Maghrib")]
    maghrib: String,
    #[serde(rename = "Fajr")]
    fajr: String,
}

#[derive(Debug, Deserialize)]
struct DateInfo {
    gregorian: CalendarDate,
    hijri: CalendarDate,
}

#[derive(Debug, Deserialize)]
struct CalendarDate {
    day: String,
    month: MonthName,
    year: String,
}

#[derive(Debug, Deserialize)]
struct MonthName {
    en: String,
}

impl CalendarDate {
    fn display(&self) -> String {
        format!("{} {} {}", self.day, self.month.en, self.year)
    }
}

fn prayer_times_from(envelope: TimingsEnvelope) -> Result<PrayerTimes, ProviderError> {
    let data = envelope.data;
    Ok(PrayerTimes {
        maghrib: ClockTime::parse_provider_time(&data.timings.maghrib)?,
        fajr: ClockTime::parse_provider_time(&data.timings.fajr)?,
        date: data.date.gregorian.display(),
        hijri_date: format!("{} AH", data.date.hijri.display()),
    })
}

/// Provider backed by the Aladhan timings endpoint
#[derive(Debug, Clone)]
pub struct AladhanProvider {
    client: Client,
    base_url: String,
    method: u8,
}

impl AladhanProvider {
    pub fn new(base_url: impl Into<String>, method: u8) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(PRAYER_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                ProviderError::ProviderUnavailable(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self::with_client(client, base_url, method))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, method: u8) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            method,
        }
    }

    pub fn method(&self) -> u8 {
        self.method
    }

    fn timings_url(&self, date: NaiveDate) -> String {
        format!("{}/timings/{}", self.base_url, date.format("%d-%m-%Y"))
    }
}

#[async_trait]
impl PrayerTimeProvider for AladhanProvider {
    async fn prayer_times(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> Result<PrayerTimes, ProviderError> {
        let unavailable = |e: String| {
            ProviderError::ProviderUnavailable(format!("Failed to get prayer times: {}", e))
        };
        let url = self.timings_url(date);
        debug!("Fetching prayer times from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("method", self.method.to_string()),
            ])
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("provider answered {}", response.status())));
        }

        let envelope: TimingsEnvelope = response
            .json()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        let times = prayer_times_from(envelope).map_err(|e| unavailable(e.to_string()))?;

        info!(
            "Prayer times for {} on {}: Maghrib {}, Fajr {}",
            location.city, times.date, times.maghrib, times.fajr
        );
        Ok(times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "05:52", "Sunrise": "07:23", "Maghrib": "17:57 (BST)", "Isha": "19:22"
            },
            "date": {
                "readable": "19 Oct 2026",
                "gregorian": {
                    "day": "19", "month": {"number": 10, "en": "October"}, "year": "2026"
                },
                "hijri": {
                    "day": "08", "month": {"number": 5, "en": "Jumādá al-ūlá"}, "year": "1448"
                }
            }
        }
    }"#;

    #[test]
    fn parses_aladhan_timings() {
        let envelope: TimingsEnvelope = serde_json::from_str(SAMPLE).unwrap();
        let times = prayer_times_from(envelope).unwrap();

        assert_eq!(times.maghrib.to_string(), "5:57 PM");
        assert_eq!(times.fajr.to_string(), "5:52 AM");
        assert_eq!(times.date, "19 October 2026");
        assert_eq!(times.hijri_date, "08 Jumādá al-ūlá 1448 AH");
    }

    #[test]
    fn unreadable_timing_is_an_error() {
        let broken = SAMPLE.replace("05:52", "dawn");
        let envelope: TimingsEnvelope = serde_json::from_str(&broken).unwrap();
        assert!(matches!(
            prayer_times_from(envelope),
            Err(ProviderError::InvalidTime(TimeError::InvalidTimeFormat { .. }))
        ));
    }

    #[test]
    fn manual_entry_converts_twenty_four_hour_input() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let times = manual_prayer_times("19:30", "05:00", today).unwrap();

        assert_eq!(times.maghrib.to_string(), "7:30 PM");
        assert_eq!(times.fajr.to_string(), "5:00 AM");
        assert_eq!(times.date, "October 19, 2026");
        assert_eq!(times.hijri_date, MANUAL_HIJRI_DATE);

        assert!(manual_prayer_times("7:30 PM", "05:00", today).is_err());
    }

    #[test]
    fn timings_url_uses_day_month_year() {
        let provider =
            AladhanProvider::with_client(Client::new(), "https://example.test/v1/", DEFAULT_METHOD);
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(provider.timings_url(date), "https://example.test/v1/timings/07-03-2026");
        assert_eq!(provider.method(), 2);
    }
}

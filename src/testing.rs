//! Fakes shared by unit tests

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    services::{Location, LocationResolver, PrayerTimeProvider, PrayerTimes, ProviderError},
    state::AppState,
    time::{countdown::TICK_PERIOD, ClockTime, FixedClock},
};

pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

/// Knows one city and answers every coordinate pair
pub struct StaticResolver;

#[async_trait]
impl LocationResolver for StaticResolver {
    async fn by_city(&self, city: &str) -> Result<Location, ProviderError> {
        if city.trim().eq_ignore_ascii_case("mecca") {
            Ok(Location {
                latitude: 21.4225,
                longitude: 39.8262,
                city: "Mecca".to_string(),
                country: "Saudi Arabia".to_string(),
            })
        } else {
            Err(ProviderError::LocationNotFound(city.to_string()))
        }
    }

    async fn by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Location, ProviderError> {
        Ok(Location {
            latitude,
            longitude,
            city: "Unknown".to_string(),
            country: "Unknown".to_string(),
        })
    }
}

/// Same Maghrib/Fajr every day
pub struct StaticProvider {
    pub maghrib: &'static str,
    pub fajr: &'static str,
}

#[async_trait]
impl PrayerTimeProvider for StaticProvider {
    async fn prayer_times(
        &self,
        _location: &Location,
        date: NaiveDate,
    ) -> Result<PrayerTimes, ProviderError> {
        Ok(PrayerTimes {
            maghrib: ClockTime::parse_24h(self.maghrib)?,
            fajr: ClockTime::parse_24h(self.fajr)?,
            date: date.to_string(),
            hijri_date: "1 Muharram 1448 AH".to_string(),
        })
    }
}

pub fn state_at(now: NaiveDateTime) -> (Arc<AppState>, Arc<FixedClock>) {
    state_with_period(now, TICK_PERIOD)
}

pub fn state_with_period(now: NaiveDateTime, period: Duration) -> (Arc<AppState>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(now));
    let state = AppState::new(
        0,
        "127.0.0.1".to_string(),
        clock.clone(),
        Arc::new(StaticResolver),
        Arc::new(StaticProvider { maghrib: "18:00", fajr: "05:00" }),
    )
    .with_tick_period(period);
    (Arc::new(state), clock)
}

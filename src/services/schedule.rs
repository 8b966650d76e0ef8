//! Builds a [`NightSchedule`] from the collaborators and the window calculator

use tracing::{info, warn};

use super::{manual_prayer_times, Location, LocationResolver, PrayerTimeProvider, ProviderError};
use crate::{
    state::{NightSchedule, ScheduleSource},
    time::{compute_window, Clock},
};

async fn load_for_location(
    provider: &dyn PrayerTimeProvider,
    clock: &dyn Clock,
    location: Location,
    source: ScheduleSource,
) -> Result<NightSchedule, ProviderError> {
    let today = clock.today();
    let prayer_times = provider.prayer_times(&location, today).await?;
    let window = compute_window(clock, prayer_times.maghrib, prayer_times.fajr);

    if let Err(e) = window.check_duration() {
        warn!("{}", e);
    }
    info!(
        "Tahajjud for {}: {} - {} ({})",
        location.city,
        window.start,
        window.end,
        window.duration_display()
    );

    Ok(NightSchedule {
        source,
        location: Some(location),
        prayer_times,
        window,
        fetched_on: today,
    })
}

/// Resolve a city name, then fetch tonight's times for it
pub async fn load_for_city(
    resolver: &dyn LocationResolver,
    provider: &dyn PrayerTimeProvider,
    clock: &dyn Clock,
    city: &str,
) -> Result<NightSchedule, ProviderError> {
    let location = resolver.by_city(city).await?;
    let source = ScheduleSource::City {
        query: city.trim().to_string(),
    };
    load_for_location(provider, clock, location, source).await
}

/// Reverse geocode coordinates, then fetch tonight's times for them
pub async fn load_for_coordinates(
    resolver: &dyn LocationResolver,
    provider: &dyn PrayerTimeProvider,
    clock: &dyn Clock,
    latitude: f64,
    longitude: f64,
) -> Result<NightSchedule, ProviderError> {
    let location = resolver.by_coordinates(latitude, longitude).await?;
    load_for_location(provider, clock, location, ScheduleSource::Coordinates).await
}

/// Build a schedule from hand-entered 24-hour times
pub fn load_manual(
    clock: &dyn Clock,
    maghrib: &str,
    fajr: &str,
) -> Result<NightSchedule, ProviderError> {
    let today = clock.today();
    let prayer_times = manual_prayer_times(maghrib, fajr, today)?;
    let window = compute_window(clock, prayer_times.maghrib, prayer_times.fajr);

    if let Err(e) = window.check_duration() {
        warn!("{}", e);
    }
    info!(
        "Manual Tahajjud window: {} - {} ({})",
        window.start,
        window.end,
        window.duration_display()
    );

    Ok(NightSchedule {
        source: ScheduleSource::Manual,
        location: None,
        prayer_times,
        window,
        fetched_on: today,
    })
}

/// Fetch today's times again for the place a schedule was built for
pub async fn refresh(
    provider: &dyn PrayerTimeProvider,
    clock: &dyn Clock,
    schedule: &NightSchedule,
) -> Result<NightSchedule, ProviderError> {
    let location = schedule
        .location
        .clone()
        .ok_or_else(|| ProviderError::LocationNotFound("schedule has no location".to_string()))?;
    load_for_location(provider, clock, location, schedule.source.clone()).await
}

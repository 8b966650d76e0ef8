//! Daily prayer-time refresh task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::{services::refresh, state::AppState};

/// Re-fetch prayer times once the calendar day has moved on.
///
/// Returns `Ok(true)` when the schedule was replaced. Manual schedules and
/// schedules already fetched today are left alone.
pub async fn refresh_if_stale(state: &AppState) -> Result<bool, String> {
    let Some(schedule) = state.get_schedule()? else {
        return Ok(false);
    };

    let today = state.clock.today();
    if !schedule.is_stale(today) {
        return Ok(false);
    }

    info!("Prayer times from {} are stale, fetching times for {}", schedule.fetched_on, today);
    let fresh = refresh(state.prayer_provider.as_ref(), state.clock.as_ref(), &schedule)
        .await
        .map_err(|e| format!("Failed to refresh prayer times: {}", e))?;

    // Someone may have replaced the schedule while we were fetching
    if state.get_schedule()?.as_ref() != Some(&schedule) {
        debug!("Schedule changed during refresh, discarding refreshed times");
        return Ok(false);
    }

    state.set_schedule("refresh", fresh)?;
    Ok(true)
}

/// Background task that periodically checks for a new day
pub async fn schedule_refresh_task(state: Arc<AppState>, period: Duration) {
    info!("Starting schedule refresh task (every {}s)", period.as_secs());

    let mut interval = interval(period);

    loop {
        interval.tick().await;

        match refresh_if_stale(&state).await {
            Ok(true) => info!("Schedule refreshed for the new day"),
            Ok(false) => {}
            Err(e) => warn!("{}", e),
        }
    }
}

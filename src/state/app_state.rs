//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::NightSchedule;
use crate::{
    services::{LocationResolver, PrayerTimeProvider},
    time::{countdown::TICK_PERIOD, countdown_at, Clock, CountdownState, TahajjudWindow},
};

/// Shared state behind the HTTP API and the background tasks
pub struct AppState {
    /// Wall-clock source for every "today" anchoring
    pub clock: Arc<dyn Clock>,
    /// External collaborators
    pub resolver: Arc<dyn LocationResolver>,
    pub prayer_provider: Arc<dyn PrayerTimeProvider>,
    /// Schedule being counted down, if any
    pub schedule: Arc<Mutex<Option<NightSchedule>>>,
    /// Latest countdown tick
    pub countdown: Arc<Mutex<Option<CountdownState>>>,
    pub tick_period: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Window changes, `None` when the schedule is cleared
    pub window_change_tx: broadcast::Sender<Option<TahajjudWindow>>,
    /// Countdown ticks
    pub countdown_tx: watch::Sender<Option<CountdownState>>,
    /// Keep the receiver alive to prevent channel closure
    pub _countdown_rx: watch::Receiver<Option<CountdownState>>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        clock: Arc<dyn Clock>,
        resolver: Arc<dyn LocationResolver>,
        prayer_provider: Arc<dyn PrayerTimeProvider>,
    ) -> Self {
        let (window_change_tx, _) = broadcast::channel(16);
        let (countdown_tx, countdown_rx) = watch::channel(None);

        Self {
            clock,
            resolver,
            prayer_provider,
            schedule: Arc::new(Mutex::new(None)),
            countdown: Arc::new(Mutex::new(None)),
            tick_period: TICK_PERIOD,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            window_change_tx,
            countdown_tx,
            _countdown_rx: countdown_rx,
        }
    }

    /// Override the countdown tick period
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn notify_window(&self, window: Option<TahajjudWindow>) {
        // No receivers just means the countdown task has not subscribed yet
        if let Err(e) = self.window_change_tx.send(window) {
            warn!("No listener for window change: {}", e);
        }
    }

    /// Replace the current schedule and restart the countdown for its window
    pub fn set_schedule(
        &self,
        action: &str,
        schedule: NightSchedule,
    ) -> Result<NightSchedule, String> {
        let mut current = self.schedule.lock()
            .map_err(|e| format!("Failed to lock schedule: {}", e))?;

        *current = Some(schedule.clone());
        drop(current);

        // The last tick belongs to the previous window
        self.update_countdown(None)?;

        info!(
            "Schedule set by {}: Maghrib {}, Fajr {}, Tahajjud {} - {}",
            action,
            schedule.prayer_times.maghrib,
            schedule.prayer_times.fajr,
            schedule.window.start,
            schedule.window.end
        );
        self.record_action(action);
        self.notify_window(Some(schedule.window));

        Ok(schedule)
    }

    /// Drop the current schedule and stop the countdown
    pub fn clear_schedule(&self, action: &str) -> Result<(), String> {
        let mut current = self.schedule.lock()
            .map_err(|e| format!("Failed to lock schedule: {}", e))?;
        let had_schedule = current.take().is_some();
        drop(current);

        if had_schedule {
            info!("Schedule cleared by {}", action);
        }
        self.record_action(action);
        self.update_countdown(None)?;
        self.notify_window(None);
        Ok(())
    }

    pub fn get_schedule(&self) -> Result<Option<NightSchedule>, String> {
        self.schedule.lock()
            .map(|schedule| schedule.clone())
            .map_err(|e| format!("Failed to lock schedule: {}", e))
    }

    pub fn get_window(&self) -> Result<Option<TahajjudWindow>, String> {
        Ok(self.get_schedule()?.map(|schedule| schedule.window))
    }

    /// Latest tick, or a fresh evaluation if the countdown has not ticked yet
    pub fn get_countdown(&self) -> Result<Option<CountdownState>, String> {
        let latest = self.countdown.lock()
            .map(|countdown| countdown.clone())
            .map_err(|e| format!("Failed to lock countdown: {}", e))?;

        match latest {
            Some(state) => Ok(Some(state)),
            None => Ok(self
                .get_window()?
                .map(|window| countdown_at(&window, self.clock.now()))),
        }
    }

    /// Store a countdown tick and notify watchers
    pub fn update_countdown(&self, state: Option<CountdownState>) -> Result<(), String> {
        let mut countdown = self.countdown.lock()
            .map_err(|e| format!("Failed to lock countdown: {}", e))?;

        *countdown = state.clone();
        drop(countdown);

        if let Err(e) = self.countdown_tx.send(state) {
            warn!("Failed to send countdown update: {}", e);
        }

        Ok(())
    }

    /// Store a tick produced for `window`.
    ///
    /// Ticks for a window that is no longer current are dropped and `Ok(false)`
    /// is returned.
    pub fn record_tick(
        &self,
        window: &TahajjudWindow,
        tick: CountdownState,
    ) -> Result<bool, String> {
        if self.get_window()?.as_ref() != Some(window) {
            return Ok(false);
        }

        let previous = self.countdown.lock()
            .map(|countdown| countdown.clone())
            .map_err(|e| format!("Failed to lock countdown: {}", e))?;

        match previous {
            Some(ref prev) if prev.is_active != tick.is_active => {
                if tick.is_active {
                    info!("Tahajjud has begun, ends at {}", window.end);
                } else {
                    info!("Tahajjud window closed, next starts at {}", window.start);
                }
            }
            _ => {}
        }

        self.update_countdown(Some(tick))?;
        Ok(true)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::load_manual, testing::{at, state_at}};

    #[test]
    fn set_schedule_broadcasts_window() {
        let (state, _) = state_at(at(22, 0, 0));
        let mut rx = state.window_change_tx.subscribe();

        let schedule = load_manual(state.clock.as_ref(), "19:30", "05:00").unwrap();
        state.set_schedule("manual", schedule.clone()).unwrap();

        assert_eq!(rx.try_recv().unwrap(), Some(schedule.window));
        assert_eq!(state.get_window().unwrap(), Some(schedule.window));
        assert_eq!(state.get_last_action().0.as_deref(), Some("manual"));
    }

    #[test]
    fn countdown_falls_back_to_fresh_evaluation() {
        let (state, _) = state_at(at(22, 0, 0));
        assert_eq!(state.get_countdown().unwrap(), None);

        let schedule = load_manual(state.clock.as_ref(), "19:30", "05:00").unwrap();
        state.set_schedule("manual", schedule).unwrap();

        // 10:00 PM -> 1:50 AM
        let countdown = state.get_countdown().unwrap().unwrap();
        assert!(!countdown.is_active);
        assert_eq!((countdown.hours, countdown.minutes), (3, 50));
    }

    #[test]
    fn ticks_for_replaced_windows_are_dropped() {
        let (state, _) = state_at(at(22, 0, 0));
        let old = load_manual(state.clock.as_ref(), "19:30", "05:00").unwrap();
        let new = load_manual(state.clock.as_ref(), "18:00", "06:00").unwrap();
        state.set_schedule("manual", new.clone()).unwrap();

        let tick = countdown_at(&old.window, state.clock.now());
        assert!(!state.record_tick(&old.window, tick).unwrap());
        assert_eq!(*state.countdown_tx.borrow(), None);

        let tick = countdown_at(&new.window, state.clock.now());
        assert!(state.record_tick(&new.window, tick.clone()).unwrap());
        assert_eq!(*state.countdown_tx.borrow(), Some(tick));
    }

    #[test]
    fn new_schedule_discards_previous_tick() {
        let (state, _) = state_at(at(22, 0, 0));
        let first = load_manual(state.clock.as_ref(), "19:30", "05:00").unwrap();
        state.set_schedule("manual", first).unwrap();
        state.update_countdown(Some(CountdownState::passed())).unwrap();

        // 18:00 -> 06:00 puts the window at 2:00 AM
        let second = load_manual(state.clock.as_ref(), "18:00", "06:00").unwrap();
        state.set_schedule("manual", second).unwrap();

        assert!(state.countdown_tx.borrow().is_none());
        let countdown = state.get_countdown().unwrap().unwrap();
        assert!(!countdown.has_passed());
        assert_eq!((countdown.hours, countdown.minutes), (4, 0));
    }

    #[test]
    fn clear_schedule_resets_countdown() {
        let (state, _) = state_at(at(22, 0, 0));
        let schedule = load_manual(state.clock.as_ref(), "19:30", "05:00").unwrap();
        state.set_schedule("manual", schedule).unwrap();
        state.update_countdown(Some(CountdownState::passed())).unwrap();

        let mut rx = state.window_change_tx.subscribe();
        state.clear_schedule("clear").unwrap();

        assert_eq!(rx.try_recv().unwrap(), None);
        assert_eq!(state.get_schedule().unwrap(), None);
        assert_eq!(state.get_countdown().unwrap(), None);
        assert!(state.countdown_tx.borrow().is_none());
    }
}

//! Live countdown toward the next boundary of a Tahajjud window
//!
//! Every tick re-anchors the window's clock times to the current day and
//! re-derives whether we are inside the window. There is no stored
//! "previous state": the same `now` always produces the same countdown.

use std::{sync::Arc, time::Duration as StdDuration};

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info};

use super::{window::anchor, Clock, TahajjudWindow};

/// Remaining time is rendered as a fraction of this span
pub const PROGRESS_SPAN_SECS: u64 = 12 * 3600;

/// Shown when the target boundary is already behind us
pub const PASSED_MESSAGE: &str = "Time has passed";

/// Default tick period
pub const TICK_PERIOD: StdDuration = StdDuration::from_secs(1);

/// Countdown snapshot produced once per tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub is_active: bool,
    pub message: String,
}

impl CountdownState {
    /// Terminal state used when the target is not in the future
    pub fn passed() -> Self {
        Self {
            hours: 0,
            minutes: 0,
            seconds: 0,
            is_active: false,
            message: PASSED_MESSAGE.to_string(),
        }
    }

    fn from_millis(diff_ms: u64, is_active: bool) -> Self {
        Self {
            hours: diff_ms / 3_600_000,
            minutes: (diff_ms % 3_600_000) / 60_000,
            seconds: (diff_ms % 60_000) / 1000,
            is_active,
            message: String::new(),
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }

    pub fn has_passed(&self) -> bool {
        self.message == PASSED_MESSAGE
    }

    /// Remaining time as a percentage of [`PROGRESS_SPAN_SECS`], clamped to 0..=100
    pub fn progress_percent(&self) -> f64 {
        self.progress_percent_over(PROGRESS_SPAN_SECS)
    }

    pub fn progress_percent_over(&self, span_secs: u64) -> f64 {
        if span_secs == 0 {
            return 0.0;
        }
        (self.total_seconds() as f64 / span_secs as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// `"HH:MM:SS"`
    pub fn clock_display(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }

    /// `"2h 5m 3s"`, leading zero units omitted
    pub fn compact_display(&self) -> String {
        let mut out = String::new();
        if self.hours > 0 {
            out.push_str(&format!("{}h ", self.hours));
        }
        if self.minutes > 0 {
            out.push_str(&format!("{}m ", self.minutes));
        }
        out.push_str(&format!("{}s", self.seconds));
        out
    }

    pub fn label(&self) -> &'static str {
        if self.is_active {
            "Tahajjud ends in"
        } else {
            "Tahajjud starts in"
        }
    }
}

/// Whether `now` falls inside the window.
///
/// Start and end are both anchored to today. A window whose end clock time
/// precedes its start spans midnight, so its end moves to tomorrow.
pub fn is_window_active(window: &TahajjudWindow, now: NaiveDateTime) -> bool {
    let today = now.date();
    let start = anchor(today, window.start);
    let mut end = anchor(today, window.end);

    if end < start {
        end += Duration::days(1);
    }

    now >= start && now <= end
}

/// Countdown toward the window end while active, otherwise toward its start
pub fn countdown_at(window: &TahajjudWindow, now: NaiveDateTime) -> CountdownState {
    let is_active = is_window_active(window, now);
    let target_time = if is_active { window.end } else { window.start };

    let mut target = anchor(now.date(), target_time);
    if target < now {
        target += Duration::days(1);
    }

    let diff_ms = (target - now).num_milliseconds();
    if diff_ms <= 0 {
        return CountdownState::passed();
    }

    CountdownState::from_millis(diff_ms as u64, is_active)
}

/// Re-evaluates a window against a clock, once per tick
#[derive(Clone)]
pub struct CountdownEngine {
    clock: Arc<dyn Clock>,
    period: StdDuration,
}

impl CountdownEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            period: TICK_PERIOD,
        }
    }

    pub fn with_period(mut self, period: StdDuration) -> Self {
        self.period = period;
        self
    }

    pub fn period(&self) -> StdDuration {
        self.period
    }

    /// Evaluate the window at the clock's current instant
    pub fn evaluate(&self, window: &TahajjudWindow) -> CountdownState {
        countdown_at(window, self.clock.now())
    }

    /// Start ticking. The first tick fires immediately.
    ///
    /// The task runs until the returned handle is stopped or dropped.
    pub fn start<F>(&self, window: TahajjudWindow, mut on_tick: F) -> CountdownHandle
    where
        F: FnMut(CountdownState) + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let clock = Arc::clone(&self.clock);
        let period = self.period;

        info!(
            "Starting countdown for window {} - {} ({} min)",
            window.start, window.end, window.duration_minutes
        );

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        debug!("Countdown for window {} - {} stopped", window.start, window.end);
                        break;
                    }
                    _ = ticker.tick() => {
                        on_tick(countdown_at(&window, clock.now()));
                    }
                }
            }
        });

        CountdownHandle {
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }
}

/// Cancels its countdown task when stopped or dropped
#[derive(Debug)]
pub struct CountdownHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CountdownHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signal the task to stop without waiting for it
    pub fn cancel(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Stop the task and wait until it has exited
    pub async fn stop(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        if self.stop_tx.is_some() {
            debug!("Countdown handle dropped while running, cancelling task");
        }
        self.cancel();
    }
}

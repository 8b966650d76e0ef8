//! Countdown background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::{
    state::AppState,
    time::{CountdownEngine, CountdownHandle, TahajjudWindow},
};

fn start_countdown(
    engine: &CountdownEngine,
    state: &Arc<AppState>,
    window: TahajjudWindow,
) -> CountdownHandle {
    let tick_state = Arc::clone(state);
    engine.start(window, move |tick| {
        if let Err(e) = tick_state.record_tick(&window, tick) {
            error!("Failed to record countdown tick: {}", e);
        }
    })
}

async fn stop_countdown(handle: &mut Option<CountdownHandle>) {
    if let Some(running) = handle.take() {
        running.stop().await;
    }
}

/// Background task that keeps one countdown running for the current window.
///
/// Each window change stops the previous countdown before the next one starts,
/// so at most one ticking task exists at a time.
pub async fn countdown_task(state: Arc<AppState>) {
    info!("Starting countdown task");

    let mut window_rx = state.window_change_tx.subscribe();
    let engine = CountdownEngine::new(Arc::clone(&state.clock)).with_period(state.tick_period);
    let mut handle: Option<CountdownHandle> = None;

    // A schedule may have been loaded before we subscribed
    match state.get_window() {
        Ok(Some(window)) => handle = Some(start_countdown(&engine, &state, window)),
        Ok(None) => debug!("No schedule yet, waiting for one"),
        Err(e) => error!("Failed to read initial window: {}", e),
    }

    loop {
        match window_rx.recv().await {
            Ok(Some(window)) => {
                stop_countdown(&mut handle).await;
                handle = Some(start_countdown(&engine, &state, window));
            }
            Ok(None) => {
                stop_countdown(&mut handle).await;
                if let Err(e) = state.update_countdown(None) {
                    error!("Failed to clear countdown: {}", e);
                }
                info!("Schedule cleared, countdown stopped");
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Missed {} window changes, resyncing with current schedule", skipped);
                stop_countdown(&mut handle).await;
                match state.get_window() {
                    Ok(Some(window)) => handle = Some(start_countdown(&engine, &state, window)),
                    Ok(None) => {}
                    Err(e) => error!("Failed to read window: {}", e),
                }
            }
            Err(RecvError::Closed) => {
                info!("Window channel closed, stopping countdown task");
                stop_countdown(&mut handle).await;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::load_manual,
        testing::{at, state_with_period},
    };
    use std::time::Duration;

    fn is_active(state: &AppState) -> bool {
        state.countdown_tx.borrow().as_ref().is_some_and(|t| t.is_active)
    }

    async fn wait_for<F: Fn() -> bool>(check: F) -> bool {
        for _ in 0..100 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn ticks_follow_the_current_schedule() {
        let (state, _clock) = state_with_period(at(22, 0, 0), Duration::from_millis(10));
        let task = tokio::spawn(countdown_task(Arc::clone(&state)));
        tokio::task::yield_now().await;

        let schedule = load_manual(state.clock.as_ref(), "19:30", "05:00").unwrap();
        state.set_schedule("manual", schedule).unwrap();

        assert!(wait_for(|| state.countdown_tx.borrow().is_some()).await);
        let tick = state.countdown_tx.borrow().clone().unwrap();
        assert!(!tick.is_active);
        assert_eq!((tick.hours, tick.minutes), (3, 50));

        // Switch to a window we are already inside of
        let schedule = load_manual(state.clock.as_ref(), "13:00", "23:00").unwrap();
        state.set_schedule("manual", schedule).unwrap();
        assert!(wait_for(|| is_active(&state)).await);

        state.clear_schedule("clear").unwrap();
        assert!(wait_for(|| state.countdown_tx.borrow().is_none()).await);

        task.abort();
    }

    #[tokio::test]
    async fn picks_up_schedule_loaded_before_start() {
        let (state, _clock) = state_with_period(at(3, 0, 0), Duration::from_millis(10));
        let schedule = load_manual(state.clock.as_ref(), "19:30", "05:00").unwrap();
        state.set_schedule("manual", schedule).unwrap();

        let task = tokio::spawn(countdown_task(Arc::clone(&state)));
        assert!(wait_for(|| is_active(&state)).await);

        task.abort();
    }
}

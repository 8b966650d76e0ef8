//! Tahajjud Timer - the last third of the night and a live countdown to it
//!
//! This library turns a night's Maghrib and Fajr times into the Tahajjud
//! window and keeps a once-per-second countdown toward its next boundary,
//! served over a small HTTP API.

pub mod config;
pub mod time;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use time::{
    calculate_window, compute_window, ClockTime, CountdownEngine, CountdownState, TahajjudWindow,
};
pub use utils::signals::shutdown_signal;

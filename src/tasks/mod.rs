//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod countdown_timer;
pub mod schedule_refresh;

// Re-export main functions
pub use countdown_timer::countdown_task;
pub use schedule_refresh::{refresh_if_stale, schedule_refresh_task};

//! State management module
//! 
//! This module contains the shared application state and the schedule it tracks.

pub mod app_state;
pub mod schedule;

// Re-export main types
pub use app_state::AppState;
pub use schedule::{NightSchedule, ScheduleSource};

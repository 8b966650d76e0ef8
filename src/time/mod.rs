//! Night-window arithmetic and the live countdown
//!
//! Pure computations over [`ClockTime`] values plus the ticking
//! [`CountdownEngine`]. Nothing here performs I/O; the current instant always
//! comes from an injected [`Clock`].

pub mod clock;
pub mod clock_time;
pub mod countdown;
pub mod error;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use clock_time::{ClockTime, Meridiem};
pub use countdown::{
    countdown_at, is_window_active, CountdownEngine, CountdownHandle, CountdownState,
    PROGRESS_SPAN_SECS,
};
pub use error::TimeError;
pub use window::{
    calculate_window, compute_window, compute_window_on, TahajjudWindow, WindowCalculator,
};

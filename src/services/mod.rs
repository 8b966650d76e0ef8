//! External collaborators
//!
//! Location lookup and prayer-time retrieval over HTTP, plus the glue that
//! turns their answers into a night schedule.

pub mod error;
pub mod location;
pub mod prayer_times;
pub mod schedule;

// Re-export main types and functions
pub use error::ProviderError;
pub use location::{
    check_coordinates, BigDataCloudResolver, Location, LocationResolver, DEFAULT_GEO_API,
};
pub use prayer_times::{
    manual_prayer_times, AladhanProvider, PrayerTimeProvider, PrayerTimes, DEFAULT_METHOD,
    DEFAULT_PRAYER_API,
};
pub use schedule::{load_for_city, load_for_coordinates, load_manual, refresh};

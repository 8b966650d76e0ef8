//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::services::{DEFAULT_GEO_API, DEFAULT_METHOD, DEFAULT_PRAYER_API};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "tahajjud-timer")]
#[command(about = "Computes the last third of the night and counts down to it")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Load prayer times for this city at startup
    #[arg(long, conflicts_with_all = ["latitude", "maghrib"])]
    pub city: Option<String>,

    /// Latitude to load prayer times for at startup
    #[arg(long, requires = "longitude", allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// Longitude to load prayer times for at startup
    #[arg(long, requires = "latitude", allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// Manual Maghrib time, 24-hour HH:MM
    #[arg(long, requires = "fajr", conflicts_with = "latitude")]
    pub maghrib: Option<String>,

    /// Manual Fajr time, 24-hour HH:MM
    #[arg(long, requires = "maghrib")]
    pub fajr: Option<String>,

    /// Aladhan calculation method
    #[arg(long, default_value_t = DEFAULT_METHOD)]
    pub method: u8,

    /// Prayer-time API base URL
    #[arg(long, default_value = DEFAULT_PRAYER_API)]
    pub prayer_api: String,

    /// Geocoding API base URL
    #[arg(long, default_value = DEFAULT_GEO_API)]
    pub geo_api: String,

    /// How often to check whether prayer times need fetching for a new day, in seconds
    #[arg(long, default_value = "60")]
    pub refresh_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// How the first schedule is obtained at startup
#[derive(Debug, Clone, PartialEq)]
pub enum StartupSource {
    None,
    City(String),
    Coordinates { latitude: f64, longitude: f64 },
    Manual { maghrib: String, fajr: String },
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Check combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.refresh_secs == 0 {
            return Err("--refresh-secs must be at least 1".to_string());
        }
        if let Some(city) = &self.city {
            if city.trim().is_empty() {
                return Err("--city must not be empty".to_string());
            }
        }
        Ok(())
    }

    pub fn startup_source(&self) -> StartupSource {
        if let Some(city) = &self.city {
            return StartupSource::City(city.clone());
        }
        if let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) {
            return StartupSource::Coordinates { latitude, longitude };
        }
        if let (Some(maghrib), Some(fajr)) = (&self.maghrib, &self.fajr) {
            return StartupSource::Manual {
                maghrib: maghrib.clone(),
                fajr: fajr.clone(),
            };
        }
        StartupSource::None
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("tahajjud-timer").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.method, 2);
        assert_eq!(config.startup_source(), StartupSource::None);
        assert_eq!(config.log_level(), "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn manual_times_come_in_pairs() {
        assert!(parse(&["--maghrib", "19:30"]).is_err());
        let config = parse(&["--maghrib", "19:30", "--fajr", "05:00"]).unwrap();
        assert_eq!(
            config.startup_source(),
            StartupSource::Manual { maghrib: "19:30".to_string(), fajr: "05:00".to_string() }
        );
    }

    #[test]
    fn coordinates_accept_negative_values() {
        let config = parse(&["--latitude", "-33.87", "--longitude", "151.21"]).unwrap();
        assert_eq!(
            config.startup_source(),
            StartupSource::Coordinates { latitude: -33.87, longitude: 151.21 }
        );
        assert!(parse(&["--latitude", "10"]).is_err());
    }

    #[test]
    fn city_conflicts_with_other_sources() {
        assert!(parse(&["--city", "Cairo", "--maghrib", "19:30", "--fajr", "05:00"]).is_err());
        let config = parse(&["--city", "Cairo", "-v"]).unwrap();
        assert_eq!(config.startup_source(), StartupSource::City("Cairo".to_string()));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn validate_rejects_zero_refresh_and_blank_city() {
        assert!(parse(&["--refresh-secs", "0"]).unwrap().validate().is_err());
        assert!(parse(&["--city", "  "]).unwrap().validate().is_err());
    }
}

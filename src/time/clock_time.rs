//! 12-hour wall-clock times ("7:30 PM") with no date attached

use std::{fmt, str::FromStr};

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::TimeError;

/// AM/PM half of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Meridiem {
    AM,
    PM,
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meridiem::AM => f.write_str("AM"),
            Meridiem::PM => f.write_str("PM"),
        }
    }
}

/// A time of day such as `"5:00 AM"`.
///
/// Hours are stored in 12-hour form (1..=12) with a meridiem. The value only
/// becomes an instant once it is anchored to a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour12: u8,
    minute: u8,
    meridiem: Meridiem,
}

impl ClockTime {
    pub fn new(hour12: u8, minute: u8, meridiem: Meridiem) -> Result<Self, TimeError> {
        if !(1..=12).contains(&hour12) {
            return Err(TimeError::invalid(
                &format!("{}:{:02} {}", hour12, minute, meridiem),
                format!("hour {} outside 1..=12", hour12),
            ));
        }
        if minute > 59 {
            return Err(TimeError::invalid(
                &format!("{}:{:02} {}", hour12, minute, meridiem),
                format!("minute {} outside 0..=59", minute),
            ));
        }
        Ok(Self { hour12, minute, meridiem })
    }

    /// Parse the 24-hour `"HH:MM"` form used for manual entry
    pub fn parse_24h(input: &str) -> Result<Self, TimeError> {
        let trimmed = input.trim();
        let (hours, minutes) = trimmed
            .split_once(':')
            .ok_or_else(|| TimeError::invalid(input, "expected HH:MM"))?;

        let hour24 = parse_number(input, hours, 2, "hour")?;
        let minute = parse_minute(input, minutes)?;
        if hour24 > 23 {
            return Err(TimeError::invalid(input, format!("hour {} outside 0..=23", hour24)));
        }

        Ok(Self::from_hour24(hour24, minute))
    }

    /// Parse a prayer-time provider value, e.g. `"04:41"` or `"04:41 (BST)"`
    pub fn parse_provider_time(input: &str) -> Result<Self, TimeError> {
        let bare = match input.trim().split_once(' ') {
            Some((time, tag)) if tag.trim_start().starts_with('(') => time,
            Some(_) => return Err(TimeError::invalid(input, "unexpected suffix")),
            None => input.trim(),
        };
        Self::parse_24h(bare).map_err(|_| TimeError::invalid(input, "expected HH:MM"))
    }

    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self::from_hour24(time.hour() as u8, time.minute() as u8)
    }

    fn from_hour24(hour24: u8, minute: u8) -> Self {
        let meridiem = if hour24 >= 12 { Meridiem::PM } else { Meridiem::AM };
        let hour12 = match hour24 % 12 {
            0 => 12,
            h => h,
        };
        Self { hour12, minute, meridiem }
    }

    pub fn hour12(&self) -> u8 {
        self.hour12
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn meridiem(&self) -> Meridiem {
        self.meridiem
    }

    /// Hour of day in 0..=23
    pub fn hour24(&self) -> u8 {
        match (self.meridiem, self.hour12) {
            (Meridiem::AM, 12) => 0,
            (Meridiem::PM, 12) => 12,
            (Meridiem::PM, h) => h + 12,
            (Meridiem::AM, h) => h,
        }
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour24()), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// `"HH:MM"` as accepted by [`ClockTime::parse_24h`]
    pub fn to_24h_string(&self) -> String {
        format!("{:02}:{:02}", self.hour24(), self.minute)
    }
}

fn parse_number(input: &str, digits: &str, max_len: usize, what: &str) -> Result<u8, TimeError> {
    if digits.is_empty() || digits.len() > max_len || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeError::invalid(input, format!("{} must be 1-{} digits", what, max_len)));
    }
    digits
        .parse()
        .map_err(|_| TimeError::invalid(input, format!("unreadable {}", what)))
}

fn parse_minute(input: &str, digits: &str) -> Result<u8, TimeError> {
    if digits.len() != 2 {
        return Err(TimeError::invalid(input, "minute must be exactly 2 digits"));
    }
    let minute = parse_number(input, digits, 2, "minute")?;
    if minute > 59 {
        return Err(TimeError::invalid(input, format!("minute {} outside 0..=59", minute)));
    }
    Ok(minute)
}

impl FromStr for ClockTime {
    type Err = TimeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (time, period) = trimmed
            .split_once(' ')
            .ok_or_else(|| TimeError::invalid(input, "expected \"H:MM AM|PM\""))?;

        let meridiem = if period.eq_ignore_ascii_case("AM") {
            Meridiem::AM
        } else if period.eq_ignore_ascii_case("PM") {
            Meridiem::PM
        } else {
            return Err(TimeError::invalid(input, format!("unknown meridiem {:?}", period)));
        };

        let (hours, minutes) = time
            .split_once(':')
            .ok_or_else(|| TimeError::invalid(input, "expected \"H:MM AM|PM\""))?;
        let hour12 = parse_number(input, hours, 2, "hour")?;
        let minute = parse_minute(input, minutes)?;
        if !(1..=12).contains(&hour12) {
            return Err(TimeError::invalid(input, format!("hour {} outside 1..=12", hour12)));
        }

        Ok(Self { hour12, minute, meridiem })
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02} {}", self.hour12, self.minute, self.meridiem)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ct(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_formats_twelve_hour_times() {
        assert_eq!(ct("7:30 PM").hour24(), 19);
        assert_eq!(ct("07:30 pm").to_string(), "7:30 PM");
        assert_eq!(ct("  5:00 AM ").to_string(), "5:00 AM");
    }

    #[test]
    fn new_checks_ranges() {
        let time = ClockTime::new(5, 0, Meridiem::AM).unwrap();
        assert_eq!((time.hour12(), time.minute(), time.meridiem()), (5, 0, Meridiem::AM));
        assert_eq!(time, ct("5:00 AM"));

        for (hour, minute) in [(0, 30), (13, 0), (7, 60)] {
            assert!(
                matches!(
                    ClockTime::new(hour, minute, Meridiem::PM),
                    Err(TimeError::InvalidTimeFormat { .. })
                ),
                "{}:{} should be rejected",
                hour,
                minute
            );
        }
    }

    #[test]
    fn noon_and_midnight_conversion() {
        assert_eq!(ct("12:00 AM").hour24(), 0);
        assert_eq!(ct("12:15 PM").hour24(), 12);
        assert_eq!(ct("12:59 AM").to_24h_string(), "00:59");
        assert_eq!(ct("11:59 PM").to_24h_string(), "23:59");
    }

    #[test]
    fn rejects_malformed_twelve_hour_strings() {
        for bad in [
            "", "7:30", "7:30PM", "0:30 AM", "13:00 PM", "7:60 PM", "7:5 PM", "7:305 PM",
            "x:30 PM", "7:30 XM", "-1:30 AM", "7 30 PM", "123:00 AM",
        ] {
            let err = bad.parse::<ClockTime>().unwrap_err();
            assert!(
                matches!(err, TimeError::InvalidTimeFormat { .. }),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn twenty_four_hour_round_trip() {
        assert_eq!(ClockTime::parse_24h("19:30").unwrap().to_string(), "7:30 PM");
        assert_eq!(ClockTime::parse_24h("00:05").unwrap().to_string(), "12:05 AM");
        assert_eq!(ClockTime::parse_24h("12:00").unwrap().to_string(), "12:00 PM");
        assert_eq!(ClockTime::parse_24h("4:41").unwrap().to_24h_string(), "04:41");
        assert!(ClockTime::parse_24h("24:00").is_err());
        assert!(ClockTime::parse_24h("19-30").is_err());
    }

    #[test]
    fn provider_times_drop_timezone_tag() {
        assert_eq!(ClockTime::parse_provider_time("04:41 (BST)").unwrap().to_string(), "4:41 AM");
        assert_eq!(ClockTime::parse_provider_time("18:02").unwrap().to_string(), "6:02 PM");
        assert!(ClockTime::parse_provider_time("18:02 PM").is_err());
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&ct("1:50 AM")).unwrap();
        assert_eq!(json, "\"1:50 AM\"");
        let back: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ct("1:50 AM"));
        assert!(serde_json::from_str::<ClockTime>("\"25:00 PM\"").is_err());
    }
}

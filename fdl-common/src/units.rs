//! Unit conversion and clock-time normalization
//!
//! The controller reports metric values and 15-minute samples. Everything that
//! leaves the aggregator is Fahrenheit, pounds and `HH:MM` rounded to the
//! sampling grid. A missing reading is `None` here; the controller's `-9999`
//! sentinel never gets past the parsing boundary.

use crate::{Error, Result};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Controller sentinel meaning "no reading"
pub const SENTINEL: f64 = -9999.0;

/// Pounds per kilogram
pub const LB_PER_KG: f64 = 2.20462;

/// Controller sampling interval in minutes
pub const QUARTER_HOUR: u16 = 15;

/// Minutes in one day
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Wall-clock time of day with minute precision.
///
/// Stored as minutes since midnight. Displays and serializes as zero-padded
/// `HH:MM`, which keeps lexicographic and chronological order identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// Build from hour and minute, `None` when out of range
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    /// Build from minutes since midnight, wrapping past 24:00
    pub fn from_minutes_wrapping(minutes: u32) -> Self {
        Self((minutes % MINUTES_PER_DAY as u32) as u16)
    }

    /// Parse `HH:MM` or `HH:MM:SS` (seconds are dropped)
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput(format!("Invalid clock time '{}'", value));

        let parts: Vec<&str> = value.trim().split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(invalid());
        }

        let field = |s: &str, max: u32| -> Result<u32> {
            if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let v: u32 = s.parse().map_err(|_| invalid())?;
            if v > max {
                return Err(invalid());
            }
            Ok(v)
        };

        let hour = field(parts[0], 23)?;
        let minute = field(parts[1], 59)?;
        if let Some(seconds) = parts.get(2) {
            field(seconds, 59)?;
        }

        Self::from_hm(hour, minute).ok_or_else(invalid)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Round to the nearest quarter hour; 23:53 wraps to 00:00
    pub fn round_to_quarter(self) -> Self {
        let half = QUARTER_HOUR / 2;
        let rounded = (self.0 + half) / QUARTER_HOUR * QUARTER_HOUR;
        Self::from_minutes_wrapping(rounded as u32)
    }

    /// Absolute distance in minutes within the same day (no wrap-around)
    pub fn abs_diff_minutes(self, other: ClockTime) -> u16 {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

/// Celsius to Fahrenheit
pub fn c_to_f_raw(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Kilograms to pounds
pub fn kg_to_lb_raw(kg: f64) -> f64 {
    kg * LB_PER_KG
}

/// Celsius to Fahrenheit; a missing reading stays missing
pub fn c_to_f(celsius: Option<f64>) -> Option<f64> {
    celsius.map(c_to_f_raw)
}

/// Kilograms to pounds; a missing reading stays missing
pub fn kg_to_lb(kg: Option<f64>) -> Option<f64> {
    kg.map(kg_to_lb_raw)
}

/// Round an `HH:MM` string to the nearest quarter hour
pub fn round_hhmm_to_15(value: &str) -> Result<String> {
    Ok(ClockTime::parse(value)?.round_to_quarter().to_string())
}

/// Split `HH:MM[:SS]` into zero-padded hour and minute for form fields.
///
/// Returns `None` for anything that is not a valid clock time.
pub fn split_hh_mm(value: &str) -> Option<(String, String)> {
    let time = ClockTime::parse(value).ok()?;
    Some((format!("{:02}", time.hour()), format!("{:02}", time.minute())))
}

//! Database models

use crate::units::{split_hh_mm, ClockTime};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why the light schedule of a day could not be fully derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightAnomaly {
    /// First light observation of the day already showed the light on
    AlreadyOnAtStart,
    /// Light turned on but was never observed turning off
    NeverOff,
    /// Light was never observed turning on
    NeverOn,
}

impl LightAnomaly {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightAnomaly::AlreadyOnAtStart => "already_on_at_start",
            LightAnomaly::NeverOff => "never_off",
            LightAnomaly::NeverOn => "never_on",
        }
    }
}

impl fmt::Display for LightAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LightAnomaly {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "already_on_at_start" => Ok(LightAnomaly::AlreadyOnAtStart),
            "never_off" => Ok(LightAnomaly::NeverOff),
            "never_on" => Ok(LightAnomaly::NeverOn),
            other => Err(crate::Error::InvalidInput(format!("Unknown light anomaly '{}'", other))),
        }
    }
}

/// One aggregated farm-day ("bot log" row).
///
/// Temperatures are Fahrenheit, feed and body weight pounds, water in the
/// controller's unit. `None` means "no data", never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub growth_day: i64,
    pub bird_age: Option<String>,

    pub outside_low_temp: Option<f64>,
    pub outside_high_temp: Option<f64>,
    pub inside_low_temp: Option<f64>,
    pub inside_high_temp: Option<f64>,

    pub lights_on: Option<ClockTime>,
    pub lights_off: Option<ClockTime>,
    pub light_anomaly: Option<LightAnomaly>,

    pub mortality: Option<i64>,
    pub feed_consumption: Option<f64>,
    pub water_consumption: Option<f64>,
    pub body_weight: Option<f64>,

    pub cooler_time_am: Option<ClockTime>,
    pub cooler_temp_am: Option<f64>,
    pub cooler_time_pm: Option<ClockTime>,
    pub cooler_temp_pm: Option<f64>,

    /// Number of telemetry files the summary was derived from
    pub source_files: u32,
}

/// Operator-entered daily record ("user log" row)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserLog {
    pub date: NaiveDate,
    pub belt_eggs: Option<i64>,
    pub floor_eggs: Option<i64>,
    pub mortality_indoor: Option<i64>,
    pub mortality_outdoor: Option<i64>,
    pub euthanized_indoor: Option<i64>,
    pub euthanized_outdoor: Option<i64>,
    pub door_open: Option<String>,
    pub door_closed: Option<String>,
    pub birds_restricted_reason: Option<String>,
    pub eggs_picked_up: Option<i64>,
    pub weather: Option<String>,
    pub comments: Option<String>,
    pub coolerlog_comments: Option<String>,
}

/// Bot log and user log of one date, as read by the upload adapter.
///
/// User-entered values win wherever both records carry a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionRecord {
    pub summary: DailySummary,
    pub user: Option<UserLog>,
}

impl ProductionRecord {
    pub fn merge(summary: DailySummary, user: Option<UserLog>) -> Self {
        Self { summary, user }
    }

    pub fn date(&self) -> NaiveDate {
        self.summary.date
    }

    pub fn door_open(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.door_open.as_deref())
    }

    pub fn door_closed(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.door_closed.as_deref())
    }

    /// Birds count as restricted when either door time is missing
    pub fn birds_restricted(&self) -> bool {
        let valid = |t: Option<&str>| t.and_then(split_hh_mm).is_some();
        !(valid(self.door_open()) && valid(self.door_closed()))
    }

    /// Controller mortality unless the operator recorded their own count
    pub fn mortality(&self) -> Option<i64> {
        let user_total = self.user.as_ref().and_then(|u| {
            match (u.mortality_indoor, u.mortality_outdoor) {
                (None, None) => None,
                (indoor, outdoor) => Some(indoor.unwrap_or(0) + outdoor.unwrap_or(0)),
            }
        });
        user_total.or(self.summary.mortality)
    }

    pub fn lights_on_parts(&self) -> Option<(String, String)> {
        clock_parts(self.summary.lights_on)
    }

    pub fn lights_off_parts(&self) -> Option<(String, String)> {
        clock_parts(self.summary.lights_off)
    }

    pub fn cooler_am_parts(&self) -> Option<(String, String)> {
        clock_parts(self.summary.cooler_time_am)
    }

    pub fn cooler_pm_parts(&self) -> Option<(String, String)> {
        clock_parts(self.summary.cooler_time_pm)
    }

    /// Flattened view with user values applied, for display and form filling
    pub fn merged(&self) -> MergedRecord {
        let s = &self.summary;
        let user = self.user.clone().unwrap_or_default();
        let parts = |t: Option<(String, String)>| t.map(|(hour, minute)| ClockParts { hour, minute });

        MergedRecord {
            date: s.date,
            growth_day: s.growth_day,
            bird_age: s.bird_age.clone(),
            outside_low_temp: s.outside_low_temp,
            outside_high_temp: s.outside_high_temp,
            inside_low_temp: s.inside_low_temp,
            inside_high_temp: s.inside_high_temp,
            lights_on: parts(self.lights_on_parts()),
            lights_off: parts(self.lights_off_parts()),
            light_anomaly: s.light_anomaly,
            mortality: self.mortality(),
            euthanized_indoor: user.euthanized_indoor,
            euthanized_outdoor: user.euthanized_outdoor,
            feed_consumption: s.feed_consumption,
            water_consumption: s.water_consumption,
            body_weight: s.body_weight,
            cooler_am: parts(self.cooler_am_parts()),
            cooler_temp_am: s.cooler_temp_am,
            cooler_pm: parts(self.cooler_pm_parts()),
            cooler_temp_pm: s.cooler_temp_pm,
            belt_eggs: user.belt_eggs,
            floor_eggs: user.floor_eggs,
            eggs_picked_up: user.eggs_picked_up,
            birds_restricted: self.birds_restricted(),
            door_open: user.door_open,
            door_closed: user.door_closed,
            birds_restricted_reason: user.birds_restricted_reason,
            weather: user.weather,
            comments: user.comments,
            coolerlog_comments: user.coolerlog_comments,
        }
    }
}

/// Hour and minute of a clock time, as form fields want them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockParts {
    pub hour: String,
    pub minute: String,
}

/// Flattened production record with every overlap already resolved.
///
/// This is what the `show` command prints and what a form-filling consumer
/// reads field by field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub date: NaiveDate,
    pub growth_day: i64,
    pub bird_age: Option<String>,

    pub outside_low_temp: Option<f64>,
    pub outside_high_temp: Option<f64>,
    pub inside_low_temp: Option<f64>,
    pub inside_high_temp: Option<f64>,

    pub lights_on: Option<ClockParts>,
    pub lights_off: Option<ClockParts>,
    pub light_anomaly: Option<LightAnomaly>,

    pub mortality: Option<i64>,
    pub euthanized_indoor: Option<i64>,
    pub euthanized_outdoor: Option<i64>,
    pub feed_consumption: Option<f64>,
    pub water_consumption: Option<f64>,
    pub body_weight: Option<f64>,

    pub cooler_am: Option<ClockParts>,
    pub cooler_temp_am: Option<f64>,
    pub cooler_pm: Option<ClockParts>,
    pub cooler_temp_pm: Option<f64>,

    pub belt_eggs: Option<i64>,
    pub floor_eggs: Option<i64>,
    pub eggs_picked_up: Option<i64>,
    pub door_open: Option<String>,
    pub door_closed: Option<String>,
    pub birds_restricted: bool,
    pub birds_restricted_reason: Option<String>,
    pub weather: Option<String>,
    pub comments: Option<String>,
    pub coolerlog_comments: Option<String>,
}

fn clock_parts(time: Option<ClockTime>) -> Option<(String, String)> {
    time.and_then(|t| split_hh_mm(&t.to_string()))
}

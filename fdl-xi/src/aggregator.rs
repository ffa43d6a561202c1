//! Daily aggregation facade
//!
//! Resolves a date to its file set and reduces it to one [`DailySummary`].
//! The summary is a pure function of the resolved files, so running twice
//! over an unchanged directory yields the same values.

use crate::cooler::closest_reading;
use crate::error::AggregateError;
use crate::light::LightCycle;
use crate::quarantine::Quarantine;
use crate::reduce::{last_reading, reduce_temperatures};
use crate::resolver::{DayResolver, ResolvedDay};
use crate::telemetry::TelemetryFile;
use chrono::NaiveDate;
use chrono_tz::Tz;
use fdl_common::bird_age::bird_age;
use fdl_common::config::AggregatorSettings;
use fdl_common::db::DailySummary;
use fdl_common::ClockTime;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct DailyAggregator {
    settings: AggregatorSettings,
    quarantine: Quarantine,
}

impl DailyAggregator {
    pub fn new(settings: AggregatorSettings) -> Self {
        let quarantine = Quarantine::new(settings.quarantine_dir.clone());
        Self {
            settings,
            quarantine,
        }
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Authoritative file set for `date`
    pub fn resolve(&self, date: NaiveDate) -> Result<ResolvedDay, AggregateError> {
        DayResolver::new(&self.settings.xml_dir, &self.quarantine).resolve(date)
    }

    /// Resolve and summarize `date`
    pub fn aggregate(&self, date: NaiveDate) -> Result<DailySummary, AggregateError> {
        let day = self.resolve(date)?;
        Ok(self.summarize(&day))
    }

    /// Reduce a resolved day to its summary record
    pub fn summarize(&self, day: &ResolvedDay) -> DailySummary {
        let temperatures = reduce_temperatures(&day.files);
        let totals = last_reading(&day.files);

        let mut light = LightCycle::new();
        for file in &day.files {
            if let Some(time) = light_time(file, self.settings.time_zone) {
                light.observe(time, file.light_active);
            }
        }
        let schedule = light.finish();
        if let Some(anomaly) = schedule.anomaly {
            warn!("Light cycle anomaly on {}: {}", day.date, anomaly);
        }

        let tolerance = self.settings.cooler_tolerance_minutes;
        let cooler_am = closest_reading(&day.files, self.settings.cooler_am, tolerance);
        let cooler_pm = closest_reading(&day.files, self.settings.cooler_pm, tolerance);
        for (label, reading) in [("AM", &cooler_am), ("PM", &cooler_pm)] {
            match reading {
                Some(r) => info!("Cooler {} reading for {} from {}", label, day.date, r.file_name),
                None => info!("No cooler {} reading within tolerance for {}", label, day.date),
            }
        }

        DailySummary {
            date: day.date,
            growth_day: day.growth_day,
            bird_age: self
                .settings
                .hatch_date
                .and_then(|hatch| bird_age(hatch, day.date)),
            outside_low_temp: temperatures.outside.map(|r| r.low),
            outside_high_temp: temperatures.outside.map(|r| r.high),
            inside_low_temp: temperatures.inside.map(|r| r.low),
            inside_high_temp: temperatures.inside.map(|r| r.high),
            lights_on: schedule.lights_on,
            lights_off: schedule.lights_off,
            light_anomaly: schedule.anomaly,
            mortality: totals.mortality,
            feed_consumption: totals.feed_lb,
            water_consumption: totals.water,
            body_weight: totals.weight_lb,
            cooler_time_am: cooler_am.as_ref().map(|r| r.time),
            cooler_temp_am: cooler_am.as_ref().map(|r| r.temp_f),
            cooler_time_pm: cooler_pm.as_ref().map(|r| r.time),
            cooler_temp_pm: cooler_pm.as_ref().map(|r| r.temp_f),
            source_files: u32::try_from(day.files.len()).unwrap_or(u32::MAX),
        }
    }
}

/// Farm wall-clock time of a sample: the UTC header converted to the farm
/// zone, or the internal time when the header is missing
fn light_time(file: &TelemetryFile, tz: Tz) -> Option<ClockTime> {
    file.captured_at
        .map(|utc| ClockTime::from(utc.with_timezone(&tz).time()))
        .or(file.internal_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn file(time: &str) -> TelemetryFile {
        TelemetryFile {
            path: PathBuf::from("/x/a.xml"),
            file_name: "a.xml".to_string(),
            internal_time: Some(ClockTime::parse(time).unwrap()),
            growth_day: Some(1),
            captured_at: None,
            outside_temp_c: None,
            inside_temp_c: None,
            light_active: None,
            egg_room_c: None,
            mortality: None,
            feed_kg: None,
            water: None,
            avg_weight_kg: None,
        }
    }

    #[test]
    fn test_light_time_uses_header_in_farm_zone() {
        let mut f = file("05:00");
        // 11:00 UTC is 06:00 CDT
        f.captured_at = Some(Utc.with_ymd_and_hms(2025, 10, 18, 11, 0, 0).unwrap());
        let time = light_time(&f, chrono_tz::America::Chicago).unwrap();
        assert_eq!(time.to_string(), "06:00");
    }

    #[test]
    fn test_light_time_falls_back_to_internal_time() {
        let time = light_time(&file("05:00"), chrono_tz::America::Chicago).unwrap();
        assert_eq!(time.to_string(), "05:00");
    }
}

//! Telemetry Test Fixture Generator
//!
//! Writes controller-style XML samples into a directory

use chrono::NaiveDate;
use fdl_common::config::AggregatorSettings;
use std::path::{Path, PathBuf};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Settings for a temp telemetry directory
pub fn settings_for(dir: &Path) -> AggregatorSettings {
    AggregatorSettings::for_directory(dir)
}

/// One controller sample; `None` fields are written as `-9999`
#[derive(Debug, Clone)]
pub struct Sample {
    pub file_name: String,
    pub time: Option<String>,
    pub growth_day: Option<i64>,
    /// UTC header stamp, `YYYY/MM/DD HH:MM:SS`; omitted when `None`
    pub header_utc: Option<String>,
    pub outside_c: Option<f64>,
    pub inside_c: Option<f64>,
    pub light: Option<bool>,
    pub egg_room_c: Option<f64>,
    pub mortality: Option<i64>,
    pub feed_kg: Option<f64>,
    pub water: Option<f64>,
    pub weight_kg: Option<f64>,
}

impl Sample {
    /// Sample captured at `stamp` (`YYYYMMDDHHMMSS`) with internal `time`
    pub fn new(stamp: &str, time: &str, growth_day: i64) -> Self {
        Self {
            file_name: format!("{}_house1.xml", stamp),
            time: Some(time.to_string()),
            growth_day: Some(growth_day),
            header_utc: None,
            outside_c: Some(10.0),
            inside_c: Some(20.0),
            light: None,
            egg_room_c: None,
            mortality: None,
            feed_kg: None,
            water: None,
            weight_kg: None,
        }
    }

    pub fn light(mut self, active: bool) -> Self {
        self.light = Some(active);
        self
    }

    pub fn outside(mut self, celsius: Option<f64>) -> Self {
        self.outside_c = celsius;
        self
    }

    pub fn inside(mut self, celsius: Option<f64>) -> Self {
        self.inside_c = celsius;
        self
    }

    pub fn egg_room(mut self, celsius: f64) -> Self {
        self.egg_room_c = Some(celsius);
        self
    }

    pub fn totals(mut self, mortality: i64, feed_kg: f64, water: f64, weight_kg: f64) -> Self {
        self.mortality = Some(mortality);
        self.feed_kg = Some(feed_kg);
        self.water = Some(water);
        self.weight_kg = Some(weight_kg);
        self
    }

    pub fn header(mut self, utc: &str) -> Self {
        self.header_utc = Some(utc.to_string());
        self
    }

    pub fn to_xml(&self) -> String {
        fn num<T: ToString>(v: Option<T>) -> String {
            v.map(|v| v.to_string()).unwrap_or_else(|| "-9999".to_string())
        }

        let header = self
            .header_utc
            .as_ref()
            .map(|s| format!("<Headers><TimeStamp>{}</TimeStamp></Headers>", s))
            .unwrap_or_default();
        let light = self
            .light
            .map(|on| format!("<Light><Active>{}</Active></Light>", u8::from(on)))
            .unwrap_or_default();

        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Data>{header}\
             <General><Time>{time}</Time><GrowthDay>{day}</GrowthDay></General>\
             <Climate><OutsideTemperature>{outside}</OutsideTemperature>\
             <AverageTemperature>{inside}</AverageTemperature></Climate>\
             {light}<EggRoom>{egg}</EggRoom>\
             <Production><TotalDailyFemaleMortality>{mort}</TotalDailyFemaleMortality>\
             <DailyFeed>{feed}</DailyFeed><DailyWater>{water}</DailyWater>\
             <AverageWeight>{weight}</AverageWeight></Production></Data>",
            header = header,
            time = self.time.clone().unwrap_or_else(|| "-9999".to_string()),
            day = num(self.growth_day),
            outside = num(self.outside_c),
            inside = num(self.inside_c),
            light = light,
            egg = num(self.egg_room_c),
            mort = num(self.mortality),
            feed = num(self.feed_kg),
            water = num(self.water),
            weight = num(self.weight_kg),
        )
    }

    pub fn write(&self, dir: &Path) -> PathBuf {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, self.to_xml()).unwrap();
        path
    }
}

/// Write a file that is not well-formed XML
pub fn write_malformed(dir: &Path, stamp: &str) -> PathBuf {
    let path = dir.join(format!("{}_house1.xml", stamp));
    std::fs::write(&path, "<Data><General><Time>06:00</General>").unwrap();
    path
}

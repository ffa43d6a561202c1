//! Per-day reductions over a resolved file set
//!
//! Temperatures reduce over every file; the running daily totals come from
//! the chronologically last file only, since summing or averaging samples of
//! a running total double counts.

use crate::telemetry::TelemetryFile;
use fdl_common::units::{c_to_f_raw, kg_to_lb};
use tracing::warn;

/// Low/high pair in Fahrenheit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Temperatures {
    pub outside: Option<TemperatureRange>,
    pub inside: Option<TemperatureRange>,
}

/// End-of-day totals, converted to the record units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EndOfDay {
    pub mortality: Option<i64>,
    pub feed_lb: Option<f64>,
    pub water: Option<f64>,
    pub weight_lb: Option<f64>,
}

/// Min/max over all readings, `None` when there are none
pub fn temperature_range<I>(readings: I) -> Option<TemperatureRange>
where
    I: IntoIterator<Item = f64>,
{
    readings.into_iter().map(c_to_f_raw).fold(None, |range, f| {
        Some(match range {
            None => TemperatureRange { low: f, high: f },
            Some(r) => TemperatureRange {
                low: r.low.min(f),
                high: r.high.max(f),
            },
        })
    })
}

pub fn reduce_temperatures(files: &[TelemetryFile]) -> Temperatures {
    let outside = temperature_range(files.iter().filter_map(|f| f.outside_temp_c));
    let inside = temperature_range(files.iter().filter_map(|f| f.inside_temp_c));

    if outside.is_none() {
        warn!("No valid OutsideTemperature reading in {} files", files.len());
    }
    if inside.is_none() {
        warn!("No valid AverageTemperature reading in {} files", files.len());
    }

    Temperatures { outside, inside }
}

/// Running totals from the last file of the day
pub fn last_reading(files: &[TelemetryFile]) -> EndOfDay {
    let Some(last) = files.last() else {
        return EndOfDay::default();
    };

    let totals = EndOfDay {
        mortality: last.mortality,
        feed_lb: kg_to_lb(last.feed_kg),
        water: last.water,
        weight_lb: kg_to_lb(last.avg_weight_kg),
    };

    for (field, missing) in [
        ("TotalDailyFemaleMortality", totals.mortality.is_none()),
        ("DailyFeed", totals.feed_lb.is_none()),
        ("DailyWater", totals.water.is_none()),
        ("AverageWeight", totals.weight_lb.is_none()),
    ] {
        if missing {
            warn!("No {} in last file {}", field, last.file_name);
        }
    }

    totals
}

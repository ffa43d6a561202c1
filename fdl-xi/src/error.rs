//! Error types for fdl-xi
//!
//! Per-file problems ([`TelemetryError`]) are recovered where they occur;
//! only [`AggregateError`] reaches the caller of a run.

use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or parse one telemetry document
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// File could not be read (left in place)
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not well-formed XML (quarantined)
    #[error("Malformed XML in {file}: {message}")]
    Malformed { file: String, message: String },

    /// A numeric field holds something that is not a number (quarantined)
    #[error("Invalid {field} value '{value}' in {file}")]
    InvalidField {
        file: String,
        field: &'static str,
        value: String,
    },
}

impl TelemetryError {
    /// Whether the file should be moved out of the active directory
    pub fn is_quarantinable(&self) -> bool {
        !matches!(self, TelemetryError::Io { .. })
    }
}

/// Why a date produced no summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    /// No file name carries the date
    NoCandidates,
    /// No candidate carries a usable growth day
    NoGrowthDay,
    /// No file of the resolved growth day carries a usable time
    NoValidTime,
}

impl fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NoDataReason::NoCandidates => "no telemetry files named for this date",
            NoDataReason::NoGrowthDay => "no candidate file has a valid growth day",
            NoDataReason::NoValidTime => "no file of the resolved growth day has a valid time",
        };
        f.write_str(text)
    }
}

/// Run-level aggregation failure
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Not enough data to produce any summary; retry once more files arrive
    #[error("No data for {date}: {reason}")]
    NoData { date: NaiveDate, reason: NoDataReason },

    /// Telemetry directory could not be listed
    #[error("Cannot read telemetry directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AggregateError {
    pub fn is_no_data(&self) -> bool {
        matches!(self, AggregateError::NoData { .. })
    }
}

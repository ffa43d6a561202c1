//! fdl-xi (XML Ingest) library
//!
//! Turns the controller's per-sample XML files into one daily summary per
//! logical day.
//!
//! # Architecture
//! - [`telemetry`]: XML document to typed optionals
//! - [`resolver`]: target date to authoritative file set, with quarantine
//! - [`reduce`], [`cooler`], [`light`]: per-field reductions
//! - [`aggregator`]: facade producing a `DailySummary`
//! - [`sweeper`], [`jobs`]: retention and scheduler-facing one-shot jobs

pub mod aggregator;
pub mod cooler;
pub mod error;
pub mod jobs;
pub mod light;
pub mod quarantine;
pub mod reduce;
pub mod resolver;
pub mod sweeper;
pub mod telemetry;

pub use aggregator::DailyAggregator;
pub use error::{AggregateError, NoDataReason, TelemetryError};
pub use jobs::{JobContext, JobOutcome};

//! Test Helper Utilities
//!
//! Shared utilities for testing fdl-xi

#![allow(dead_code)]

pub mod telemetry_generator;

pub use telemetry_generator::{date, settings_for, write_malformed, Sample};

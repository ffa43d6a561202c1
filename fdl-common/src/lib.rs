//! # FDL Common Library
//!
//! Shared code for the farm data logger:
//! - Configuration loading (TOML bootstrap file)
//! - Unit and clock-time normalization
//! - Daily record models and the SQLite daily record store
//! - Bird age calculation

pub mod bird_age;
pub mod config;
pub mod db;
pub mod error;
pub mod units;

pub use error::{Error, Result};
pub use units::ClockTime;

//! Daily record store (SQLite)

pub mod bot_log;
pub mod init;
pub mod models;
pub mod user_log;

pub use bot_log::*;
pub use init::*;
pub use models::*;
pub use user_log::*;

use crate::units::ClockTime;
use crate::{Error, Result};
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// Bot log and user log for `date`, merged for the upload adapter
pub async fn load_production_record(
    pool: &SqlitePool,
    date: NaiveDate,
) -> Result<Option<ProductionRecord>> {
    let Some(summary) = load_daily_bot_log(pool, date).await? else {
        return Ok(None);
    };
    let user = load_daily_user_log(pool, date).await?;
    Ok(Some(ProductionRecord::merge(summary, user)))
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| Error::InvalidInput(format!("Invalid stored date '{}': {}", value, e)))
}

pub(crate) fn parse_clock(value: Option<String>) -> Result<Option<ClockTime>> {
    value.as_deref().map(ClockTime::parse).transpose()
}

/// Storage format of date columns
pub const DATE_FORMAT: &str = "%Y-%m-%d";

//! daily_bot_log persistence
//!
//! Single-row inserts and date-keyed reads. "Already processed" is checked by
//! the caller with [`bot_log_exists`] before aggregating.

use super::models::{DailySummary, LightAnomaly};
use super::{parse_clock, parse_date, DATE_FORMAT};
use crate::Result;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

/// Insert one aggregated day; `None` fields are stored as NULL
pub async fn insert_daily_bot_log(pool: &SqlitePool, summary: &DailySummary) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO daily_bot_log (
            date, growth_day, bird_age, feed_consumption, lights_on, lights_off,
            light_anomaly, water_consumption, body_weight, mortality,
            inside_low_temp, inside_high_temp, outside_low_temp, outside_high_temp,
            cooler_time_am, cooler_temp_am, cooler_time_pm, cooler_temp_pm,
            source_files
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(summary.date.format(DATE_FORMAT).to_string())
    .bind(summary.growth_day)
    .bind(summary.bird_age.as_deref())
    .bind(summary.feed_consumption)
    .bind(summary.lights_on.map(|t| t.to_string()))
    .bind(summary.lights_off.map(|t| t.to_string()))
    .bind(summary.light_anomaly.map(|a| a.as_str()))
    .bind(summary.water_consumption)
    .bind(summary.body_weight)
    .bind(summary.mortality)
    .bind(summary.inside_low_temp)
    .bind(summary.inside_high_temp)
    .bind(summary.outside_low_temp)
    .bind(summary.outside_high_temp)
    .bind(summary.cooler_time_am.map(|t| t.to_string()))
    .bind(summary.cooler_temp_am)
    .bind(summary.cooler_time_pm.map(|t| t.to_string()))
    .bind(summary.cooler_temp_pm)
    .bind(summary.source_files as i64)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Load the bot log row for `date` (first inserted row if several exist)
pub async fn load_daily_bot_log(pool: &SqlitePool, date: NaiveDate) -> Result<Option<DailySummary>> {
    let row = sqlx::query(
        r#"
        SELECT date, growth_day, bird_age, feed_consumption, lights_on, lights_off,
               light_anomaly, water_consumption, body_weight, mortality,
               inside_low_temp, inside_high_temp, outside_low_temp, outside_high_temp,
               cooler_time_am, cooler_temp_am, cooler_time_pm, cooler_temp_pm,
               source_files
        FROM daily_bot_log
        WHERE date = ?
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(date.format(DATE_FORMAT).to_string())
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let date_str: String = row.get("date");
    let anomaly: Option<String> = row.get("light_anomaly");
    let source_files: i64 = row.get("source_files");

    Ok(Some(DailySummary {
        date: parse_date(&date_str)?,
        growth_day: row.get("growth_day"),
        bird_age: row.get("bird_age"),
        outside_low_temp: row.get("outside_low_temp"),
        outside_high_temp: row.get("outside_high_temp"),
        inside_low_temp: row.get("inside_low_temp"),
        inside_high_temp: row.get("inside_high_temp"),
        lights_on: parse_clock(row.get("lights_on"))?,
        lights_off: parse_clock(row.get("lights_off"))?,
        light_anomaly: anomaly.as_deref().map(str::parse::<LightAnomaly>).transpose()?,
        mortality: row.get("mortality"),
        feed_consumption: row.get("feed_consumption"),
        water_consumption: row.get("water_consumption"),
        body_weight: row.get("body_weight"),
        cooler_time_am: parse_clock(row.get("cooler_time_am"))?,
        cooler_temp_am: row.get("cooler_temp_am"),
        cooler_time_pm: parse_clock(row.get("cooler_time_pm"))?,
        cooler_temp_pm: row.get("cooler_temp_pm"),
        source_files: source_files.max(0) as u32,
    }))
}

/// Whether a bot log row exists for `date`
pub async fn bot_log_exists(pool: &SqlitePool, date: NaiveDate) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_bot_log WHERE date = ?")
        .bind(date.format(DATE_FORMAT).to_string())
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// Distinct dates with a bot log row in `[from, to]`, oldest first
pub async fn list_bot_log_dates(
    pool: &SqlitePool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    let rows: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT date FROM daily_bot_log WHERE date >= ? AND date <= ? ORDER BY date",
    )
    .bind(from.format(DATE_FORMAT).to_string())
    .bind(to.format(DATE_FORMAT).to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(|d| parse_date(d)).collect()
}

//! daily_user_log persistence
//!
//! Rows come from the operator web form. The form may be submitted more than
//! once a day; the latest submission for a date wins.

use super::models::UserLog;
use super::{parse_date, DATE_FORMAT};
use crate::Result;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

/// Insert one operator record
pub async fn insert_daily_user_log(pool: &SqlitePool, log: &UserLog) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO daily_user_log (
            date_entered, belt_eggs, floor_eggs, mortality_indoor, mortality_outdoor,
            euthanized_indoor, euthanized_outdoor, door_open, door_closed,
            birds_restricted_reason, eggs_picked_up, weather, comments, coolerlog_comments
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(log.date.format(DATE_FORMAT).to_string())
    .bind(log.belt_eggs)
    .bind(log.floor_eggs)
    .bind(log.mortality_indoor)
    .bind(log.mortality_outdoor)
    .bind(log.euthanized_indoor)
    .bind(log.euthanized_outdoor)
    .bind(log.door_open.as_deref())
    .bind(log.door_closed.as_deref())
    .bind(log.birds_restricted_reason.as_deref())
    .bind(log.eggs_picked_up)
    .bind(log.weather.as_deref())
    .bind(log.comments.as_deref())
    .bind(log.coolerlog_comments.as_deref())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Latest operator record for `date`
pub async fn load_daily_user_log(pool: &SqlitePool, date: NaiveDate) -> Result<Option<UserLog>> {
    let row = sqlx::query(
        r#"
        SELECT date_entered, belt_eggs, floor_eggs, mortality_indoor, mortality_outdoor,
               euthanized_indoor, euthanized_outdoor, door_open, door_closed,
               birds_restricted_reason, eggs_picked_up, weather, comments, coolerlog_comments
        FROM daily_user_log
        WHERE date_entered = ?
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .bind(date.format(DATE_FORMAT).to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let date_str: String = row.get("date_entered");
            Ok(Some(UserLog {
                date: parse_date(&date_str)?,
                belt_eggs: row.get("belt_eggs"),
                floor_eggs: row.get("floor_eggs"),
                mortality_indoor: row.get("mortality_indoor"),
                mortality_outdoor: row.get("mortality_outdoor"),
                euthanized_indoor: row.get("euthanized_indoor"),
                euthanized_outdoor: row.get("euthanized_outdoor"),
                door_open: row.get("door_open"),
                door_closed: row.get("door_closed"),
                birds_restricted_reason: row.get("birds_restricted_reason"),
                eggs_picked_up: row.get("eggs_picked_up"),
                weather: row.get("weather"),
                comments: row.get("comments"),
                coolerlog_comments: row.get("coolerlog_comments"),
            }))
        }
        None => Ok(None),
    }
}

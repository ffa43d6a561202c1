//! Database initialization
//!
//! Creates the database file and schema on first run. Every statement is
//! idempotent, so opening an existing database is the same call.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (or create) the daily record store
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // The web form and the upload adapter read while we write
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_daily_bot_log_table(&pool).await?;
    create_daily_user_log_table(&pool).await?;

    Ok(pool)
}

/// Create the daily_bot_log table
///
/// Rows are written once by the aggregator. `cooler_logged_at` and `sent_at`
/// belong to the upload adapter.
pub async fn create_daily_bot_log_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS daily_bot_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            growth_day INTEGER NOT NULL,
            bird_age TEXT,
            feed_consumption REAL,
            lights_on TEXT,
            lights_off TEXT,
            light_anomaly TEXT,
            water_consumption REAL,
            body_weight REAL,
            mortality INTEGER,
            inside_low_temp REAL,
            inside_high_temp REAL,
            outside_low_temp REAL,
            outside_high_temp REAL,
            cooler_time_am TEXT,
            cooler_temp_am REAL,
            cooler_time_pm TEXT,
            cooler_temp_pm REAL,
            source_files INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            cooler_logged_at TEXT,
            sent_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_daily_bot_log_date ON daily_bot_log(date)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the daily_user_log table (filled by the operator web form)
pub async fn create_daily_user_log_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS daily_user_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date_entered TEXT NOT NULL,
            belt_eggs INTEGER,
            floor_eggs INTEGER,
            mortality_indoor INTEGER,
            mortality_outdoor INTEGER,
            euthanized_indoor INTEGER,
            euthanized_outdoor INTEGER,
            door_open TEXT,
            door_closed TEXT,
            birds_restricted_reason TEXT,
            eggs_picked_up INTEGER,
            weather TEXT,
            comments TEXT,
            coolerlog_comments TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

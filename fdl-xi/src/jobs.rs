//! One-shot jobs invoked by the external scheduler
//!
//! Each job runs to completion and returns; nothing here schedules itself.
//! Dates are processed sequentially because quarantine moves and retention
//! deletes change the directory the next run scans.

use crate::aggregator::DailyAggregator;
use crate::error::AggregateError;
use crate::telemetry::{capture_date, capture_stamp, file_name_of, is_telemetry_name};
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, NaiveTime};
use fdl_common::db::{bot_log_exists, insert_daily_bot_log, DailySummary};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Capture time before which a file counts as the start of a day
const DAY_START_BEFORE: (u32, u32) = (1, 0);
/// Capture time from which a file counts as the end of a day
const DAY_END_FROM: (u32, u32) = (23, 0);

#[derive(Clone)]
pub struct JobContext {
    pub aggregator: DailyAggregator,
    pub pool: SqlitePool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Inserted(Box<DailySummary>),
    AlreadyProcessed,
    /// Not enough telemetry yet; the scheduler retries later
    NoData(String),
}

/// Aggregate `date` and store it unless a bot log row already exists
pub async fn run_for_date(ctx: &JobContext, date: NaiveDate) -> Result<JobOutcome> {
    if bot_log_exists(&ctx.pool, date).await? {
        info!("Bot log for {} already exists, skipping", date);
        return Ok(JobOutcome::AlreadyProcessed);
    }

    let aggregator = ctx.aggregator.clone();
    let result = tokio::task::spawn_blocking(move || aggregator.aggregate(date))
        .await
        .context("Aggregation task panicked")?;

    let summary = match result {
        Ok(summary) => summary,
        Err(e @ AggregateError::NoData { .. }) => {
            warn!("{}", e);
            return Ok(JobOutcome::NoData(e.to_string()));
        }
        Err(e) => return Err(e).with_context(|| format!("Aggregation of {} failed", date)),
    };

    let id = insert_daily_bot_log(&ctx.pool, &summary)
        .await
        .with_context(|| format!("Failed to store bot log for {}", date))?;
    info!(
        "Stored bot log {} for {} (growth day {}, {} files)",
        id, date, summary.growth_day, summary.source_files
    );

    Ok(JobOutcome::Inserted(Box::new(summary)))
}

/// Whether the directory holds files captured at both ends of `date`
pub fn day_is_complete(xml_dir: &Path, date: NaiveDate) -> std::io::Result<bool> {
    let start = clock(DAY_START_BEFORE);
    let end = clock(DAY_END_FROM);
    let (mut early, mut late) = (false, false);

    for entry in std::fs::read_dir(xml_dir)? {
        let name = file_name_of(&entry?.path());
        if !is_telemetry_name(&name) || capture_date(&name) != Some(date) {
            continue;
        }
        if let Some(stamp) = capture_stamp(&name) {
            early |= stamp.time() < start;
            late |= stamp.time() >= end;
        }
        if early && late {
            return Ok(true);
        }
    }

    Ok(false)
}

fn clock((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatchUpReport {
    pub inserted: Vec<NaiveDate>,
    pub already_processed: Vec<NaiveDate>,
    pub incomplete: Vec<NaiveDate>,
    pub no_data: Vec<NaiveDate>,
}

/// Dates a catch-up run considers, oldest first
pub fn catch_up_dates(today: NaiveDate, retention_days: u32) -> Vec<NaiveDate> {
    let span = u64::from(retention_days.max(1));
    (1..=span)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect()
}

/// Process every missing, complete day inside the retention window
pub async fn catch_up(ctx: &JobContext, today: NaiveDate) -> Result<CatchUpReport> {
    let settings = ctx.aggregator.settings();
    let mut report = CatchUpReport::default();

    for date in catch_up_dates(today, settings.retention_days) {
        if bot_log_exists(&ctx.pool, date).await? {
            debug!("{} already processed", date);
            report.already_processed.push(date);
            continue;
        }

        let complete = day_is_complete(&settings.xml_dir, date).with_context(|| {
            format!("Cannot read telemetry directory {}", settings.xml_dir.display())
        })?;
        if !complete {
            info!("{} is missing start or end of day files, skipping", date);
            report.incomplete.push(date);
            continue;
        }

        match run_for_date(ctx, date).await? {
            JobOutcome::Inserted(_) => report.inserted.push(date),
            JobOutcome::AlreadyProcessed => report.already_processed.push(date),
            JobOutcome::NoData(_) => report.no_data.push(date),
        }
    }

    info!(
        "Catch-up done: {} inserted, {} already processed, {} incomplete, {} without data",
        report.inserted.len(),
        report.already_processed.len(),
        report.incomplete.len(),
        report.no_data.len()
    );
    Ok(report)
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
    /// No telemetry file in the directory
    Empty,
    Fresh { newest: PathBuf, age: Duration },
    Stale { newest: PathBuf, age: Duration },
}

/// Check how long ago the controller last delivered a file
pub fn feed_status(xml_dir: &Path, now: SystemTime, stale_after: Duration) -> std::io::Result<FeedStatus> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in std::fs::read_dir(xml_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !is_telemetry_name(&file_name_of(&path)) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, path));
        }
    }

    let Some((modified, newest)) = newest else {
        return Ok(FeedStatus::Empty);
    };

    // clock skew can put mtimes in the future
    let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
    if age > stale_after {
        Ok(FeedStatus::Stale { newest, age })
    } else {
        Ok(FeedStatus::Fresh { newest, age })
    }
}

/// Poll [`feed_status`] until Ctrl-C, warning when the feed goes stale
pub async fn watch_feed(xml_dir: PathBuf, stale_after: Duration, every: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(every);
    let mut was_stale = false;

    info!(
        "Watching {} (stale after {}s, checking every {}s)",
        xml_dir.display(),
        stale_after.as_secs(),
        every.as_secs()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, stopping watcher");
                return Ok(());
            }
        }

        match feed_status(&xml_dir, SystemTime::now(), stale_after) {
            Ok(FeedStatus::Empty) => {
                warn!("No telemetry files in {}", xml_dir.display());
                was_stale = true;
            }
            Ok(FeedStatus::Stale { newest, age }) => {
                warn!(
                    "Telemetry feed stale: newest file {} is {} minutes old",
                    file_name_of(&newest),
                    age.as_secs() / 60
                );
                was_stale = true;
            }
            Ok(FeedStatus::Fresh { newest, .. }) => {
                if was_stale {
                    info!("Telemetry feed resumed with {}", file_name_of(&newest));
                }
                was_stale = false;
            }
            Err(e) => warn!("Cannot check {}: {}", xml_dir.display(), e),
        }
    }
}

//! fdl-xi - XML ingest command line
//!
//! Invoked by cron or a systemd timer. `run` aggregates one day (yesterday by
//! default), `catch-up` fills the gaps left by downtime.

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use fdl_common::config::{resolve_config_path, AggregatorSettings, TomlConfig, CONFIG_ENV_VAR};
use fdl_common::db::{init_database, load_production_record};
use fdl_xi::jobs::{self, JobContext, JobOutcome};
use fdl_xi::sweeper::RetentionSweeper;
use fdl_xi::DailyAggregator;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Exit status telling the scheduler to retry later
const EXIT_NO_DATA: u8 = 2;

/// Command-line arguments for fdl-xi
#[derive(Parser, Debug)]
#[command(name = "fdl-xi")]
#[command(about = "Farm telemetry XML to daily record aggregation")]
#[command(version)]
struct Args {
    /// Config file path
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate one day and store it
    Run {
        /// Target date (default: yesterday in the farm time zone)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Skip the retention sweep after a successful run
        #[arg(long)]
        no_delete: bool,

        /// Print the stored summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Process every missing complete day inside the retention window
    CatchUp {
        #[arg(long)]
        no_delete: bool,
    },
    /// Delete XML files older than the retention window
    Sweep,
    /// Print the merged bot and user log of a date as JSON
    Show {
        #[arg(long)]
        date: NaiveDate,
    },
    /// Warn when the controller stops delivering files
    Watch {
        #[arg(long, default_value = "60")]
        interval_secs: u64,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    // loaded before tracing so the configured level applies
    let (config, source) = TomlConfig::load_with_source(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting fdl-xi v{}", env!("CARGO_PKG_VERSION"));
    source.log();

    let settings = config.validate().context("Invalid configuration")?;
    let today = Utc::now().with_timezone(&settings.time_zone).date_naive();

    match args.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Sweep => {
            sweep(&settings, today)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Watch { interval_secs } => {
            let stale_after = Duration::from_secs(u64::from(config.xml.stale_after_minutes) * 60);
            jobs::watch_feed(
                settings.xml_dir.clone(),
                stale_after,
                Duration::from_secs(interval_secs.max(1)),
            )
            .await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { date } => {
            let pool = init_database(&config.database_path()).await?;
            match load_production_record(&pool, date).await? {
                Some(record) => {
                    println!("{}", serde_json::to_string_pretty(&record.merged())?);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    error!("No bot log for {}", date);
                    Ok(ExitCode::from(EXIT_NO_DATA))
                }
            }
        }
        Command::Run {
            date,
            no_delete,
            json,
        } => {
            let ctx = job_context(&config, settings.clone()).await?;
            let date = match date.or_else(|| today.checked_sub_days(Days::new(1))) {
                Some(date) => date,
                None => anyhow::bail!("Cannot compute yesterday from {}", today),
            };

            let code = match jobs::run_for_date(&ctx, date).await? {
                JobOutcome::Inserted(summary) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                    }
                    if !no_delete {
                        sweep(&settings, today)?;
                    }
                    ExitCode::SUCCESS
                }
                JobOutcome::AlreadyProcessed => ExitCode::SUCCESS,
                JobOutcome::NoData(reason) => {
                    error!("{}", reason);
                    ExitCode::from(EXIT_NO_DATA)
                }
            };
            Ok(code)
        }
        Command::CatchUp { no_delete } => {
            let ctx = job_context(&config, settings.clone()).await?;
            let report = jobs::catch_up(&ctx, today).await?;
            if !no_delete && !report.inserted.is_empty() {
                sweep(&settings, today)?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn job_context(config: &TomlConfig, settings: AggregatorSettings) -> Result<JobContext> {
    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    Ok(JobContext {
        aggregator: DailyAggregator::new(settings),
        pool,
    })
}

fn sweep(settings: &AggregatorSettings, today: NaiveDate) -> Result<()> {
    RetentionSweeper::new(&settings.xml_dir, settings.retention_days)
        .sweep(today)
        .with_context(|| format!("Retention sweep of {} failed", settings.xml_dir.display()))?;
    Ok(())
}

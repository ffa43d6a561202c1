//! Configuration loading and validation
//!
//! Bootstrap configuration lives in a TOML file. Resolution order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. `~/.config/fdl/config.toml`, then `/etc/fdl/config.toml`
//!
//! A missing file is not fatal: a warning is logged and built-in defaults are
//! used. Every key has a default, so older files with missing sections load.

use crate::units::ClockTime;
use crate::{Error, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "FDL_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    pub farm: FarmConfig,
    pub xml: XmlConfig,
    pub cooler: CoolerConfig,
    pub system: SystemConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    /// Flock hatch date, used for the bird age column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hatch_date: Option<NaiveDate>,
}

/// Telemetry directory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlConfig {
    /// Directory the controller drops XML files into
    pub path: PathBuf,

    /// Days of XML files to keep; 0 disables deletion
    pub retention_days: u32,

    /// Where unparsable files are moved (default: `<path>/corrupt`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarantine_dir: Option<PathBuf>,

    /// Feed watcher threshold
    pub stale_after_minutes: u32,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/srv/ftp/upload/"),
            retention_days: 2,
            quarantine_dir: None,
            stale_after_minutes: 30,
        }
    }
}

/// Egg cooler reading targets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoolerConfig {
    pub am_time: String,
    pub pm_time: String,
    pub time_tolerance: String,
}

impl Default for CoolerConfig {
    fn default() -> Self {
        Self {
            am_time: "06:00".to_string(),
            pm_time: "18:00".to_string(),
            time_tolerance: "00:30".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// IANA zone of the farm, e.g. `America/Chicago`
    pub time_zone: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            time_zone: "America/Chicago".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where a loaded [`TomlConfig`] came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// A path was given but does not exist; defaults are used
    Missing(PathBuf),
    /// No config file was found anywhere; defaults are used
    Defaults,
}

impl ConfigSource {
    pub fn is_default(&self) -> bool {
        !matches!(self, ConfigSource::File(_))
    }

    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Missing(path) => {
                warn!("Config file {} not found, using built-in defaults", path.display())
            }
            ConfigSource::Defaults => warn!("No config file found, using built-in defaults"),
        }
    }
}

/// Validated settings handed to the aggregator, sweeper and jobs.
///
/// Built once from [`TomlConfig`]; nothing downstream re-parses strings.
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub xml_dir: PathBuf,
    pub quarantine_dir: PathBuf,
    pub retention_days: u32,
    pub cooler_am: ClockTime,
    pub cooler_pm: ClockTime,
    pub cooler_tolerance_minutes: u16,
    pub time_zone: Tz,
    pub hatch_date: Option<NaiveDate>,
}

impl AggregatorSettings {
    /// Settings for a telemetry directory with the stock cooler targets.
    ///
    /// Convenient for tests and tools that do not read a config file.
    pub fn for_directory(xml_dir: impl Into<PathBuf>) -> Self {
        let xml_dir = xml_dir.into();
        Self {
            quarantine_dir: xml_dir.join("corrupt"),
            xml_dir,
            retention_days: 2,
            cooler_am: ClockTime::from_minutes_wrapping(6 * 60),
            cooler_pm: ClockTime::from_minutes_wrapping(18 * 60),
            cooler_tolerance_minutes: 30,
            time_zone: chrono_tz::America::Chicago,
            hatch_date: None,
        }
    }
}

impl TomlConfig {
    /// Load configuration from `path`.
    ///
    /// `None` or a path that does not exist yields defaults with a warning.
    /// A file that exists but does not parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config, source) = Self::load_with_source(path)?;
        source.log();
        Ok(config)
    }

    /// Like [`TomlConfig::load`] but reports where the values came from
    /// instead of logging it, for callers that install tracing afterwards
    pub fn load_with_source(path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let Some(path) = path else {
            return Ok((Self::default(), ConfigSource::Defaults));
        };

        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Missing(path.to_path_buf())));
        }

        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))?;

        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    /// Render as TOML (used to print the effective configuration)
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Database path, falling back to the platform data directory
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    /// Validate string-typed values and build [`AggregatorSettings`]
    pub fn validate(&self) -> Result<AggregatorSettings> {
        let clock = |key: &str, value: &str| {
            ClockTime::parse(value)
                .map_err(|_| Error::Config(format!("{} must be HH:MM, got '{}'", key, value)))
        };

        let cooler_am = clock("cooler.am_time", &self.cooler.am_time)?;
        let cooler_pm = clock("cooler.pm_time", &self.cooler.pm_time)?;
        let tolerance = clock("cooler.time_tolerance", &self.cooler.time_tolerance)?;

        let time_zone: Tz = self.system.time_zone.parse().map_err(|_| {
            Error::Config(format!("Unknown time zone '{}'", self.system.time_zone))
        })?;

        let quarantine_dir = self
            .xml
            .quarantine_dir
            .clone()
            .unwrap_or_else(|| self.xml.path.join("corrupt"));

        Ok(AggregatorSettings {
            xml_dir: self.xml.path.clone(),
            quarantine_dir,
            retention_days: self.xml.retention_days,
            cooler_am,
            cooler_pm,
            cooler_tolerance_minutes: tolerance.minutes(),
            time_zone,
            hatch_date: self.farm.hatch_date,
        })
    }
}

/// Resolve which config file to read
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: user config, then system config
    let user_config = dirs::config_dir().map(|d| d.join("fdl").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/fdl/config.toml");
    if system_config.exists() {
        return Some(system_config);
    }

    None
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("fdl").join("fdl.db"))
        .unwrap_or_else(|| PathBuf::from("/var/lib/fdl/fdl.db"))
}

//! Application configuration.
//!
//! Settings are layered: built-in defaults, then an optional
//! `fueltrack/config.toml` under the user's config directory, then
//! `FUELTRACK_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::monitor::{MonitorSettings, DEFAULT_THRESHOLD};

/// Directory under the platform config dir holding our files.
pub const CONFIG_DIR_NAME: &str = "fueltrack";
/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "FUELTRACK";

const DEFAULT_CONFIG: &str = r#"# fueltrack configuration

# Seconds between two fuel samples of the low fuel monitor.
monitor_interval_secs = 5

# Warn when a vehicle holds strictly less fuel than this.
low_fuel_threshold = 5.0

# Number of low fuel warnings kept on screen.
warning_history = 50

# Directory receiving fueltrack.log.
log_dir = "logs"
"#;

/// Runtime configuration for the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Seconds between two monitor samples.
    pub monitor_interval_secs: u64,
    /// Fuel level below which the monitor warns.
    pub low_fuel_threshold: f64,
    /// How many warnings the UI keeps.
    pub warning_history: usize,
    /// Where the log file is written.
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            monitor_interval_secs: 5,
            low_fuel_threshold: DEFAULT_THRESHOLD,
            warning_history: 50,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration using `path` as the optional file layer.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = AppConfig::default();
        let settings = Config::builder()
            .set_default("monitor_interval_secs", defaults.monitor_interval_secs as i64)?
            .set_default("low_fuel_threshold", defaults.low_fuel_threshold)?
            .set_default("warning_history", defaults.warning_history as i64)?
            .set_default("log_dir", defaults.log_dir.to_string_lossy().into_owned())?
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.monitor_interval_secs == 0 {
            bail!("monitor_interval_secs must be greater than zero");
        }
        if !self.low_fuel_threshold.is_finite() || self.low_fuel_threshold < 0.0 {
            bail!(
                "low_fuel_threshold must be a non-negative number, got {}",
                self.low_fuel_threshold
            );
        }
        Ok(())
    }

    /// Sampling parameters for the low fuel monitor.
    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            interval: Duration::from_secs(self.monitor_interval_secs),
            threshold: self.low_fuel_threshold,
        }
    }
}

/// Default location of the configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}

mod app;
mod form;

use std::{
    fs::{self, OpenOptions},
    path::Path,
};

use anyhow::{Context, Result};
use fueltrack_core::{
    config::{self, AppConfig},
    FuelMonitors,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

const WARNING_CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config.log_dir)?;
    info!(
        config = %config_path.display(),
        interval_secs = config.monitor_interval_secs,
        threshold = config.low_fuel_threshold,
        "Starting fuel tracker"
    );

    let (warning_tx, warning_rx) = mpsc::channel(WARNING_CHANNEL_CAPACITY);
    let monitors = FuelMonitors::new(config.monitor_settings(), warning_tx);

    let mut app = app::FuelTrackerApp::new(monitors, config.warning_history);
    app.attach_warnings(warning_rx);
    app.run().await
}

/// Log to `<log_dir>/fueltrack.log`; the terminal itself belongs to the UI.
fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("fueltrack.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(std::sync::Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}

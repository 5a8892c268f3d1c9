#![warn(clippy::all, missing_docs)]

//! Core domain logic for the fuel tracker.
//!
//! This crate hosts the vehicle and trip models, the fleet registry,
//! the background low-fuel monitor and configuration handling used by
//! the terminal UI.

pub mod config;
pub mod error;
pub mod fleet;
pub mod models;
pub mod monitor;
pub mod vehicle;

pub use config::AppConfig;
pub use error::{FleetError, Result};
pub use fleet::FleetRegistry;
pub use models::{Trip, VehicleKind};
pub use monitor::{FuelMonitors, LowFuelWarning, MonitorSettings};
pub use vehicle::{FuelGauge, Vehicle};

//! Shared domain models.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a registered vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleKind {
    /// Passenger car.
    Car,
    /// Motorbike.
    Bike,
    /// Truck.
    Truck,
}

impl VehicleKind {
    /// All kinds in menu order.
    pub const ALL: [VehicleKind; 3] = [VehicleKind::Car, VehicleKind::Bike, VehicleKind::Truck];

    /// Upper-case label used in tables.
    pub fn label(self) -> &'static str {
        match self {
            VehicleKind::Car => "CAR",
            VehicleKind::Bike => "BIKE",
            VehicleKind::Truck => "TRUCK",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a vehicle kind cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vehicle type '{0}' (expected 1.CAR 2.BIKE 3.TRUCK)")]
pub struct ParseKindError(String);

impl FromStr for VehicleKind {
    type Err = ParseKindError;

    /// Accepts the one-based menu number or the kind name in any case.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if let Ok(choice) = trimmed.parse::<usize>() {
            return choice
                .checked_sub(1)
                .and_then(|idx| Self::ALL.get(idx).copied())
                .ok_or_else(|| ParseKindError(trimmed.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseKindError(trimmed.to_string()))
    }
}

/// A single recorded trip. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    distance: f64,
    fuel_used: f64,
    recorded_at: DateTime<Utc>,
}

impl Trip {
    pub(crate) fn new(distance: f64, fuel_used: f64) -> Self {
        Self {
            distance,
            fuel_used,
            recorded_at: Utc::now(),
        }
    }

    /// Distance covered.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Fuel consumed.
    pub fn fuel_used(&self) -> f64 {
        self.fuel_used
    }

    /// When the trip was recorded.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Distance per unit of fuel.
    pub fn efficiency(&self) -> f64 {
        self.distance / self.fuel_used
    }
}

#![allow(missing_docs)]

//! Vehicles, their fuel tank and trip history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::{
    error::{FleetError, Result},
    models::{Trip, VehicleKind},
};

/// Shared handle to a vehicle's fuel level.
///
/// The owning [`Vehicle`] is the only writer. Clones handed out through
/// [`Vehicle::gauge`] can only read, which is all the low-fuel monitor needs.
#[derive(Debug, Clone, Default)]
pub struct FuelGauge {
    level: Arc<RwLock<f64>>,
}

impl FuelGauge {
    /// Current fuel level.
    pub fn level(&self) -> f64 {
        *self.level.read()
    }

    fn set(&self, value: f64) {
        *self.level.write() = value;
    }
}

/// A tracked vehicle with its tank, pricing and trip log.
#[derive(Debug)]
pub struct Vehicle {
    name: String,
    kind: VehicleKind,
    gauge: FuelGauge,
    total_fuel_added: f64,
    price_per_unit: f64,
    trips: Vec<Trip>,
    best_trip: Option<usize>,
    registered_at: DateTime<Utc>,
}

impl Vehicle {
    /// Create an empty vehicle with no fuel and no trips.
    pub fn new(name: impl Into<String>, kind: VehicleKind) -> Self {
        Self {
            name: name.into(),
            kind,
            gauge: FuelGauge::default(),
            total_fuel_added: 0.0,
            price_per_unit: 0.0,
            trips: Vec::new(),
            best_trip: None,
            registered_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn fuel_level(&self) -> f64 {
        self.gauge.level()
    }

    /// Total fuel ever added through refills.
    pub fn total_fuel_added(&self) -> f64 {
        self.total_fuel_added
    }

    /// Price paid per unit on the most recent refill.
    pub fn price_per_unit(&self) -> f64 {
        self.price_per_unit
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Read-only handle on the fuel level for background observers.
    pub fn gauge(&self) -> FuelGauge {
        self.gauge.clone()
    }

    /// Add fuel to the tank and record the price paid.
    pub fn refill_fuel(&mut self, amount: f64, price_per_unit: f64) -> Result<()> {
        require_positive("fuel amount", amount)?;
        require_non_negative("price per unit", price_per_unit)?;

        self.gauge.set(self.gauge.level() + amount);
        self.total_fuel_added += amount;
        self.price_per_unit = price_per_unit;
        Ok(())
    }

    /// Override the current tank level, e.g. after a manual gauge reading.
    ///
    /// Leaves `total_fuel_added` untouched.
    pub fn set_fuel_level(&mut self, level: f64) -> Result<()> {
        require_non_negative("fuel level", level)?;
        self.gauge.set(level);
        Ok(())
    }

    /// Record a trip, consuming fuel from the tank.
    ///
    /// Using exactly the remaining fuel is allowed and empties the tank. On
    /// error nothing is changed.
    pub fn add_trip(&mut self, distance: f64, fuel_used: f64) -> Result<&Trip> {
        require_non_negative("distance", distance)?;
        require_positive("fuel used", fuel_used)?;

        let available = self.gauge.level();
        if fuel_used > available {
            return Err(FleetError::InsufficientFuel {
                requested: fuel_used,
                available,
            });
        }

        let trip = Trip::new(distance, fuel_used);
        let is_best = self
            .best_trip()
            .map(|best| trip.efficiency() > best.efficiency())
            .unwrap_or(true);

        self.trips.push(trip);
        self.gauge.set(available - fuel_used);
        let index = self.trips.len() - 1;
        if is_best {
            self.best_trip = Some(index);
        }
        Ok(&self.trips[index])
    }

    /// Total distance over total fuel, or `0.0` without any fuel used.
    pub fn overall_efficiency(&self) -> f64 {
        let fuel = self.total_fuel_used();
        if fuel == 0.0 {
            0.0
        } else {
            self.total_distance() / fuel
        }
    }

    pub fn total_distance(&self) -> f64 {
        self.trips.iter().map(Trip::distance).sum()
    }

    pub fn total_fuel_used(&self) -> f64 {
        self.trips.iter().map(Trip::fuel_used).sum()
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// Trips in recording order with one-based display numbers.
    pub fn list_trips(&self) -> impl Iterator<Item = (usize, &Trip)> + '_ {
        self.trips.iter().enumerate().map(|(idx, trip)| (idx + 1, trip))
    }

    /// The most efficient trip so far; the earliest one wins ties.
    pub fn best_trip(&self) -> Option<&Trip> {
        self.best_trip.and_then(|idx| self.trips.get(idx))
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FleetError::InvalidAmount { field, value })
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FleetError::InvalidAmount { field, value })
    }
}

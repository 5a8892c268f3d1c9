//! Registry of tracked vehicles.

use std::collections::HashMap;

use crate::{
    error::{FleetError, Result},
    models::VehicleKind,
    vehicle::Vehicle,
};

/// Ordered collection of vehicles with a name index.
///
/// Registration order is display order. The name index always mirrors the
/// ordered list since both are only ever touched through this type.
#[derive(Debug, Default)]
pub struct FleetRegistry {
    vehicles: Vec<Vehicle>,
    by_name: HashMap<String, usize>,
}

impl FleetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new vehicle under a unique, non-blank name.
    pub fn register(&mut self, name: &str, kind: VehicleKind) -> Result<&Vehicle> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FleetError::InvalidName);
        }
        if self.by_name.contains_key(name) {
            return Err(FleetError::DuplicateName(name.to_string()));
        }

        let index = self.vehicles.len();
        self.vehicles.push(Vehicle::new(name, kind));
        self.by_name.insert(name.to_string(), index);
        Ok(&self.vehicles[index])
    }

    /// Look up a vehicle by zero-based position.
    pub fn by_index(&self, index: usize) -> Result<&Vehicle> {
        let len = self.vehicles.len();
        self.vehicles
            .get(index)
            .ok_or(FleetError::IndexOutOfRange { index, len })
    }

    /// Mutable variant of [`FleetRegistry::by_index`].
    pub fn by_index_mut(&mut self, index: usize) -> Result<&mut Vehicle> {
        let len = self.vehicles.len();
        self.vehicles
            .get_mut(index)
            .ok_or(FleetError::IndexOutOfRange { index, len })
    }

    /// Look up a vehicle by its registered name.
    pub fn by_name(&self, name: &str) -> Result<&Vehicle> {
        let index = self.position(name)?;
        Ok(&self.vehicles[index])
    }

    /// Mutable variant of [`FleetRegistry::by_name`].
    pub fn by_name_mut(&mut self, name: &str) -> Result<&mut Vehicle> {
        let index = self.position(name)?;
        Ok(&mut self.vehicles[index])
    }

    /// Zero-based position of the named vehicle.
    pub fn position(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| FleetError::NotFound(name.to_string()))
    }

    /// Vehicle with the highest overall efficiency. The first registered
    /// vehicle wins ties.
    pub fn most_efficient(&self) -> Result<&Vehicle> {
        let mut vehicles = self.vehicles.iter();
        let mut best = vehicles.next().ok_or(FleetError::EmptyFleet)?;
        let mut best_efficiency = best.overall_efficiency();
        for vehicle in vehicles {
            let efficiency = vehicle.overall_efficiency();
            if efficiency > best_efficiency {
                best = vehicle;
                best_efficiency = efficiency;
            }
        }
        Ok(best)
    }

    /// Vehicles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.vehicles.iter()
    }

    /// Number of registered vehicles.
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Whether no vehicle has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet_with_efficiencies(entries: &[(&str, f64)]) -> Result<FleetRegistry> {
        let mut fleet = FleetRegistry::new();
        for (name, efficiency) in entries {
            fleet.register(name, VehicleKind::Car)?;
            let vehicle = fleet.by_name_mut(name)?;
            vehicle.refill_fuel(10.0, 1.0)?;
            vehicle.add_trip(efficiency * 10.0, 10.0)?;
        }
        Ok(fleet)
    }

    #[test]
    fn register_keeps_order_and_index_in_sync() -> Result<()> {
        let mut fleet = FleetRegistry::new();
        fleet.register("Civic", VehicleKind::Car)?;
        fleet.register("  Vespa ", VehicleKind::Bike)?;
        fleet.register("Actros", VehicleKind::Truck)?;

        assert_eq!(fleet.len(), 3);
        let names: Vec<&str> = fleet.iter().map(Vehicle::name).collect();
        assert_eq!(names, vec!["Civic", "Vespa", "Actros"]);
        for (idx, vehicle) in fleet.iter().enumerate() {
            assert_eq!(fleet.position(vehicle.name())?, idx);
        }
        assert_eq!(fleet.by_name("Vespa")?.kind(), VehicleKind::Bike);
        Ok(())
    }

    #[test]
    fn duplicate_names_are_rejected() -> Result<()> {
        let mut fleet = FleetRegistry::new();
        fleet.register("Civic", VehicleKind::Car)?;
        let err = fleet.register("Civic", VehicleKind::Truck).unwrap_err();
        assert_eq!(err, FleetError::DuplicateName("Civic".to_string()));
        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet.by_name("Civic")?.kind(), VehicleKind::Car);
        Ok(())
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut fleet = FleetRegistry::new();
        assert_eq!(
            fleet.register("   ", VehicleKind::Car).unwrap_err(),
            FleetError::InvalidName
        );
        assert!(fleet.is_empty());
    }

    #[test]
    fn lookups_report_missing_vehicles() -> Result<()> {
        let mut fleet = FleetRegistry::new();
        fleet.register("Civic", VehicleKind::Car)?;

        assert_eq!(
            fleet.by_index(1).unwrap_err(),
            FleetError::IndexOutOfRange { index: 1, len: 1 }
        );
        assert!(fleet.by_index_mut(5).is_err());
        assert_eq!(
            fleet.by_name("Golf").unwrap_err(),
            FleetError::NotFound("Golf".to_string())
        );
        assert_eq!(fleet.by_index(0)?.name(), "Civic");
        Ok(())
    }

    #[test]
    fn mutations_through_index_are_visible_by_name() -> Result<()> {
        let mut fleet = FleetRegistry::new();
        fleet.register("Civic", VehicleKind::Car)?;
        fleet.by_index_mut(0)?.refill_fuel(12.0, 1.4)?;
        assert_eq!(fleet.by_name("Civic")?.fuel_level(), 12.0);
        Ok(())
    }

    #[test]
    fn most_efficient_requires_vehicles() {
        let fleet = FleetRegistry::new();
        assert_eq!(fleet.most_efficient().unwrap_err(), FleetError::EmptyFleet);
    }

    #[test]
    fn most_efficient_picks_highest_overall() -> Result<()> {
        let fleet = fleet_with_efficiencies(&[("A", 8.0), ("B", 12.0)])?;
        assert_eq!(fleet.most_efficient()?.name(), "B");
        Ok(())
    }

    #[test]
    fn most_efficient_prefers_first_registered_on_ties() -> Result<()> {
        let fleet = fleet_with_efficiencies(&[("A", 9.0), ("B", 9.0), ("C", 3.0)])?;
        assert_eq!(fleet.most_efficient()?.name(), "A");

        let mut idle = FleetRegistry::new();
        idle.register("First", VehicleKind::Car)?;
        idle.register("Second", VehicleKind::Bike)?;
        assert_eq!(idle.most_efficient()?.name(), "First");
        Ok(())
    }
}

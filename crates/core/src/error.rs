//! Error taxonomy shared by the fleet operations.

use thiserror::Error;

/// Convenience alias for fallible fleet operations.
pub type Result<T, E = FleetError> = std::result::Result<T, E>;

/// Recoverable failures returned by vehicle and registry operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FleetError {
    /// A trip asked for more fuel than the tank holds.
    #[error("not enough fuel: trip needs {requested:.2} but only {available:.2} left, refill first")]
    InsufficientFuel {
        /// Fuel the trip would consume.
        requested: f64,
        /// Fuel currently in the tank.
        available: f64,
    },
    /// A positional lookup fell outside the registry.
    #[error("no vehicle at position {index} (fleet has {len})")]
    IndexOutOfRange {
        /// Zero-based index that was requested.
        index: usize,
        /// Number of registered vehicles.
        len: usize,
    },
    /// A name lookup found nothing.
    #[error("no vehicle named '{0}'")]
    NotFound(String),
    /// A fleet-wide query ran against an empty registry.
    #[error("no vehicles registered")]
    EmptyFleet,
    /// Registration reused an existing name.
    #[error("a vehicle named '{0}' is already registered")]
    DuplicateName(String),
    /// Registration was attempted with a blank name.
    #[error("vehicle name must not be empty")]
    InvalidName,
    /// A numeric input was negative, zero where not allowed, or not finite.
    #[error("invalid {field}: {value}")]
    InvalidAmount {
        /// Which input was rejected.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}

//! Error types used by the quotagate simulator.
//!
//! This module defines the error enums raised by the concurrency core:
//!
//! - [`ConfigError`]: misconfiguration detected before any worker is spawned.
//! - [`PoolError`]: addressing a resource that is not in the pool.
//! - [`GateError`]: the admission gate can no longer hand out slots.
//! - [`SimulationError`]: everything that can end a run abnormally.
//!
//! Operation outcomes (a rejected booking, a cancellation with nothing booked)
//! are **not** errors; they are ordinary [`Outcome`](crate::Outcome) values.
//! Every enum provides `as_label` for logs/metrics.

use thiserror::Error;

/// # Configuration rejected by [`SimulationConfig::validate`](crate::SimulationConfig::validate).
///
/// Raised before any resource, gate or worker is created.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The pool must contain at least one resource.
    #[error("resource_count must be positive")]
    ZeroResources,

    /// Each resource needs a positive capacity.
    #[error("capacity_per_resource must be positive")]
    ZeroCapacity,

    /// At least one worker has to run.
    #[error("worker_count must be positive")]
    ZeroWorkers,

    /// The admission gate needs at least one slot.
    #[error("gate_capacity must be positive")]
    ZeroGate,

    /// The run needs a positive duration.
    #[error("run_duration must be positive")]
    ZeroDuration,

    /// Bookings request at least one unit.
    #[error("book_min must be positive")]
    ZeroBookMin,

    /// `book_min` is above `book_max`.
    #[error("invalid booking range: book_min={min} > book_max={max}")]
    InvalidBookRange {
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use quotagate::ConfigError;
    ///
    /// let err = ConfigError::InvalidBookRange { min: 9, max: 3 };
    /// assert_eq!(err.as_label(), "config_invalid_book_range");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroResources => "config_zero_resources",
            ConfigError::ZeroCapacity => "config_zero_capacity",
            ConfigError::ZeroWorkers => "config_zero_workers",
            ConfigError::ZeroGate => "config_zero_gate",
            ConfigError::ZeroDuration => "config_zero_duration",
            ConfigError::ZeroBookMin => "config_zero_book_min",
            ConfigError::InvalidBookRange { .. } => "config_invalid_book_range",
        }
    }
}

/// Error returned when a resource id is outside the pool.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// No resource with this id.
    #[error("unknown resource {id} (pool has {len} resources)")]
    UnknownResource {
        /// Requested id.
        id: usize,
        /// Pool size.
        len: usize,
    },
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::UnknownResource { .. } => "pool_unknown_resource",
        }
    }
}

/// Error returned by [`AdmissionGate::acquire`](crate::AdmissionGate::acquire).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// The gate was closed; no further slots will be granted.
    #[error("admission gate closed")]
    Closed,
}

impl GateError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            GateError::Closed => "gate_closed",
        }
    }
}

/// # Errors that end a simulation run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Configuration was rejected before start.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A worker addressed a resource outside the pool.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// A resource quota was observed outside `[0, capacity]`.
    ///
    /// Indicates a locking-discipline bug; never produced by a correct run.
    #[error("resource {resource} has {available} available, capacity {capacity}")]
    InvariantViolated {
        /// Resource id.
        resource: usize,
        /// Observed quota.
        available: u32,
        /// Resource capacity.
        capacity: u32,
    },

    /// A worker task panicked or was aborted.
    #[error("worker {worker:?} panicked: {reason}")]
    WorkerPanicked {
        /// Worker id (`None` if the join error could not be attributed).
        worker: Option<usize>,
        /// Panic payload or abort reason.
        reason: String,
    },
}

impl SimulationError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use quotagate::{ConfigError, SimulationError};
    ///
    /// let err = SimulationError::from(ConfigError::ZeroGate);
    /// assert_eq!(err.as_label(), "config_zero_gate");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SimulationError::Config(e) => e.as_label(),
            SimulationError::Pool(e) => e.as_label(),
            SimulationError::InvariantViolated { .. } => "invariant_violated",
            SimulationError::WorkerPanicked { .. } => "worker_panicked",
        }
    }

    /// Indicates whether the error is an invariant violation (a locking bug).
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SimulationError::InvariantViolated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_has_a_label() {
        assert_eq!(GateError::Closed.as_label(), "gate_closed");
        assert_eq!(
            PoolError::UnknownResource { id: 4, len: 2 }.as_label(),
            "pool_unknown_resource"
        );
        assert_eq!(ConfigError::ZeroWorkers.as_label(), "config_zero_workers");

        let err = SimulationError::InvariantViolated {
            resource: 1,
            available: 11,
            capacity: 10,
        };
        assert_eq!(err.as_label(), "invariant_violated");
        assert!(err.is_invariant_violation());
    }
}

//! # Simulation configuration.
//!
//! Provides [`SimulationConfig`], the centralized settings for one simulation run.
//!
//! Config is consumed by [`Simulator::builder`](crate::Simulator::builder), which
//! validates it before anything is spawned.
//!
//! ## Defaults
//! The defaults describe the classic seat-booking setup: 100 trains of 500
//! seats, 20 booking clerks, at most 5 of them inside the booking system at
//! once, one minute of activity.

use std::ops::RangeInclusive;
use std::time::Duration;

use crate::error::ConfigError;
use crate::workload::{ThinkTime, Workload};

/// Configuration for one simulation run.
///
/// ## Field semantics
/// - `resource_count`: size of the pool (`> 0`)
/// - `capacity_per_resource`: initial and maximum quota of every resource (`> 0`)
/// - `worker_count`: number of workers spawned (`> 0`)
/// - `gate_capacity`: admission slots (`> 0`; `≤ worker_count` is recommended, not enforced)
/// - `run_duration`: time from start to the shared deadline (`> 0`)
/// - `book_min..=book_max`: booking quantity range (`0 < book_min ≤ book_max`)
/// - `think_time`: pause before each iteration
/// - `seed`: base seed for per-worker sources (`None` = draw one at start)
/// - `bus_capacity`: event ring buffer size (min 1)
/// - `handle_signals`: stop early on SIGINT/SIGTERM/SIGQUIT/Ctrl-C
///
/// ## Notes
/// All fields are public; call [`validate`](Self::validate) (the builder does)
/// rather than sprinkling checks across the codebase.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Number of resources in the pool.
    pub resource_count: usize,

    /// Capacity of every resource.
    pub capacity_per_resource: u32,

    /// Number of workers.
    pub worker_count: usize,

    /// Maximum number of workers inside the critical region at once.
    pub gate_capacity: usize,

    /// Duration from start to the deadline shared by all workers.
    ///
    /// Workers do not start new operations after the deadline; an operation
    /// admitted before it always completes.
    pub run_duration: Duration,

    /// Smallest booking quantity.
    pub book_min: u32,

    /// Largest booking quantity.
    pub book_max: u32,

    /// Pause before each iteration.
    pub think_time: ThinkTime,

    /// Base seed; worker `i` uses `seed + i`.
    pub seed: Option<u64>,

    /// Capacity of the event bus ring buffer.
    ///
    /// A listener that lags more than this many events skips the oldest ones.
    pub bus_capacity: usize,

    /// Listen for OS termination signals and stop workers early.
    pub handle_signals: bool,
}

impl SimulationConfig {
    /// Checks every field; fails on the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resource_count == 0 {
            return Err(ConfigError::ZeroResources);
        }
        if self.capacity_per_resource == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.gate_capacity == 0 {
            return Err(ConfigError::ZeroGate);
        }
        if self.run_duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        if self.book_min == 0 {
            return Err(ConfigError::ZeroBookMin);
        }
        if self.book_min > self.book_max {
            return Err(ConfigError::InvalidBookRange {
                min: self.book_min,
                max: self.book_max,
            });
        }
        Ok(())
    }

    /// Inclusive booking quantity range.
    #[inline]
    pub fn book_range(&self) -> RangeInclusive<u32> {
        self.book_min..=self.book_max
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Operation generation bounds derived from this config.
    pub fn workload(&self) -> Workload {
        Workload {
            resource_count: self.resource_count,
            book: self.book_range(),
        }
    }
}

impl Default for SimulationConfig {
    /// Default configuration:
    ///
    /// - 100 resources × 500 capacity
    /// - 20 workers, gate capacity 5
    /// - 60s run, bookings of 5..=10
    /// - think time uniform in `[0, 500ms)`
    /// - no fixed seed, `bus_capacity = 1024`, signals handled
    fn default() -> Self {
        Self {
            resource_count: 100,
            capacity_per_resource: 500,
            worker_count: 20,
            gate_capacity: 5,
            run_duration: Duration::from_secs(60),
            book_min: 5,
            book_max: 10,
            think_time: ThinkTime::default(),
            seed: None,
            bus_capacity: 1024,
            handle_signals: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    fn validate_with(mutate: impl FnOnce(&mut SimulationConfig)) -> Result<(), ConfigError> {
        let mut cfg = SimulationConfig::default();
        mutate(&mut cfg);
        cfg.validate()
    }

    #[test]
    fn test_each_zero_field_is_rejected() {
        assert_eq!(
            validate_with(|c| c.resource_count = 0),
            Err(ConfigError::ZeroResources)
        );
        assert_eq!(
            validate_with(|c| c.capacity_per_resource = 0),
            Err(ConfigError::ZeroCapacity)
        );
        assert_eq!(
            validate_with(|c| c.worker_count = 0),
            Err(ConfigError::ZeroWorkers)
        );
        assert_eq!(
            validate_with(|c| c.gate_capacity = 0),
            Err(ConfigError::ZeroGate)
        );
        assert_eq!(
            validate_with(|c| c.run_duration = Duration::ZERO),
            Err(ConfigError::ZeroDuration)
        );
        assert_eq!(
            validate_with(|c| c.book_min = 0),
            Err(ConfigError::ZeroBookMin)
        );
    }

    #[test]
    fn test_inverted_book_range() {
        let cfg = SimulationConfig {
            book_min: 10,
            book_max: 5,
            ..SimulationConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidBookRange { min: 10, max: 5 })
        );
    }

    #[test]
    fn test_gate_above_workers_is_allowed() {
        let cfg = SimulationConfig {
            worker_count: 2,
            gate_capacity: 8,
            ..SimulationConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_workload_mirrors_config() {
        let cfg = SimulationConfig::default();
        let wl = cfg.workload();
        assert_eq!(wl.resource_count, 100);
        assert_eq!(wl.book, 5..=10);
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
    }
}

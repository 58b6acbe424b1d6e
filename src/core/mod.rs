//! Simulation core: configuration, workers and the driver.
//!
//! - [`config`]: run settings and validation;
//! - [`worker`]: one worker's state machine (gate slot, then resource lock);
//! - [`simulator`]: spawns workers, handles OS signals, builds the report;
//! - [`builder`]: wires subscribers, sources and an external stop token;
//! - [`shutdown`]: cross-platform termination signals.

mod builder;
mod config;
mod shutdown;
mod simulator;
mod worker;

pub use builder::SimulatorBuilder;
pub use config::SimulationConfig;
pub use shutdown::wait_for_shutdown_signal;
pub use simulator::Simulator;
pub use worker::{OperationRecord, StopReason, Worker, WorkerParams, WorkerState, WorkerSummary};

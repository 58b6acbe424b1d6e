//! # quotagate
//!
//! **quotagate** simulates many concurrent workers booking, cancelling and
//! inquiring against a fixed set of quota-limited resources.
//!
//! Two tiers of synchronization guard the shared state:
//! an [`AdmissionGate`] bounds how many workers are inside the booking system
//! at once, and each [`Resource`] carries its own lock so operations on one
//! resource are serialized while different resources proceed in parallel.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Worker 0   │   │   Worker 1   │   │  Worker N-1  │
//!     │ (think, gen) │   │ (think, gen) │   │ (think, gen) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  AdmissionGate (counting semaphore, gate_capacity slots)          │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ResourcePool: Resource[0] │ Resource[1] │ ... │ Resource[R-1]    │
//! │                (one lock guarding one quota each)                 │
//! └───────────────────────────────────────────────────────────────────┘
//!
//!   every step ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                            ├─► LogWriter
//!                                                            └─► custom ...
//! ```
//!
//! ### Worker loop
//! ```text
//! loop {
//!   ├─► think (cut short by stop)
//!   ├─► generate op: resource, kind, quantity
//!   ├─► stop or deadline passed? ─► Finished
//!   ├─► acquire gate slot
//!   ├─► lock resource ─► Inquire | Book | Cancel ─► publish outcome
//!   └─► release resource lock, then gate slot
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------|---------------------------------------------|
//! | **Simulation**    | Spawn workers, join them, read the final state.             | [`Simulator`], [`SimulationReport`]         |
//! | **Admission**     | Bound the number of workers in the critical region.         | [`AdmissionGate`], [`GatePermit`]           |
//! | **Resources**     | Per-resource locks guarding a quota.                        | [`ResourcePool`], [`ResourceGuard`]         |
//! | **Workload**      | Seeded, injectable randomness for operations and pauses.    | [`RandomSource`], [`SeededSource`]          |
//! | **Subscriber API**| Observe gate waits, outcomes and run lifecycle.             | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors with stable labels.                            | [`SimulationError`], [`ConfigError`]        |
//! | **Configuration** | Centralize run settings.                                    | [`SimulationConfig`]                        |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`LogWriter`] subscriber (renders events through `tracing`).
//! - `cli`: builds the `quotagate` binary.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use quotagate::{SimulationConfig, Simulator, Subscribe, ThinkTime};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = SimulationConfig {
//!         resource_count: 10,
//!         capacity_per_resource: 50,
//!         worker_count: 6,
//!         gate_capacity: 3,
//!         run_duration: Duration::from_millis(100),
//!         think_time: ThinkTime::uniform_ms(5),
//!         seed: Some(42),
//!         handle_signals: false,
//!         ..SimulationConfig::default()
//!     };
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(quotagate::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!
//!     let report = Simulator::builder(cfg)
//!         .with_subscribers(subs)
//!         .build()?
//!         .run()
//!         .await?;
//!
//!     assert!(report.peak_gate_occupancy <= 3);
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
mod admission;
mod core;
mod error;
mod events;
mod occupancy;
mod report;
mod resources;
mod subscribers;
mod workload;

// ---- Public re-exports ----

pub use crate::admission::{AdmissionGate, GatePermit};
pub use crate::core::{
    OperationRecord, SimulationConfig, Simulator, SimulatorBuilder, StopReason, Worker,
    WorkerParams, WorkerState, WorkerSummary, wait_for_shutdown_signal,
};
pub use crate::error::{ConfigError, GateError, PoolError, SimulationError};
pub use crate::events::{Bus, Event, EventKind};
pub use crate::report::{OutcomeTally, SimulationReport};
pub use crate::resources::{Resource, ResourceGuard, ResourcePool, ResourceSnapshot};
pub use crate::subscribers::{Subscribe, SubscriberSet};
pub use crate::workload::{
    Operation, OperationKind, Outcome, RandomSource, SeededSource, SourceFactory, ThinkTime,
    Workload, entropy_seed, seeded_factory,
};

// Optional: built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use crate::subscribers::LogWriter;

//! Simulation events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish events emitted by the simulator and its workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Simulator` (run/shutdown events), `Worker` (gate and
//!   outcome events), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the simulator's listener, which fans out to `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

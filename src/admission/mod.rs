//! Global admission control.
//!
//! - [`AdmissionGate`] bounded counting gate (semaphore + occupancy gauge)
//! - [`GatePermit`] RAII slot; dropping it releases the slot

mod gate;

pub use gate::{AdmissionGate, GatePermit};

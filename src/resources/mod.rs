//! Resources and the pool that owns them.
//!
//! ## Contents
//! - [`Resource`], [`ResourceGuard`] one quota behind its own lock
//! - [`ResourcePool`], [`ResourceSnapshot`] fixed arena addressed by index
//!
//! No task ever holds two resource locks at once, so there is no lock-ordering
//! concern between resources.

mod pool;
mod resource;

pub use pool::{ResourcePool, ResourceSnapshot};
pub use resource::{Resource, ResourceGuard};

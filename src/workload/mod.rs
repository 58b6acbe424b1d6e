//! Workload generation.
//!
//! This module groups everything a worker needs to decide **what** to do next:
//!
//! ## Contents
//! - [`Operation`], [`OperationKind`], [`Outcome`] the operation value and its result
//! - [`RandomSource`], [`SeededSource`], [`SourceFactory`] injected randomness
//! - [`ThinkTime`] pause between iterations
//! - [`Workload`] bounds used to turn random draws into operations

mod operation;
mod source;
mod think;

pub use operation::{Operation, OperationKind, Outcome};
pub use source::{RandomSource, SeededSource, SourceFactory, entropy_seed, seeded_factory};
pub use think::ThinkTime;

use std::ops::RangeInclusive;

/// Bounds for generating operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workload {
    /// Number of resources to choose from.
    pub resource_count: usize,
    /// Inclusive booking quantity range.
    pub book: RangeInclusive<u32>,
}

impl Workload {
    /// Draws the next operation: resource, then kind, then quantity for bookings.
    pub fn next_operation(&self, src: &mut dyn RandomSource) -> Operation {
        let resource = src.resource(self.resource_count);
        match src.kind() {
            OperationKind::Inquire => Operation::inquire(resource),
            OperationKind::Book => Operation::book(resource, src.book_quantity(self.book.clone())),
            OperationKind::Cancel => Operation::cancel(resource),
        }
    }
}

//! # Resource: one lockable quota.
//!
//! A [`Resource`] owns a fixed `capacity` and a mutable `available` counter
//! behind its own [`tokio::sync::Mutex`]. The only way to read or change the
//! counter is through a [`ResourceGuard`], so every operation runs inside a
//! single lock-held interval:
//!
//! ```text
//! lock().await ──► ResourceGuard ──► inquire() / book(q) / cancel(pick)
//!                        │
//!                        └─ drop ──► holder count decremented ──► mutex released
//! ```
//!
//! ## Rules
//! - `0 ≤ available ≤ capacity` at every observation through a guard.
//! - Check and mutation of `available` never span two lock intervals.
//! - The guard releases on drop, including while unwinding from a panic.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::occupancy::Occupancy;
use crate::workload::{Operation, OperationKind, Outcome};

/// Lockable unit holding a capacity and a current quota.
#[derive(Debug)]
pub struct Resource {
    id: usize,
    capacity: u32,
    available: Mutex<u32>,
    holders: Arc<Occupancy>,
}

impl Resource {
    /// Creates a fully available resource with its own holder gauge.
    pub fn new(id: usize, capacity: u32) -> Self {
        Self::with_gauge(id, capacity, Arc::new(Occupancy::new()))
    }

    /// Creates a fully available resource that reports lock holders to `holders`.
    pub(crate) fn with_gauge(id: usize, capacity: u32, holders: Arc<Occupancy>) -> Self {
        Self {
            id,
            capacity,
            available: Mutex::new(capacity),
            holders,
        }
    }

    /// Stable index in the pool.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Fixed capacity.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Waits for exclusive access.
    ///
    /// Suspends the calling task (not the thread) while another task holds the lock.
    pub async fn lock(&self) -> ResourceGuard<'_> {
        let available = self.available.lock().await;
        self.holders.enter();
        ResourceGuard {
            resource: self,
            available,
        }
    }
}

/// Exclusive, scoped access to one [`Resource`].
pub struct ResourceGuard<'a> {
    resource: &'a Resource,
    available: MutexGuard<'a, u32>,
}

impl ResourceGuard<'_> {
    /// Id of the locked resource.
    pub fn id(&self) -> usize {
        self.resource.id
    }

    /// Capacity of the locked resource.
    pub fn capacity(&self) -> u32 {
        self.resource.capacity
    }

    /// Current quota.
    pub fn available(&self) -> u32 {
        *self.available
    }

    /// Units currently booked (`capacity − available`).
    pub fn booked(&self) -> u32 {
        self.resource.capacity.saturating_sub(*self.available)
    }

    /// True if `0 ≤ available ≤ capacity`.
    pub fn within_bounds(&self) -> bool {
        *self.available <= self.resource.capacity
    }

    /// Reads the quota without changing it.
    pub fn inquire(&self) -> Outcome {
        Outcome::Inquired {
            available: *self.available,
        }
    }

    /// Takes `quantity` units if that many are available; otherwise changes nothing.
    pub fn book(&mut self, quantity: u32) -> Outcome {
        let available = *self.available;
        if available >= quantity {
            *self.available = available - quantity;
            Outcome::Booked {
                quantity,
                available: *self.available,
            }
        } else {
            Outcome::Rejected {
                requested: quantity,
                available,
            }
        }
    }

    /// Returns part of the booked units.
    ///
    /// `pick` receives the booked amount and chooses how many units to return;
    /// its answer is clamped into `[1, booked]`. `pick` is not called when
    /// nothing is booked.
    pub fn cancel(&mut self, pick: impl FnOnce(u32) -> u32) -> Outcome {
        let booked = self.booked();
        if booked == 0 {
            return Outcome::NothingToCancel {
                available: *self.available,
            };
        }
        let quantity = pick(booked).clamp(1, booked);
        *self.available += quantity;
        Outcome::Cancelled {
            quantity,
            available: *self.available,
        }
    }

    /// Dispatches `op` to [`inquire`](Self::inquire), [`book`](Self::book) or
    /// [`cancel`](Self::cancel).
    ///
    /// A booking without a quantity requests zero units.
    pub fn apply(&mut self, op: &Operation, pick: impl FnOnce(u32) -> u32) -> Outcome {
        match op.kind {
            OperationKind::Inquire => self.inquire(),
            OperationKind::Book => self.book(op.quantity.unwrap_or(0)),
            OperationKind::Cancel => self.cancel(pick),
        }
    }
}

impl Drop for ResourceGuard<'_> {
    fn drop(&mut self) {
        // Runs before the mutex guard field is dropped.
        self.resource.holders.leave();
    }
}

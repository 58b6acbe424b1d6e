//! # AdmissionGate: bounded counting gate over the critical region.
//!
//! The gate limits how many workers may be inside the combined
//! *gate + resource lock* region at once. It is a thin wrapper around
//! [`tokio::sync::Semaphore`] with `capacity` permits plus an occupancy gauge
//! for observation.
//!
//! ## Architecture
//! ```text
//! acquire().await ──► Semaphore::acquire_owned ──► Occupancy::enter ──► GatePermit
//!                                                                          │
//!                     (resource lock taken and released while held)        │
//!                                                                          ▼
//!                      Semaphore permit returned ◄── Occupancy::leave ◄── drop
//! ```
//!
//! ## Rules
//! - `0 ≤ active ≤ capacity` at every observation.
//! - A slot is released exactly once: when its [`GatePermit`] is dropped,
//!   including while unwinding.
//! - Waiters are woken when a slot frees up, but **wake order is unspecified**.
//!   Callers must not rely on FIFO admission or any other fairness property.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::GateError;
use crate::occupancy::Occupancy;

/// Bounded counting gate shared by all workers of a run.
#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    slots: Arc<Semaphore>,
    occupancy: Occupancy,
}

impl AdmissionGate {
    /// Creates a gate with `capacity` slots.
    ///
    /// The capacity is validated by the configuration; a zero-capacity gate
    /// never admits anyone.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Arc::new(Semaphore::new(capacity)),
            occupancy: Occupancy::new(),
        }
    }

    /// Waits for a free slot and takes it.
    ///
    /// No timeout is applied; the call suspends the task for as long as the gate
    /// is saturated. Fails only once the gate has been [closed](Self::close).
    pub async fn acquire(self: &Arc<Self>) -> Result<GatePermit, GateError> {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_closed| GateError::Closed)?;
        self.occupancy.enter();
        Ok(GatePermit {
            gate: Arc::clone(self),
            _permit: permit,
        })
    }

    /// Takes a slot only if one is free right now.
    pub fn try_acquire(self: &Arc<Self>) -> Option<GatePermit> {
        let permit = Arc::clone(&self.slots).try_acquire_owned().ok()?;
        self.occupancy.enter();
        Some(GatePermit {
            gate: Arc::clone(self),
            _permit: permit,
        })
    }

    /// Stops handing out new slots; pending and future `acquire` calls fail.
    ///
    /// Permits already held stay valid until dropped. The simulator never
    /// closes its gate; this is a hook for embedders driving [`Worker`](crate::Worker)s
    /// directly, whose workers then finish with
    /// [`StopReason::GateClosed`](crate::StopReason::GateClosed).
    pub fn close(&self) {
        self.slots.close();
    }

    /// Configured number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held.
    pub fn active(&self) -> usize {
        self.occupancy.current()
    }

    /// Highest number of slots held simultaneously.
    pub fn peak(&self) -> usize {
        self.occupancy.peak()
    }

    /// Slots free right now.
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }
}

/// One held gate slot. Dropping it releases the slot.
#[derive(Debug)]
pub struct GatePermit {
    gate: Arc<AdmissionGate>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        // Count leaves before the semaphore permit field is returned.
        self.gate.occupancy.leave();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_acquire_and_release_counts() {
        let gate = Arc::new(AdmissionGate::new(2));
        let a = gate.acquire().await.unwrap();
        let b = gate.acquire().await.unwrap();
        assert_eq!(gate.active(), 2);
        assert_eq!(gate.available_slots(), 0);
        assert!(gate.try_acquire().is_none());

        drop(a);
        assert_eq!(gate.active(), 1);
        assert!(gate.try_acquire().is_some());
        drop(b);
        assert_eq!(gate.active(), 0);
        assert_eq!(gate.peak(), 2);
    }

    #[tokio::test]
    async fn test_release_wakes_waiter() {
        let gate = Arc::new(AdmissionGate::new(1));
        let held = gate.acquire().await.unwrap();

        let g = Arc::clone(&gate);
        let waiter = tokio::spawn(async move {
            let _p = g.acquire().await.unwrap();
            g.active()
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        drop(held);

        let seen = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter was not woken")
            .unwrap();
        assert_eq!(seen, 1);
    }

    #[tokio::test]
    async fn test_closed_gate_rejects() {
        let gate = Arc::new(AdmissionGate::new(1));
        let held = gate.acquire().await.unwrap();
        gate.close();
        assert_eq!(gate.acquire().await.unwrap_err(), GateError::Closed);
        drop(held);
        assert_eq!(gate.active(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_never_exceeds_capacity() {
        let gate = Arc::new(AdmissionGate::new(3));
        let inside = Arc::new(AtomicUsize::new(0));
        let worst = Arc::new(AtomicUsize::new(0));

        let mut set = tokio::task::JoinSet::new();
        for _ in 0..24 {
            let gate = Arc::clone(&gate);
            let inside = Arc::clone(&inside);
            let worst = Arc::clone(&worst);
            set.spawn(async move {
                for _ in 0..10 {
                    let _slot = gate.acquire().await.unwrap();
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    worst.fetch_max(now, Ordering::SeqCst);
                    assert!(gate.active() <= gate.capacity());
                    tokio::task::yield_now().await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                }
            });
        }
        while let Some(res) = set.join_next().await {
            res.unwrap();
        }

        assert!(worst.load(Ordering::SeqCst) <= 3);
        assert!(gate.peak() <= 3);
        assert_eq!(gate.active(), 0);
        assert_eq!(gate.available_slots(), 3);
    }

    #[tokio::test]
    async fn test_slot_released_on_panic() {
        let gate = Arc::new(AdmissionGate::new(1));
        let g = Arc::clone(&gate);
        let res = tokio::spawn(async move {
            let _slot = g.acquire().await.unwrap();
            panic!("boom while holding the gate");
        })
        .await;
        assert!(res.is_err());
        assert_eq!(gate.active(), 0);
        assert!(gate.try_acquire().is_some());
    }
}

//! # Runtime events emitted by the simulator and its workers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Run events**: simulation started/finished, shutdown requested
//! - **Gate events**: a worker starts waiting for, or obtains, a gate slot
//! - **Outcome events**: result of one operation under the resource lock
//!
//! The [`Event`] struct carries metadata such as timestamps, worker id,
//! resource id, quantities and the quota observed under the lock.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use quotagate::{Event, EventKind, Operation, Outcome};
//!
//! let ev = Event::outcome(
//!     3,
//!     &Operation::book(7, 5),
//!     &Outcome::Booked { quantity: 5, available: 495 },
//! );
//!
//! assert_eq!(ev.kind, EventKind::Booked);
//! assert_eq!(ev.worker, Some(3));
//! assert_eq!(ev.resource, Some(7));
//! assert_eq!(ev.available, Some(495));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::workload::{Operation, OperationKind, Outcome};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run events ===
    /// Workers are about to be spawned.
    ///
    /// Sets:
    /// - `count`: number of workers
    /// - `quantity`: gate capacity
    RunStarted,

    /// Shutdown requested (OS signal observed); workers stop at their next check.
    ShutdownRequested,

    /// All workers finished and the final snapshot was taken.
    ///
    /// Sets:
    /// - `count`: total operations executed
    RunFinished,

    // === Gate events ===
    /// Worker starts waiting for a gate slot.
    ///
    /// Sets:
    /// - `worker`, `resource`, `op`, `quantity` (bookings only)
    GateWaiting,

    /// Worker obtained a gate slot.
    ///
    /// Sets:
    /// - `worker`, `resource`, `op`, `quantity` (bookings only)
    GateAcquired,

    // === Outcome events ===
    /// Quota read.
    ///
    /// Sets:
    /// - `worker`, `resource`, `op`, `available`
    Inquired,

    /// Booking succeeded.
    ///
    /// Sets:
    /// - `worker`, `resource`, `op`, `quantity` (booked), `available` (after)
    Booked,

    /// Booking rejected for lack of quota.
    ///
    /// Sets:
    /// - `worker`, `resource`, `op`, `quantity` (requested), `available`
    BookRejected,

    /// Cancellation returned units.
    ///
    /// Sets:
    /// - `worker`, `resource`, `op`, `quantity` (returned), `available` (after)
    Cancelled,

    /// Cancellation found nothing booked.
    ///
    /// Sets:
    /// - `worker`, `resource`, `op`, `available`
    NothingToCancel,

    // === Worker terminal state ===
    /// Worker reached `Finished`.
    ///
    /// Sets:
    /// - `worker`
    /// - `count`: operations executed by this worker
    /// - `reason`: `"deadline"` or `"stopped"`
    WorkerFinished,
}

impl EventKind {
    /// True for the five operation outcome kinds.
    pub fn is_outcome(&self) -> bool {
        matches!(
            self,
            EventKind::Inquired
                | EventKind::Booked
                | EventKind::BookRejected
                | EventKind::Cancelled
                | EventKind::NothingToCancel
        )
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker id, if applicable.
    pub worker: Option<usize>,
    /// Target resource id, if applicable.
    pub resource: Option<usize>,
    /// Operation kind, if applicable.
    pub op: Option<OperationKind>,
    /// Requested, booked or returned units, depending on `kind`.
    pub quantity: Option<u32>,
    /// Quota observed under the resource lock.
    pub available: Option<u32>,
    /// Counter payload (workers, operations).
    pub count: Option<u64>,
    /// Human-readable reason.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            resource: None,
            op: None,
            quantity: None,
            available: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches a worker id.
    #[inline]
    pub fn with_worker(mut self, worker: usize) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Attaches the target resource, kind and (for bookings) requested quantity.
    #[inline]
    pub fn with_operation(mut self, op: &Operation) -> Self {
        self.resource = Some(op.resource);
        self.op = Some(op.kind);
        self.quantity = op.quantity;
        self
    }

    /// Attaches a quantity.
    #[inline]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Attaches the observed quota.
    #[inline]
    pub fn with_available(mut self, available: u32) -> Self {
        self.available = Some(available);
        self
    }

    /// Attaches a counter.
    #[inline]
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates the outcome event for one applied operation.
    pub fn outcome(worker: usize, op: &Operation, outcome: &Outcome) -> Self {
        let (kind, quantity) = match *outcome {
            Outcome::Inquired { .. } => (EventKind::Inquired, None),
            Outcome::Booked { quantity, .. } => (EventKind::Booked, Some(quantity)),
            Outcome::Rejected { requested, .. } => (EventKind::BookRejected, Some(requested)),
            Outcome::Cancelled { quantity, .. } => (EventKind::Cancelled, Some(quantity)),
            Outcome::NothingToCancel { .. } => (EventKind::NothingToCancel, None),
        };
        let mut ev = Event::new(kind)
            .with_worker(worker)
            .with_operation(op)
            .with_available(outcome.available());
        ev.quantity = quantity;
        ev
    }
}

//! # LogWriter: renders events through `tracing`
//!
//! A subscriber that turns every [`Event`] into a structured `tracing` record.
//! Run-level events log at `info`, per-operation events at `debug`, subscriber
//! problems at `warn`. Install any `tracing` subscriber to see the output.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO  run started workers=20 gate=5
//! DEBUG waiting for system access worker=3 resource=41 op=book quantity=7
//! DEBUG gained system access worker=3 resource=41 op=book
//! DEBUG booked worker=3 resource=41 quantity=7 available=493
//! DEBUG booking rejected worker=8 resource=2 requested=9 available=4
//! DEBUG no bookings to cancel worker=1 resource=17 available=500
//! INFO  worker finished worker=3 operations=118 reason="deadline"
//! INFO  run finished operations=2361
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let worker = e.worker.unwrap_or_default();
        let resource = e.resource.unwrap_or_default();
        let op = e.op.map(|k| k.as_str()).unwrap_or("-");
        match e.kind {
            EventKind::RunStarted => {
                tracing::info!(workers = e.count, gate = e.quantity, "run started");
            }
            EventKind::ShutdownRequested => {
                tracing::info!("shutdown requested; workers stop at next iteration");
            }
            EventKind::RunFinished => {
                tracing::info!(operations = e.count, "run finished");
            }
            EventKind::GateWaiting => {
                tracing::debug!(worker, resource, op, quantity = e.quantity, "waiting for system access");
            }
            EventKind::GateAcquired => {
                tracing::debug!(worker, resource, op, "gained system access");
            }
            EventKind::Inquired => {
                tracing::debug!(worker, resource, available = e.available, "inquiry");
            }
            EventKind::Booked => {
                tracing::debug!(
                    worker,
                    resource,
                    quantity = e.quantity,
                    available = e.available,
                    "booked"
                );
            }
            EventKind::BookRejected => {
                tracing::debug!(
                    worker,
                    resource,
                    requested = e.quantity,
                    available = e.available,
                    "booking rejected"
                );
            }
            EventKind::Cancelled => {
                tracing::debug!(
                    worker,
                    resource,
                    quantity = e.quantity,
                    available = e.available,
                    "cancelled"
                );
            }
            EventKind::NothingToCancel => {
                tracing::debug!(worker, resource, available = e.available, "no bookings to cancel");
            }
            EventKind::WorkerFinished => {
                tracing::info!(
                    worker,
                    operations = e.count,
                    reason = e.reason.as_deref().unwrap_or("deadline"),
                    "worker finished"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

//! # Final simulation report.
//!
//! [`SimulationReport`] is produced by [`Simulator::run`](crate::Simulator::run)
//! after every worker has finished. It carries the final reading of every
//! resource (taken under each resource's lock, in id order), what each worker
//! did, and the observed peaks of gate occupancy and resource-lock holders.
//!
//! `Display` renders the classic reservation chart:
//! ```text
//! --- Final Reservation Chart ---
//!     Train number    Available Seats
//!         0                487
//!         1                500
//! Thanks for using our services!!!
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::core::WorkerSummary;
use crate::resources::ResourceSnapshot;
use crate::workload::Outcome;

/// Counts of each outcome kind plus units moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    /// Inquiries.
    pub inquired: u64,
    /// Successful bookings.
    pub booked: u64,
    /// Rejected bookings.
    pub rejected: u64,
    /// Successful cancellations.
    pub cancelled: u64,
    /// Cancellations with nothing booked.
    pub nothing_to_cancel: u64,
    /// Units taken by successful bookings.
    pub units_booked: u64,
    /// Units returned by cancellations.
    pub units_cancelled: u64,
}

impl OutcomeTally {
    /// Adds one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match *outcome {
            Outcome::Inquired { .. } => self.inquired += 1,
            Outcome::Booked { quantity, .. } => {
                self.booked += 1;
                self.units_booked += u64::from(quantity);
            }
            Outcome::Rejected { .. } => self.rejected += 1,
            Outcome::Cancelled { quantity, .. } => {
                self.cancelled += 1;
                self.units_cancelled += u64::from(quantity);
            }
            Outcome::NothingToCancel { .. } => self.nothing_to_cancel += 1,
        }
    }

    /// Total operations counted.
    pub fn total(&self) -> u64 {
        self.inquired + self.booked + self.rejected + self.cancelled + self.nothing_to_cancel
    }
}

/// Result of one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Base seed used for the per-worker sources (`None` with a custom source factory).
    pub seed: Option<u64>,
    /// Final reading of every resource, in id order.
    pub resources: Vec<ResourceSnapshot>,
    /// Per-worker summaries, in worker id order.
    pub workers: Vec<WorkerSummary>,
    /// Configured gate capacity.
    pub gate_capacity: usize,
    /// Most gate slots held at once.
    pub peak_gate_occupancy: usize,
    /// Most resource locks held at once.
    pub peak_lock_holders: usize,
    /// True if the run was stopped before the deadline.
    pub stopped_early: bool,
    /// Wall time from start until the last worker finished.
    pub elapsed: Duration,
}

impl SimulationReport {
    /// `(resource_id, available)` for every resource, in id order.
    pub fn chart(&self) -> Vec<(usize, u32)> {
        self.resources.iter().map(|r| (r.id, r.available)).collect()
    }

    /// Operations executed by all workers.
    pub fn total_operations(&self) -> usize {
        self.workers.iter().map(WorkerSummary::operations).sum()
    }

    /// Outcome counts across all workers.
    pub fn tally(&self) -> OutcomeTally {
        let mut tally = OutcomeTally::default();
        for outcome in self.workers.iter().flat_map(|w| w.outcomes()) {
            tally.record(outcome);
        }
        tally
    }

    /// True if every final quota equals capacity minus the net units booked
    /// on that resource according to the worker histories.
    ///
    /// Detects lost or duplicated updates.
    pub fn is_consistent(&self) -> bool {
        let mut net: BTreeMap<usize, i64> = BTreeMap::new();
        for rec in self.workers.iter().flat_map(|w| w.history.iter()) {
            *net.entry(rec.operation.resource).or_default() += rec.outcome.delta();
        }
        self.resources.iter().all(|r| {
            let delta = net.get(&r.id).copied().unwrap_or(0);
            i64::from(r.capacity) + delta == i64::from(r.available)
        })
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Final Reservation Chart ---")?;
        writeln!(f, "    Train number    Available Seats")?;
        for r in &self.resources {
            writeln!(f, "        {:<16} {}", r.id, r.available)?;
        }
        write!(f, "Thanks for using our services!!!")
    }
}

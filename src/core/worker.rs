//! # Worker: one actor contending for gate slots and resource locks.
//!
//! Each worker repeatedly picks a target resource and an operation, passes the
//! admission gate, applies the operation under the resource lock and releases
//! both, until the shared deadline passes or the run is stopped.
//!
//! ## State machine
//! ```text
//!            ┌──────────────────────────────────────────────────────────┐
//!            ▼                                                          │
//!          Idle ── think, generate op, deadline/stop check ──► Finished │
//!            │                                                          │
//!            ▼                                                          │
//!      AwaitingGate ── gate.acquire() (no timeout) ──► HoldingGate      │
//!                                                          │            │
//!                                                          ▼            │
//!                           AwaitingResourceLock ── pool.lock(id)       │
//!                                                          │            │
//!                                                          ▼            │
//!                     HoldingBoth ── apply op, publish outcome          │
//!                          │                                            │
//!                          └─ release resource lock, then gate slot ────┘
//! ```
//!
//! ## Rules
//! - The deadline is checked **before** a new operation starts; an operation
//!   admitted past the gate always runs to completion.
//! - The gate slot covers the whole critical section: it is taken before the
//!   resource lock and released after it.
//! - No task holds more than one resource lock.
//! - No retries: a rejected booking or an empty cancellation ends the iteration.
//! - Both locks are scoped guards, so a panic inside the critical section
//!   releases them.

use std::fmt;
use std::sync::Arc;

use tokio::{select, time, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    admission::AdmissionGate,
    error::SimulationError,
    events::{Bus, Event, EventKind},
    resources::ResourcePool,
    workload::{Operation, Outcome, RandomSource, ThinkTime, Workload},
};

/// Position of a worker in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Between operations (thinking, generating, checking the deadline).
    Idle,
    /// Waiting for a gate slot.
    AwaitingGate,
    /// Holding a gate slot, about to request the resource lock.
    HoldingGate,
    /// Holding a gate slot, waiting for the resource lock.
    AwaitingResourceLock,
    /// Holding both; applying the operation.
    HoldingBoth,
    /// Loop exited.
    Finished,
}

impl WorkerState {
    /// Short name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Idle => "idle",
            WorkerState::AwaitingGate => "awaiting_gate",
            WorkerState::HoldingGate => "holding_gate",
            WorkerState::AwaitingResourceLock => "awaiting_resource_lock",
            WorkerState::HoldingBoth => "holding_both",
            WorkerState::Finished => "finished",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a worker reached [`WorkerState::Finished`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shared deadline passed.
    Deadline,
    /// The run's stop token was cancelled.
    Stopped,
    /// The admission gate was closed.
    GateClosed,
}

impl StopReason {
    /// Short name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Deadline => "deadline",
            StopReason::Stopped => "stopped",
            StopReason::GateClosed => "gate_closed",
        }
    }
}

/// One executed operation and its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationRecord {
    /// What was attempted.
    pub operation: Operation,
    /// What happened under the lock.
    pub outcome: Outcome,
}

/// Everything a worker did, returned when it finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Worker id.
    pub worker: usize,
    /// Executed operations in order.
    pub history: Vec<OperationRecord>,
    /// Why the loop exited.
    pub stop: StopReason,
}

impl WorkerSummary {
    /// Number of executed operations.
    pub fn operations(&self) -> usize {
        self.history.len()
    }

    /// Outcomes in execution order.
    pub fn outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.history.iter().map(|r| &r.outcome)
    }
}

/// Per-worker parameters extracted from the configuration by the simulator.
#[derive(Clone, Debug)]
pub struct WorkerParams {
    /// Operation generation bounds.
    pub workload: Workload,
    /// Pause before each iteration.
    pub think: ThinkTime,
    /// No new operation starts at or after this instant.
    pub deadline: Instant,
}

/// Actor driving one worker's loop.
pub struct Worker {
    /// Worker id.
    pub id: usize,
    /// Loop parameters.
    pub params: WorkerParams,
    /// Shared resource arena.
    pub pool: Arc<ResourcePool>,
    /// Shared admission gate.
    pub gate: Arc<AdmissionGate>,
    /// This worker's random source.
    pub source: Box<dyn RandomSource>,
    /// Event bus.
    pub bus: Bus,
}

impl Worker {
    /// Creates a worker.
    pub fn new(
        id: usize,
        params: WorkerParams,
        pool: Arc<ResourcePool>,
        gate: Arc<AdmissionGate>,
        source: Box<dyn RandomSource>,
        bus: Bus,
    ) -> Self {
        Self {
            id,
            params,
            pool,
            gate,
            source,
            bus,
        }
    }

    /// Runs the loop until the deadline passes or `stop` is cancelled.
    ///
    /// ### Cancellation semantics
    /// - `stop` and the deadline are checked once per iteration, in `Idle`,
    ///   after the operation has been generated and before the gate is requested.
    /// - A pending think-time sleep is cut short by `stop`.
    /// - Gate and resource waits are never interrupted.
    ///
    /// ### Errors
    /// - [`SimulationError::Pool`] if the source names a resource outside the pool.
    /// - [`SimulationError::InvariantViolated`] if a quota leaves `[0, capacity]`.
    pub async fn run(self, stop: CancellationToken) -> Result<WorkerSummary, SimulationError> {
        let Worker {
            id,
            params,
            pool,
            gate,
            mut source,
            bus,
        } = self;

        let mut state = WorkerState::Idle;
        let mut history = Vec::new();

        let reason = loop {
            transition(id, &mut state, WorkerState::Idle);
            let pause = params.think.sample(source.as_mut());
            if !pause.is_zero() {
                select! {
                    _ = time::sleep(pause) => {}
                    _ = stop.cancelled() => break StopReason::Stopped,
                }
            }
            let op = params.workload.next_operation(source.as_mut());
            if stop.is_cancelled() {
                break StopReason::Stopped;
            }
            if Instant::now() >= params.deadline {
                break StopReason::Deadline;
            }

            transition(id, &mut state, WorkerState::AwaitingGate);
            bus.publish(
                Event::new(EventKind::GateWaiting)
                    .with_worker(id)
                    .with_operation(&op),
            );
            let slot = match gate.acquire().await {
                Ok(slot) => slot,
                Err(e) => {
                    tracing::debug!(worker = id, label = e.as_label(), "gate refused slot");
                    break StopReason::GateClosed;
                }
            };
            transition(id, &mut state, WorkerState::HoldingGate);
            bus.publish(
                Event::new(EventKind::GateAcquired)
                    .with_worker(id)
                    .with_operation(&op),
            );

            let outcome = {
                transition(id, &mut state, WorkerState::AwaitingResourceLock);
                let mut resource = pool.lock(op.resource).await?;
                transition(id, &mut state, WorkerState::HoldingBoth);

                let outcome = resource.apply(&op, |booked| source.cancel_amount(booked));
                if !resource.within_bounds() {
                    return Err(SimulationError::InvariantViolated {
                        resource: resource.id(),
                        available: resource.available(),
                        capacity: resource.capacity(),
                    });
                }
                bus.publish(Event::outcome(id, &op, &outcome));
                outcome
            };
            drop(slot);

            history.push(OperationRecord {
                operation: op,
                outcome,
            });
        };

        transition(id, &mut state, WorkerState::Finished);
        bus.publish(
            Event::new(EventKind::WorkerFinished)
                .with_worker(id)
                .with_count(history.len() as u64)
                .with_reason(reason.as_str()),
        );

        Ok(WorkerSummary {
            worker: id,
            history,
            stop: reason,
        })
    }
}

fn transition(worker: usize, state: &mut WorkerState, next: WorkerState) {
    tracing::trace!(worker, from = state.as_str(), to = next.as_str(), "worker state");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::{OperationKind, SeededSource};
    use std::time::Duration;

    /// Always books `qty` units of resource 0 after a fixed pause.
    struct AlwaysBook {
        qty: u32,
    }

    impl RandomSource for AlwaysBook {
        fn resource(&mut self, _count: usize) -> usize {
            0
        }
        fn kind(&mut self) -> OperationKind {
            OperationKind::Book
        }
        fn book_quantity(&mut self, _range: std::ops::RangeInclusive<u32>) -> u32 {
            self.qty
        }
        fn cancel_amount(&mut self, booked: u32) -> u32 {
            booked
        }
        fn think_time(&mut self, _max: Duration) -> Duration {
            Duration::from_millis(1)
        }
    }

    fn worker(
        id: usize,
        pool: &Arc<ResourcePool>,
        gate: &Arc<AdmissionGate>,
        source: Box<dyn RandomSource>,
        run_for: Duration,
    ) -> Worker {
        Worker::new(
            id,
            WorkerParams {
                workload: Workload {
                    resource_count: pool.len(),
                    book: 1..=10,
                },
                think: ThinkTime::Uniform {
                    max: Duration::from_millis(5),
                },
                deadline: Instant::now() + run_for,
            },
            Arc::clone(pool),
            Arc::clone(gate),
            source,
            Bus::new(64),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_deadline() {
        let pool = Arc::new(ResourcePool::new(1, 100));
        let gate = Arc::new(AdmissionGate::new(1));
        let w = worker(
            0,
            &pool,
            &gate,
            Box::new(AlwaysBook { qty: 10 }),
            Duration::from_millis(50),
        );

        let summary = w.run(CancellationToken::new()).await.unwrap();
        assert_eq!(summary.stop, StopReason::Deadline);
        // 1ms think per iteration, 50ms budget.
        assert!(summary.operations() >= 40, "ops={}", summary.operations());

        let booked: u32 = summary
            .outcomes()
            .filter_map(|o| match o {
                Outcome::Booked { quantity, .. } => Some(*quantity),
                _ => None,
            })
            .sum();
        assert_eq!(booked, 100);
        assert_eq!(pool.snapshot().await[0].available, 0);
        assert_eq!(gate.active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admitted_operation_completes_past_deadline() {
        let pool = Arc::new(ResourcePool::new(1, 100));
        let gate = Arc::new(AdmissionGate::new(1));
        let held = gate.acquire().await.unwrap();

        let w = worker(
            0,
            &pool,
            &gate,
            Box::new(AlwaysBook { qty: 4 }),
            Duration::from_millis(5),
        );
        let run = tokio::spawn(w.run(CancellationToken::new()));

        // The worker passes its deadline check at 1ms, then waits on the gate.
        time::sleep(Duration::from_millis(50)).await;
        assert!(!run.is_finished());
        drop(held);

        let summary = run.await.unwrap().unwrap();
        assert_eq!(summary.stop, StopReason::Deadline);
        assert_eq!(summary.operations(), 1);
        assert_eq!(
            summary.history[0].outcome,
            Outcome::Booked {
                quantity: 4,
                available: 96
            }
        );
        assert_eq!(pool.snapshot().await[0].available, 96);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_token_stops_before_first_operation() {
        let pool = Arc::new(ResourcePool::new(1, 100));
        let gate = Arc::new(AdmissionGate::new(1));
        let stop = CancellationToken::new();
        stop.cancel();

        let w = worker(
            0,
            &pool,
            &gate,
            Box::new(AlwaysBook { qty: 1 }),
            Duration::from_secs(60),
        );
        let summary = w.run(stop).await.unwrap();
        assert_eq!(summary.stop, StopReason::Stopped);
        assert_eq!(summary.operations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_gate_finishes_worker() {
        let pool = Arc::new(ResourcePool::new(1, 100));
        let gate = Arc::new(AdmissionGate::new(1));
        gate.close();

        let w = worker(
            0,
            &pool,
            &gate,
            Box::new(SeededSource::new(1)),
            Duration::from_secs(60),
        );
        let summary = w.run(CancellationToken::new()).await.unwrap();
        assert_eq!(summary.stop, StopReason::GateClosed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_resource_is_an_error() {
        struct OutOfRange;
        impl RandomSource for OutOfRange {
            fn resource(&mut self, count: usize) -> usize {
                count
            }
            fn kind(&mut self) -> OperationKind {
                OperationKind::Inquire
            }
            fn book_quantity(&mut self, range: std::ops::RangeInclusive<u32>) -> u32 {
                *range.start()
            }
            fn cancel_amount(&mut self, booked: u32) -> u32 {
                booked
            }
            fn think_time(&mut self, _max: Duration) -> Duration {
                Duration::from_millis(1)
            }
        }

        let pool = Arc::new(ResourcePool::new(2, 10));
        let gate = Arc::new(AdmissionGate::new(1));
        let w = worker(0, &pool, &gate, Box::new(OutOfRange), Duration::from_secs(1));
        let err = w.run(CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.as_label(), "pool_unknown_resource");
        assert_eq!(gate.active(), 0, "gate slot must be released on error");
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_worker_is_reproducible() {
        async fn once() -> WorkerSummary {
            let pool = Arc::new(ResourcePool::new(4, 50));
            let gate = Arc::new(AdmissionGate::new(1));
            let w = worker(
                0,
                &pool,
                &gate,
                Box::new(SeededSource::new(2024)),
                Duration::from_millis(200),
            );
            w.run(CancellationToken::new()).await.unwrap()
        }

        let a = once().await;
        let b = once().await;
        assert!(a.operations() > 0);
        assert_eq!(a, b);
    }
}

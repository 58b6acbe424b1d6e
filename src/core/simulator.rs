//! # Simulator: spawns workers, drives shutdown, and builds the final report.
//!
//! The [`Simulator`] owns the event bus and the subscriber list. [`Simulator::run`]
//! builds the resource pool and the admission gate, spawns one [`Worker`] per
//! configured worker into a `JoinSet` and joins them all before reading the
//! final state of every resource.
//!
//! ## High-level flow
//! ```text
//! run():
//!   listener: Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!   publish RunStarted
//!
//!   Worker[0]  Worker[1]  ...  Worker[N-1]        (shared pool, gate, deadline)
//!       └──► set.spawn(worker.run(stop.clone()))
//!
//!   join loop:
//!     ├─ join_next_with_id() ─► collect WorkerSummary
//!     │                         (error or panic: remember it, cancel stop)
//!     └─ OS signal (optional) ─► publish ShutdownRequested, cancel stop
//!
//!   pool.snapshot()  (each resource read under its lock, in id order)
//!   publish RunFinished
//!   drop Bus ─► listener drains ─► SubscriberSet::shutdown()
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use quotagate::{SimulationConfig, Simulator, ThinkTime};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = SimulationConfig {
//!         resource_count: 4,
//!         capacity_per_resource: 20,
//!         worker_count: 3,
//!         gate_capacity: 2,
//!         run_duration: Duration::from_millis(50),
//!         think_time: ThinkTime::Fixed(Duration::from_millis(1)),
//!         seed: Some(7),
//!         handle_signals: false,
//!         ..SimulationConfig::default()
//!     };
//!
//!     let report = Simulator::builder(cfg).build()?.run().await?;
//!     assert_eq!(report.chart().len(), 4);
//!     assert!(report.is_consistent());
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::{
    sync::broadcast::error::RecvError,
    task::{JoinError, JoinHandle, JoinSet},
    time::Instant,
};
use tokio_util::sync::CancellationToken;

use super::{
    builder::SimulatorBuilder,
    config::SimulationConfig,
    shutdown,
    worker::{StopReason, Worker, WorkerParams, WorkerSummary},
};
use crate::{
    admission::AdmissionGate,
    error::SimulationError,
    events::{Bus, Event, EventKind},
    report::SimulationReport,
    resources::ResourcePool,
    subscribers::{Subscribe, SubscriberSet, panic_message},
    workload::{SourceFactory, entropy_seed, seeded_factory},
};

/// Runs one simulation from a validated [`SimulationConfig`].
pub struct Simulator {
    /// Validated configuration.
    pub cfg: SimulationConfig,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    sources: Option<SourceFactory>,
    stop: CancellationToken,
}

impl Simulator {
    /// Creates a builder for configuring the simulator.
    ///
    /// # Example
    /// ```rust
    /// use quotagate::{SimulationConfig, Simulator};
    ///
    /// let sim = Simulator::builder(SimulationConfig::default()).build().unwrap();
    /// assert_eq!(sim.cfg.worker_count, 20);
    /// ```
    pub fn builder(cfg: SimulationConfig) -> SimulatorBuilder {
        SimulatorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: SimulationConfig,
        bus: Bus,
        subscribers: Vec<Arc<dyn Subscribe>>,
        sources: Option<SourceFactory>,
        stop: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            bus,
            subscribers,
            sources,
            stop,
        }
    }

    /// Direct access to the event bus, for listeners that want raw events.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Token that stops the run early when cancelled.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Runs every worker to completion and returns the final report.
    ///
    /// All published events have been delivered to the subscribers when this
    /// returns, on success and on error alike.
    ///
    /// ### Errors
    /// - [`SimulationError::Pool`] / [`SimulationError::InvariantViolated`]
    ///   from a worker, reported after every other worker has been joined.
    /// - [`SimulationError::WorkerPanicked`] if a worker task panicked.
    /// - [`SimulationError::InvariantViolated`] if the final read finds a
    ///   quota outside `[0, capacity]`.
    pub async fn run(self) -> Result<SimulationReport, SimulationError> {
        let Simulator {
            cfg,
            bus,
            subscribers,
            sources,
            stop,
        } = self;

        let listener = subscriber_listener(&bus, SubscriberSet::new(subscribers));
        let result = drive(&cfg, &bus, sources, stop.child_token()).await;

        drop(bus);
        match listener.await {
            Ok(set) => set.shutdown().await,
            Err(e) => tracing::warn!(error = %e, "event listener failed"),
        }
        result
    }
}

/// Forwards bus events to the subscriber set until every sender is gone.
fn subscriber_listener(bus: &Bus, set: SubscriberSet) -> JoinHandle<SubscriberSet> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event listener lagged; oldest events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        set
    })
}

async fn drive(
    cfg: &SimulationConfig,
    bus: &Bus,
    sources: Option<SourceFactory>,
    stop: CancellationToken,
) -> Result<SimulationReport, SimulationError> {
    let started = Instant::now();
    let (seed, sources) = match sources {
        Some(factory) => (None, factory),
        None => {
            let seed = cfg.seed.unwrap_or_else(entropy_seed);
            (Some(seed), seeded_factory(seed))
        }
    };

    let pool = Arc::new(ResourcePool::new(cfg.resource_count, cfg.capacity_per_resource));
    let gate = Arc::new(AdmissionGate::new(cfg.gate_capacity));
    let params = WorkerParams {
        workload: cfg.workload(),
        think: cfg.think_time,
        deadline: started + cfg.run_duration,
    };

    bus.publish(
        Event::new(EventKind::RunStarted)
            .with_count(cfg.worker_count as u64)
            .with_quantity(u32::try_from(cfg.gate_capacity).unwrap_or(u32::MAX)),
    );

    let mut set = JoinSet::new();
    let mut ids = HashMap::with_capacity(cfg.worker_count);
    for id in 0..cfg.worker_count {
        let worker = Worker::new(
            id,
            params.clone(),
            Arc::clone(&pool),
            Arc::clone(&gate),
            sources(id),
            bus.clone(),
        );
        let handle = set.spawn(worker.run(stop.clone()));
        ids.insert(handle.id(), id);
    }

    let signal = shutdown::shutdown_signal(cfg.handle_signals);
    tokio::pin!(signal);
    let mut signalled = false;
    let mut failure: Option<SimulationError> = None;
    let mut workers = Vec::with_capacity(cfg.worker_count);

    loop {
        tokio::select! {
            joined = set.join_next_with_id() => {
                let Some(joined) = joined else { break };
                match joined {
                    Ok((_, Ok(summary))) => workers.push(summary),
                    Ok((_, Err(e))) => {
                        tracing::warn!(error = %e, label = e.as_label(), "worker failed");
                        stop.cancel();
                        failure.get_or_insert(e);
                    }
                    Err(e) => {
                        let worker = ids.get(&e.id()).copied();
                        stop.cancel();
                        failure.get_or_insert(SimulationError::WorkerPanicked {
                            worker,
                            reason: join_reason(e),
                        });
                    }
                }
            }
            _ = &mut signal, if !signalled => {
                signalled = true;
                bus.publish(Event::new(EventKind::ShutdownRequested));
                stop.cancel();
            }
        }
    }

    if let Some(e) = failure {
        return Err(e);
    }
    workers.sort_by_key(|w: &WorkerSummary| w.worker);

    let resources = pool.snapshot().await;
    if let Some(bad) = resources.iter().find(|r| !r.within_bounds()) {
        return Err(SimulationError::InvariantViolated {
            resource: bad.id,
            available: bad.available,
            capacity: bad.capacity,
        });
    }

    let report = SimulationReport {
        seed,
        resources,
        stopped_early: workers.iter().any(|w| w.stop == StopReason::Stopped),
        workers,
        gate_capacity: gate.capacity(),
        peak_gate_occupancy: gate.peak(),
        peak_lock_holders: pool.peak_lock_holders(),
        elapsed: started.elapsed(),
    };
    bus.publish(Event::new(EventKind::RunFinished).with_count(report.total_operations() as u64));
    Ok(report)
}

fn join_reason(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic().as_ref())
    } else {
        "cancelled".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::ThinkTime;
    use std::time::Duration;

    fn small() -> SimulationConfig {
        SimulationConfig {
            resource_count: 3,
            capacity_per_resource: 30,
            worker_count: 4,
            gate_capacity: 2,
            run_duration: Duration::from_millis(100),
            think_time: ThinkTime::Fixed(Duration::from_millis(2)),
            seed: Some(11),
            handle_signals: false,
            ..SimulationConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_produces_consistent_report() {
        let report = Simulator::builder(small()).build().unwrap().run().await.unwrap();

        assert_eq!(report.seed, Some(11));
        assert_eq!(report.chart().iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(report.workers.len(), 4);
        assert!(report.workers.iter().all(|w| w.stop == StopReason::Deadline));
        assert!(report.total_operations() > 0);
        assert!(report.peak_gate_occupancy <= 2);
        assert!(report.peak_lock_holders <= 2);
        assert!(!report.stopped_early);
        assert!(report.is_consistent());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_token_ends_run_early() {
        let cfg = SimulationConfig {
            run_duration: Duration::from_secs(3600),
            ..small()
        };
        let sim = Simulator::builder(cfg).build().unwrap();
        let stop = sim.stop_token();
        let run = tokio::spawn(sim.run());

        tokio::time::sleep(Duration::from_millis(20)).await;
        stop.cancel();

        let report = run.await.unwrap().unwrap();
        assert!(report.stopped_early);
        assert!(report.elapsed < Duration::from_secs(1));
        assert!(report.is_consistent());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_worker_is_reported() {
        struct Boom;
        impl crate::workload::RandomSource for Boom {
            fn resource(&mut self, _count: usize) -> usize {
                panic!("boom");
            }
            fn kind(&mut self) -> crate::workload::OperationKind {
                crate::workload::OperationKind::Inquire
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

        let cfg = SimulationConfig {
            worker_count: 2,
            ..small()
        };
        let factory: SourceFactory = Arc::new(|id| -> Box<dyn crate::workload::RandomSource> {
            if id == 1 {
                Box::new(Boom)
            } else {
                Box::new(crate::workload::SeededSource::new(3))
            }
        });
        let err = Simulator::builder(cfg)
            .with_source_factory(factory)
            .build()
            .unwrap()
            .run()
            .await
            .unwrap_err();

        match err {
            SimulationError::WorkerPanicked { worker, reason } => {
                assert_eq!(worker, Some(1));
                assert_eq!(reason, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

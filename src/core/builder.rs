use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{config::SimulationConfig, simulator::Simulator};
use crate::{error::ConfigError, events::Bus, subscribers::Subscribe, workload::SourceFactory};

/// Builder for constructing a [`Simulator`] with optional collaborators.
pub struct SimulatorBuilder {
    cfg: SimulationConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    sources: Option<SourceFactory>,
    stop: Option<CancellationToken>,
}

impl SimulatorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SimulationConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            sources: None,
            stop: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive simulation events (gate waits, outcomes, run
    /// lifecycle) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Replaces the default seeded sources with a custom per-worker factory.
    pub fn with_source_factory(mut self, factory: SourceFactory) -> Self {
        self.sources = Some(factory);
        self
    }

    /// Uses an external token to stop the run early.
    ///
    /// Workers observe it at their next `Idle` check; operations already
    /// admitted still complete.
    pub fn with_stop_token(mut self, token: CancellationToken) -> Self {
        self.stop = Some(token);
        self
    }

    /// Validates the configuration and builds the simulator.
    ///
    /// Nothing is spawned here; the run starts with [`Simulator::run`].
    pub fn build(self) -> Result<Simulator, ConfigError> {
        self.cfg.validate()?;
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        Ok(Simulator::new_internal(
            self.cfg,
            bus,
            self.subscribers,
            self.sources,
            self.stop.unwrap_or_default(),
        ))
    }
}

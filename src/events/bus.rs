//! # Event bus for broadcasting simulation events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. Workers publish
//! from inside the critical section, so publishing must never block or fail.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                   Listener (one):
//!   Worker 0  ──┐
//!   Worker 1  ──┼──────► Bus ───────► Simulator listener ────► SubscriberSet
//!   Worker N  ──┤  (broadcast chan)
//!   Simulator ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits on receivers.
//! - **Bounded capacity**: one ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **Observability only**: losing events never affects quotas or gate accounting.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for simulation events.
///
/// Cheap to clone; every worker holds its own clone. The channel closes once
/// all clones are dropped, which lets the listener drain and exit.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

//! # Occupancy gauge.
//!
//! Counts how many holders are inside a region right now and the highest count
//! ever observed. Used by the admission gate (slots held) and the resource pool
//! (resource locks held) so tests and reports can check the bounds directly.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Current/peak holder counter.
#[derive(Debug, Default)]
pub struct Occupancy {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Occupancy {
    /// Creates an empty gauge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more holder and returns the new count.
    pub fn enter(&self) -> usize {
        let now = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::AcqRel);
        now
    }

    /// Records one holder leaving.
    pub fn leave(&self) {
        self.current.fetch_sub(1, Ordering::AcqRel);
    }

    /// Holders right now.
    pub fn current(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    /// Highest number of simultaneous holders observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_survives_leave() {
        let g = Occupancy::new();
        assert_eq!(g.enter(), 1);
        assert_eq!(g.enter(), 2);
        g.leave();
        g.leave();
        assert_eq!(g.current(), 0);
        assert_eq!(g.peak(), 2);
    }
}

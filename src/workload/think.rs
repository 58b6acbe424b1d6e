//! # Think-time policy.
//!
//! [`ThinkTime`] decides how long a worker stays in `Idle` before generating its
//! next operation. The delay spreads workers out so they do not hit the gate in
//! lockstep.
//!
//! - [`ThinkTime::None`]: no pause, predictable and maximally contended
//! - [`ThinkTime::Fixed`]: the same pause every iteration
//! - [`ThinkTime::Uniform`]: random pause in `[0, max)` drawn from the worker's source

use std::time::Duration;

use super::source::RandomSource;

/// Policy controlling the per-iteration pause of a worker.
///
/// ## Trade-offs
/// - **None**: Highest contention; use with a deadline far enough out that
///   the runtime still advances time.
/// - **Fixed**: Deterministic pacing without touching the random source.
/// - **Uniform**: Desynchronizes workers (default).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThinkTime {
    /// No pause.
    None,

    /// Constant pause.
    Fixed(Duration),

    /// Random pause in `[0, max)`.
    Uniform {
        /// Exclusive upper bound.
        max: Duration,
    },
}

impl Default for ThinkTime {
    /// Returns `Uniform { max: 500ms }`.
    fn default() -> Self {
        ThinkTime::Uniform {
            max: Duration::from_millis(500),
        }
    }
}

impl ThinkTime {
    /// Uniform pause bounded by `max_ms` milliseconds (`0` = no pause).
    pub fn uniform_ms(max_ms: u64) -> Self {
        if max_ms == 0 {
            ThinkTime::None
        } else {
            ThinkTime::Uniform {
                max: Duration::from_millis(max_ms),
            }
        }
    }

    /// Computes the next pause.
    ///
    /// Only `Uniform` consults `src`; the other variants leave the source's
    /// call sequence untouched.
    pub fn sample(&self, src: &mut dyn RandomSource) -> Duration {
        match *self {
            ThinkTime::None => Duration::ZERO,
            ThinkTime::Fixed(d) => d,
            ThinkTime::Uniform { max } => src.think_time(max).min(max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::source::SeededSource;

    #[test]
    fn test_none_and_fixed_ignore_source() {
        let mut a = SeededSource::new(9);
        let mut b = SeededSource::new(9);
        assert_eq!(ThinkTime::None.sample(&mut a), Duration::ZERO);
        assert_eq!(
            ThinkTime::Fixed(Duration::from_millis(3)).sample(&mut a),
            Duration::from_millis(3)
        );
        assert_eq!(a.resource(1_000), b.resource(1_000));
    }

    #[test]
    fn test_uniform_bounds() {
        let policy = ThinkTime::uniform_ms(50);
        let mut src = SeededSource::new(11);
        for _ in 0..500 {
            assert!(policy.sample(&mut src) < Duration::from_millis(50));
        }
    }

    #[test]
    fn test_uniform_zero_is_none() {
        assert_eq!(ThinkTime::uniform_ms(0), ThinkTime::None);
    }
}

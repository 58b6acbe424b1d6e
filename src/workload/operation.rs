//! # Operations and their outcomes.
//!
//! An [`Operation`] is a value generated fresh per worker iteration: a target
//! resource, a kind and (for bookings) a requested quantity. Applying it under
//! the target's lock yields an [`Outcome`].
//!
//! None of the outcomes is an error: a rejected booking and a cancellation with
//! nothing booked are ordinary results of one iteration.

use std::fmt;

/// Kind of operation a worker performs on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Read the current quota.
    Inquire,
    /// Take `quantity` units if enough are available.
    Book,
    /// Return part of the booked units.
    Cancel,
}

impl OperationKind {
    /// All kinds, in the order used for uniform selection.
    pub const ALL: [OperationKind; 3] = [
        OperationKind::Inquire,
        OperationKind::Book,
        OperationKind::Cancel,
    ];

    /// Short lowercase name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Inquire => "inquire",
            OperationKind::Book => "book",
            OperationKind::Cancel => "cancel",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work against a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Target resource id.
    pub resource: usize,
    /// What to do.
    pub kind: OperationKind,
    /// Requested quantity; set only for [`OperationKind::Book`].
    pub quantity: Option<u32>,
}

impl Operation {
    /// Read-only query.
    pub fn inquire(resource: usize) -> Self {
        Self {
            resource,
            kind: OperationKind::Inquire,
            quantity: None,
        }
    }

    /// Booking of `quantity` units.
    pub fn book(resource: usize, quantity: u32) -> Self {
        Self {
            resource,
            kind: OperationKind::Book,
            quantity: Some(quantity),
        }
    }

    /// Cancellation; the amount is chosen under the resource lock.
    pub fn cancel(resource: usize) -> Self {
        Self {
            resource,
            kind: OperationKind::Cancel,
            quantity: None,
        }
    }
}

/// Result of applying an [`Operation`] under the resource lock.
///
/// `available` is always the quota observed at the end of the locked interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Quota read, nothing changed.
    Inquired {
        /// Current quota.
        available: u32,
    },
    /// Booking succeeded.
    Booked {
        /// Units taken.
        quantity: u32,
        /// Quota after the booking.
        available: u32,
    },
    /// Not enough quota; nothing changed.
    Rejected {
        /// Units asked for.
        requested: u32,
        /// Quota at the time of the attempt.
        available: u32,
    },
    /// Part of the booked units returned.
    Cancelled {
        /// Units returned.
        quantity: u32,
        /// Quota after the cancellation.
        available: u32,
    },
    /// Nothing was booked; nothing changed.
    NothingToCancel {
        /// Quota (equal to capacity).
        available: u32,
    },
}

impl Outcome {
    /// Quota observed at the end of the operation.
    pub fn available(&self) -> u32 {
        match *self {
            Outcome::Inquired { available }
            | Outcome::Booked { available, .. }
            | Outcome::Rejected { available, .. }
            | Outcome::Cancelled { available, .. }
            | Outcome::NothingToCancel { available } => available,
        }
    }

    /// True if the operation changed the quota.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Outcome::Booked { .. } | Outcome::Cancelled { .. })
    }

    /// Signed change applied to the quota (`-booked`, `+cancelled`, else `0`).
    pub fn delta(&self) -> i64 {
        match *self {
            Outcome::Booked { quantity, .. } => -i64::from(quantity),
            Outcome::Cancelled { quantity, .. } => i64::from(quantity),
            _ => 0,
        }
    }

    /// Short stable label for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Inquired { .. } => "inquired",
            Outcome::Booked { .. } => "booked",
            Outcome::Rejected { .. } => "rejected",
            Outcome::Cancelled { .. } => "cancelled",
            Outcome::NothingToCancel { .. } => "nothing_to_cancel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_signs() {
        assert_eq!(
            Outcome::Booked {
                quantity: 7,
                available: 3
            }
            .delta(),
            -7
        );
        assert_eq!(
            Outcome::Cancelled {
                quantity: 4,
                available: 7
            }
            .delta(),
            4
        );
        assert_eq!(
            Outcome::Rejected {
                requested: 9,
                available: 2
            }
            .delta(),
            0
        );
        assert_eq!(Outcome::NothingToCancel { available: 10 }.delta(), 0);
    }

    #[test]
    fn test_only_book_and_cancel_mutate() {
        assert!(!Outcome::Inquired { available: 1 }.is_mutation());
        assert!(
            !Outcome::Rejected {
                requested: 2,
                available: 1
            }
            .is_mutation()
        );
        assert!(
            Outcome::Booked {
                quantity: 1,
                available: 0
            }
            .is_mutation()
        );
    }

    #[test]
    fn test_constructors_set_quantity_only_for_book() {
        assert_eq!(Operation::book(3, 5).quantity, Some(5));
        assert_eq!(Operation::inquire(3).quantity, None);
        assert_eq!(Operation::cancel(3).kind, OperationKind::Cancel);
    }
}

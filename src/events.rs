use std::cmp::Ordering;

use serde::Serialize;

use crate::types::{Day, LoanId};

/// A wake-up of one of the simulation's logical processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Event {
    /// The allocator resumes: spend the wallet, then sleep one day.
    AllocatorWake,
    /// A committed claim becomes a live loan, the day after allocation.
    LoanOriginated { loan_id: LoanId },
    /// The loan's duration has elapsed; settle it.
    LoanMatured { loan_id: LoanId },
}

/// A scheduled wake-up, queued by the scheduler and kept in the run's log.
/// Ordered by `day`, then by submission order within a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimEvent {
    pub day: Day,
    pub seq: u64,
    pub event: Event,
}

impl Ord for SimEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.day.cmp(&other.day).then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for SimEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Resumed wake-ups in dispatch order.
pub type EventLog = Vec<SimEvent>;

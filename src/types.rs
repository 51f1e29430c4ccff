use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LoanId(pub u64);

/// Simulation time in days (1 unit = 1 simulated day).
/// Uses a 365-day year when annualising interest and growth.
/// The scheduler only visits days on which some process wakes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Day(pub u64);

impl Day {
    pub const DAYS_PER_YEAR: u64 = 365;

    /// Advance by a number of days.
    pub fn offset(self, days: u64) -> Self {
        Day(self.0 + days)
    }
}

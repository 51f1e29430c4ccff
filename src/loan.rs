use crate::credit::CreditRecord;
use crate::types::{Day, LoanId};

/// Days between the allocator committing a claim and the loan starting.
pub const SETTLEMENT_OFFSET_DAYS: u64 = 1;

/// A claim committed to one credit. Terms are fixed when the claim is made.
#[derive(Debug, Clone, PartialEq)]
pub struct Loan {
    pub id: LoanId,
    /// Index into the run's credit pool.
    pub credit: usize,
    pub principal: f64,
    pub origination_day: Day,
    pub maturity_day: Day,
    pub duration_days: u64,
    pub repayment: f64,
}

impl Loan {
    pub fn new(id: LoanId, credit_index: usize, credit: &CreditRecord, principal: f64, allocated_on: Day) -> Self {
        let origination_day = allocated_on.offset(SETTLEMENT_OFFSET_DAYS);
        Loan {
            id,
            credit: credit_index,
            principal,
            origination_day,
            maturity_day: origination_day.offset(credit.investment_duration),
            duration_days: credit.investment_duration,
            repayment: credit.repayment(principal),
        }
    }

    /// Repayment minus principal.
    pub fn profit(&self) -> f64 {
        self.repayment - self.principal
    }
}

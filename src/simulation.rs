use std::collections::HashMap;

use log::{debug, info};
use rand::Rng;

use crate::config::AllocationRatios;
use crate::credit::CreditRecord;
use crate::error::{Result, SimError};
use crate::events::{Event, EventLog};
use crate::ledger::Ledger;
use crate::loan::{Loan, SETTLEMENT_OFFSET_DAYS};
use crate::scheduler::Scheduler;
use crate::types::{Day, LoanId};

/// Days the allocator sleeps once the wallet is spent.
const ALLOCATOR_PERIOD_DAYS: u64 = 1;

/// Result of a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    /// `wallet + invested` when the horizon is reached.
    pub terminal_value: f64,
    pub loans_originated: u64,
    pub loans_settled: u64,
    /// Loans still running at the horizon; only their principal is counted.
    pub loans_outstanding: usize,
}

/// One auto-invest run: the allocator process plus one maturation process
/// per loan, sharing a wallet and an invested-capital container.
pub struct Simulation<'a, R: Rng> {
    scheduler: Scheduler,
    /// Resumed wake-ups in dispatch order; empty unless built [`with_log`](Self::with_log).
    pub log: EventLog,
    record_log: bool,
    rng: &'a mut R,
    credits: &'a [CreditRecord],
    ratios: &'a AllocationRatios,
    ledger: Ledger,
    loans: HashMap<LoanId, Loan>,
    next_loan_id: u64,
    loans_settled: u64,
}

impl<'a, R: Rng> Simulation<'a, R> {
    pub fn new(
        credits: &'a [CreditRecord],
        ratios: &'a AllocationRatios,
        initial_amount: f64,
        horizon_days: u64,
        rng: &'a mut R,
    ) -> Result<Self> {
        if credits.is_empty() {
            return Err(SimError::EmptyCreditPool);
        }
        ratios.validate()?;
        Ok(Simulation {
            scheduler: Scheduler::new(Day(horizon_days)),
            log: EventLog::new(),
            record_log: false,
            rng,
            credits,
            ratios,
            ledger: Ledger::new(initial_amount)?,
            loans: HashMap::new(),
            next_loan_id: 0,
            loans_settled: 0,
        })
    }

    /// Keep every resumed wake-up in [`log`](Self::log).
    pub fn with_log(mut self) -> Self {
        self.record_log = true;
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn now(&self) -> Day {
        self.scheduler.now()
    }

    pub fn loan(&self, id: LoanId) -> Option<&Loan> {
        self.loans.get(&id)
    }

    /// Bootstrap the allocator on day 0.
    pub fn start(&mut self) -> Result<()> {
        self.scheduler.schedule_at(Day(0), Event::AllocatorWake)
    }

    /// Resume the next due process. Returns `false` once the horizon is reached.
    pub fn step(&mut self) -> Result<bool> {
        let Some(ev) = self.scheduler.next_due() else {
            return Ok(false);
        };
        if self.record_log {
            self.log.push(ev.clone());
        }
        self.dispatch(ev.day, ev.event)?;
        Ok(true)
    }

    /// Run until the horizon and report the terminal portfolio.
    pub fn run(&mut self) -> Result<SimulationOutcome> {
        while self.step()? {}
        let outcome = self.outcome();
        debug!(
            "run finished day={} wallet={:.2} invested={:.2} settled={} outstanding={}",
            self.now().0,
            self.ledger.wallet(),
            self.ledger.invested(),
            outcome.loans_settled,
            outcome.loans_outstanding
        );
        Ok(outcome)
    }

    pub fn outcome(&self) -> SimulationOutcome {
        SimulationOutcome {
            terminal_value: self.ledger.total(),
            loans_originated: self.next_loan_id,
            loans_settled: self.loans_settled,
            loans_outstanding: self.loans.len(),
        }
    }

    fn dispatch(&mut self, day: Day, event: Event) -> Result<()> {
        match event {
            Event::AllocatorWake => {
                self.allocate(day)?;
                self.scheduler.schedule_after(ALLOCATOR_PERIOD_DAYS, Event::AllocatorWake)
            }
            Event::LoanOriginated { loan_id } => self.on_loan_originated(day, loan_id),
            Event::LoanMatured { loan_id } => self.on_loan_matured(day, loan_id),
        }
    }

    /// Spend the whole wallet on randomly drawn credits. Each claim is capped
    /// at the credit's ratio of the current portfolio value.
    fn allocate(&mut self, day: Day) -> Result<()> {
        let credits = self.credits;
        while self.ledger.wallet() > 0.0 {
            let index = self.rng.random_range(0..credits.len());
            let credit = &credits[index];
            let ratio = self.ratios.ratio_for(credit)?;
            let claim = (ratio * self.ledger.total()).min(self.ledger.wallet());

            self.ledger.commit(claim)?;
            let loan = Loan::new(LoanId(self.next_loan_id), index, credit, claim, day);
            self.next_loan_id += 1;
            self.scheduler
                .schedule_after(SETTLEMENT_OFFSET_DAYS, Event::LoanOriginated { loan_id: loan.id })?;
            self.loans.insert(loan.id, loan);
        }
        Ok(())
    }

    fn on_loan_originated(&mut self, day: Day, loan_id: LoanId) -> Result<()> {
        let loan = self.loans.get(&loan_id).ok_or(SimError::UnknownLoan { loan_id })?;
        self.log_loan("loan originated", day, loan);
        let duration = loan.duration_days;
        if duration == 0 {
            return self.on_loan_matured(day, loan_id);
        }
        self.scheduler.schedule_after(duration, Event::LoanMatured { loan_id })
    }

    fn on_loan_matured(&mut self, day: Day, loan_id: LoanId) -> Result<()> {
        let loan = self.loans.remove(&loan_id).ok_or(SimError::UnknownLoan { loan_id })?;
        self.ledger.settle(loan.principal, loan.repayment)?;
        self.loans_settled += 1;
        self.log_loan("loan repaid", day, &loan);
        Ok(())
    }

    fn log_loan(&self, what: &str, day: Day, loan: &Loan) {
        let credit = &self.credits[loan.credit];
        info!(
            target: "autoinvest::loan",
            "{what} loan_id={} day={} originator={:?} asset_class={} claim={:.2} repayment={:.2} days={} wallet={:.2} invested={:.2}",
            loan.id.0,
            day.0,
            credit.originator,
            credit.asset_class,
            loan.principal,
            loan.repayment,
            loan.duration_days,
            self.ledger.wallet(),
            self.ledger.invested()
        );
    }
}

/// Run one simulation from day 0 to the horizon.
pub fn simulate<R: Rng>(
    credits: &[CreditRecord],
    ratios: &AllocationRatios,
    initial_amount: f64,
    horizon_days: u64,
    rng: &mut R,
) -> Result<SimulationOutcome> {
    let mut sim = Simulation::new(credits, ratios, initial_amount, horizon_days, rng)?;
    sim.start()?;
    sim.run()
}

//! Capital containers: the liquid wallet and the capital locked in loans.
//!
//! Levels are private. Processes move money only through the whole-step
//! operations on [`Ledger`], each of which checks its preconditions before
//! touching either container, so a step either fully applies or leaves both
//! levels unchanged.

use crate::error::{Result, SimError};

/// Relative slack for floating-point rounding when withdrawing a level to zero.
const ROUNDING_TOLERANCE: f64 = 1e-9;

/// A non-negative scalar accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    name: &'static str,
    level: f64,
}

impl Container {
    pub fn new(name: &'static str, level: f64) -> Result<Self> {
        if !(level >= 0.0) {
            return Err(SimError::NegativeAmount { container: name, amount: level });
        }
        Ok(Container { name, level })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    fn check_withdraw(&self, amount: f64) -> Result<()> {
        if !(amount >= 0.0) {
            return Err(SimError::NegativeAmount { container: self.name, amount });
        }
        let slack = ROUNDING_TOLERANCE * self.level.max(1.0);
        if amount > self.level + slack {
            return Err(SimError::InsufficientFunds {
                container: self.name,
                requested: amount,
                available: self.level,
            });
        }
        Ok(())
    }

    fn check_deposit(&self, amount: f64) -> Result<()> {
        if !(amount >= 0.0) {
            return Err(SimError::NegativeAmount { container: self.name, amount });
        }
        Ok(())
    }

    /// Take `amount` out. Fails if it exceeds the level; rounding dust below
    /// zero is absorbed so the level never goes negative.
    pub fn withdraw(&mut self, amount: f64) -> Result<()> {
        self.check_withdraw(amount)?;
        self.level = (self.level - amount).max(0.0);
        Ok(())
    }

    pub fn deposit(&mut self, amount: f64) -> Result<()> {
        self.check_deposit(amount)?;
        self.level += amount;
        Ok(())
    }
}

/// The two containers of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    wallet: Container,
    invested: Container,
}

impl Ledger {
    /// All capital starts liquid.
    pub fn new(initial_amount: f64) -> Result<Self> {
        Ok(Ledger {
            wallet: Container::new("wallet", initial_amount)?,
            invested: Container::new("invested", 0.0)?,
        })
    }

    pub fn wallet(&self) -> f64 {
        self.wallet.level()
    }

    pub fn invested(&self) -> f64 {
        self.invested.level()
    }

    /// Portfolio value: liquid plus locked capital.
    pub fn total(&self) -> f64 {
        self.wallet.level() + self.invested.level()
    }

    /// Move a claim from the wallet into invested capital. Leaves the total unchanged.
    pub fn commit(&mut self, claim: f64) -> Result<()> {
        self.wallet.check_withdraw(claim)?;
        self.invested.check_deposit(claim)?;
        self.wallet.withdraw(claim)?;
        self.invested.deposit(claim)
    }

    /// Close a loan: credit the repayment to the wallet and release the
    /// principal from invested capital.
    ///
    /// Only `principal` ever leaves `invested`; interest or partial loss shows
    /// up as the difference landing in the wallet. A non-positive repayment is
    /// a total loss: nothing reaches the wallet.
    pub fn settle(&mut self, principal: f64, repayment: f64) -> Result<()> {
        self.invested.check_withdraw(principal)?;
        if repayment > 0.0 {
            self.wallet.deposit(repayment)?;
        }
        self.invested.withdraw(principal)
    }
}

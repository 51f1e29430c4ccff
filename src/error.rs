//! Error types for the auto-invest simulator.

use thiserror::Error;

use crate::types::{Day, LoanId};

/// Result type alias for simulator operations.
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    // ── Configuration ────────────────────────────────────────────────────────
    /// A credit was offered whose (originator, asset class) has no ratio.
    #[error("missing allocation ratio for {originator}:{asset_class}")]
    MissingRatio { originator: String, asset_class: String },

    #[error("allocation ratio for {originator}:{asset_class} must be in (0, 1], got {ratio}")]
    InvalidRatio { originator: String, asset_class: String, ratio: f64 },

    #[error("credit pool is empty")]
    EmptyCreditPool,

    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    // ── Invariant violations ─────────────────────────────────────────────────
    #[error("cannot withdraw {requested} from {container}, level is {available}")]
    InsufficientFunds { container: &'static str, requested: f64, available: f64 },

    #[error("negative amount {amount} for {container}")]
    NegativeAmount { container: &'static str, amount: f64 },

    #[error("wake-up delay must be at least one day")]
    NonPositiveDelay,

    #[error("cannot schedule at day {day:?}, clock is already at {now:?}")]
    ScheduleInPast { day: Day, now: Day },

    #[error("loan {loan_id:?} is not outstanding")]
    UnknownLoan { loan_id: LoanId },

    // ── Input shape ──────────────────────────────────────────────────────────
    #[error("credit #{index}: {message}")]
    InvalidCredit { index: usize, message: String },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter { message: message.into() }
    }

    pub fn invalid_credit(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidCredit { index, message: message.into() }
    }
}

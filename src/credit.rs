//! Credit-list input: the raw JSON shape served by the platform's portfolio
//! API, and its decoration into fixed-shape [`CreditRecord`]s.

use std::io::Read;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::{Result, SimError};

/// Interest accrues only on loans held longer than this many days.
pub const INTEREST_FREE_MAX_DAYS: u64 = 14;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Statuses of credits that no longer take new money.
pub const CLOSED_STATUSES: [&str; 3] = ["Repaid", "Sold", "CreditLoss"];

/// One entry of the credit-list document. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCredit {
    pub originator: String,
    pub asset_class: String,
    pub expected_annual_interest: f64,
    pub first_investment_time: String,
    pub status: String,
    #[serde(default)]
    pub actual_end_time: Option<String>,
    #[serde(default)]
    pub expected_end_date: Option<String>,
    #[serde(default)]
    pub credit_issue_date: Option<String>,
    #[serde(default)]
    pub claim: Option<f64>,
}

impl RawCredit {
    pub fn is_open(&self) -> bool {
        !CLOSED_STATUSES.contains(&self.status.as_str())
    }

    pub fn is_repaid(&self) -> bool {
        self.status == "Repaid"
    }

    /// Day the credit ends: actual end for repaid credits, expected end otherwise.
    fn end_date(&self) -> std::result::Result<NaiveDate, String> {
        if self.is_repaid() {
            let ts = self.actual_end_time.as_deref().ok_or("repaid credit without ActualEndTime")?;
            parse_timestamp(ts)
        } else {
            let date = self.expected_end_date.as_deref().ok_or("credit without ExpectedEndDate")?;
            parse_date(date)
        }
    }
}

/// A lendable instrument with its derived duration and daily growth factor.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditRecord {
    pub originator: String,
    pub asset_class: String,
    pub expected_annual_interest: f64,
    /// Days from first investment to (actual or expected) end.
    pub investment_duration: u64,
    /// `(1 + annual)^(1/365)`.
    pub daily_interest_factor: f64,
}

impl CreditRecord {
    /// Build a record directly from its terms. Used by decoration and tests.
    pub fn new(
        originator: impl Into<String>,
        asset_class: impl Into<String>,
        expected_annual_interest: f64,
        investment_duration: u64,
    ) -> std::result::Result<Self, String> {
        let daily_interest_factor = daily_interest_factor(expected_annual_interest);
        if !(daily_interest_factor.is_finite() && daily_interest_factor > 0.0) {
            return Err(format!(
                "expected annual interest {expected_annual_interest} gives a non-positive daily factor"
            ));
        }
        Ok(CreditRecord {
            originator: originator.into(),
            asset_class: asset_class.into(),
            expected_annual_interest,
            investment_duration,
            daily_interest_factor,
        })
    }

    /// What a claim of `principal` pays back at maturity.
    /// Short loans (≤ 14 days) return exactly the principal.
    pub fn repayment(&self, principal: f64) -> f64 {
        if self.investment_duration > INTEREST_FREE_MAX_DAYS {
            principal * self.daily_interest_factor.powf(self.investment_duration as f64)
        } else {
            principal
        }
    }
}

pub fn daily_interest_factor(annual: f64) -> f64 {
    (1.0 + annual).powf(1.0 / 365.0)
}

fn parse_timestamp(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map(|dt| dt.date())
        .map_err(|e| format!("bad timestamp {s:?}: {e}"))
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("bad date {s:?}: {e}"))
}

/// Derive duration and daily interest for one raw entry.
pub fn decorate_one(index: usize, raw: &RawCredit) -> Result<CreditRecord> {
    let invest_date =
        parse_timestamp(&raw.first_investment_time).map_err(|m| SimError::invalid_credit(index, m))?;
    let end_date = raw.end_date().map_err(|m| SimError::invalid_credit(index, m))?;
    let days = (end_date - invest_date).num_days();
    let duration = u64::try_from(days).map_err(|_| {
        SimError::invalid_credit(index, format!("ends {end_date} before first investment {invest_date}"))
    })?;
    CreditRecord::new(&raw.originator, &raw.asset_class, raw.expected_annual_interest, duration)
        .map_err(|m| SimError::invalid_credit(index, m))
}

pub fn decorate(raw: &[RawCredit]) -> Result<Vec<CreditRecord>> {
    raw.iter().enumerate().map(|(i, r)| decorate_one(i, r)).collect()
}

/// Parse a credit-list JSON array.
pub fn load_credits(reader: impl Read) -> Result<Vec<RawCredit>> {
    Ok(serde_json::from_reader(reader)?)
}

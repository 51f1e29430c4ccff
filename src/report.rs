//! Descriptive statistics of a credit list: how it splits by status, asset
//! class and originator, and how much money falls due over time.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::credit::RawCredit;

/// Percentiles of the order-depth table, as fractions.
pub const DEPTH_PERCENTILES: [f64; 7] = [0.05, 0.1, 0.25, 0.5, 0.75, 0.9, 0.99];

/// Count of credits per key, plus the total the shares are taken against.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub counts: BTreeMap<String, usize>,
    pub total: usize,
}

impl Distribution {
    fn tally(keys: impl Iterator<Item = String>, total: usize) -> Self {
        let mut counts = BTreeMap::new();
        for key in keys {
            *counts.entry(key).or_insert(0) += 1;
        }
        Distribution { counts, total }
    }

    /// Percentage of the whole list.
    pub fn share(&self, key: &str) -> f64 {
        match (self.counts.get(key), self.total) {
            (Some(&n), total) if total > 0 => 100.0 * n as f64 / total as f64,
            _ => 0.0,
        }
    }
}

/// Every credit, by status.
pub fn status_distribution(credits: &[RawCredit]) -> Distribution {
    Distribution::tally(credits.iter().map(|c| c.status.clone()), credits.len())
}

/// Open credits by asset class; shares are of the whole list.
pub fn asset_class_distribution(credits: &[RawCredit]) -> Distribution {
    let open = credits.iter().filter(|c| c.is_open());
    Distribution::tally(open.map(|c| c.asset_class.clone()), credits.len())
}

/// Open credits by originator; shares are of the whole list.
pub fn originator_distribution(credits: &[RawCredit]) -> Distribution {
    let open = credits.iter().filter(|c| c.is_open());
    Distribution::tally(open.map(|c| originator_label(&c.originator)), credits.len())
}

fn originator_label(originator: &str) -> String {
    if originator == "Loanstep" {
        "Loanstep (SBL Finans)".to_string()
    } else {
        originator.to_string()
    }
}

/// A not-yet-repaid credit's place in the repayment queue.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthEntry {
    /// Negative when the expected end date has passed.
    pub days_until_end: i64,
    pub claim_with_interest: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepthRow {
    pub percentile: f64,
    pub days_until_end: i64,
    /// Claims with interest falling due up to and including this entry.
    pub cumulative: f64,
}

/// Not-yet-repaid credits ordered by expected end date.
///
/// Interest runs from issue to the later of `today` and the expected end
/// date, compounded as `claim * (1 + annual)^(days / 365)` like the
/// simulation's repayments. Older depth reports compounded differently, so
/// their figures will not match. Credits without an issue date, end date or
/// claim are skipped.
pub fn depth_entries(credits: &[RawCredit], today: NaiveDate) -> Vec<DepthEntry> {
    let mut entries: Vec<DepthEntry> = credits
        .iter()
        .filter(|c| !c.is_repaid())
        .filter_map(|c| {
            let end = NaiveDate::parse_from_str(c.expected_end_date.as_deref()?, "%Y-%m-%d").ok()?;
            let issued = NaiveDate::parse_from_str(c.credit_issue_date.as_deref()?, "%Y-%m-%d").ok()?;
            let claim = c.claim?;
            let accrual_days = (today.max(end) - issued).num_days() as f64;
            Some(DepthEntry {
                days_until_end: (end - today).num_days(),
                claim_with_interest: claim
                    * (1.0 + c.expected_annual_interest).powf(accrual_days / 365.0),
            })
        })
        .collect();
    entries.sort_by_key(|e| e.days_until_end);
    entries
}

/// Cumulative money due at each of [`DEPTH_PERCENTILES`] of the queue.
pub fn order_depth(credits: &[RawCredit], today: NaiveDate) -> Vec<DepthRow> {
    let entries = depth_entries(credits, today);
    if entries.is_empty() {
        return Vec::new();
    }
    DEPTH_PERCENTILES
        .iter()
        .map(|&p| {
            let index = (p * (entries.len() - 1) as f64).round() as usize;
            DepthRow {
                percentile: p,
                days_until_end: entries[index].days_until_end,
                cumulative: entries[..=index].iter().map(|e| e.claim_with_interest).sum(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn credit(originator: &str, asset_class: &str, status: &str) -> RawCredit {
        RawCredit {
            originator: originator.to_string(),
            asset_class: asset_class.to_string(),
            expected_annual_interest: 0.1,
            first_investment_time: "2024-01-01T00:00:00.000Z".to_string(),
            status: status.to_string(),
            actual_end_time: None,
            expected_end_date: Some("2024-06-01".to_string()),
            credit_issue_date: Some("2024-01-01".to_string()),
            claim: Some(100.0),
        }
    }

    fn sample() -> Vec<RawCredit> {
        vec![
            credit("Loanstep", "ConsumerCredit", "Active"),
            credit("Loanstep", "ConsumerCredit", "Repaid"),
            credit("Treyd", "Factoring", "Active"),
            credit("Treyd", "Factoring", "CreditLoss"),
        ]
    }

    #[test]
    fn status_counts_every_credit() {
        let d = status_distribution(&sample());
        assert_eq!(d.counts["Active"], 2);
        assert_eq!(d.counts["Repaid"], 1);
        assert_eq!(d.total, 4);
        assert_relative_eq!(d.share("Active"), 50.0);
        assert_eq!(d.share("Sold"), 0.0);
    }

    #[test]
    fn asset_classes_count_open_credits_against_full_list() {
        let d = asset_class_distribution(&sample());
        assert_eq!(d.counts["ConsumerCredit"], 1);
        assert_eq!(d.counts["Factoring"], 1);
        assert_relative_eq!(d.share("Factoring"), 25.0);
    }

    #[test]
    fn loanstep_is_labelled_with_its_lender() {
        let d = originator_distribution(&sample());
        assert_eq!(d.counts["Loanstep (SBL Finans)"], 1);
        assert!(!d.counts.contains_key("Loanstep"));
    }

    #[test]
    fn depth_skips_repaid_and_incomplete_credits() {
        let mut credits = sample();
        credits[2].claim = None;
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let entries = depth_entries(&credits, today);
        // Active Loanstep and the credit-loss Treyd remain.
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].days_until_end, 92);
    }

    #[test]
    fn overdue_credits_accrue_until_today() {
        let credits = [credit("Treyd", "Factoring", "Active")];
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let entries = depth_entries(&credits, today);
        assert!(entries[0].days_until_end < 0);
        assert_relative_eq!(entries[0].claim_with_interest, 110.0, max_relative = 1e-2);
    }

    #[test]
    fn order_depth_accumulates_sorted_claims() {
        let mut credits: Vec<RawCredit> = (0..5)
            .map(|i| {
                let mut c = credit("Treyd", "Factoring", "Active");
                c.expected_annual_interest = 0.0;
                c.expected_end_date = Some(format!("2024-0{}-01", 5 - i));
                c
            })
            .collect();
        credits.push(credit("Treyd", "Factoring", "Repaid"));
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = order_depth(&credits, today);

        assert_eq!(rows.len(), DEPTH_PERCENTILES.len());
        // p = 0.5 → index round(0.5 * 4) = 2 → three claims of 100.
        let median = rows.iter().find(|r| r.percentile == 0.5).unwrap();
        assert_relative_eq!(median.cumulative, 300.0);
        assert_eq!(median.days_until_end, 60);
        for pair in rows.windows(2) {
            assert!(pair[0].days_until_end <= pair[1].days_until_end);
            assert!(pair[0].cumulative <= pair[1].cumulative);
        }
    }

    #[test]
    fn order_depth_of_empty_list_is_empty() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(order_depth(&[], today).is_empty());
    }
}

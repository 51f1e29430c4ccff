//! Outcome aggregation: annualised growth, mean and percentile table.

use crate::simulation::SimulationOutcome;
use crate::types::Day;

/// Percentiles reported for every study.
pub const PERCENTILES: [u8; 11] = [0, 1, 5, 10, 25, 50, 75, 90, 95, 99, 100];

/// Scale a run's growth multiple to a one-year equivalent.
pub fn annualize(terminal_value: f64, initial_amount: f64, horizon_days: u64) -> f64 {
    let growth = terminal_value / initial_amount;
    growth.powf(Day::DAYS_PER_YEAR as f64 / horizon_days as f64)
}

pub fn annualized_growth(outcomes: &[SimulationOutcome], initial_amount: f64, horizon_days: u64) -> Vec<f64> {
    outcomes
        .iter()
        .map(|o| annualize(o.terminal_value, initial_amount, horizon_days))
        .collect()
}

/// Linear interpolation between closest ranks; `p` in percent.
/// `sorted` must be non-empty and ascending.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let h = (p / 100.0) * (n - 1) as f64;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[derive(Debug, Clone, PartialEq)]
pub struct PercentileValue {
    pub percentile: u8,
    /// Annualised growth multiple at this percentile.
    pub growth: f64,
}

/// Distribution of annualised growth across a study.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub n: usize,
    pub initial_amount: f64,
    pub mean: f64,
    pub percentiles: Vec<PercentileValue>,
}

impl Summary {
    /// Gain as a fraction: positive is profit, negative is loss.
    pub fn gain(growth: f64) -> f64 {
        growth - 1.0
    }

    /// Money the initial amount grows to in a year at this multiple.
    pub fn amount(&self, growth: f64) -> f64 {
        self.initial_amount * growth
    }
}

/// `None` when there are no outcomes to summarise.
pub fn summarize(growth: &[f64], initial_amount: f64) -> Option<Summary> {
    if growth.is_empty() {
        return None;
    }
    let mut sorted = growth.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
    let percentiles = PERCENTILES
        .iter()
        .map(|&p| PercentileValue { percentile: p, growth: percentile(&sorted, p as f64) })
        .collect();

    Some(Summary { n: sorted.len(), initial_amount, mean, percentiles })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use super::*;

    fn outcome(terminal_value: f64) -> SimulationOutcome {
        SimulationOutcome { terminal_value, loans_originated: 0, loans_settled: 0, loans_outstanding: 0 }
    }

    #[test]
    fn percentile_known_values() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 25.0), 2.0);
        assert_eq!(percentile(&values, 50.0), 3.0);
        assert_eq!(percentile(&values, 100.0), 5.0);
        assert_relative_eq!(percentile(&values, 10.0), 1.4, epsilon = 1e-12);
    }

    #[test]
    fn single_value_fills_every_percentile() {
        let s = summarize(&[1.05], 10_000.0).unwrap();
        assert_eq!(s.n, 1);
        assert!(s.percentiles.iter().all(|p| p.growth == 1.05));
        assert_relative_eq!(Summary::gain(s.mean), 0.05, epsilon = 1e-12);
        assert_relative_eq!(s.amount(s.mean), 10_500.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_outcomes_have_no_summary() {
        assert!(summarize(&[], 10_000.0).is_none());
    }

    #[test]
    fn full_year_is_not_rescaled() {
        assert_relative_eq!(annualize(10_800.0, 10_000.0, 365), 1.08, epsilon = 1e-12);
    }

    #[test]
    fn half_year_growth_compounds_to_a_year() {
        let g = annualize(10_100.0, 10_000.0, 73);
        assert_relative_eq!(g, 1.01f64.powi(5), epsilon = 1e-12);
    }

    #[test]
    fn annualized_growth_maps_each_outcome() {
        let g = annualized_growth(&[outcome(10_000.0), outcome(11_000.0)], 10_000.0, 365);
        assert_eq!(g.len(), 2);
        assert_eq!(g[0], 1.0);
        assert_relative_eq!(g[1], 1.1, epsilon = 1e-12);
    }

    #[test]
    fn summary_reports_all_percentiles_in_order() {
        let s = summarize(&[1.2, 0.9, 1.0, 1.1], 100.0).unwrap();
        let ps: Vec<u8> = s.percentiles.iter().map(|p| p.percentile).collect();
        assert_eq!(ps, PERCENTILES.to_vec());
        assert_eq!(s.percentiles[0].growth, 0.9);
        assert_eq!(s.percentiles[10].growth, 1.2);
        assert_relative_eq!(s.mean, 1.05, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn percentiles_are_non_decreasing(values in prop::collection::vec(0.0f64..3.0, 1..200)) {
            let s = summarize(&values, 10_000.0).unwrap();
            for pair in s.percentiles.windows(2) {
                prop_assert!(pair[0].growth <= pair[1].growth, "{:?}", pair);
            }
            prop_assert!(s.percentiles[0].growth <= s.mean + 1e-12);
            prop_assert!(s.mean <= s.percentiles[10].growth + 1e-12);
        }
    }
}

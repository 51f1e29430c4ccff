use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;

use crate::credit::CreditRecord;
use crate::error::{Result, SimError};

/// Parameters of a Monte Carlo study.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// `None` draws a fresh seed per study (logged so it can be replayed).
    pub seed: Option<u64>,
    pub iterations: usize,
    /// Cash placed in the wallet on day 0.
    pub initial_amount: f64,
    /// Number of simulated days; wake-ups on or after this day never run.
    pub horizon_days: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig { seed: None, iterations: 1000, initial_amount: 10_000.0, horizon_days: 365 }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(SimError::invalid_parameter("iterations must be positive"));
        }
        if !(self.initial_amount.is_finite() && self.initial_amount > 0.0) {
            return Err(SimError::invalid_parameter(format!(
                "initial amount must be a positive number, got {}",
                self.initial_amount
            )));
        }
        if self.horizon_days == 0 {
            return Err(SimError::invalid_parameter("time horizon must be at least one day"));
        }
        Ok(())
    }
}

/// Maximum share of total portfolio value a single claim may take,
/// keyed by originator, then asset class.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AllocationRatios {
    by_originator: HashMap<String, HashMap<String, f64>>,
}

impl AllocationRatios {
    pub fn new() -> Self {
        AllocationRatios { by_originator: HashMap::new() }
    }

    /// The auto-invest settings of the reference portfolio.
    pub fn canonical() -> Self {
        let mut ratios = AllocationRatios::new();
        ratios.insert("Loanstep", "ConsumerCredit", 0.02);
        ratios.insert("Treyd", "Factoring", 0.01);
        ratios.insert("Billecta Factoring", "Factoring", 0.01);
        ratios.insert("Billecta Inkasso", "DcPortfolio", 0.02);
        ratios.insert("Billecta Företagskrediter", "SMECredit", 0.015);
        ratios.insert("Billecta PL - SME", "SMECredit", 0.03);
        ratios.insert("SKF Hyresfastighet", "SMECredit", 0.015);
        ratios.insert("Billecta FI - Factoring", "Factoring", 0.01);
        ratios
    }

    /// Parse `{ "<originator>": { "<asset class>": ratio, ... }, ... }`.
    pub fn from_json(reader: impl Read) -> Result<Self> {
        let ratios: AllocationRatios = serde_json::from_reader(reader)?;
        ratios.validate()?;
        Ok(ratios)
    }

    pub fn insert(&mut self, originator: &str, asset_class: &str, ratio: f64) {
        self.by_originator
            .entry(originator.to_string())
            .or_default()
            .insert(asset_class.to_string(), ratio);
    }

    /// Every ratio must lie in (0, 1].
    pub fn validate(&self) -> Result<()> {
        for (originator, classes) in &self.by_originator {
            for (asset_class, &ratio) in classes {
                if !(ratio > 0.0 && ratio <= 1.0) {
                    return Err(SimError::InvalidRatio {
                        originator: originator.clone(),
                        asset_class: asset_class.clone(),
                        ratio,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, originator: &str, asset_class: &str) -> Result<f64> {
        self.by_originator
            .get(originator)
            .and_then(|classes| classes.get(asset_class))
            .copied()
            .ok_or_else(|| SimError::MissingRatio {
                originator: originator.to_string(),
                asset_class: asset_class.to_string(),
            })
    }

    pub fn ratio_for(&self, credit: &CreditRecord) -> Result<f64> {
        self.get(&credit.originator, &credit.asset_class)
    }

    /// Fail on the first credit in the pool that has no configured ratio.
    pub fn check_pool(&self, credits: &[CreditRecord]) -> Result<()> {
        credits.iter().try_for_each(|c| self.ratio_for(c).map(|_| ()))
    }
}

impl Default for AllocationRatios {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_prices_loanstep_consumer_credit() {
        let ratios = AllocationRatios::canonical();
        assert_eq!(ratios.get("Loanstep", "ConsumerCredit").unwrap(), 0.02);
        assert_eq!(ratios.get("Billecta PL - SME", "SMECredit").unwrap(), 0.03);
        ratios.validate().unwrap();
    }

    #[test]
    fn missing_asset_class_is_an_error() {
        let ratios = AllocationRatios::canonical();
        let err = ratios.get("Loanstep", "Factoring").unwrap_err();
        assert!(
            matches!(err, SimError::MissingRatio { ref originator, ref asset_class }
                if originator == "Loanstep" && asset_class == "Factoring"),
            "got {err:?}"
        );
    }

    #[test]
    fn missing_originator_is_an_error() {
        let ratios = AllocationRatios::canonical();
        assert!(matches!(ratios.get("Nobody", "ConsumerCredit"), Err(SimError::MissingRatio { .. })));
    }

    #[test]
    fn from_json_reads_nested_table() {
        let json = r#"{"Acme": {"Factoring": 0.05, "SMECredit": 0.1}}"#;
        let ratios = AllocationRatios::from_json(json.as_bytes()).unwrap();
        assert_eq!(ratios.get("Acme", "Factoring").unwrap(), 0.05);
        assert_eq!(ratios.get("Acme", "SMECredit").unwrap(), 0.1);
    }

    #[test]
    fn from_json_rejects_out_of_range_ratio() {
        let json = r#"{"Acme": {"Factoring": 1.5}}"#;
        let err = AllocationRatios::from_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, SimError::InvalidRatio { .. }), "got {err:?}");

        let json = r#"{"Acme": {"Factoring": 0.0}}"#;
        assert!(AllocationRatios::from_json(json.as_bytes()).is_err());
    }

    #[test]
    fn default_config_is_valid() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn config_rejects_non_positive_parameters() {
        let base = SimulationConfig::default();
        assert!(SimulationConfig { iterations: 0, ..base.clone() }.validate().is_err());
        assert!(SimulationConfig { initial_amount: 0.0, ..base.clone() }.validate().is_err());
        assert!(SimulationConfig { initial_amount: f64::NAN, ..base.clone() }.validate().is_err());
        assert!(SimulationConfig { horizon_days: 0, ..base }.validate().is_err());
    }
}

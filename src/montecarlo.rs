use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;

use crate::config::{AllocationRatios, SimulationConfig};
use crate::credit::CreditRecord;
use crate::error::{Result, SimError};
use crate::simulation::{SimulationOutcome, simulate};

/// Use the configured seed, or draw one from the OS-seeded thread RNG.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let seed: u64 = rand::rng().random();
        info!("no random seed given, using {seed}");
        seed
    })
}

/// Repeats independent simulation runs over one credit pool.
pub struct MonteCarlo<'a> {
    credits: &'a [CreditRecord],
    ratios: &'a AllocationRatios,
    config: SimulationConfig,
    seed: u64,
}

impl<'a> MonteCarlo<'a> {
    /// Validates the parameters and checks that every credit in the pool is priced.
    pub fn new(credits: &'a [CreditRecord], ratios: &'a AllocationRatios, config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        if credits.is_empty() {
            return Err(SimError::EmptyCreditPool);
        }
        ratios.validate()?;
        ratios.check_pool(credits)?;
        Ok(MonteCarlo { credits, ratios, config: config.clone(), seed: resolve_seed(config.seed) })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every iteration in turn, all drawing from one generator.
    pub fn run(&self) -> Result<Vec<SimulationOutcome>> {
        let mut rng = ChaCha20Rng::seed_from_u64(self.seed);
        (0..self.config.iterations)
            .map(|i| -> Result<SimulationOutcome> {
                let outcome = self.run_one(&mut rng)?;
                debug!("iteration {i}: terminal value {:.2}", outcome.terminal_value);
                Ok(outcome)
            })
            .collect()
    }

    /// Run iterations on the rayon pool. Iteration `i` draws from its own
    /// generator seeded with `seed + i`; results come back in iteration order.
    pub fn run_parallel(&self) -> Result<Vec<SimulationOutcome>> {
        (0..self.config.iterations)
            .into_par_iter()
            .map(|i| -> Result<SimulationOutcome> {
                let mut rng = ChaCha20Rng::seed_from_u64(self.seed.wrapping_add(i as u64));
                let outcome = self.run_one(&mut rng)?;
                debug!("iteration {i}: terminal value {:.2}", outcome.terminal_value);
                Ok(outcome)
            })
            .collect()
    }

    fn run_one(&self, rng: &mut ChaCha20Rng) -> Result<SimulationOutcome> {
        simulate(self.credits, self.ratios, self.config.initial_amount, self.config.horizon_days, rng)
    }
}

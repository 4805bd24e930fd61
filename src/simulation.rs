// src/simulation.rs

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use statrs::statistics::Statistics;

use crate::config::N_SIMULATIONS;
use crate::error::SimulationError;

/// Point estimates and user forecasts for one valuation case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationInputs {
    pub kpi_current: f64,
    pub kpi_estimated: f64,
    pub kpi_std: f64,
    pub financial_current: f64,
    pub financial_estimated: f64,
    pub financial_std: f64,
}

impl ValuationInputs {
    pub fn current_valuation(&self) -> f64 {
        self.kpi_current * self.financial_current
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub n_simulations: usize,
    /// Fixed seed for reproducible draws; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_simulations: N_SIMULATIONS,
            seed: None,
        }
    }
}

/// All four distributions from one [`MonteCarloSimulation::run`].
#[derive(Debug, Clone)]
pub struct SimulationOutputs {
    pub kpi: Vec<f64>,
    pub financial: Vec<f64>,
    pub valuation: Vec<f64>,
    /// `None` when the growth rate is undefined for this draw.
    pub cagr: Option<Vec<f64>>,
}

/// Propagates KPI and financial uncertainty into a valuation and its CAGR.
///
/// Every call draws fresh samples from the simulation's generator; nothing is
/// cached between calls, so two calls only agree when the generator was seeded
/// identically and called in the same order.
pub struct MonteCarloSimulation {
    inputs: ValuationInputs,
    n_simulations: usize,
    rng: StdRng,
}

impl MonteCarloSimulation {
    pub fn new(inputs: ValuationInputs) -> Result<Self, SimulationError> {
        Self::with_config(inputs, SimulationConfig::default())
    }

    pub fn with_config(inputs: ValuationInputs, config: SimulationConfig) -> Result<Self, SimulationError> {
        if config.n_simulations == 0 {
            return Err(SimulationError::NoSamples);
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(MonteCarloSimulation {
            inputs,
            n_simulations: config.n_simulations,
            rng,
        })
    }

    pub fn inputs(&self) -> &ValuationInputs {
        &self.inputs
    }

    pub fn n_simulations(&self) -> usize {
        self.n_simulations
    }

    pub fn kpi_distribution(&mut self) -> Result<Vec<f64>, SimulationError> {
        let (mean, std_dev) = (self.inputs.kpi_estimated, self.inputs.kpi_std);
        self.draw("kpi", mean, std_dev)
    }

    pub fn financial_distribution(&mut self) -> Result<Vec<f64>, SimulationError> {
        let (mean, std_dev) = (self.inputs.financial_estimated, self.inputs.financial_std);
        self.draw("financial", mean, std_dev)
    }

    /// Elementwise product of fresh KPI and financial draws.
    pub fn valuation_distribution(&mut self) -> Result<Vec<f64>, SimulationError> {
        let kpi = self.kpi_distribution()?;
        let financial = self.financial_distribution()?;
        Ok(kpi.iter().zip(&financial).map(|(k, f)| k * f).collect())
    }

    /// Per-period compound growth from the current valuation to a fresh
    /// valuation draw.
    ///
    /// Returns `Ok(None)` when any simulated valuation is negative or the
    /// current valuation is not positive, since no growth rate reaches those.
    pub fn valuation_cagr_distribution(&mut self, periods: f64) -> Result<Option<Vec<f64>>, SimulationError> {
        if !periods.is_finite() || periods <= 0.0 {
            return Err(SimulationError::InvalidPeriods(periods));
        }

        let valuation_current = self.inputs.current_valuation();
        let estimated_valuation = self.valuation_distribution()?;

        if estimated_valuation.iter().any(|value| *value < 0.0) {
            log::warn!("It is not possible to calculate a cagr to a negative ending value");
            return Ok(None);
        }
        if valuation_current <= 0.0 {
            log::warn!("It is not possible to calculate a cagr from a current valuation of {valuation_current}");
            return Ok(None);
        }

        let exponent = 1.0 / periods;
        let cagr = estimated_valuation
            .par_iter()
            .map(|valuation| (valuation / valuation_current).powf(exponent) - 1.0)
            .collect();
        Ok(Some(cagr))
    }

    /// Draws all four distributions, each from its own fresh samples.
    pub fn run(&mut self, periods: f64) -> Result<SimulationOutputs, SimulationError> {
        Ok(SimulationOutputs {
            kpi: self.kpi_distribution()?,
            financial: self.financial_distribution()?,
            valuation: self.valuation_distribution()?,
            cagr: self.valuation_cagr_distribution(periods)?,
        })
    }

    fn draw(&mut self, name: &'static str, mean: f64, std_dev: f64) -> Result<Vec<f64>, SimulationError> {
        if !mean.is_finite() {
            return Err(SimulationError::InvalidMean { name, value: mean });
        }
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(SimulationError::InvalidStdDev { name, value: std_dev });
        }
        // A zero spread is a point mass, which the normal constructor rejects.
        if std_dev == 0.0 {
            return Ok(vec![mean; self.n_simulations]);
        }

        let normal = Normal::new(mean, std_dev)
            .map_err(|_| SimulationError::InvalidStdDev { name, value: std_dev })?;
        Ok((0..self.n_simulations).map(|_| normal.sample(&mut self.rng)).collect())
    }
}

/// Location and spread of a simulated distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl DistributionSummary {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        Some(DistributionSummary {
            mean: samples.iter().mean(),
            std_dev: samples.iter().std_dev(),
            min: Statistics::min(samples.iter()),
            max: Statistics::max(samples.iter()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> ValuationInputs {
        ValuationInputs {
            kpi_current: 15.0,
            kpi_estimated: 20.0,
            kpi_std: 1.0,
            financial_current: 200.0,
            financial_estimated: 280.0,
            financial_std: 30.0,
        }
    }

    fn seeded(n_simulations: usize, seed: u64) -> SimulationConfig {
        SimulationConfig {
            n_simulations,
            seed: Some(seed),
        }
    }

    #[test]
    fn same_seed_same_draws() {
        let mut a = MonteCarloSimulation::with_config(inputs(), seeded(1000, 7)).unwrap();
        let mut b = MonteCarloSimulation::with_config(inputs(), seeded(1000, 7)).unwrap();
        assert_eq!(a.valuation_distribution().unwrap(), b.valuation_distribution().unwrap());
    }

    #[test]
    fn repeated_calls_redraw() {
        let mut sim = MonteCarloSimulation::with_config(inputs(), seeded(1000, 7)).unwrap();
        let first = sim.valuation_distribution().unwrap();
        let second = sim.valuation_distribution().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn zero_std_is_a_point_mass() {
        let mut point = inputs();
        point.kpi_std = 0.0;
        let mut sim = MonteCarloSimulation::with_config(point, seeded(10, 1)).unwrap();
        assert!(sim.kpi_distribution().unwrap().iter().all(|k| *k == 20.0));
    }

    #[test]
    fn negative_std_is_rejected() {
        let mut bad = inputs();
        bad.financial_std = -1.0;
        let mut sim = MonteCarloSimulation::with_config(bad, seeded(10, 1)).unwrap();
        assert_eq!(
            sim.financial_distribution(),
            Err(SimulationError::InvalidStdDev { name: "financial", value: -1.0 })
        );
    }

    #[test]
    fn zero_samples_is_rejected() {
        assert!(matches!(
            MonteCarloSimulation::with_config(inputs(), seeded(0, 1)),
            Err(SimulationError::NoSamples)
        ));
    }

    #[test]
    fn summary_of_known_samples() {
        let summary = DistributionSummary::from_samples(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(summary.mean, 2.0);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
        assert!((summary.std_dev - 1.0).abs() < 1e-12);
        assert!(DistributionSummary::from_samples(&[]).is_none());
    }
}

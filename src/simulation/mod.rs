//! Monte Carlo price-risk simulation.
//!
//! Simulates independent GBM price paths from a spot price and
//! annualized drift/volatility, then reduces the terminal ensemble to
//! distributional risk statistics in both return and dollar-P&L terms.

pub mod artifacts;
pub mod gbm;
pub mod rng;

pub use artifacts::{Histogram, PathEnsemble, HISTOGRAM_BINS, SAMPLE_PATH_COUNT};
pub use gbm::terminal_price_quantile;

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::snapshot::normalize_ticker;
use crate::core::stats::{log_returns, percentile, tail_mean, DistributionStats};

/// Trading days per year used to annualize historical returns.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Parameters of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Spot price at t=0.
    pub spot: f64,
    /// Annualized drift of log returns.
    pub mu: f64,
    /// Annualized volatility of log returns; zero is valid (pure drift).
    pub sigma: f64,
    /// Simulation horizon in years.
    pub horizon_years: f64,
    /// Discrete steps per simulated year.
    pub steps_per_year: usize,
    /// Number of independent trajectories.
    pub n_paths: usize,
    /// RNG seed; identical params + seed reproduce results exactly.
    pub seed: u64,
}

impl SimulationParams {
    /// Estimate drift and volatility from a daily price history.
    ///
    /// Log returns are annualized at 252 trading days (sample standard
    /// deviation); the spot is the last observed price.
    pub fn from_price_history(
        prices: &[f64],
        horizon_years: f64,
        steps_per_year: usize,
        n_paths: usize,
        seed: u64,
    ) -> Result<Self> {
        let returns = log_returns(prices)?;
        if returns.len() < 2 {
            return Err(EngineError::insufficient_data(3, prices.len()));
        }
        let spot = *prices.last().expect("checked non-empty");
        if spot <= 0.0 {
            return Err(EngineError::invalid_parameter(format!(
                "spot price must be positive, got {spot}"
            )));
        }

        let stats = DistributionStats::from_values(&returns);
        let mu = stats.mean() * TRADING_DAYS_PER_YEAR;
        let sigma = stats.sample_std_dev() * TRADING_DAYS_PER_YEAR.sqrt();

        log::debug!("estimated mu={mu:.6} sigma={sigma:.6} from {} returns", returns.len());

        let params = Self {
            spot,
            mu,
            sigma,
            horizon_years,
            steps_per_year,
            n_paths,
            seed,
        };
        params.validate()?;
        Ok(params)
    }

    /// Reject malformed parameters before simulation starts.
    pub fn validate(&self) -> Result<()> {
        if !(self.spot.is_finite() && self.spot > 0.0) {
            return Err(EngineError::invalid_parameter(format!(
                "spot price must be positive, got {}",
                self.spot
            )));
        }
        if !self.mu.is_finite() {
            return Err(EngineError::invalid_parameter(format!(
                "drift must be finite, got {}",
                self.mu
            )));
        }
        if !(self.sigma.is_finite() && self.sigma >= 0.0) {
            return Err(EngineError::invalid_parameter(format!(
                "volatility must be non-negative, got {}",
                self.sigma
            )));
        }
        if !(self.horizon_years.is_finite() && self.horizon_years > 0.0) {
            return Err(EngineError::invalid_parameter(format!(
                "horizon must be positive, got {}",
                self.horizon_years
            )));
        }
        if self.steps_per_year == 0 {
            return Err(EngineError::invalid_parameter(
                "steps per year must be positive",
            ));
        }
        if self.n_paths == 0 {
            return Err(EngineError::invalid_parameter(
                "path count must be positive",
            ));
        }
        Ok(())
    }

    /// Total discrete steps over the horizon.
    pub fn step_count(&self) -> Result<usize> {
        let steps = (self.steps_per_year as f64 * self.horizon_years).round() as usize;
        if steps == 0 {
            return Err(EngineError::invalid_parameter(
                "steps_per_year * horizon_years must round to at least one step",
            ));
        }
        Ok(steps)
    }
}

/// Mean, dispersion and 95% tail statistics of one distribution.
///
/// VaR95 is the 5th percentile of the distribution itself (negative in a
/// loss); ES95 is the mean of all observations at or below it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskStats {
    pub mean: f64,
    pub std_dev: f64,
    pub var_95: f64,
    pub es_95: f64,
}

impl RiskStats {
    fn from_distribution(values: &[f64]) -> Self {
        let stats = DistributionStats::from_values(values);
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).expect("validated finite values"));

        let var_95 = percentile(&sorted, 5.0).expect("non-empty ensemble");
        let es_95 = tail_mean(&sorted, var_95).unwrap_or(var_95);

        Self {
            mean: stats.mean(),
            std_dev: stats.population_std_dev(),
            var_95,
            es_95,
        }
    }
}

/// Complete simulation response for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub ticker: String,
    pub spot: f64,
    pub mu: f64,
    pub sigma: f64,
    /// Statistics of terminal simple returns `(S_T - S0) / S0`.
    pub returns: RiskStats,
    /// The same statistics in dollar P&L terms `S_T - S0`.
    pub pnl: RiskStats,
    /// Sampled paths for plotting.
    pub paths: PathEnsemble,
    /// Terminal-return histogram.
    pub histogram: Histogram,
    /// The parameters the run actually used, echoed back.
    pub params: SimulationParams,
}

/// Run a Monte Carlo simulation for one ticker.
pub fn run_simulation(ticker: &str, params: &SimulationParams) -> Result<SimulationResult> {
    let ticker = normalize_ticker(ticker)?;
    params.validate()?;

    log::debug!(
        "simulating {} paths x {} steps for {ticker}",
        params.n_paths,
        params.step_count()?
    );

    let batch = gbm::simulate_paths(params, SAMPLE_PATH_COUNT)?;

    let returns: Vec<f64> = batch
        .terminal_prices
        .iter()
        .map(|t| (t - params.spot) / params.spot)
        .collect();
    let pnl: Vec<f64> = batch
        .terminal_prices
        .iter()
        .map(|t| t - params.spot)
        .collect();

    Ok(SimulationResult {
        ticker,
        spot: params.spot,
        mu: params.mu,
        sigma: params.sigma,
        returns: RiskStats::from_distribution(&returns),
        pnl: RiskStats::from_distribution(&pnl),
        paths: PathEnsemble {
            steps: batch.steps,
            paths: batch.sampled_paths,
        },
        histogram: Histogram::from_values(&returns, HISTOGRAM_BINS),
        params: *params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SimulationParams {
        SimulationParams {
            spot: 100.0,
            mu: 0.08,
            sigma: 0.30,
            horizon_years: 1.0,
            steps_per_year: 252,
            n_paths: 2000,
            seed: 42,
        }
    }

    #[test]
    fn test_validation_rejections() {
        let mut p = params();
        p.sigma = -0.1;
        assert!(p.validate().is_err());

        let mut p = params();
        p.n_paths = 0;
        assert!(p.validate().is_err());

        let mut p = params();
        p.horizon_years = 0.0;
        assert!(p.validate().is_err());

        let mut p = params();
        p.spot = -5.0;
        assert!(p.validate().is_err());

        let mut p = params();
        p.sigma = 0.0;
        assert!(p.validate().is_ok(), "zero volatility is valid");
    }

    #[test]
    fn test_from_price_history() {
        // 1% daily growth, constant: sigma of log returns is 0.
        let prices: Vec<f64> = (0..10).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let p = SimulationParams::from_price_history(&prices, 1.0, 252, 100, 7).unwrap();

        assert!((p.spot - prices[9]).abs() < 1e-9);
        assert!((p.mu - 1.01f64.ln() * 252.0).abs() < 1e-9);
        assert!(p.sigma.abs() < 1e-12);

        assert!(SimulationParams::from_price_history(&[100.0], 1.0, 252, 100, 7).is_err());
    }

    #[test]
    fn test_result_shape_and_echo() {
        let p = params();
        let result = run_simulation("nvda", &p).unwrap();

        assert_eq!(result.ticker, "NVDA");
        assert_eq!(result.params, p);
        assert_eq!(result.paths.paths.len(), SAMPLE_PATH_COUNT);
        assert_eq!(result.histogram.counts.iter().sum::<usize>(), p.n_paths);
    }

    #[test]
    fn test_var_es_ordering() {
        let result = run_simulation("SPY", &params()).unwrap();

        // ES is the mean of the tail at or below VaR.
        assert!(result.returns.es_95 <= result.returns.var_95);
        assert!(result.pnl.es_95 <= result.pnl.var_95);
        // Dollar stats are the return stats scaled by spot.
        assert!((result.pnl.mean - result.returns.mean * 100.0).abs() < 1e-9);
        assert!((result.pnl.var_95 - result.returns.var_95 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_volatility_degenerate_distribution() {
        let mut p = params();
        p.sigma = 0.0;
        p.n_paths = 500;
        let result = run_simulation("BND", &p).unwrap();

        let expected = 0.08f64.exp() - 1.0;
        assert!((result.returns.mean - expected).abs() < 1e-9);
        assert!(result.returns.std_dev.abs() < 1e-12);
        assert!((result.returns.var_95 - expected).abs() < 1e-9);
        assert!((result.returns.es_95 - expected).abs() < 1e-9);
    }

    #[test]
    fn test_reproducibility_bit_identical() {
        let a = run_simulation("AAPL", &params()).unwrap();
        let b = run_simulation("AAPL", &params()).unwrap();

        assert_eq!(a.returns, b.returns);
        assert_eq!(a.pnl, b.pnl);
        assert_eq!(a.histogram, b.histogram);
        assert_eq!(a.paths, b.paths);
    }

    #[test]
    fn test_different_seed_changes_results() {
        let mut p2 = params();
        p2.seed = 43;
        let a = run_simulation("AAPL", &params()).unwrap();
        let b = run_simulation("AAPL", &p2).unwrap();
        assert_ne!(a.returns, b.returns);
    }
}

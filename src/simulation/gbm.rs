//! Geometric Brownian Motion path generation.
//!
//! Paths are independent and generated in parallel; each owns a stream
//! derived from (seed, path index), and results are reduced in path
//! order, so aggregate statistics are bit-identical for a given seed
//! no matter the thread count.

use rayon::prelude::*;

use crate::core::error::{EngineError, Result};
use crate::core::stats::normal_inv_cdf;
use crate::simulation::rng::Xoshiro256;
use crate::simulation::SimulationParams;

/// Output of the path fan-out: every terminal price, plus the first few
/// full paths for plotting.
pub struct PathBatch {
    pub terminal_prices: Vec<f64>,
    pub sampled_paths: Vec<Vec<f64>>,
    pub steps: usize,
}

/// Simulate `n_paths` GBM trajectories and collect terminal prices.
///
/// Each step multiplies the price by `exp((mu - sigma^2/2)dt + sigma
/// sqrt(dt) Z)`. The first `sample_count` paths are recorded in full.
pub fn simulate_paths(params: &SimulationParams, sample_count: usize) -> Result<PathBatch> {
    params.validate()?;
    let steps = params.step_count()?;
    let dt = params.horizon_years / steps as f64;
    let drift = (params.mu - 0.5 * params.sigma * params.sigma) * dt;
    let vol_step = params.sigma * dt.sqrt();
    let recorded = sample_count.min(params.n_paths);

    let results: Vec<(f64, Option<Vec<f64>>)> = (0..params.n_paths)
        .into_par_iter()
        .map(|path_idx| {
            let mut rng = Xoshiro256::for_stream(params.seed, path_idx as u64);
            let mut price = params.spot;
            let mut path = (path_idx < recorded).then(|| {
                let mut p = Vec::with_capacity(steps + 1);
                p.push(price);
                p
            });

            for _ in 0..steps {
                let z = rng.next_normal();
                price *= (drift + vol_step * z).exp();
                if let Some(p) = path.as_mut() {
                    p.push(price);
                }
            }

            (price, path)
        })
        .collect();

    let mut terminal_prices = Vec::with_capacity(params.n_paths);
    let mut sampled_paths = Vec::with_capacity(recorded);
    for (terminal, path) in results {
        terminal_prices.push(terminal);
        if let Some(p) = path {
            sampled_paths.push(p);
        }
    }

    Ok(PathBatch {
        terminal_prices,
        sampled_paths,
        steps,
    })
}

/// Closed-form quantile of the terminal price, `pct` in (0, 100).
///
/// Under GBM the terminal price is log-normal, so the p-th percentile is
/// `exp(ln(S0) + (mu - sigma^2/2)T + sigma sqrt(T) PhiInv(p))`. Serves
/// as an independent sanity check against the simulated percentiles.
pub fn terminal_price_quantile(params: &SimulationParams, pct: f64) -> Result<f64> {
    params.validate()?;
    let z = normal_inv_cdf(pct / 100.0).ok_or_else(|| {
        EngineError::invalid_parameter(format!("percentile must be inside (0, 100), got {pct}"))
    })?;
    let t = params.horizon_years;
    let log_terminal = params.spot.ln()
        + (params.mu - 0.5 * params.sigma * params.sigma) * t
        + params.sigma * t.sqrt() * z;
    Ok(log_terminal.exp())
}

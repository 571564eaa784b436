//! Discounting and terminal value for one WACC regime.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::dcf::assumptions::WaccSchedule;

/// Valuation of the firm under a single discount-rate regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfValuation {
    /// PV of explicit-window FCFF + PV of terminal value.
    pub enterprise_value: f64,
    /// Enterprise value bridged for net debt.
    pub equity_value: f64,
    /// Equity value per share; `None` when shares are unknown or zero.
    pub intrinsic_value_per_share: Option<f64>,
    pub pv_of_explicit_fcff: f64,
    pub pv_of_terminal_value: f64,
    /// Undiscounted Gordon terminal value at the horizon.
    pub terminal_value_at_horizon: f64,
    /// Per-year discount factors, index 0 = year 1.
    pub discount_factors: Vec<f64>,
    /// Projected FCFF per forecast year.
    pub fcff_projection: Vec<f64>,
}

/// Per-year discount factors plus the horizon factor for the terminal
/// value.
///
/// Factors compound year by year through the schedule, so a constant
/// schedule reduces to `(1+r)^-t`. Mid-year discounting credits each
/// flow (and the terminal value) half a period.
fn discount_factors(schedule: &WaccSchedule, years: usize, midyear: bool) -> (Vec<f64>, f64) {
    let mut factors = Vec::with_capacity(years);
    let mut cumulative = 1.0;
    for year in 1..=years {
        let rate = schedule.rate_for_year(year);
        let within_year = if midyear {
            (1.0 + rate).sqrt()
        } else {
            1.0 + rate
        };
        factors.push(cumulative / within_year);
        cumulative /= 1.0 + rate;
    }
    let horizon_factor = if midyear {
        cumulative * (1.0 + schedule.terminal_rate()).sqrt()
    } else {
        cumulative
    };
    (factors, horizon_factor)
}

/// Gordon growth terminal value at the horizon.
///
/// Divergent inputs (growth at or above the rate) are a domain error,
/// never a clamped number.
fn terminal_value(last_fcff: f64, rate: f64, growth: f64) -> Result<f64> {
    if growth >= rate {
        return Err(EngineError::divergent_terminal(rate, growth));
    }
    Ok(last_fcff * (1.0 + growth) / (rate - growth))
}

/// Value the firm from a projected FCFF path under one schedule.
///
/// `cash` and `debt` bridge enterprise value to equity value; shares
/// bridge equity to per-share, and stay `None` when unknown or zero
/// while the firm-level values are still returned.
pub fn value_firm(
    fcff: &[f64],
    schedule: &WaccSchedule,
    terminal_growth: f64,
    midyear: bool,
    cash: f64,
    debt: f64,
    shares_outstanding: Option<f64>,
) -> Result<DcfValuation> {
    let last_fcff = match fcff.last() {
        Some(last) => *last,
        None => {
            return Err(EngineError::invalid_parameter(
                "FCFF projection must cover at least one year",
            ))
        }
    };

    let (factors, horizon_factor) = discount_factors(schedule, fcff.len(), midyear);
    let pv_explicit: f64 = fcff.iter().zip(&factors).map(|(f, df)| f * df).sum();

    let tv = terminal_value(last_fcff, schedule.terminal_rate(), terminal_growth)?;
    let pv_tv = tv * horizon_factor;

    let enterprise_value = pv_explicit + pv_tv;
    let equity_value = enterprise_value + cash - debt;
    let intrinsic_value_per_share = shares_outstanding
        .filter(|s| *s > 0.0)
        .map(|s| equity_value / s);

    Ok(DcfValuation {
        enterprise_value,
        equity_value,
        intrinsic_value_per_share,
        pv_of_explicit_fcff: pv_explicit,
        pv_of_terminal_value: pv_tv,
        terminal_value_at_horizon: tv,
        discount_factors: factors,
        fcff_projection: fcff.to_vec(),
    })
}

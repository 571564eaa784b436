//! Absolute (DCF) valuation.
//!
//! Projects free cash flow to the firm through a growth model, discounts
//! it under one or two WACC regimes, adds a Gordon terminal value and
//! bridges to intrinsic value per share, with a two-way sensitivity grid
//! around the base assumptions.

pub mod assumptions;
pub mod sensitivity;
pub mod valuation;

pub use assumptions::{DcfAssumptions, GrowthModel, WaccSchedule};
pub use sensitivity::{SensitivityGrid, SensitivitySpec};
pub use valuation::{value_firm, DcfValuation};

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::snapshot::{normalize_ticker, FinancialSnapshot};

/// Complete DCF response for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfResult {
    pub ticker: String,
    /// Valuation at the constant base WACC.
    pub constant_wacc: DcfValuation,
    /// Valuation under the per-year WACC path, when one was supplied.
    pub dynamic_wacc: Option<DcfValuation>,
    pub sensitivity: SensitivityGrid,
    /// The assumptions the valuation actually used, echoed back.
    pub assumptions: DcfAssumptions,
}

/// Run a full DCF valuation from a snapshot and assumptions.
///
/// Assumptions are validated before any projection runs; the base-year
/// free cash flow must be known. Cash and debt default to zero in the
/// equity bridge when unknown, while unknown shares outstanding null the
/// per-share value only.
pub fn run_dcf(
    ticker: &str,
    snapshot: &FinancialSnapshot,
    assumptions: &DcfAssumptions,
    spec: &SensitivitySpec,
) -> Result<DcfResult> {
    let ticker = normalize_ticker(ticker)?;
    assumptions.validate()?;
    spec.validate()?;

    let base_fcff = snapshot
        .free_cash_flow
        .filter(|f| f.is_finite())
        .ok_or_else(|| EngineError::missing_data("free_cash_flow"))?;

    let fcff = assumptions.growth.project(base_fcff, assumptions.years)?;

    let cash = snapshot.cash.unwrap_or(0.0);
    let debt = snapshot.total_debt.unwrap_or(0.0);
    let shares = snapshot.shares_outstanding;

    log::debug!(
        "running {}y DCF for {ticker} at base WACC {}",
        assumptions.years,
        assumptions.wacc_base
    );

    let constant_wacc = value_firm(
        &fcff,
        &WaccSchedule::Constant(assumptions.wacc_base),
        assumptions.terminal_growth,
        assumptions.midyear,
        cash,
        debt,
        shares,
    )?;

    let dynamic_wacc = match &assumptions.wacc_path {
        Some(path) => Some(value_firm(
            &fcff,
            &WaccSchedule::PerYear(path.clone()),
            assumptions.terminal_growth,
            assumptions.midyear,
            cash,
            debt,
            shares,
        )?),
        None => None,
    };

    let sensitivity = SensitivityGrid::compute(
        &fcff,
        assumptions.wacc_base,
        assumptions.terminal_growth,
        assumptions.midyear,
        cash,
        debt,
        shares,
        spec,
    )?;

    Ok(DcfResult {
        ticker,
        constant_wacc,
        dynamic_wacc,
        sensitivity,
        assumptions: assumptions.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> FinancialSnapshot {
        FinancialSnapshot {
            free_cash_flow: Some(1000.0),
            cash: Some(500.0),
            total_debt: Some(2000.0),
            shares_outstanding: Some(100.0),
            ..Default::default()
        }
    }

    fn assumptions() -> DcfAssumptions {
        DcfAssumptions::new(0.09, 0.03, 10, GrowthModel::Constant { rate: 0.05 })
    }

    #[test]
    fn test_run_dcf_constant_regime() {
        let result = run_dcf("msft", &snapshot(), &assumptions(), &SensitivitySpec::default())
            .unwrap();

        assert_eq!(result.ticker, "MSFT");
        assert!(result.dynamic_wacc.is_none());
        assert_eq!(result.constant_wacc.fcff_projection.len(), 10);
        assert!((result.constant_wacc.fcff_projection[0] - 1050.0).abs() < 1e-9);
        assert!(result.constant_wacc.enterprise_value > 0.0);
        // Equity bridge: EV + 500 - 2000.
        assert!(
            (result.constant_wacc.equity_value
                - (result.constant_wacc.enterprise_value - 1500.0))
                .abs()
                < 1e-9
        );
        assert!(result.constant_wacc.intrinsic_value_per_share.is_some());
    }

    #[test]
    fn test_run_dcf_dynamic_regime() {
        // Declining path front-loads heavier discounting than its own
        // final rate would.
        let path: Vec<f64> = (0..10).map(|t| 0.11 - 0.002 * t as f64).collect();
        let with_path = assumptions().with_wacc_path(path.clone());
        let result =
            run_dcf("AAPL", &snapshot(), &with_path, &SensitivitySpec::default()).unwrap();

        let dynamic = result.dynamic_wacc.as_ref().unwrap();
        let terminal_only = value_firm(
            &result.constant_wacc.fcff_projection,
            &WaccSchedule::Constant(*path.last().unwrap()),
            0.03,
            false,
            500.0,
            2000.0,
            Some(100.0),
        )
        .unwrap();
        assert!(dynamic.enterprise_value < terminal_only.enterprise_value);
    }

    #[test]
    fn test_missing_fcff_is_missing_data() {
        let empty = FinancialSnapshot::default();
        let result = run_dcf("AAPL", &empty, &assumptions(), &SensitivitySpec::default());
        assert!(matches!(result, Err(EngineError::MissingData { .. })));
    }

    #[test]
    fn test_invalid_assumptions_rejected_before_projection() {
        let mut bad = assumptions();
        bad.terminal_growth = 0.10;
        let result = run_dcf("AAPL", &snapshot(), &bad, &SensitivitySpec::default());
        assert!(matches!(
            result,
            Err(EngineError::DivergentTerminalValue { .. })
        ));
    }

    #[test]
    fn test_unknown_shares_nulls_per_share_only() {
        let mut no_shares = snapshot();
        no_shares.shares_outstanding = None;
        let result =
            run_dcf("AAPL", &no_shares, &assumptions(), &SensitivitySpec::default()).unwrap();

        assert_eq!(result.constant_wacc.intrinsic_value_per_share, None);
        assert!(result.constant_wacc.enterprise_value > 0.0);
        assert!(result
            .sensitivity
            .cells
            .iter()
            .flatten()
            .all(|cell| cell.is_none()));
    }

    #[test]
    fn test_missing_balance_sheet_defaults_to_zero_bridge() {
        let bare = FinancialSnapshot {
            free_cash_flow: Some(1000.0),
            shares_outstanding: Some(100.0),
            ..Default::default()
        };
        let result = run_dcf("AAPL", &bare, &assumptions(), &SensitivitySpec::default()).unwrap();
        assert!(
            (result.constant_wacc.equity_value - result.constant_wacc.enterprise_value).abs()
                < 1e-9
        );
    }

    #[test]
    fn test_assumptions_echoed() {
        let a = assumptions().with_midyear(true);
        let result = run_dcf("AAPL", &snapshot(), &a, &SensitivitySpec::default()).unwrap();
        assert_eq!(result.assumptions, a);
    }
}

//! DCF assumptions: discount-rate schedule and growth-path model.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};

/// Discount-rate regime for the explicit forecast window.
///
/// One discounting routine consumes either variant by indexing the
/// schedule per forecast year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WaccSchedule {
    /// A single rate applied to every forecast year.
    Constant(f64),
    /// One rate per forecast year, index 0 = year 1.
    PerYear(Vec<f64>),
}

impl WaccSchedule {
    /// Rate in effect for 1-based forecast year `year`.
    pub fn rate_for_year(&self, year: usize) -> f64 {
        match self {
            WaccSchedule::Constant(rate) => *rate,
            WaccSchedule::PerYear(rates) => rates[year - 1],
        }
    }

    /// Rate used for the terminal period (the final forecast year's).
    pub fn terminal_rate(&self) -> f64 {
        match self {
            WaccSchedule::Constant(rate) => *rate,
            WaccSchedule::PerYear(rates) => *rates.last().expect("validated non-empty"),
        }
    }

    /// Reject non-positive rates and path/horizon length mismatches.
    pub fn validate(&self, years: usize) -> Result<()> {
        match self {
            WaccSchedule::Constant(rate) => {
                if !rate.is_finite() || *rate <= 0.0 {
                    return Err(EngineError::invalid_parameter(format!(
                        "WACC must be positive, got {rate}"
                    )));
                }
            }
            WaccSchedule::PerYear(rates) => {
                if rates.len() != years {
                    return Err(EngineError::length_mismatch(years, rates.len()));
                }
                if let Some(bad) = rates.iter().find(|r| !r.is_finite() || **r <= 0.0) {
                    return Err(EngineError::invalid_parameter(format!(
                        "WACC path entries must be positive, got {bad}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Default decay factor for the fading growth path.
pub const DEFAULT_GROWTH_DECAY: f64 = 0.8;

/// Free-cash-flow growth-path model for the explicit forecast window.
///
/// Deliberately injectable: swapping the model never touches discounting
/// or terminal-value code. Every variant yields a deterministic per-year
/// rate vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GrowthModel {
    /// Flat growth every forecast year.
    Constant { rate: f64 },
    /// Fading growth: year t of N grows at `initial * factor^(t/N)`.
    Decaying { initial: f64, factor: f64 },
    /// Externally derived per-year growth rates, index 0 = year 1.
    Explicit(Vec<f64>),
}

impl GrowthModel {
    /// Fading growth with the default decay factor.
    pub fn decaying(initial: f64) -> Self {
        GrowthModel::Decaying {
            initial,
            factor: DEFAULT_GROWTH_DECAY,
        }
    }

    /// Per-year growth rates for a horizon of `years`.
    pub fn rates(&self, years: usize) -> Result<Vec<f64>> {
        self.validate(years)?;
        Ok(match self {
            GrowthModel::Constant { rate } => vec![*rate; years],
            GrowthModel::Decaying { initial, factor } => (1..=years)
                .map(|t| initial * factor.powf(t as f64 / years as f64))
                .collect(),
            GrowthModel::Explicit(rates) => rates.clone(),
        })
    }

    /// Compound `base_fcff` through the growth path, producing the
    /// projected free cash flow for each forecast year.
    pub fn project(&self, base_fcff: f64, years: usize) -> Result<Vec<f64>> {
        let rates = self.rates(years)?;
        let mut level = base_fcff;
        Ok(rates
            .into_iter()
            .map(|g| {
                level *= 1.0 + g;
                level
            })
            .collect())
    }

    fn validate(&self, years: usize) -> Result<()> {
        let check = |rate: f64| -> Result<()> {
            if !rate.is_finite() || rate <= -1.0 {
                return Err(EngineError::invalid_parameter(format!(
                    "growth rate must be finite and above -100%, got {rate}"
                )));
            }
            Ok(())
        };
        match self {
            GrowthModel::Constant { rate } => check(*rate)?,
            GrowthModel::Decaying { initial, factor } => {
                check(*initial)?;
                if !factor.is_finite() || *factor <= 0.0 || *factor > 1.0 {
                    return Err(EngineError::invalid_parameter(format!(
                        "decay factor must be in (0, 1], got {factor}"
                    )));
                }
            }
            GrowthModel::Explicit(rates) => {
                if rates.len() != years {
                    return Err(EngineError::length_mismatch(years, rates.len()));
                }
                for &rate in rates {
                    check(rate)?;
                }
            }
        }
        Ok(())
    }
}

/// Assumptions driving one DCF valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfAssumptions {
    /// Base WACC for the constant-rate regime and the sensitivity grid.
    pub wacc_base: f64,
    /// Optional per-year WACC path enabling the dynamic regime.
    pub wacc_path: Option<Vec<f64>>,
    /// Perpetual growth rate for the terminal value.
    pub terminal_growth: f64,
    /// Explicit forecast horizon in years.
    pub years: usize,
    /// Discount cash flows at mid-year rather than year-end.
    pub midyear: bool,
    /// Growth-path model applied to the base-year free cash flow.
    pub growth: GrowthModel,
}

impl DcfAssumptions {
    /// Assumptions with a constant growth path, year-end discounting and
    /// no dynamic regime.
    pub fn new(wacc_base: f64, terminal_growth: f64, years: usize, growth: GrowthModel) -> Self {
        Self {
            wacc_base,
            wacc_path: None,
            terminal_growth,
            years,
            midyear: false,
            growth,
        }
    }

    /// Enable mid-year discounting.
    pub fn with_midyear(mut self, midyear: bool) -> Self {
        self.midyear = midyear;
        self
    }

    /// Attach a per-year WACC path for the dynamic regime.
    pub fn with_wacc_path(mut self, path: Vec<f64>) -> Self {
        self.wacc_path = Some(path);
        self
    }

    /// Reject malformed assumptions before any projection runs.
    ///
    /// Terminal growth at or above the terminal-period WACC makes the
    /// Gordon formula divergent and is reported as a distinct error,
    /// never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.years == 0 {
            return Err(EngineError::invalid_parameter(
                "forecast horizon must be at least one year",
            ));
        }
        if !self.terminal_growth.is_finite() {
            return Err(EngineError::invalid_parameter(format!(
                "terminal growth must be finite, got {}",
                self.terminal_growth
            )));
        }

        let constant = WaccSchedule::Constant(self.wacc_base);
        constant.validate(self.years)?;
        self.check_terminal(&constant)?;

        if let Some(path) = &self.wacc_path {
            let dynamic = WaccSchedule::PerYear(path.clone());
            dynamic.validate(self.years)?;
            self.check_terminal(&dynamic)?;
        }

        self.growth.validate(self.years)
    }

    fn check_terminal(&self, schedule: &WaccSchedule) -> Result<()> {
        let rate = schedule.terminal_rate();
        if self.terminal_growth >= rate {
            return Err(EngineError::divergent_terminal(rate, self.terminal_growth));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EngineError;

    fn base_assumptions() -> DcfAssumptions {
        DcfAssumptions::new(0.09, 0.03, 10, GrowthModel::Constant { rate: 0.05 })
    }

    #[test]
    fn test_schedule_indexing() {
        let constant = WaccSchedule::Constant(0.08);
        assert_eq!(constant.rate_for_year(1), 0.08);
        assert_eq!(constant.rate_for_year(7), 0.08);
        assert_eq!(constant.terminal_rate(), 0.08);

        let path = WaccSchedule::PerYear(vec![0.10, 0.09, 0.08]);
        assert_eq!(path.rate_for_year(1), 0.10);
        assert_eq!(path.rate_for_year(3), 0.08);
        assert_eq!(path.terminal_rate(), 0.08);
    }

    #[test]
    fn test_schedule_validation() {
        assert!(WaccSchedule::Constant(0.0).validate(5).is_err());
        assert!(WaccSchedule::Constant(-0.05).validate(5).is_err());
        assert!(WaccSchedule::PerYear(vec![0.08; 4]).validate(5).is_err());
        assert!(WaccSchedule::PerYear(vec![0.08, 0.0]).validate(2).is_err());
        assert!(WaccSchedule::PerYear(vec![0.08, 0.07]).validate(2).is_ok());
    }

    #[test]
    fn test_constant_growth_projection() {
        let model = GrowthModel::Constant { rate: 0.05 };
        let fcff = model.project(1000.0, 3).unwrap();

        assert!((fcff[0] - 1050.0).abs() < 1e-9);
        assert!((fcff[1] - 1102.5).abs() < 1e-9);
        assert!((fcff[2] - 1157.625).abs() < 1e-9);
    }

    #[test]
    fn test_decaying_growth_is_monotone_fading() {
        let model = GrowthModel::decaying(0.10);
        let rates = model.rates(10).unwrap();

        for pair in rates.windows(2) {
            assert!(pair[1] < pair[0], "decay path must fade monotonically");
        }
        // Final-year rate is initial * factor.
        assert!((rates[9] - 0.10 * DEFAULT_GROWTH_DECAY).abs() < 1e-12);
        // Positive growth keeps the projection monotone increasing.
        let fcff = model.project(1000.0, 10).unwrap();
        for pair in fcff.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_explicit_growth_length_checked() {
        let model = GrowthModel::Explicit(vec![0.05, 0.04]);
        assert!(model.project(1000.0, 3).is_err());
        assert!(model.project(1000.0, 2).is_ok());
    }

    #[test]
    fn test_growth_rate_bounds() {
        assert!(GrowthModel::Constant { rate: -1.0 }.project(1000.0, 2).is_err());
        assert!(GrowthModel::Constant { rate: -0.5 }.project(1000.0, 2).is_ok());
        assert!(GrowthModel::Decaying {
            initial: 0.1,
            factor: 1.5
        }
        .rates(5)
        .is_err());
    }

    #[test]
    fn test_assumption_validation() {
        assert!(base_assumptions().validate().is_ok());

        let mut bad = base_assumptions();
        bad.years = 0;
        assert!(bad.validate().is_err());

        let mut bad = base_assumptions();
        bad.wacc_base = -0.01;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_divergent_terminal_rejected() {
        let mut assumptions = base_assumptions();
        assumptions.terminal_growth = 0.09;
        match assumptions.validate() {
            Err(EngineError::DivergentTerminalValue { wacc, growth }) => {
                assert_eq!(wacc, 0.09);
                assert_eq!(growth, 0.09);
            }
            other => panic!("expected divergence error, got {other:?}"),
        }

        assumptions.terminal_growth = 0.10;
        assert!(assumptions.validate().is_err());
    }

    #[test]
    fn test_divergent_dynamic_terminal_rejected() {
        // Base WACC clears the terminal growth but the path's final year
        // does not.
        let assumptions = base_assumptions().with_wacc_path(vec![
            0.10, 0.09, 0.08, 0.07, 0.06, 0.05, 0.04, 0.035, 0.032, 0.03,
        ]);
        assert!(matches!(
            assumptions.validate(),
            Err(EngineError::DivergentTerminalValue { .. })
        ));
    }
}

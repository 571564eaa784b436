//! Two-way sensitivity of intrinsic value to WACC and terminal growth.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::dcf::assumptions::WaccSchedule;
use crate::dcf::valuation::value_firm;

/// Shape of the sensitivity grid, declared before computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySpec {
    /// Grid side length; odd so the base case sits at the center.
    pub size: usize,
    /// Spacing between adjacent WACC columns.
    pub wacc_step: f64,
    /// Spacing between adjacent terminal-growth rows.
    pub growth_step: f64,
}

impl Default for SensitivitySpec {
    fn default() -> Self {
        Self {
            size: 3,
            wacc_step: 0.0075,
            growth_step: 0.005,
        }
    }
}

impl SensitivitySpec {
    /// Reject even or degenerate grids and non-positive steps.
    pub fn validate(&self) -> Result<()> {
        if self.size < 3 || self.size % 2 == 0 {
            return Err(EngineError::invalid_parameter(format!(
                "sensitivity grid size must be odd and at least 3, got {}",
                self.size
            )));
        }
        if !(self.wacc_step.is_finite() && self.wacc_step > 0.0)
            || !(self.growth_step.is_finite() && self.growth_step > 0.0)
        {
            return Err(EngineError::invalid_parameter(
                "sensitivity steps must be positive",
            ));
        }
        Ok(())
    }

    /// Symmetric offsets centered on zero, e.g. [-step, 0, +step].
    fn offsets(&self, step: f64) -> Vec<f64> {
        let half = (self.size / 2) as i64;
        (-half..=half).map(|i| i as f64 * step).collect()
    }
}

/// Intrinsic-value-per-share sensitivity grid.
///
/// Rows span terminal growth, columns span WACC; axis labels are the
/// absolute rates at each offset. A cell is `None` when its perturbed
/// assumptions are divergent or per-share value is undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    /// Absolute WACC per column.
    pub wacc_axis: Vec<f64>,
    /// Absolute terminal growth per row.
    pub growth_axis: Vec<f64>,
    /// `cells[row][col]` = per-share value at (growth row, WACC column).
    pub cells: Vec<Vec<Option<f64>>>,
}

impl SensitivityGrid {
    /// Fill the grid by re-invoking the same valuation routine once per
    /// cell with perturbed constant-WACC assumptions.
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        fcff: &[f64],
        wacc_base: f64,
        terminal_growth: f64,
        midyear: bool,
        cash: f64,
        debt: f64,
        shares_outstanding: Option<f64>,
        spec: &SensitivitySpec,
    ) -> Result<Self> {
        spec.validate()?;

        let wacc_axis: Vec<f64> = spec
            .offsets(spec.wacc_step)
            .iter()
            .map(|dw| wacc_base + dw)
            .collect();
        let growth_axis: Vec<f64> = spec
            .offsets(spec.growth_step)
            .iter()
            .map(|dg| terminal_growth + dg)
            .collect();

        let cells = growth_axis
            .iter()
            .map(|&growth| {
                wacc_axis
                    .iter()
                    .map(|&wacc| {
                        if wacc <= 0.0 {
                            return None;
                        }
                        value_firm(
                            fcff,
                            &WaccSchedule::Constant(wacc),
                            growth,
                            midyear,
                            cash,
                            debt,
                            shares_outstanding,
                        )
                        .ok()
                        .and_then(|v| v.intrinsic_value_per_share)
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            wacc_axis,
            growth_axis,
            cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(wacc: f64, growth: f64, spec: &SensitivitySpec) -> SensitivityGrid {
        let fcff: Vec<f64> = (1..=10).map(|t| 1000.0 * 1.05f64.powi(t)).collect();
        SensitivityGrid::compute(&fcff, wacc, growth, false, 0.0, 0.0, Some(1000.0), spec)
            .unwrap()
    }

    #[test]
    fn test_grid_shape_and_axes() {
        let g = grid(0.09, 0.03, &SensitivitySpec::default());

        assert_eq!(g.cells.len(), 3);
        assert!(g.cells.iter().all(|row| row.len() == 3));
        assert!((g.wacc_axis[0] - 0.0825).abs() < 1e-12);
        assert!((g.wacc_axis[1] - 0.09).abs() < 1e-12);
        assert!((g.wacc_axis[2] - 0.0975).abs() < 1e-12);
        assert!((g.growth_axis[0] - 0.025).abs() < 1e-12);
        assert!((g.growth_axis[2] - 0.035).abs() < 1e-12);
    }

    #[test]
    fn test_grid_monotonic_along_both_axes() {
        let g = grid(0.09, 0.03, &SensitivitySpec::default());

        // Across a row, higher WACC strictly lowers value.
        for row in &g.cells {
            for pair in row.windows(2) {
                assert!(pair[1].unwrap() < pair[0].unwrap());
            }
        }
        // Down a column, higher terminal growth strictly raises value.
        for col in 0..3 {
            for row in 0..2 {
                assert!(g.cells[row + 1][col].unwrap() > g.cells[row][col].unwrap());
            }
        }
    }

    #[test]
    fn test_center_cell_is_base_case() {
        let g = grid(0.09, 0.03, &SensitivitySpec::default());
        let fcff: Vec<f64> = (1..=10).map(|t| 1000.0 * 1.05f64.powi(t)).collect();
        let base = value_firm(
            &fcff,
            &WaccSchedule::Constant(0.09),
            0.03,
            false,
            0.0,
            0.0,
            Some(1000.0),
        )
        .unwrap();

        assert!(
            (g.cells[1][1].unwrap() - base.intrinsic_value_per_share.unwrap()).abs() < 1e-12
        );
    }

    #[test]
    fn test_divergent_cell_is_none_not_clamped() {
        // Base 5.5% WACC / 5.0% growth is valid, but the (+growth, -WACC)
        // corner crosses the divergence boundary.
        let g = grid(0.055, 0.05, &SensitivitySpec::default());

        assert_eq!(g.cells[2][0], None, "tg=5.5% vs wacc=4.75% diverges");
        assert_eq!(g.cells[1][0], None, "tg=5.0% vs wacc=4.75% diverges");
        assert!(g.cells[0][0].is_some(), "tg=4.5% vs wacc=4.75% converges");
        assert!(g.cells[1][1].is_some(), "base case stays valid");
    }

    #[test]
    fn test_five_by_five() {
        let spec = SensitivitySpec {
            size: 5,
            ..Default::default()
        };
        let g = grid(0.09, 0.03, &spec);
        assert_eq!(g.cells.len(), 5);
        assert_eq!(g.wacc_axis.len(), 5);
        assert!((g.wacc_axis[0] - (0.09 - 2.0 * 0.0075)).abs() < 1e-12);
    }

    #[test]
    fn test_spec_validation() {
        assert!(SensitivitySpec {
            size: 4,
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(SensitivitySpec {
            size: 1,
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(SensitivitySpec {
            wacc_step: 0.0,
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(SensitivitySpec::default().validate().is_ok());
    }
}

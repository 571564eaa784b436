// Suppress warning from PyO3 macro expansion (fixed in newer PyO3 versions)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

//! QuantVal - stateless equity valuation and risk analytics engine.
//!
//! This crate provides the computational core of a stock-analysis
//! service:
//! - Relative valuation multiples from a financial snapshot
//! - DCF intrinsic value with constant/dynamic WACC regimes and a
//!   two-way sensitivity grid
//! - Monte Carlo GBM price simulation with VaR/ES tail statistics
//! - News-sentiment ratio aggregation
//!
//! All four components are pure functions from validated inputs to
//! results: no I/O, no shared state, and explicit seeds for anything
//! random, so callers may cache and parallelize freely.

pub mod core;
pub mod dcf;
pub mod multiples;
pub mod sentiment;
pub mod simulation;

#[cfg(feature = "python")]
pub mod python;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module entry point
#[cfg(feature = "python")]
#[pymodule]
fn _quantval(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    // Register input classes
    m.add_class::<python::bindings::PyFinancialSnapshot>()?;
    m.add_class::<python::bindings::PyDcfAssumptions>()?;
    m.add_class::<python::bindings::PyNewsItem>()?;

    // Register result classes
    m.add_class::<python::bindings::PyMultiplesResult>()?;
    m.add_class::<python::bindings::PyDcfValuation>()?;
    m.add_class::<python::bindings::PyDcfResult>()?;
    m.add_class::<python::bindings::PyRiskStats>()?;
    m.add_class::<python::bindings::PySimulationResult>()?;
    m.add_class::<python::bindings::PySentimentSummary>()?;

    // Register analysis functions
    m.add_function(wrap_pyfunction!(python::bindings::calculate_multiples, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::run_dcf, m)?)?;
    m.add_function(wrap_pyfunction!(python::bindings::run_monte_carlo, m)?)?;
    m.add_function(wrap_pyfunction!(
        python::bindings::run_monte_carlo_from_history,
        m
    )?)?;
    m.add_function(wrap_pyfunction!(
        python::bindings::terminal_price_quantile,
        m
    )?)?;
    m.add_function(wrap_pyfunction!(python::bindings::summarize_sentiment, m)?)?;
    m.add_function(wrap_pyfunction!(
        python::bindings::sentiment_daily_breakdown,
        m
    )?)?;

    Ok(())
}

//! PyO3 function bindings for the valuation engine.

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use chrono::NaiveDate;

use crate::core::snapshot::FinancialSnapshot;
use crate::dcf::{self, DcfAssumptions, DcfValuation, GrowthModel, SensitivitySpec};
use crate::multiples;
use crate::sentiment::{self, NewsItem, SentimentLabel, SentimentSummary};
use crate::simulation::{self, SimulationParams, SimulationResult};

use super::numpy_bridge::*;

fn parse_date(date: &str) -> PyResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| PyValueError::new_err(format!("invalid date {date:?}, expected YYYY-MM-DD")))
}

// ============================================================================
// Input Classes
// ============================================================================

/// Python-exposed financial snapshot. Unknown fields stay None.
#[pyclass]
#[derive(Debug, Clone, Default)]
pub struct PyFinancialSnapshot {
    #[pyo3(get, set)]
    pub price: Option<f64>,
    #[pyo3(get, set)]
    pub shares_outstanding: Option<f64>,
    #[pyo3(get, set)]
    pub revenue: Option<f64>,
    #[pyo3(get, set)]
    pub ebit: Option<f64>,
    #[pyo3(get, set)]
    pub ebitda: Option<f64>,
    #[pyo3(get, set)]
    pub net_income: Option<f64>,
    #[pyo3(get, set)]
    pub book_value: Option<f64>,
    #[pyo3(get, set)]
    pub total_debt: Option<f64>,
    #[pyo3(get, set)]
    pub cash: Option<f64>,
    #[pyo3(get, set)]
    pub invested_capital: Option<f64>,
    #[pyo3(get, set)]
    pub free_cash_flow: Option<f64>,
    #[pyo3(get, set)]
    pub operating_cash_flow: Option<f64>,
    #[pyo3(get, set)]
    pub employee_count: Option<f64>,
}

#[pymethods]
impl PyFinancialSnapshot {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    fn __repr__(&self) -> String {
        format!(
            "FinancialSnapshot(price={:?}, shares_outstanding={:?}, free_cash_flow={:?})",
            self.price, self.shares_outstanding, self.free_cash_flow
        )
    }
}

impl From<&PyFinancialSnapshot> for FinancialSnapshot {
    fn from(py_snapshot: &PyFinancialSnapshot) -> Self {
        FinancialSnapshot {
            price: py_snapshot.price,
            shares_outstanding: py_snapshot.shares_outstanding,
            revenue: py_snapshot.revenue,
            ebit: py_snapshot.ebit,
            ebitda: py_snapshot.ebitda,
            net_income: py_snapshot.net_income,
            book_value: py_snapshot.book_value,
            total_debt: py_snapshot.total_debt,
            cash: py_snapshot.cash,
            invested_capital: py_snapshot.invested_capital,
            free_cash_flow: py_snapshot.free_cash_flow,
            operating_cash_flow: py_snapshot.operating_cash_flow,
            employee_count: py_snapshot.employee_count,
        }
    }
}

/// Python-exposed DCF assumptions.
#[pyclass]
#[derive(Debug, Clone)]
pub struct PyDcfAssumptions {
    #[pyo3(get, set)]
    pub wacc_base: f64,
    #[pyo3(get, set)]
    pub terminal_growth: f64,
    #[pyo3(get, set)]
    pub years: usize,
    #[pyo3(get, set)]
    pub midyear: bool,
    growth: GrowthModel,
    wacc_path: Option<Vec<f64>>,
}

#[pymethods]
impl PyDcfAssumptions {
    #[new]
    #[pyo3(signature = (wacc_base, terminal_growth, years=10, midyear=true))]
    fn new(wacc_base: f64, terminal_growth: f64, years: usize, midyear: bool) -> Self {
        Self {
            wacc_base,
            terminal_growth,
            years,
            midyear,
            growth: GrowthModel::decaying(0.06),
            wacc_path: None,
        }
    }

    /// Grow FCFF at a flat rate every forecast year.
    fn set_constant_growth(&mut self, rate: f64) {
        self.growth = GrowthModel::Constant { rate };
    }

    /// Fade FCFF growth from `initial` by `factor` over the horizon.
    fn set_decaying_growth(&mut self, initial: f64, factor: f64) {
        self.growth = GrowthModel::Decaying { initial, factor };
    }

    /// Supply an externally derived per-year growth path.
    fn set_explicit_growth(&mut self, rates: Vec<f64>) {
        self.growth = GrowthModel::Explicit(rates);
    }

    /// Enable the dynamic regime with a per-year WACC path.
    fn set_wacc_path(&mut self, path: Vec<f64>) {
        self.wacc_path = Some(path);
    }

    fn __repr__(&self) -> String {
        format!(
            "DcfAssumptions(wacc_base={}, terminal_growth={}, years={})",
            self.wacc_base, self.terminal_growth, self.years
        )
    }
}

impl From<&PyDcfAssumptions> for DcfAssumptions {
    fn from(py_assumptions: &PyDcfAssumptions) -> Self {
        DcfAssumptions {
            wacc_base: py_assumptions.wacc_base,
            wacc_path: py_assumptions.wacc_path.clone(),
            terminal_growth: py_assumptions.terminal_growth,
            years: py_assumptions.years,
            midyear: py_assumptions.midyear,
            growth: py_assumptions.growth.clone(),
        }
    }
}

/// Python-exposed classified headline.
#[pyclass]
#[derive(Debug, Clone)]
pub struct PyNewsItem {
    #[pyo3(get, set)]
    pub headline: String,
    #[pyo3(get, set)]
    pub url: Option<String>,
    #[pyo3(get, set)]
    pub timestamp: i64,
    #[pyo3(get, set)]
    pub label: String,
    #[pyo3(get, set)]
    pub confidence: f64,
}

#[pymethods]
impl PyNewsItem {
    #[new]
    #[pyo3(signature = (headline, timestamp, label, confidence, url=None))]
    fn new(
        headline: String,
        timestamp: i64,
        label: String,
        confidence: f64,
        url: Option<String>,
    ) -> Self {
        Self {
            headline,
            url,
            timestamp,
            label,
            confidence,
        }
    }
}

impl TryFrom<&PyNewsItem> for NewsItem {
    type Error = PyErr;

    fn try_from(py_item: &PyNewsItem) -> PyResult<NewsItem> {
        let label: SentimentLabel = py_item.label.parse()?;
        Ok(NewsItem {
            headline: py_item.headline.clone(),
            url: py_item.url.clone(),
            timestamp: py_item.timestamp,
            label,
            confidence: py_item.confidence,
        })
    }
}

// ============================================================================
// Result Classes
// ============================================================================

/// Python-exposed valuation multiples. Unresolved ratios are None.
#[pyclass]
#[derive(Debug, Clone)]
pub struct PyMultiplesResult {
    #[pyo3(get)]
    pub ticker: String,
    #[pyo3(get)]
    pub price_to_earnings: Option<f64>,
    #[pyo3(get)]
    pub ev_to_ebitda: Option<f64>,
    #[pyo3(get)]
    pub ev_to_ebit: Option<f64>,
    #[pyo3(get)]
    pub price_to_book: Option<f64>,
    #[pyo3(get)]
    pub debt_to_equity: Option<f64>,
    #[pyo3(get)]
    pub ev_to_invested_capital: Option<f64>,
    #[pyo3(get)]
    pub ev_to_fcf: Option<f64>,
    #[pyo3(get)]
    pub price_to_cash_flow: Option<f64>,
    #[pyo3(get)]
    pub ev_to_sales: Option<f64>,
    #[pyo3(get)]
    pub ev_to_revenue_per_employee: Option<f64>,
}

impl From<multiples::MultiplesResult> for PyMultiplesResult {
    fn from(result: multiples::MultiplesResult) -> Self {
        Self {
            ticker: result.ticker,
            price_to_earnings: result.price_to_earnings,
            ev_to_ebitda: result.ev_to_ebitda,
            ev_to_ebit: result.ev_to_ebit,
            price_to_book: result.price_to_book,
            debt_to_equity: result.debt_to_equity,
            ev_to_invested_capital: result.ev_to_invested_capital,
            ev_to_fcf: result.ev_to_fcf,
            price_to_cash_flow: result.price_to_cash_flow,
            ev_to_sales: result.ev_to_sales,
            ev_to_revenue_per_employee: result.ev_to_revenue_per_employee,
        }
    }
}

/// Python-exposed single-regime DCF valuation.
#[pyclass]
#[derive(Debug, Clone)]
pub struct PyDcfValuation {
    #[pyo3(get)]
    pub enterprise_value: f64,
    #[pyo3(get)]
    pub equity_value: f64,
    #[pyo3(get)]
    pub intrinsic_value_per_share: Option<f64>,
    #[pyo3(get)]
    pub pv_of_explicit_fcff: f64,
    #[pyo3(get)]
    pub pv_of_terminal_value: f64,
    #[pyo3(get)]
    pub terminal_value_at_horizon: f64,
    #[pyo3(get)]
    pub discount_factors: Vec<f64>,
    #[pyo3(get)]
    pub fcff_projection: Vec<f64>,
}

impl From<DcfValuation> for PyDcfValuation {
    fn from(valuation: DcfValuation) -> Self {
        Self {
            enterprise_value: valuation.enterprise_value,
            equity_value: valuation.equity_value,
            intrinsic_value_per_share: valuation.intrinsic_value_per_share,
            pv_of_explicit_fcff: valuation.pv_of_explicit_fcff,
            pv_of_terminal_value: valuation.pv_of_terminal_value,
            terminal_value_at_horizon: valuation.terminal_value_at_horizon,
            discount_factors: valuation.discount_factors,
            fcff_projection: valuation.fcff_projection,
        }
    }
}

/// Python-exposed full DCF response.
#[pyclass]
#[derive(Debug, Clone)]
pub struct PyDcfResult {
    #[pyo3(get)]
    pub ticker: String,
    #[pyo3(get)]
    pub constant_wacc: PyDcfValuation,
    #[pyo3(get)]
    pub dynamic_wacc: Option<PyDcfValuation>,
    #[pyo3(get)]
    pub sensitivity_cells: Vec<Vec<Option<f64>>>,
    #[pyo3(get)]
    pub sensitivity_wacc_axis: Vec<f64>,
    #[pyo3(get)]
    pub sensitivity_growth_axis: Vec<f64>,
    #[pyo3(get)]
    pub wacc_base: f64,
    #[pyo3(get)]
    pub terminal_growth: f64,
    #[pyo3(get)]
    pub years: usize,
    #[pyo3(get)]
    pub midyear: bool,
}

impl From<dcf::DcfResult> for PyDcfResult {
    fn from(result: dcf::DcfResult) -> Self {
        Self {
            ticker: result.ticker,
            constant_wacc: result.constant_wacc.into(),
            dynamic_wacc: result.dynamic_wacc.map(Into::into),
            sensitivity_cells: result.sensitivity.cells,
            sensitivity_wacc_axis: result.sensitivity.wacc_axis,
            sensitivity_growth_axis: result.sensitivity.growth_axis,
            wacc_base: result.assumptions.wacc_base,
            terminal_growth: result.assumptions.terminal_growth,
            years: result.assumptions.years,
            midyear: result.assumptions.midyear,
        }
    }
}

/// Python-exposed distribution statistics.
#[pyclass]
#[derive(Debug, Clone)]
pub struct PyRiskStats {
    #[pyo3(get)]
    pub mean: f64,
    #[pyo3(get)]
    pub std_dev: f64,
    #[pyo3(get)]
    pub var_95: f64,
    #[pyo3(get)]
    pub es_95: f64,
}

impl From<simulation::RiskStats> for PyRiskStats {
    fn from(stats: simulation::RiskStats) -> Self {
        Self {
            mean: stats.mean,
            std_dev: stats.std_dev,
            var_95: stats.var_95,
            es_95: stats.es_95,
        }
    }
}

/// Python-exposed Monte Carlo result.
#[pyclass]
#[derive(Debug, Clone)]
pub struct PySimulationResult {
    #[pyo3(get)]
    pub ticker: String,
    #[pyo3(get)]
    pub spot: f64,
    #[pyo3(get)]
    pub mu: f64,
    #[pyo3(get)]
    pub sigma: f64,
    #[pyo3(get)]
    pub returns: PyRiskStats,
    #[pyo3(get)]
    pub pnl: PyRiskStats,
    #[pyo3(get)]
    pub horizon_years: f64,
    #[pyo3(get)]
    pub steps_per_year: usize,
    #[pyo3(get)]
    pub n_paths: usize,
    #[pyo3(get)]
    pub seed: u64,
    sample_paths: Vec<Vec<f64>>,
    histogram_edges: Vec<f64>,
    histogram_counts: Vec<usize>,
}

#[pymethods]
impl PySimulationResult {
    /// Number of sampled plot paths.
    fn sample_path_count(&self) -> usize {
        self.sample_paths.len()
    }

    /// One sampled price path as a numpy array.
    fn sample_path<'py>(&self, py: Python<'py>, index: usize) -> PyResult<&'py PyArray1<f64>> {
        let path = self
            .sample_paths
            .get(index)
            .ok_or_else(|| PyValueError::new_err(format!("path index {index} out of range")))?;
        Ok(vec_to_numpy_f64(py, path.clone()))
    }

    /// Terminal-return histogram bin edges as a numpy array.
    fn histogram_edges<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        vec_to_numpy_f64(py, self.histogram_edges.clone())
    }

    /// Terminal-return histogram counts.
    fn histogram_counts(&self) -> Vec<usize> {
        self.histogram_counts.clone()
    }
}

impl From<SimulationResult> for PySimulationResult {
    fn from(result: SimulationResult) -> Self {
        Self {
            ticker: result.ticker,
            spot: result.spot,
            mu: result.mu,
            sigma: result.sigma,
            returns: result.returns.into(),
            pnl: result.pnl.into(),
            horizon_years: result.params.horizon_years,
            steps_per_year: result.params.steps_per_year,
            n_paths: result.params.n_paths,
            seed: result.params.seed,
            sample_paths: result.paths.paths,
            histogram_edges: result.histogram.bin_edges,
            histogram_counts: result.histogram.counts,
        }
    }
}

/// Python-exposed sentiment summary. Ratios are None when no articles.
#[pyclass]
#[derive(Debug, Clone)]
pub struct PySentimentSummary {
    #[pyo3(get)]
    pub ticker: String,
    #[pyo3(get)]
    pub date: String,
    #[pyo3(get)]
    pub total_articles: usize,
    #[pyo3(get)]
    pub positive_ratio: Option<f64>,
    #[pyo3(get)]
    pub neutral_ratio: Option<f64>,
    #[pyo3(get)]
    pub negative_ratio: Option<f64>,
}

impl From<SentimentSummary> for PySentimentSummary {
    fn from(summary: SentimentSummary) -> Self {
        Self {
            ticker: summary.ticker,
            date: summary.date.to_string(),
            total_articles: summary.total_articles,
            positive_ratio: summary.ratios.map(|r| r.positive),
            neutral_ratio: summary.ratios.map(|r| r.neutral),
            negative_ratio: summary.ratios.map(|r| r.negative),
        }
    }
}

// ============================================================================
// Analysis Functions
// ============================================================================

/// Calculate the ten valuation multiples for a ticker's snapshot.
#[pyfunction]
pub fn calculate_multiples(
    ticker: &str,
    snapshot: PyFinancialSnapshot,
) -> PyResult<PyMultiplesResult> {
    let result = multiples::calculate_multiples(ticker, &(&snapshot).into())?;
    Ok(result.into())
}

/// Run a DCF valuation with a sensitivity grid.
#[pyfunction]
#[pyo3(signature = (ticker, snapshot, assumptions, grid_size=3, wacc_step=0.0075, growth_step=0.005))]
pub fn run_dcf(
    ticker: &str,
    snapshot: PyFinancialSnapshot,
    assumptions: PyDcfAssumptions,
    grid_size: usize,
    wacc_step: f64,
    growth_step: f64,
) -> PyResult<PyDcfResult> {
    let spec = SensitivitySpec {
        size: grid_size,
        wacc_step,
        growth_step,
    };
    let result = dcf::run_dcf(ticker, &(&snapshot).into(), &(&assumptions).into(), &spec)?;
    Ok(result.into())
}

/// Run a Monte Carlo simulation from explicit GBM parameters.
#[pyfunction]
#[pyo3(signature = (ticker, spot, mu, sigma, horizon_years=1.0, steps_per_year=252, n_paths=1000, seed=42))]
#[allow(clippy::too_many_arguments)]
pub fn run_monte_carlo(
    ticker: &str,
    spot: f64,
    mu: f64,
    sigma: f64,
    horizon_years: f64,
    steps_per_year: usize,
    n_paths: usize,
    seed: u64,
) -> PyResult<PySimulationResult> {
    let params = SimulationParams {
        spot,
        mu,
        sigma,
        horizon_years,
        steps_per_year,
        n_paths,
        seed,
    };
    let result = simulation::run_simulation(ticker, &params)?;
    Ok(result.into())
}

/// Run a Monte Carlo simulation, estimating drift and volatility from a
/// daily price history.
#[pyfunction]
#[pyo3(signature = (ticker, prices, horizon_years=1.0, steps_per_year=252, n_paths=1000, seed=42))]
pub fn run_monte_carlo_from_history(
    ticker: &str,
    prices: PyReadonlyArray1<f64>,
    horizon_years: f64,
    steps_per_year: usize,
    n_paths: usize,
    seed: u64,
) -> PyResult<PySimulationResult> {
    let prices = numpy_to_vec_f64(prices)?;
    let params = SimulationParams::from_price_history(
        &prices,
        horizon_years,
        steps_per_year,
        n_paths,
        seed,
    )?;
    let result = simulation::run_simulation(ticker, &params)?;
    Ok(result.into())
}

/// Closed-form log-normal quantile of the terminal price.
#[pyfunction]
#[pyo3(signature = (spot, mu, sigma, horizon_years, pct))]
pub fn terminal_price_quantile(
    spot: f64,
    mu: f64,
    sigma: f64,
    horizon_years: f64,
    pct: f64,
) -> PyResult<f64> {
    let params = SimulationParams {
        spot,
        mu,
        sigma,
        horizon_years,
        steps_per_year: 252,
        n_paths: 1,
        seed: 0,
    };
    Ok(simulation::terminal_price_quantile(&params, pct)?)
}

/// Summarize one day's classified headlines.
#[pyfunction]
pub fn summarize_sentiment(
    ticker: &str,
    date: &str,
    items: Vec<PyNewsItem>,
) -> PyResult<PySentimentSummary> {
    let date = parse_date(date)?;
    let items: Vec<NewsItem> = items
        .iter()
        .map(NewsItem::try_from)
        .collect::<PyResult<_>>()?;
    let summary = sentiment::summarize(ticker, date, &items)?;
    Ok(summary.into())
}

/// One sentiment summary per calendar day with coverage.
#[pyfunction]
pub fn sentiment_daily_breakdown(
    ticker: &str,
    items: Vec<PyNewsItem>,
) -> PyResult<Vec<PySentimentSummary>> {
    let items: Vec<NewsItem> = items
        .iter()
        .map(NewsItem::try_from)
        .collect::<PyResult<_>>()?;
    let summaries = sentiment::daily_breakdown(ticker, &items)?;
    Ok(summaries.into_iter().map(Into::into).collect())
}

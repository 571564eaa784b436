//! Relative valuation multiples.
//!
//! Ten ratios derived from a single [`FinancialSnapshot`]. Each ratio is
//! resolved independently: a missing or non-positive denominator nulls
//! that ratio alone and never cascades into its siblings.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::snapshot::{normalize_ticker, FinancialSnapshot};

/// Valuation multiples for one ticker.
///
/// A `None` ratio means a required input was unknown or the denominator
/// was non-positive; it is never coerced to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplesResult {
    pub ticker: String,
    pub price_to_earnings: Option<f64>,
    pub ev_to_ebitda: Option<f64>,
    pub ev_to_ebit: Option<f64>,
    pub price_to_book: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub ev_to_invested_capital: Option<f64>,
    pub ev_to_fcf: Option<f64>,
    pub price_to_cash_flow: Option<f64>,
    pub ev_to_sales: Option<f64>,
    pub ev_to_revenue_per_employee: Option<f64>,
}

impl MultiplesResult {
    /// Number of ratios that resolved to a value.
    pub fn resolved_count(&self) -> usize {
        [
            self.price_to_earnings,
            self.ev_to_ebitda,
            self.ev_to_ebit,
            self.price_to_book,
            self.debt_to_equity,
            self.ev_to_invested_capital,
            self.ev_to_fcf,
            self.price_to_cash_flow,
            self.ev_to_sales,
            self.ev_to_revenue_per_employee,
        ]
        .iter()
        .filter(|r| r.is_some())
        .count()
    }
}

/// Divide with the engine's null policy: the denominator must be known,
/// positive and produce a finite quotient.
fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let n = numerator?;
    let d = denominator.filter(|d| *d > 0.0)?;
    let value = n / d;
    value.is_finite().then_some(value)
}

/// Calculate the ten valuation multiples for a snapshot.
///
/// Total for well-typed input: apart from ticker validation this never
/// fails, it only nulls individual ratios.
pub fn calculate_multiples(
    ticker: &str,
    snapshot: &FinancialSnapshot,
) -> Result<MultiplesResult> {
    let ticker = normalize_ticker(ticker)?;

    let market_cap = snapshot.market_cap();
    let ev = snapshot.enterprise_value();
    let revenue_per_employee = ratio(snapshot.revenue, snapshot.employee_count);

    log::debug!("calculating multiples for {ticker}");

    Ok(MultiplesResult {
        ticker,
        price_to_earnings: ratio(market_cap, snapshot.net_income),
        ev_to_ebitda: ratio(ev, snapshot.ebitda),
        ev_to_ebit: ratio(ev, snapshot.ebit),
        price_to_book: ratio(market_cap, snapshot.book_value),
        debt_to_equity: ratio(snapshot.total_debt, snapshot.book_value),
        ev_to_invested_capital: ratio(ev, snapshot.invested_capital),
        ev_to_fcf: ratio(ev, snapshot.free_cash_flow),
        price_to_cash_flow: ratio(market_cap, snapshot.operating_cash_flow),
        ev_to_sales: ratio(ev, snapshot.revenue),
        ev_to_revenue_per_employee: ratio(ev, revenue_per_employee),
    })
}

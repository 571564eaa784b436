//! Point-in-time financial snapshot for a single ticker.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};

/// Type alias for monetary values.
pub type Money = f64;

/// Type alias for timestamp values (seconds since epoch).
pub type Timestamp = i64;

/// Maximum accepted ticker length.
const MAX_TICKER_LEN: usize = 12;

/// Validate a ticker symbol and return its canonical uppercase form.
///
/// Accepts ASCII alphanumerics plus `.` and `-` (class shares, foreign
/// listings), up to [`MAX_TICKER_LEN`] characters.
pub fn normalize_ticker(ticker: &str) -> Result<String> {
    let trimmed = ticker.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_TICKER_LEN {
        return Err(EngineError::invalid_ticker(ticker));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(EngineError::invalid_ticker(ticker));
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// Immutable per-ticker financial snapshot.
///
/// Every field may be unknown; the data provider never fabricates values.
/// Monetary fields share the snapshot's reporting currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    /// Last market price per share.
    pub price: Option<Money>,
    /// Shares outstanding.
    pub shares_outstanding: Option<f64>,
    /// Trailing total revenue.
    pub revenue: Option<Money>,
    /// Earnings before interest and taxes.
    pub ebit: Option<Money>,
    /// Earnings before interest, taxes, depreciation and amortization.
    pub ebitda: Option<Money>,
    /// Trailing net income.
    pub net_income: Option<Money>,
    /// Total stockholders' equity (book value).
    pub book_value: Option<Money>,
    /// Total debt.
    pub total_debt: Option<Money>,
    /// Cash and cash-like short-term assets.
    pub cash: Option<Money>,
    /// Invested capital.
    pub invested_capital: Option<Money>,
    /// Trailing free cash flow to the firm.
    pub free_cash_flow: Option<Money>,
    /// Trailing operating cash flow.
    pub operating_cash_flow: Option<Money>,
    /// Employee headcount.
    pub employee_count: Option<f64>,
}

impl FinancialSnapshot {
    /// Market capitalization, when both price and share count are known
    /// and positive.
    pub fn market_cap(&self) -> Option<Money> {
        let price = self.price.filter(|p| *p > 0.0)?;
        let shares = self.shares_outstanding.filter(|s| *s > 0.0)?;
        Some(price * shares)
    }

    /// Enterprise value: market cap + total debt - cash.
    ///
    /// Unknown when any constituent is unknown; missing balance-sheet
    /// fields are not assumed zero here.
    pub fn enterprise_value(&self) -> Option<Money> {
        Some(self.market_cap()? + self.total_debt? - self.cash?)
    }

    /// Net debt: total debt - cash.
    pub fn net_debt(&self) -> Option<Money> {
        Some(self.total_debt? - self.cash?)
    }
}

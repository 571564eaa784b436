//! News-sentiment aggregation.
//!
//! Reduces externally classified headlines to label ratios. Each
//! headline counts as one unit regardless of classifier confidence;
//! confidence is carried through for display only. Empty input yields
//! undefined ratios, never zeros, so "no data" stays distinct from
//! "100% neutral".

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::snapshot::{normalize_ticker, Timestamp};

/// Sentiment label assigned by the upstream classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl FromStr for SentimentLabel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            other => Err(EngineError::invalid_parameter(format!(
                "unknown sentiment label {other:?}"
            ))),
        }
    }
}

/// One classified headline for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub url: Option<String>,
    /// Publication time, seconds since epoch.
    pub timestamp: Timestamp,
    pub label: SentimentLabel,
    /// Classifier confidence, passed through untouched.
    pub confidence: f64,
}

impl NewsItem {
    /// Calendar day of publication (UTC).
    pub fn published_on(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.timestamp, 0).map(|dt| dt.date_naive())
    }
}

/// Label shares of a non-empty headline set; the three ratios sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentRatios {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// Aggregated sentiment for a ticker and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub ticker: String,
    pub date: NaiveDate,
    pub total_articles: usize,
    /// `None` when no articles were supplied (undefined, not zero).
    pub ratios: Option<SentimentRatios>,
}

fn reduce(ticker: String, date: NaiveDate, items: &[NewsItem]) -> SentimentSummary {
    let total = items.len();
    if total == 0 {
        return SentimentSummary {
            ticker,
            date,
            total_articles: 0,
            ratios: None,
        };
    }

    let mut positive = 0usize;
    let mut neutral = 0usize;
    let mut negative = 0usize;
    for item in items {
        match item.label {
            SentimentLabel::Positive => positive += 1,
            SentimentLabel::Neutral => neutral += 1,
            SentimentLabel::Negative => negative += 1,
        }
    }

    let denom = total as f64;
    SentimentSummary {
        ticker,
        date,
        total_articles: total,
        ratios: Some(SentimentRatios {
            positive: positive as f64 / denom,
            neutral: neutral as f64 / denom,
            negative: negative as f64 / denom,
        }),
    }
}

/// Summarize one day's classified headlines for a ticker.
pub fn summarize(ticker: &str, date: NaiveDate, items: &[NewsItem]) -> Result<SentimentSummary> {
    let ticker = normalize_ticker(ticker)?;
    log::debug!("summarizing {} headlines for {ticker} on {date}", items.len());
    Ok(reduce(ticker, date, items))
}

/// Summarize a trailing window of `window_days` calendar days ending at
/// `end` (inclusive), ignoring items outside the window.
pub fn summarize_window(
    ticker: &str,
    end: NaiveDate,
    window_days: u32,
    items: &[NewsItem],
) -> Result<SentimentSummary> {
    let ticker = normalize_ticker(ticker)?;
    if window_days == 0 {
        return Err(EngineError::invalid_parameter(
            "window must cover at least one day",
        ));
    }
    let start = end - chrono::Days::new(u64::from(window_days) - 1);

    let in_window: Vec<NewsItem> = items
        .iter()
        .filter(|item| {
            item.published_on()
                .is_some_and(|day| day >= start && day <= end)
        })
        .cloned()
        .collect();

    Ok(reduce(ticker, end, &in_window))
}

/// One summary per calendar day, ascending, covering only days with at
/// least one headline.
pub fn daily_breakdown(ticker: &str, items: &[NewsItem]) -> Result<Vec<SentimentSummary>> {
    let ticker = normalize_ticker(ticker)?;

    let mut by_day: std::collections::BTreeMap<NaiveDate, Vec<NewsItem>> =
        std::collections::BTreeMap::new();
    for item in items {
        if let Some(day) = item.published_on() {
            by_day.entry(day).or_default().push(item.clone());
        }
    }

    Ok(by_day
        .into_iter()
        .map(|(day, day_items)| reduce(ticker.clone(), day, &day_items))
        .collect())
}

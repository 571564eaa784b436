//! Core types and utilities for the valuation engine.

pub mod error;
pub mod snapshot;
pub mod stats;

pub use error::{EngineError, Result};
pub use snapshot::{normalize_ticker, FinancialSnapshot, Money, Timestamp};
pub use stats::DistributionStats;

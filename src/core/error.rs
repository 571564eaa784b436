//! Error types for the valuation engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Error types for the analytics engine.
///
/// Invalid-request errors (`InvalidTicker`, `InvalidParameter`) are raised
/// before any computation starts. `MissingData` marks a computation whose
/// required snapshot field is unknown; a missing input that only affects a
/// single derived value is expressed as `None` in the result instead.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Ticker failed validation.
    #[error("Invalid ticker: {ticker:?}")]
    InvalidTicker { ticker: String },

    /// Invalid parameter value.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// A required financial-statement field is unknown.
    #[error("Missing data: {field}")]
    MissingData { field: String },

    /// Terminal growth at or above the terminal-period discount rate.
    #[error(
        "Divergent terminal value: terminal growth {growth} must be below the terminal WACC {wacc}"
    )]
    DivergentTerminalValue { wacc: f64, growth: f64 },

    /// Data length mismatch between arrays.
    #[error("Data length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Insufficient data for calculation.
    #[error("Insufficient data: need at least {required} elements, got {available}")]
    InsufficientData { required: usize, available: usize },
}

impl EngineError {
    /// Create an invalid ticker error.
    pub fn invalid_ticker(ticker: impl Into<String>) -> Self {
        Self::InvalidTicker {
            ticker: ticker.into(),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a missing data error.
    pub fn missing_data(field: impl Into<String>) -> Self {
        Self::MissingData {
            field: field.into(),
        }
    }

    /// Create a divergent terminal value error.
    pub fn divergent_terminal(wacc: f64, growth: f64) -> Self {
        Self::DivergentTerminalValue { wacc, growth }
    }

    /// Create a length mismatch error.
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(required: usize, available: usize) -> Self {
        Self::InsufficientData {
            required,
            available,
        }
    }
}

#[cfg(feature = "python")]
impl From<EngineError> for pyo3::PyErr {
    fn from(err: EngineError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::divergent_terminal(0.05, 0.06);
        let msg = err.to_string();
        assert!(msg.contains("0.06"));
        assert!(msg.contains("0.05"));

        let err = EngineError::missing_data("free_cash_flow");
        assert!(err.to_string().contains("free_cash_flow"));
    }
}

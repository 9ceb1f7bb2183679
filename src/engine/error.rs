// src/engine/error.rs

use thiserror::Error;

/// Everything that can go wrong in the accounting core and the layers built on it.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Trades and target construction need a strictly positive price.
    #[error("price must be greater than zero, got {0}")]
    InvalidPrice(f64),

    #[error("invalid config: {field} = {value} ({reason})")]
    InvalidConfig {
        field:  &'static str,
        value:  f64,
        reason: &'static str,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("input series is empty")]
    EmptyInput,

    #[error("'{name}' length {actual} != expected {expected}")]
    LengthMismatch {
        name:     &'static str,
        actual:   usize,
        expected: usize,
    },

    #[error("'{name}' has a non-finite value at index {index}")]
    NonFinite {
        name:  &'static str,
        index: usize,
    },

    #[error("price {value} at index {index} is not strictly positive")]
    NonPositivePrice {
        index: usize,
        value: f64,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(feature = "python")]
impl From<EngineError> for pyo3::PyErr {
    fn from(err: EngineError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

// src/engine/prepare_inputs.rs

use ndarray::ArrayView1;

use crate::engine::error::{EngineError, Result};

/// Check a price series and its target-exposure series, returning their common length.
pub fn prepare_inputs(prices: ArrayView1<f64>, targets: ArrayView1<f64>) -> Result<usize> {
    let n = prices.len();
    if n == 0 {
        return Err(EngineError::EmptyInput);
    }
    if targets.len() != n {
        return Err(EngineError::LengthMismatch {
            name:     "targets",
            actual:   targets.len(),
            expected: n,
        });
    }
    if let Some(index) = targets.iter().position(|x| !x.is_finite()) {
        return Err(EngineError::NonFinite { name: "targets", index });
    }
    for (index, &value) in prices.iter().enumerate() {
        if !value.is_finite() {
            return Err(EngineError::NonFinite { name: "prices", index });
        }
        if value <= 0.0 {
            return Err(EngineError::NonPositivePrice { index, value });
        }
    }
    Ok(n)
}

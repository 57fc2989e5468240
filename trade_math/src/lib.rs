//! # Trade Math
//!
//! Statistical building blocks for analysing and forecasting daily price series.
//! This crate provides the numeric collaborators used by the forecasting pipeline:
//!
//! - Moving averages (simple and centred)
//! - Ordinary least squares with coefficient standard errors
//! - Augmented Dickey-Fuller unit-root test
//! - Classical additive seasonal decomposition
//! - Nelder-Mead minimisation
//! - Seasonal ARIMA estimation by conditional sum of squares

use thiserror::Error;

pub mod decomposition;
pub mod moving_averages;
pub mod ols;
pub mod optimization;
pub mod sarima;
pub mod stationarity;

pub use decomposition::{seasonal_decompose, Decomposition};
pub use sarima::{fit_sarima, SarimaFit, SarimaSpec};
pub use stationarity::{adf_test, AdfResult, CriticalValues};

/// Errors that can occur in time series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for time series math operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Reject series containing NaN or infinite values
pub(crate) fn ensure_finite(values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(MathError::InvalidInput(format!(
            "Non-finite value at index {}",
            idx
        ))),
        None => Ok(()),
    }
}

/// Population variance of a slice, 0.0 for fewer than two values
pub(crate) fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

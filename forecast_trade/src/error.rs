//! Error types for the forecast_trade crate

use crate::params::{ModelOrder, SeasonalOrder};
use market_data::MarketDataError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the forecast_trade crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The provider returned no rows or could not be reached
    #[error("Data unavailable: {0}")]
    DataUnavailable(#[from] MarketDataError),

    /// Too few observations for the requested analysis
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The seasonal ARIMA estimate could not be produced
    #[error("Model fit failed for order {order} seasonal {seasonal}: {reason}")]
    ModelFitFailure {
        order: ModelOrder,
        seasonal: SeasonalOrder,
        reason: String,
    },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),

    /// Chart rendering failed
    #[error("Render error: {0}")]
    Render(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Io(err.into())
    }
}

//! Forecasting models for price series

use crate::error::{ForecastError, Result};
use crate::params::{ForecastAnchor, ModelOrder, SeasonalOrder};
use crate::utils::future_dates;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod sarima;

pub use sarima::{SarimaModel, TrainedSarimaModel};

/// Estimates and fit statistics reported alongside a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub model: String,
    pub mean: f64,
    pub ar: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    pub sigma2: f64,
    pub aic: f64,
    pub converged: bool,
    pub iterations: usize,
}

/// Point forecast for future days plus the in-sample fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Contiguous calendar days, one per forecast value
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    /// Dates of the history the model was fitted to
    pub history_dates: Vec<NaiveDate>,
    /// One-step-ahead predictions aligned with `history_dates`
    pub fitted: Vec<Option<f64>>,
    pub diagnostics: FitDiagnostics,
}

impl ForecastResult {
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(date, value)` pairs in order
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for future periods
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>>;

    /// One-step-ahead predictions for the training data
    fn fitted_values(&self) -> Vec<Option<f64>>;

    /// Estimates and fit statistics
    fn diagnostics(&self) -> FitDiagnostics;

    /// Name of the model
    fn name(&self) -> String;
}

/// Forecast model that can be trained on a numeric series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on the full series
    fn train(&self, values: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> String;
}

/// Settings for [`forecast_series`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRequest {
    pub order: ModelOrder,
    pub seasonal: SeasonalOrder,
    pub horizon: usize,
    pub anchor: ForecastAnchor,
    /// End of the requested date range, used by [`ForecastAnchor::RequestedEnd`]
    pub requested_end: NaiveDate,
}

/// Fit a seasonal ARIMA model to `values` and forecast `request.horizon` days.
///
/// Horizons outside `[1, 365]` are rejected before any fitting happens.
pub fn forecast_series(
    dates: &[NaiveDate],
    values: &[f64],
    request: &ForecastRequest,
) -> Result<ForecastResult> {
    crate::params::validate_horizon(request.horizon)?;
    if dates.len() != values.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "{} dates for {} values",
            dates.len(),
            values.len()
        )));
    }

    let anchor = match request.anchor {
        ForecastAnchor::LastObservation => dates.last().copied().ok_or_else(|| {
            ForecastError::InsufficientData("Cannot forecast an empty series".to_string())
        })?,
        ForecastAnchor::RequestedEnd => request.requested_end,
    };

    let model = SarimaModel::new(request.order, request.seasonal);
    let trained = model.train(values)?;
    let forecast = trained.forecast(request.horizon)?;

    if forecast.len() != request.horizon {
        return Err(ForecastError::ModelFitFailure {
            order: request.order,
            seasonal: request.seasonal,
            reason: format!(
                "produced {} values for horizon {}",
                forecast.len(),
                request.horizon
            ),
        });
    }

    Ok(ForecastResult {
        dates: future_dates(anchor, request.horizon)?,
        values: forecast,
        history_dates: dates.to_vec(),
        fitted: trained.fitted_values(),
        diagnostics: trained.diagnostics(),
    })
}

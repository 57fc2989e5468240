//! Utility functions for the forecast_trade crate

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use serde::Serialize;

/// `horizon` consecutive calendar days starting the day after `anchor`
pub fn future_dates(anchor: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon as u64)
        .map(|offset| {
            anchor.checked_add_days(Days::new(offset)).ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "Forecast date {} days after {} is out of range",
                    offset, anchor
                ))
            })
        })
        .collect()
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;
    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

    let (pct_sum, pct_count) = actual
        .iter()
        .zip(&errors)
        .filter(|(a, _)| **a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (a, e)| {
            (sum + (e.abs() / a.abs()) * 100.0, count + 1)
        });
    let mape = if pct_count > 0 {
        pct_sum / pct_count as f64
    } else {
        f64::NAN
    };

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape,
        n: forecast.len(),
    })
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, Serialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, skipping zero actuals
    pub mape: f64,
    /// Number of compared points
    pub n: usize,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "In-sample fit over {} points:", self.n)?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        write!(f, "  MAPE:  {:.4}%", self.mape)
    }
}

/// Contiguous runs of defined points, for drawing series with gaps
pub fn defined_segments<X: Copy>(points: &[(X, Option<f64>)]) -> Vec<Vec<(X, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();

    for (x, y) in points {
        match y {
            Some(y) if y.is_finite() => current.push((*x, *y)),
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

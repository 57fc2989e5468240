//! Seasonal ARIMA model for price forecasting

use crate::error::{ForecastError, Result};
use crate::models::{FitDiagnostics, ForecastModel, TrainedForecastModel};
use crate::params::{to_sarima_spec, ModelOrder, SeasonalOrder};
use trade_math::{fit_sarima, SarimaFit};

/// SARIMA(p,d,q)(P,D,Q)s model
#[derive(Debug, Clone)]
pub struct SarimaModel {
    order: ModelOrder,
    seasonal: SeasonalOrder,
}

/// Trained SARIMA model
#[derive(Debug, Clone)]
pub struct TrainedSarimaModel {
    order: ModelOrder,
    seasonal: SeasonalOrder,
    fit: SarimaFit,
}

impl SarimaModel {
    /// Create a new SARIMA model
    pub fn new(order: ModelOrder, seasonal: SeasonalOrder) -> Self {
        Self { order, seasonal }
    }

    pub fn order(&self) -> ModelOrder {
        self.order
    }

    pub fn seasonal(&self) -> SeasonalOrder {
        self.seasonal
    }

    fn failure(&self, reason: impl ToString) -> ForecastError {
        ForecastError::ModelFitFailure {
            order: self.order,
            seasonal: self.seasonal,
            reason: reason.to_string(),
        }
    }
}

impl ForecastModel for SarimaModel {
    type Trained = TrainedSarimaModel;

    fn train(&self, values: &[f64]) -> Result<Self::Trained> {
        let spec = to_sarima_spec(self.order, self.seasonal);
        log::info!("Fitting {} to {} observations", spec, values.len());

        let fit = fit_sarima(values, spec).map_err(|e| {
            log::warn!("{} failed: {}", spec, e);
            self.failure(e)
        })?;

        Ok(TrainedSarimaModel {
            order: self.order,
            seasonal: self.seasonal,
            fit,
        })
    }

    fn name(&self) -> String {
        to_sarima_spec(self.order, self.seasonal).to_string()
    }
}

impl TrainedForecastModel for TrainedSarimaModel {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        self.fit
            .forecast(horizon)
            .map_err(|e| ForecastError::ModelFitFailure {
                order: self.order,
                seasonal: self.seasonal,
                reason: e.to_string(),
            })
    }

    fn fitted_values(&self) -> Vec<Option<f64>> {
        self.fit.fitted_values()
    }

    fn diagnostics(&self) -> FitDiagnostics {
        FitDiagnostics {
            model: self.name(),
            mean: self.fit.mean,
            ar: self.fit.ar.clone(),
            seasonal_ar: self.fit.seasonal_ar.clone(),
            ma: self.fit.ma.clone(),
            seasonal_ma: self.fit.seasonal_ma.clone(),
            sigma2: self.fit.sigma2,
            aic: self.fit.aic,
            converged: self.fit.converged,
            iterations: self.fit.iterations,
        }
    }

    fn name(&self) -> String {
        self.fit.spec.to_string()
    }
}

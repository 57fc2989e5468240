//! One full run: fetch, then the three independent analysis stages

use crate::data::fetch_series;
use crate::decomposition::{decompose, DecompositionResult};
use crate::error::Result;
use crate::models::{forecast_series, ForecastRequest, ForecastResult};
use crate::params::PipelineParams;
use crate::stationarity::{check_stationarity, StationarityVerdict};
use market_data::{MarketDataProvider, ObservationSeries};

/// Everything a run produced.
///
/// Each analysis stage keeps its own outcome so one failure does not hide
/// the others.
#[derive(Debug)]
pub struct PipelineReport {
    pub params: PipelineParams,
    pub series: ObservationSeries,
    pub stationarity: Result<StationarityVerdict>,
    pub decomposition: Result<DecompositionResult>,
    pub forecast: Result<ForecastResult>,
}

impl PipelineReport {
    /// Whether every analysis stage succeeded
    pub fn is_complete(&self) -> bool {
        self.stationarity.is_ok() && self.decomposition.is_ok() && self.forecast.is_ok()
    }
}

/// Run the pipeline for `params`.
///
/// Invalid parameters and fetch failures abort the run; later stage failures
/// are recorded in the report.
pub fn run_pipeline(
    params: &PipelineParams,
    provider: &dyn MarketDataProvider,
) -> Result<PipelineReport> {
    params.validate()?;

    let series = match fetch_series(provider, &params.ticker, params.start, params.end) {
        Ok(series) => series,
        Err(e) => {
            log::warn!("Fetch failed for {}: {}", params.ticker, e);
            return Err(e);
        }
    };

    let dates = series.dates();
    let values = series.column(params.column);

    let stationarity = check_stationarity(&values);
    if let Err(e) = &stationarity {
        log::warn!("Stationarity check failed: {}", e);
    }

    let decomposition = decompose(&dates, &values, params.decomposition_period);
    if let Err(e) = &decomposition {
        log::warn!("Decomposition failed: {}", e);
    }

    let request = ForecastRequest {
        order: params.order,
        seasonal: params.seasonal,
        horizon: params.horizon,
        anchor: params.anchor,
        requested_end: params.end,
    };
    let forecast = forecast_series(&dates, &values, &request);
    if let Err(e) = &forecast {
        log::warn!("Forecast failed: {}", e);
    }

    Ok(PipelineReport {
        params: params.clone(),
        series,
        stationarity,
        decomposition,
        forecast,
    })
}

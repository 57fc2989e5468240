//! Fetching price history and holding it as a polars frame

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use market_data::{Field, MarketDataError, MarketDataProvider, ObservationSeries};
use polars::prelude::*;

/// Name of the date column in every frame built here
pub const DATE_COLUMN: &str = "Date";

/// Fetch `[start, end]` for `ticker` and normalise it into a series.
///
/// Any provider failure, and an empty answer, is reported as
/// `DataUnavailable` with the underlying cause attached.
pub fn fetch_series(
    provider: &dyn MarketDataProvider,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ObservationSeries> {
    if start > end {
        return Err(ForecastError::InvalidParameter(format!(
            "Start date {} is after end date {}",
            start, end
        )));
    }

    let rows = provider.fetch_daily(ticker, start, end)?;
    let series = ObservationSeries::normalized(ticker, rows, start, end)?;

    if series.is_empty() {
        return Err(MarketDataError::NoData(ticker.to_string()).into());
    }

    log::info!(
        "Fetched {} observations for {} from {} ({}..={})",
        series.len(),
        ticker,
        provider.name(),
        series.first_date().unwrap_or(start),
        series.last_date().unwrap_or(end)
    );
    Ok(series)
}

/// Days since 1970-01-01, the physical representation of a polars date
fn epoch_days(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}

/// Date column for a frame
pub fn date_series(name: &str, dates: &[NaiveDate]) -> Result<Series> {
    let days: Vec<i32> = dates.iter().map(|d| epoch_days(*d)).collect();
    Ok(Series::new(name, days).cast(&DataType::Date)?)
}

/// Time series data structure backed by a polars `DataFrame`
#[derive(Debug, Clone)]
pub struct TimeSeriesData {
    df: DataFrame,
    ticker: String,
    dates: Vec<NaiveDate>,
}

impl TimeSeriesData {
    /// One column per field plus the date column, in Yahoo layout order
    pub fn from_series(series: &ObservationSeries) -> Result<Self> {
        let dates = series.dates();
        let mut columns = vec![date_series(DATE_COLUMN, &dates)?];

        for field in Field::ALL {
            let column = match field {
                Field::Volume => Series::new(
                    field.label(),
                    series
                        .observations()
                        .iter()
                        .map(|o| o.volume)
                        .collect::<Vec<u64>>(),
                ),
                _ => Series::new(field.label(), series.column(field)),
            };
            columns.push(column);
        }

        Ok(Self {
            df: DataFrame::new(columns)?,
            ticker: series.ticker().to_string(),
            dates,
        })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Values of one field as floats
    pub fn column(&self, field: Field) -> Result<Vec<f64>> {
        let series = self.df.column(field.label())?.cast(&DataType::Float64)?;
        Ok(series
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    /// Date column and one field
    pub fn select_column(&self, field: Field) -> Result<DataFrame> {
        Ok(self.df.select([DATE_COLUMN, field.label()])?)
    }
}

//! Tabular views of a pipeline report as polars frames

use crate::data::{date_series, TimeSeriesData, DATE_COLUMN};
use crate::decomposition::DecompositionResult;
use crate::error::{ForecastError, Result};
use crate::models::ForecastResult;
use market_data::{Field, ObservationSeries};
use polars::prelude::*;

/// Every field of the fetched series
pub fn raw_table(series: &ObservationSeries) -> Result<DataFrame> {
    Ok(TimeSeriesData::from_series(series)?.dataframe().clone())
}

/// Date plus the analysed column
pub fn selected_table(series: &ObservationSeries, field: Field) -> Result<DataFrame> {
    TimeSeriesData::from_series(series)?.select_column(field)
}

/// Last `rows` observations of the analysed column
pub fn actual_tail_table(
    series: &ObservationSeries,
    field: Field,
    rows: usize,
) -> Result<DataFrame> {
    Ok(selected_table(series, field)?.tail(Some(rows)))
}

/// Observed value and the three components per date; undefined values are null
pub fn decomposition_table(decomposition: &DecompositionResult) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        date_series(DATE_COLUMN, &decomposition.dates)?,
        Series::new("Observed", decomposition.observed.clone()),
        Series::new("Trend", decomposition.trend.clone()),
        Series::new("Seasonal", decomposition.seasonal.clone()),
        Series::new("Residual", decomposition.residual.clone()),
    ])?)
}

/// Forecast dates and predicted values
pub fn prediction_table(forecast: &ForecastResult) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        date_series(DATE_COLUMN, &forecast.dates)?,
        Series::new("Forecast", forecast.values.clone()),
    ])?)
}

/// Observed history next to the one-step-ahead fit
pub fn fitted_table(
    series: &ObservationSeries,
    field: Field,
    forecast: &ForecastResult,
) -> Result<DataFrame> {
    let actual = series.column(field);
    if actual.len() != forecast.fitted.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "{} fitted values for {} observations",
            forecast.fitted.len(),
            actual.len()
        )));
    }

    Ok(DataFrame::new(vec![
        date_series(DATE_COLUMN, &forecast.history_dates)?,
        Series::new(field.label(), actual),
        Series::new("Fitted", forecast.fitted.clone()),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::decompose;
    use chrono::NaiveDate;
    use market_data::{MarketDataProvider, SyntheticProvider};

    fn series(days: i64) -> ObservationSeries {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let end = start + chrono::Duration::days(days);
        let rows = SyntheticProvider::new(11)
            .fetch_daily("MSFT", start, end)
            .unwrap();
        ObservationSeries::normalized("MSFT", rows, start, end).unwrap()
    }

    #[test]
    fn test_tail_is_bounded_by_series() {
        let series = series(20);
        let tail = actual_tail_table(&series, Field::Close, 5).unwrap();
        assert_eq!(tail.height(), 5);
        assert_eq!(tail.get_column_names(), vec!["Date", "Close"]);

        let all = actual_tail_table(&series, Field::Close, 10_000).unwrap();
        assert_eq!(all.height(), series.len());
    }

    #[test]
    fn test_decomposition_table_keeps_gaps_as_nulls() {
        let series = series(120);
        let values = series.column(Field::Close);
        let decomposition = decompose(&series.dates(), &values, 10).unwrap();
        let table = decomposition_table(&decomposition).unwrap();

        assert_eq!(table.height(), series.len());
        assert_eq!(table.width(), 5);
        // half a window at each end has no centred average
        assert_eq!(table.column("Trend").unwrap().null_count(), 10);
        assert_eq!(table.column("Seasonal").unwrap().null_count(), 0);
    }
}

use chrono::NaiveDate;
use forecast_trade::{
    forecast_series, run_pipeline, ForecastAnchor, ForecastError, ForecastRequest, ModelOrder,
    PipelineParams, SeasonalOrder,
};
use market_data::{
    CsvProvider, Field, MarketDataError, MarketDataProvider, Observation, ObservationSeries,
    SyntheticProvider,
};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

struct EmptyProvider;

impl MarketDataProvider for EmptyProvider {
    fn name(&self) -> &str {
        "empty"
    }

    fn fetch_daily(
        &self,
        _ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> market_data::Result<Vec<Observation>> {
        Ok(Vec::new())
    }
}

fn params_for(start: &str, end: &str) -> PipelineParams {
    PipelineParams {
        start: date(start),
        end: date(end),
        ..PipelineParams::default()
    }
}

#[test]
fn test_full_run_on_synthetic_data() {
    let params = params_for("2019-01-01", "2020-12-31");
    let report = run_pipeline(&params, &SyntheticProvider::new(42)).unwrap();

    let dates = report.series.dates();
    assert!(!dates.is_empty());
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
    assert!(dates.iter().all(|d| *d >= params.start && *d <= params.end));

    let verdict = report.stationarity.as_ref().unwrap();
    assert!(verdict.p_value >= 0.0 && verdict.p_value <= 1.0);

    let decomposition = report.decomposition.as_ref().unwrap();
    assert_eq!(decomposition.len(), report.series.len());
    assert_eq!(decomposition.period, 30);

    let forecast = report.forecast.as_ref().unwrap();
    assert_eq!(forecast.horizon(), 30);
    assert_eq!(forecast.dates[0], report.series.last_date().unwrap().succ_opt().unwrap());
    assert!(report.is_complete());
}

#[test]
fn test_unknown_ticker_halts_before_analysis() {
    let mut params = PipelineParams::default();
    params.ticker = "ZZZZ99".to_string();

    let result = run_pipeline(&params, &EmptyProvider);
    assert!(matches!(
        result,
        Err(ForecastError::DataUnavailable(MarketDataError::NoData(_)))
    ));
}

#[test]
fn test_unknown_ticker_in_csv_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("AAPL.csv"),
        "Date,Open,High,Low,Close,Adj Close,Volume\n2020-01-02,1,2,0.5,1.5,1.4,100\n",
    )
    .unwrap();

    let mut params = params_for("2020-01-01", "2020-12-31");
    params.ticker = "ZZZZ99".to_string();

    let result = run_pipeline(&params, &CsvProvider::from_dir(dir.path()));
    assert!(matches!(
        result,
        Err(ForecastError::DataUnavailable(MarketDataError::UnknownTicker(_)))
    ));
}

#[test]
fn test_short_history_fails_per_stage() {
    // Two weeks of data: too short to decompose with period 30
    let params = params_for("2021-03-01", "2021-03-14");
    let report = run_pipeline(&params, &SyntheticProvider::new(1)).unwrap();

    assert!(matches!(
        report.decomposition,
        Err(ForecastError::InsufficientData(_))
    ));
    assert!(report.forecast.is_err());
    assert!(!report.is_complete());
}

#[test]
fn test_invalid_params_are_rejected_before_fetch() {
    let mut params = params_for("2021-01-01", "2020-01-01");
    assert!(matches!(
        run_pipeline(&params, &EmptyProvider),
        Err(ForecastError::InvalidParameter(_))
    ));

    params = params_for("2020-01-01", "2021-01-01");
    params.horizon = 0;
    assert!(matches!(
        run_pipeline(&params, &EmptyProvider),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_horizon_30_on_500_points() {
    let (start, end) = (date("2018-01-01"), date("2020-12-31"));
    let rows = SyntheticProvider::new(7).fetch_daily("TSLA", start, end).unwrap();
    let series = ObservationSeries::normalized("TSLA", rows, start, end).unwrap();
    assert!(series.len() >= 500);

    let dates = &series.dates()[..500];
    let values = &series.column(Field::Close)[..500];
    let request = ForecastRequest {
        order: ModelOrder::new(2, 2, 2),
        seasonal: SeasonalOrder::new(1, 1, 1, 12),
        horizon: 30,
        anchor: ForecastAnchor::LastObservation,
        requested_end: end,
    };

    let forecast = forecast_series(dates, values, &request).unwrap();

    assert_eq!(forecast.values.len(), 30);
    assert_eq!(forecast.dates.len(), 30);
    assert!(forecast.dates[0] > dates[499]);
    assert!(forecast.dates.windows(2).all(|w| w[1] == w[0].succ_opt().unwrap()));
    assert!(forecast.values.iter().all(|v| v.is_finite()));
}

#[test]
fn test_requested_end_anchor() {
    let mut params = params_for("2020-01-01", "2020-12-27");
    params.anchor = ForecastAnchor::RequestedEnd;
    params.horizon = 10;

    let report = run_pipeline(&params, &SyntheticProvider::new(3)).unwrap();
    let forecast = report.forecast.unwrap();

    // 2020-12-27 is a Sunday, so the data stops on the 25th
    assert_eq!(report.series.last_date(), Some(date("2020-12-25")));
    assert_eq!(forecast.dates[0], date("2020-12-28"));
    assert_eq!(forecast.dates[9], date("2021-01-06"));
}

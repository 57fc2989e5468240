use approx::assert_abs_diff_eq;
use chrono::{Days, NaiveDate};
use forecast_trade::{check_stationarity, decompose, ForecastError};
use std::f64::consts::PI;

fn daily(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
    (0..n)
        .map(|i| start.checked_add_days(Days::new(i as u64)).unwrap())
        .collect()
}

#[test]
fn test_strictly_increasing_series_is_not_stationary() {
    let values: Vec<f64> = (0..100).map(|i| 10.0 + i as f64 * 1.5).collect();
    let verdict = check_stationarity(&values).unwrap();

    assert!(!verdict.is_stationary);
    assert!(verdict.p_value > 0.05);
}

#[test]
fn test_quadratic_growth_is_not_stationary() {
    let values: Vec<f64> = (0..200).map(|i| 0.05 * (i as f64).powi(2) + i as f64).collect();
    let verdict = check_stationarity(&values).unwrap();

    assert!(!verdict.is_stationary);
    assert!(verdict.p_value > 0.05);
}

#[test]
fn test_saturating_growth_is_not_stationary() {
    let values: Vec<f64> = (0..200).map(|i| 80.0 - 60.0 * 0.98_f64.powi(i)).collect();
    let verdict = check_stationarity(&values).unwrap();

    assert!(!verdict.is_stationary);
}

#[test]
fn test_stationarity_is_deterministic() {
    let values: Vec<f64> = (0..250)
        .map(|i| 100.0 + (i as f64 * 0.7).sin() * 4.0 + (i as f64 * 0.13).cos())
        .collect();

    let first = check_stationarity(&values).unwrap();
    for _ in 0..3 {
        assert_eq!(check_stationarity(&values).unwrap(), first);
    }
}

#[test]
fn test_linear_trend_plus_sine_recovers_amplitude() {
    let n = 360;
    let amplitude = 5.0;
    let values: Vec<f64> = (0..n)
        .map(|i| 20.0 + 0.25 * i as f64 + amplitude * (2.0 * PI * i as f64 / 30.0).sin())
        .collect();

    let result = decompose(&daily(n), &values, 30).unwrap();

    let sampled_peak = (0..30)
        .map(|i| amplitude * (2.0 * PI * i as f64 / 30.0).sin())
        .fold(f64::MIN, f64::max);
    let seasonal_peak = result.seasonal.iter().copied().fold(f64::MIN, f64::max);
    let seasonal_trough = result.seasonal.iter().copied().fold(f64::MAX, f64::min);

    assert_abs_diff_eq!(seasonal_peak, sampled_peak, epsilon = 0.05);
    assert_abs_diff_eq!(seasonal_trough, -sampled_peak, epsilon = 0.05);

    // Trend follows the line wherever it is defined
    for (i, trend) in result.trend.iter().enumerate() {
        if let Some(t) = trend {
            assert_abs_diff_eq!(*t, 20.0 + 0.25 * i as f64, epsilon = 0.05);
        }
    }
}

#[test]
fn test_decomposition_needs_two_periods() {
    let values: Vec<f64> = (0..59).map(|i| i as f64).collect();
    assert!(matches!(
        decompose(&daily(59), &values, 30),
        Err(ForecastError::InsufficientData(_))
    ));

    let values: Vec<f64> = (0..60).map(|i| i as f64).collect();
    assert!(decompose(&daily(60), &values, 30).is_ok());
}

//! Stationarity check on the selected column

use crate::config::SIGNIFICANCE_LEVEL;
use crate::error::{ForecastError, Result};
use trade_math::adf_test;

/// Augmented Dickey-Fuller outcome; `is_stationary` uses [`SIGNIFICANCE_LEVEL`]
pub use trade_math::AdfResult as StationarityVerdict;

/// Run the ADF test on `values`.
///
/// Series that are too short, constant or contain non-finite values fail
/// with `InsufficientData`.
///
/// The regression only has a constant, no time trend. Series that grow along
/// a smooth concave curve, such as a square root or a logarithm, fit that
/// regression almost exactly with a negative level coefficient and can come
/// back stationary. A series the regression reproduces exactly is reported
/// with a zero statistic and is never called stationary.
pub fn check_stationarity(values: &[f64]) -> Result<StationarityVerdict> {
    let verdict = adf_test(values).map_err(|e| ForecastError::InsufficientData(e.to_string()))?;

    log::info!(
        "ADF statistic {:.4}, p-value {:.4}, lag {}: {}",
        verdict.statistic,
        verdict.p_value,
        verdict.used_lag,
        if verdict.is_stationary_at(SIGNIFICANCE_LEVEL) {
            "stationary"
        } else {
            "non-stationary"
        }
    );
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_increasing_is_not_stationary() {
        let values: Vec<f64> = (1..=100).map(f64::from).collect();
        let verdict = check_stationarity(&values).unwrap();
        assert!(!verdict.is_stationary);
    }

    #[test]
    fn test_deterministic() {
        let values: Vec<f64> = (0..200)
            .map(|i| ((i * 37 % 101) as f64).sin() * 3.0 + (i as f64 * 0.01))
            .collect();
        let first = check_stationarity(&values).unwrap();
        let second = check_stationarity(&values).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_verdict_uses_configured_level() {
        let values: Vec<f64> = (0..200).map(|i| ((i * 37 % 101) as f64).sin()).collect();
        let verdict = check_stationarity(&values).unwrap();
        assert_eq!(verdict.is_stationary, verdict.is_stationary_at(SIGNIFICANCE_LEVEL));
    }

    #[test]
    fn test_failures_are_insufficient_data() {
        assert!(matches!(
            check_stationarity(&[1.0, 2.0]),
            Err(ForecastError::InsufficientData(_))
        ));
        assert!(matches!(
            check_stationarity(&[4.0; 20]),
            Err(ForecastError::InsufficientData(_))
        ));
        assert!(matches!(
            check_stationarity(&[1.0, f64::INFINITY, 2.0, 3.0, 4.0]),
            Err(ForecastError::InsufficientData(_))
        ));
    }
}

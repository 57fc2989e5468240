//! Seasonal decomposition of the selected column

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trade_math::{seasonal_decompose, MathError};

/// Additive decomposition aligned with the observation dates.
///
/// `trend` and `residual` are `None` where the centred moving average has no
/// full window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionResult {
    pub period: usize,
    pub dates: Vec<NaiveDate>,
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
}

impl DecompositionResult {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Decompose `values` with the given period.
///
/// Fails with `InsufficientData` for fewer than two full periods and with
/// `InvalidParameter` for a period below 2.
pub fn decompose(
    dates: &[NaiveDate],
    values: &[f64],
    period: usize,
) -> Result<DecompositionResult> {
    if dates.len() != values.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "{} dates for {} values",
            dates.len(),
            values.len()
        )));
    }

    let parts = seasonal_decompose(values, period).map_err(|e| match e {
        MathError::InvalidInput(msg) if period < 2 => ForecastError::InvalidParameter(msg),
        other => ForecastError::InsufficientData(other.to_string()),
    })?;

    log::info!("Decomposed {} observations with period {}", parts.len(), period);

    Ok(DecompositionResult {
        period,
        dates: dates.to_vec(),
        observed: parts.observed,
        trend: parts.trend,
        seasonal: parts.seasonal,
        residual: parts.residual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        (0..n)
            .map(|i| start.checked_add_days(Days::new(i as u64)).unwrap())
            .collect()
    }

    #[test]
    fn test_alignment() {
        let values: Vec<f64> = (0..90).map(|i| (i % 30) as f64 + i as f64 * 0.1).collect();
        let result = decompose(&dates(90), &values, 30).unwrap();

        assert_eq!(result.len(), 90);
        assert_eq!(result.trend.len(), 90);
        assert_eq!(result.seasonal.len(), 90);
        assert_eq!(result.residual.len(), 90);
        assert_eq!(result.dates[0], NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[test]
    fn test_errors() {
        let values: Vec<f64> = (0..59).map(|i| i as f64).collect();
        assert!(matches!(
            decompose(&dates(59), &values, 30),
            Err(ForecastError::InsufficientData(_))
        ));
        assert!(matches!(
            decompose(&dates(59), &values, 1),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(matches!(
            decompose(&dates(10), &values, 2),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}

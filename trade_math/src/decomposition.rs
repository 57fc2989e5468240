//! Classical additive seasonal decomposition
//!
//! `observed = trend + seasonal + residual`, where the trend is a centred
//! moving average over one period and the seasonal component is the average
//! detrended value at each phase of the cycle.

use crate::moving_averages::centered_moving_average;
use crate::{ensure_finite, MathError, Result};
use serde::{Deserialize, Serialize};

/// Components of an additive decomposition, all aligned with the input.
///
/// `trend` and `residual` are `None` at the edges where the centred moving
/// average has no full window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub period: usize,
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
}

impl Decomposition {
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// One full cycle of seasonal effects, indexed by phase
    pub fn seasonal_profile(&self) -> &[f64] {
        &self.seasonal[..self.period.min(self.seasonal.len())]
    }
}

/// Split `series` into trend, seasonal and residual parts.
///
/// Requires `period >= 2` and at least two full cycles of data.
pub fn seasonal_decompose(series: &[f64], period: usize) -> Result<Decomposition> {
    if period < 2 {
        return Err(MathError::InvalidInput(format!(
            "Seasonal period must be at least 2, got {}",
            period
        )));
    }
    if series.len() < 2 * period {
        return Err(MathError::InsufficientData(format!(
            "Decomposition with period {} needs {} observations, have {}",
            period,
            2 * period,
            series.len()
        )));
    }
    ensure_finite(series)?;

    let trend = centered_moving_average(series, period)?;

    let mut phase_sums = vec![0.0; period];
    let mut phase_counts = vec![0usize; period];
    for (i, (value, level)) in series.iter().zip(&trend).enumerate() {
        if let Some(level) = level {
            phase_sums[i % period] += value - level;
            phase_counts[i % period] += 1;
        }
    }

    let mut profile: Vec<f64> = phase_sums
        .iter()
        .zip(&phase_counts)
        .map(|(sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
        .collect();
    let profile_mean = profile.iter().sum::<f64>() / period as f64;
    for effect in profile.iter_mut() {
        *effect -= profile_mean;
    }

    let seasonal: Vec<f64> = (0..series.len()).map(|i| profile[i % period]).collect();
    let residual = series
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((value, level), effect)| level.map(|l| value - l - effect))
        .collect();

    log::debug!(
        "Decomposed {} observations with period {}",
        series.len(),
        period
    );

    Ok(Decomposition {
        period,
        observed: series.to_vec(),
        trend,
        seasonal,
        residual,
    })
}

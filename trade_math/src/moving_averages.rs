//! Moving average calculations
//!
//! Contains:
//! - Simple Moving Average (SMA), updated one value at a time
//! - Rolling SMA over a whole slice
//! - Centred moving average used for trend extraction

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Push a new value into the window, dropping the oldest once full
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.sum / self.period as f64)
    }

    /// Whether the window holds a full period of values
    pub fn is_ready(&self) -> bool {
        self.values.len() >= self.period
    }

    /// Reset the SMA, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}

/// SMA of every full window in `values`.
///
/// Element `i` of the output is the mean of `values[i..i + period]`, so the
/// output has `values.len() - period + 1` elements (or none if the slice is
/// shorter than the period).
pub fn rolling_mean(values: &[f64], period: usize) -> Result<Vec<f64>> {
    let mut sma = SimpleMovingAverage::new(period)?;
    let mut out = Vec::with_capacity(values.len().saturating_sub(period) + 1);

    for &value in values {
        sma.update(value);
        if sma.is_ready() {
            out.push(sma.value()?);
        }
    }

    Ok(out)
}

/// Centred moving average aligned with the input.
///
/// Odd periods use a plain `period`-point window centred on each index.
/// Even periods use the 2 x `period` average, i.e. weights
/// `[0.5, 1, ..., 1, 0.5] / period` spanning `period + 1` points.
/// The first and last `period / 2` positions are `None`.
pub fn centered_moving_average(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    if period == 0 {
        return Err(MathError::InvalidInput(
            "Period must be greater than zero".to_string(),
        ));
    }

    let n = values.len();
    let half = period / 2;
    let mut centred = vec![None; n];

    if n < period + (1 - period % 2) {
        return Ok(centred);
    }

    let windows = rolling_mean(values, period)?;

    if period % 2 == 1 {
        for (offset, mean) in windows.into_iter().enumerate() {
            centred[offset + half] = Some(mean);
        }
    } else {
        for (offset, pair) in windows.windows(2).enumerate() {
            centred[offset + half] = Some((pair[0] + pair[1]) / 2.0);
        }
    }

    Ok(centred)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sma_calculation() {
        let mut sma = SimpleMovingAverage::new(3).unwrap();

        assert!(sma.value().is_err());

        sma.update(2.0);
        sma.update(4.0);
        assert!(!sma.is_ready());

        sma.update(6.0);
        assert_eq!(sma.value().unwrap(), 4.0);

        // The window slides, dropping the oldest value
        sma.update(8.0);
        assert_eq!(sma.value().unwrap(), 6.0);

        sma.reset();
        assert!(sma.value().is_err());
    }

    #[test]
    fn test_sma_zero_period() {
        assert!(SimpleMovingAverage::new(0).is_err());
        assert!(rolling_mean(&[1.0], 0).is_err());
    }

    #[test]
    fn test_rolling_mean() {
        let means = rolling_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
        assert_eq!(means, vec![1.5, 2.5, 3.5, 4.5]);

        assert!(rolling_mean(&[1.0, 2.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_centered_odd_period() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ma = centered_moving_average(&values, 3).unwrap();

        assert_eq!(ma, vec![None, Some(2.0), Some(3.0), Some(4.0), None]);
    }

    #[test]
    fn test_centered_even_period_weights() {
        // 2x4 MA at index 2 = (0.5*x0 + x1 + x2 + x3 + 0.5*x4) / 4
        let values = [4.0, 8.0, 0.0, 12.0, 16.0, 2.0];
        let ma = centered_moving_average(&values, 4).unwrap();

        assert_eq!(ma[0], None);
        assert_eq!(ma[1], None);
        assert_relative_eq!(
            ma[2].unwrap(),
            (0.5 * 4.0 + 8.0 + 0.0 + 12.0 + 0.5 * 16.0) / 4.0
        );
        assert_relative_eq!(
            ma[3].unwrap(),
            (0.5 * 8.0 + 0.0 + 12.0 + 16.0 + 0.5 * 2.0) / 4.0
        );
        assert_eq!(ma[4], None);
        assert_eq!(ma[5], None);
    }

    #[test]
    fn test_centered_linear_is_exact() {
        let values: Vec<f64> = (0..40).map(|i| 3.0 + 0.5 * i as f64).collect();
        let ma = centered_moving_average(&values, 12).unwrap();

        for (i, v) in ma.iter().enumerate() {
            match v {
                Some(m) => assert_relative_eq!(*m, values[i], epsilon = 1e-9),
                None => assert!(i < 6 || i >= 34),
            }
        }
    }

    #[test]
    fn test_centered_too_short() {
        let ma = centered_moving_average(&[1.0, 2.0, 3.0, 4.0], 4).unwrap();
        assert!(ma.iter().all(Option::is_none));
    }
}

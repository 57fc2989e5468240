//! Augmented Dickey-Fuller unit-root test
//!
//! Regression with a constant term:
//!
//! `dy_t = alpha + beta * y_{t-1} + sum_i gamma_i * dy_{t-i} + e_t`
//!
//! The number of lagged differences is chosen by AIC over a common sample,
//! starting from the Schwert upper bound `12 * (n / 100)^(1/4)`. P-values use
//! MacKinnon's (1994) response surface and critical values use MacKinnon (2010).

use crate::ols::{ols, OlsFit};
use crate::{ensure_finite, variance, MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Significance level used for the stationarity verdict
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Smallest series the test accepts
pub const MIN_OBSERVATIONS: usize = 4;

// MacKinnon (1994) response surface, constant-only regression, one variable
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010) finite-sample critical value coefficients
const CV_1: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const CV_5: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const CV_10: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

/// Critical values of the test statistic at the usual levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_percent: f64,
    pub five_percent: f64,
    pub ten_percent: f64,
}

impl CriticalValues {
    fn for_sample_size(nobs: usize) -> Self {
        let t = nobs as f64;
        let eval = |b: &[f64; 4]| b[0] + b[1] / t + b[2] / t.powi(2) + b[3] / t.powi(3);
        Self {
            one_percent: eval(&CV_1),
            five_percent: eval(&CV_5),
            ten_percent: eval(&CV_10),
        }
    }
}

/// Outcome of an ADF test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    /// t-statistic of the lagged level coefficient
    pub statistic: f64,
    /// Approximate p-value in [0, 1]
    pub p_value: f64,
    /// Number of lagged differences in the final regression
    pub used_lag: usize,
    /// Observations used in the final regression
    pub n_obs: usize,
    pub critical_values: CriticalValues,
    /// `p_value < 0.05`
    pub is_stationary: bool,
}

impl AdfResult {
    /// Verdict at a custom significance level
    pub fn is_stationary_at(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Run the ADF test with a constant term and AIC lag selection.
///
/// Fails with `InsufficientData` for fewer than four observations or a
/// series with zero variance, and with `InvalidInput` for non-finite values.
pub fn adf_test(series: &[f64]) -> Result<AdfResult> {
    ensure_finite(series)?;

    let n = series.len();
    if n < MIN_OBSERVATIONS {
        return Err(MathError::InsufficientData(format!(
            "ADF test needs at least {} observations, have {}",
            MIN_OBSERVATIONS, n
        )));
    }

    let mean = series.iter().sum::<f64>() / n as f64;
    if variance(series) <= f64::EPSILON * (1.0 + mean * mean) {
        return Err(MathError::InsufficientData(
            "Series is constant; ADF test is undefined".to_string(),
        ));
    }

    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
    let max_lag = max_lag(n);

    let selected = select_lag(series, &diffs, max_lag)?;
    let (best_lag, fit, response) = fit_at_lag(series, &diffs, selected)?;

    let statistic = level_t_statistic(&fit, &response);
    let p_value = mackinnon_p_value(statistic)?;
    let critical_values = CriticalValues::for_sample_size(fit.n_obs);

    log::debug!(
        "ADF: statistic={:.4}, p={:.4}, lag={}, nobs={}",
        statistic,
        p_value,
        best_lag,
        fit.n_obs
    );

    Ok(AdfResult {
        statistic,
        p_value,
        used_lag: best_lag,
        n_obs: fit.n_obs,
        critical_values,
        is_stationary: p_value < DEFAULT_SIGNIFICANCE,
    })
}

/// Schwert upper bound on the lag order, capped so every candidate
/// regression keeps more observations than regressors.
fn max_lag(n: usize) -> usize {
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize;
    schwert.min((n / 2).saturating_sub(2))
}

/// Lag with the lowest AIC, each candidate fitted on the sample that starts
/// after `max_lag` so the criteria are comparable.
fn select_lag(series: &[f64], diffs: &[f64], max_lag: usize) -> Result<usize> {
    let mut best: Option<(usize, f64)> = None;

    for lag in 0..=max_lag {
        let (design, response) = build_regression(series, diffs, lag, max_lag);
        let fit = match ols(&design, &response) {
            Ok(fit) => fit,
            Err(MathError::CalculationError(_)) => continue,
            Err(e) => return Err(e),
        };
        let aic = fit.aic();
        if best.map_or(true, |(_, best_aic)| aic < best_aic) {
            best = Some((lag, aic));
        }
    }

    best.map(|(lag, _)| lag).ok_or_else(|| {
        MathError::CalculationError("ADF regression is singular at every lag".to_string())
    })
}

/// Full-sample regression at `lag`, stepping down a lag while the longer
/// sample turns out singular.
fn fit_at_lag(series: &[f64], diffs: &[f64], lag: usize) -> Result<(usize, OlsFit, Vec<f64>)> {
    for lag in (0..=lag).rev() {
        let (design, response) = build_regression(series, diffs, lag, lag);
        match ols(&design, &response) {
            Ok(fit) => return Ok((lag, fit, response)),
            Err(MathError::CalculationError(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(MathError::CalculationError(
        "ADF regression is singular at every lag".to_string(),
    ))
}

/// Design rows `[1, y_{t-1}, dy_{t-1}, ..., dy_{t-lag}]` with response `dy_t`,
/// for every difference index from `start` onwards.
fn build_regression(
    series: &[f64],
    diffs: &[f64],
    lag: usize,
    start: usize,
) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut design = Vec::with_capacity(diffs.len().saturating_sub(start));
    let mut response = Vec::with_capacity(diffs.len().saturating_sub(start));

    for t in start..diffs.len() {
        let mut row = Vec::with_capacity(lag + 2);
        row.push(1.0);
        row.push(series[t]);
        row.extend((1..=lag).map(|i| diffs[t - i]));
        design.push(row);
        response.push(diffs[t]);
    }

    (design, response)
}

/// t-statistic for the level coefficient.
///
/// An exact fit leaves no residual variance, which happens when the series is
/// a deterministic function of time (a polynomial, a geometric path or a pure
/// sinusoid). Such a series has no stochastic error to test against, and its
/// mean moves with time, so the statistic is reported as zero and the unit
/// root is not rejected.
fn level_t_statistic(fit: &OlsFit, response: &[f64]) -> f64 {
    let total: f64 = response.iter().map(|d| d * d).sum();
    if fit.rss <= 1e-10 * total {
        return 0.0;
    }

    fit.coefficients[1] / fit.std_errors[1]
}

/// MacKinnon (1994) approximate p-value for the constant-only ADF statistic.
pub fn mackinnon_p_value(statistic: f64) -> Result<f64> {
    if statistic.is_nan() {
        return Err(MathError::CalculationError(
            "ADF statistic is NaN".to_string(),
        ));
    }
    if statistic > TAU_MAX {
        return Ok(1.0);
    }
    if statistic < TAU_MIN {
        return Ok(0.0);
    }

    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    let z = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * statistic + c);

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| MathError::CalculationError(format!("Normal distribution: {}", e)))?;
    Ok(normal.cdf(z).clamp(0.0, 1.0))
}

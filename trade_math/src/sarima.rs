//! Seasonal ARIMA estimated by conditional sum of squares
//!
//! The series is differenced `d` times at lag 1 and `D` times at the seasonal
//! lag, then an ARMA model with multiplicative seasonal polynomials is fitted
//! to what remains:
//!
//! `phi(B) Phi(B^s) (w_t - mu) = theta(B) Theta(B^s) e_t`
//!
//! A mean `mu` is only estimated when no differencing is applied.
//! Coefficients are found with Nelder-Mead; parameter sets whose AR part is
//! explosive or whose MA part is not invertible are rejected inside the
//! objective so the search stays in the admissible region.

use crate::optimization::{nelder_mead, SimplexOptions};
use crate::{ensure_finite, MathError, Result};
use serde::{Deserialize, Serialize};

/// Model orders `(p, d, q) x (P, D, Q, s)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SarimaSpec {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
}

impl SarimaSpec {
    pub fn new(order: (usize, usize, usize), seasonal: (usize, usize, usize, usize)) -> Self {
        Self {
            p: order.0,
            d: order.1,
            q: order.2,
            seasonal_p: seasonal.0,
            seasonal_d: seasonal.1,
            seasonal_q: seasonal.2,
            period: seasonal.3,
        }
    }

    /// Plain ARIMA(p, d, q)
    pub fn non_seasonal(p: usize, d: usize, q: usize) -> Self {
        Self::new((p, d, q), (0, 0, 0, 0))
    }

    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    pub fn seasonal_order(&self) -> (usize, usize, usize, usize) {
        (self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period)
    }

    pub fn has_seasonal_terms(&self) -> bool {
        self.seasonal_p + self.seasonal_d + self.seasonal_q > 0
    }

    /// Whether a mean term is estimated
    pub fn includes_constant(&self) -> bool {
        self.d + self.seasonal_d == 0
    }

    /// Number of estimated coefficients, excluding the innovation variance
    pub fn n_params(&self) -> usize {
        usize::from(self.includes_constant())
            + self.p
            + self.seasonal_p
            + self.q
            + self.seasonal_q
    }

    fn seasonal_lag(&self) -> usize {
        if self.has_seasonal_terms() {
            self.period
        } else {
            0
        }
    }

    /// Highest lag of the expanded AR polynomial
    fn ar_degree(&self) -> usize {
        self.p + self.seasonal_p * self.seasonal_lag()
    }

    fn ma_degree(&self) -> usize {
        self.q + self.seasonal_q * self.seasonal_lag()
    }

    /// Observations consumed by differencing
    fn differencing_loss(&self) -> usize {
        self.d + self.seasonal_d * self.seasonal_lag()
    }

    fn validate(&self) -> Result<()> {
        if self.has_seasonal_terms() && self.period < 2 {
            return Err(MathError::InvalidInput(format!(
                "Seasonal period must be at least 2 when seasonal terms are used, got {}",
                self.period
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for SarimaSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SARIMA({},{},{})x({},{},{},{})",
            self.p, self.d, self.q, self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period
        )
    }
}

/// Estimated model, ready to forecast
#[derive(Debug, Clone)]
pub struct SarimaFit {
    pub spec: SarimaSpec,
    /// Mean of the differenced series (zero when no constant is fitted)
    pub mean: f64,
    pub ar: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    /// Innovation variance
    pub sigma2: f64,
    /// Conditional sum of squares at the optimum
    pub css: f64,
    pub aic: f64,
    /// Residuals entering the sum of squares
    pub n_effective: usize,
    pub converged: bool,
    pub iterations: usize,
    observations: usize,
    levels: Vec<Vec<f64>>,
    lags: Vec<usize>,
    ar_poly: Vec<f64>,
    ma_poly: Vec<f64>,
    residuals: Vec<f64>,
}

/// Unpacked parameter vector
struct Coefficients<'a> {
    mean: f64,
    ar: &'a [f64],
    seasonal_ar: &'a [f64],
    ma: &'a [f64],
    seasonal_ma: &'a [f64],
}

impl<'a> Coefficients<'a> {
    fn unpack(spec: &SarimaSpec, params: &'a [f64]) -> Self {
        let (mean, rest) = if spec.includes_constant() {
            (params[0], &params[1..])
        } else {
            (0.0, params)
        };
        let (ar, rest) = rest.split_at(spec.p);
        let (seasonal_ar, rest) = rest.split_at(spec.seasonal_p);
        let (ma, seasonal_ma) = rest.split_at(spec.q);
        Self {
            mean,
            ar,
            seasonal_ar,
            ma,
            seasonal_ma,
        }
    }

    /// Lag weights `a_k` such that `w_t - mu = sum_k a_k (w_{t-k} - mu) + ...`
    fn ar_polynomial(&self, period: usize) -> Vec<f64> {
        let regular = lag_polynomial(self.ar, 1, -1.0);
        let seasonal = lag_polynomial(self.seasonal_ar, period, -1.0);
        multiply(&regular, &seasonal)
            .into_iter()
            .skip(1)
            .map(|c| -c)
            .collect()
    }

    /// Lag weights `b_k` such that the noise term is `e_t + sum_k b_k e_{t-k}`
    fn ma_polynomial(&self, period: usize) -> Vec<f64> {
        let regular = lag_polynomial(self.ma, 1, 1.0);
        let seasonal = lag_polynomial(self.seasonal_ma, period, 1.0);
        multiply(&regular, &seasonal).into_iter().skip(1).collect()
    }
}

/// `1 + sign * sum_i c_i B^(i * step)` as a dense coefficient vector
fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        if *x == 0.0 {
            continue;
        }
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Whether `1 - sum_k phi_k B^k` has every root strictly outside the unit circle.
///
/// Levinson step-down: the polynomial is stable iff every reflection
/// coefficient met while lowering the order has modulus below one.
fn is_stable(phi: &[f64]) -> bool {
    if phi.iter().any(|c| !c.is_finite()) {
        return false;
    }

    let mut a = phi.to_vec();
    while let Some(&r) = a.last() {
        if r.abs() >= 1.0 {
            return false;
        }
        let k = a.len();
        let scale = 1.0 - r * r;
        let lowered: Vec<f64> = (0..k - 1)
            .map(|j| (a[j] + r * a[k - 2 - j]) / scale)
            .collect();
        a = lowered;
    }
    true
}

/// Stationary AR part and invertible MA part
fn is_admissible(ar_poly: &[f64], ma_poly: &[f64]) -> bool {
    let ma_as_ar: Vec<f64> = ma_poly.iter().map(|b| -b).collect();
    is_stable(ar_poly) && is_stable(&ma_as_ar)
}

/// Conditional residuals, zero for the first `ar_poly.len()` observations
fn conditional_residuals(series: &[f64], mean: f64, ar_poly: &[f64], ma_poly: &[f64]) -> Vec<f64> {
    let start = ar_poly.len();
    let mut residuals = vec![0.0; series.len()];

    for t in start..series.len() {
        let ar_part: f64 = ar_poly
            .iter()
            .enumerate()
            .map(|(k, a)| a * (series[t - k - 1] - mean))
            .sum();
        let ma_part: f64 = ma_poly
            .iter()
            .enumerate()
            .take(t)
            .map(|(k, b)| b * residuals[t - k - 1])
            .sum();
        residuals[t] = series[t] - mean - ar_part - ma_part;
    }

    residuals
}

/// Apply each lag in turn, returning every intermediate level
fn difference_levels(series: &[f64], lags: &[usize]) -> Vec<Vec<f64>> {
    let mut levels = Vec::with_capacity(lags.len() + 1);
    levels.push(series.to_vec());
    for &lag in lags {
        let prev = &levels[levels.len() - 1];
        let next: Vec<f64> = prev
            .iter()
            .skip(lag)
            .zip(prev.iter())
            .map(|(curr, back)| curr - back)
            .collect();
        levels.push(next);
    }
    levels
}

/// Fit `spec` to `series` by conditional sum of squares.
///
/// Fails with `InvalidInput` for inconsistent orders or non-finite data,
/// `InsufficientData` when differencing leaves too few observations, and
/// `CalculationError` when no admissible parameters can be found.
pub fn fit_sarima(series: &[f64], spec: SarimaSpec) -> Result<SarimaFit> {
    spec.validate()?;
    ensure_finite(series)?;

    let n_params = spec.n_params();
    let required = spec.differencing_loss() + spec.ar_degree() + n_params + 1;
    if series.len() < required {
        return Err(MathError::InsufficientData(format!(
            "{} needs at least {} observations, have {}",
            spec,
            required,
            series.len()
        )));
    }

    let lags: Vec<usize> = std::iter::repeat(1)
        .take(spec.d)
        .chain(std::iter::repeat(spec.seasonal_lag()).take(spec.seasonal_d))
        .collect();
    let levels = difference_levels(series, &lags);
    let working = &levels[levels.len() - 1];
    let n_effective = working.len() - spec.ar_degree();

    let period = spec.seasonal_lag();
    log::debug!(
        "Fitting {} on {} differenced observations (AR lags {}, MA lags {})",
        spec,
        working.len(),
        spec.ar_degree(),
        spec.ma_degree()
    );
    let objective = |params: &[f64]| -> f64 {
        let coefs = Coefficients::unpack(&spec, params);
        let ar_poly = coefs.ar_polynomial(period);
        let ma_poly = coefs.ma_polynomial(period);
        if !is_admissible(&ar_poly, &ma_poly) {
            return f64::INFINITY;
        }
        conditional_residuals(working, coefs.mean, &ar_poly, &ma_poly)
            .iter()
            .map(|e| e * e)
            .sum()
    };

    let mut start = Vec::with_capacity(n_params);
    if spec.includes_constant() {
        start.push(working.iter().sum::<f64>() / working.len() as f64);
    }
    for block in [spec.p, spec.seasonal_p, spec.q, spec.seasonal_q] {
        start.extend((0..block).map(|i| 0.1 / (i + 1) as f64));
    }

    let options = SimplexOptions {
        max_iterations: 500 * n_params.max(1),
        tolerance: 1e-8,
        initial_step: 0.1,
    };
    let minimum = nelder_mead(objective, &start, &options);

    if !minimum.converged {
        log::warn!(
            "{} did not converge after {} iterations; using best parameters found",
            spec,
            minimum.iterations
        );
    }
    if !minimum.value.is_finite() {
        return Err(MathError::CalculationError(format!(
            "{} has no admissible parameters for this series",
            spec
        )));
    }

    let coefs = Coefficients::unpack(&spec, &minimum.point);
    let ar_poly = coefs.ar_polynomial(period);
    let ma_poly = coefs.ma_polynomial(period);
    if !is_admissible(&ar_poly, &ma_poly) {
        return Err(MathError::CalculationError(format!(
            "{} estimate is explosive or not invertible",
            spec
        )));
    }

    let residuals = conditional_residuals(working, coefs.mean, &ar_poly, &ma_poly);
    let css = minimum.value;
    let sigma2 = css / n_effective as f64;
    let log_likelihood = if sigma2 > 0.0 {
        -0.5 * n_effective as f64 * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0)
    } else {
        f64::INFINITY
    };
    let aic = -2.0 * log_likelihood + 2.0 * (n_params + 1) as f64;

    log::debug!(
        "{} fitted: css={:.6}, sigma2={:.6}, aic={:.3}, iterations={}",
        spec,
        css,
        sigma2,
        aic,
        minimum.iterations
    );

    Ok(SarimaFit {
        spec,
        mean: coefs.mean,
        ar: coefs.ar.to_vec(),
        seasonal_ar: coefs.seasonal_ar.to_vec(),
        ma: coefs.ma.to_vec(),
        seasonal_ma: coefs.seasonal_ma.to_vec(),
        sigma2,
        css,
        aic,
        n_effective,
        converged: minimum.converged,
        iterations: minimum.iterations,
        observations: series.len(),
        levels,
        lags,
        ar_poly,
        ma_poly,
        residuals,
    })
}

impl SarimaFit {
    /// Point forecasts for the next `horizon` steps on the original scale.
    ///
    /// Future shocks are set to zero and the differencing is undone step by
    /// step from the last observed values.
    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        if horizon == 0 {
            return Ok(Vec::new());
        }

        let working = &self.levels[self.levels.len() - 1];
        let n = working.len();
        let mut values = working.clone();
        let mut shocks = self.residuals.clone();

        for t in n..n + horizon {
            let ar_part: f64 = self
                .ar_poly
                .iter()
                .enumerate()
                .map(|(k, a)| a * (values[t - k - 1] - self.mean))
                .sum();
            let ma_part: f64 = self
                .ma_poly
                .iter()
                .enumerate()
                .take(t)
                .map(|(k, b)| b * shocks[t - k - 1])
                .sum();
            values.push(self.mean + ar_part + ma_part);
            shocks.push(0.0);
        }

        let mut path = values[n..].to_vec();
        for (level, &lag) in self.levels.iter().zip(&self.lags).rev() {
            let mut history = level.clone();
            for step in &path {
                let base = history[history.len() - lag];
                history.push(step + base);
            }
            path = history[level.len()..].to_vec();
        }

        if let Some(idx) = path.iter().position(|v| !v.is_finite()) {
            return Err(MathError::CalculationError(format!(
                "{} forecast diverged at step {}",
                self.spec,
                idx + 1
            )));
        }

        Ok(path)
    }

    /// One-step-ahead in-sample predictions aligned with the fitted series.
    ///
    /// Positions consumed by differencing or by the AR start-up are `None`.
    pub fn fitted_values(&self) -> Vec<Option<f64>> {
        let offset = self.spec.differencing_loss();
        let start = offset + self.ar_poly.len();
        let observed = &self.levels[0];

        (0..self.observations)
            .map(|t| {
                if t < start {
                    None
                } else {
                    Some(observed[t] - self.residuals[t - offset])
                }
            })
            .collect()
    }

    /// Conditional residuals of the differenced series
    pub fn residuals(&self) -> &[f64] {
        &self.residuals[self.ar_poly.len()..]
    }
}

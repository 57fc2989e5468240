//! Ordinary least squares for small dense regressions.
//!
//! Used by the unit-root test, where the design matrix has a handful of
//! columns and a few hundred to a few thousand rows.

use crate::{MathError, Result};

/// Fitted OLS regression
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Coefficient per design column, in column order
    pub coefficients: Vec<f64>,
    /// Standard error per coefficient
    pub std_errors: Vec<f64>,
    /// Residual sum of squares
    pub rss: f64,
    /// Number of observations (rows)
    pub n_obs: usize,
}

impl OlsFit {
    /// Residual variance estimate `rss / (n - k)`
    pub fn sigma2(&self) -> f64 {
        let dof = self.n_obs.saturating_sub(self.coefficients.len());
        if dof == 0 {
            return f64::NAN;
        }
        self.rss / dof as f64
    }

    /// Akaike information criterion from the Gaussian log-likelihood
    pub fn aic(&self) -> f64 {
        let n = self.n_obs as f64;
        let rss = self.rss.max(f64::MIN_POSITIVE);
        let llf = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (rss / n).ln() + 1.0);
        -2.0 * llf + 2.0 * self.coefficients.len() as f64
    }
}

/// Regress `y` on the rows of `design`.
///
/// Every row must have the same number of columns. Intercepts are not added
/// implicitly; include a column of ones when one is wanted.
pub fn ols(design: &[Vec<f64>], y: &[f64]) -> Result<OlsFit> {
    let n = y.len();
    if design.len() != n {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but response has {}",
            design.len(),
            n
        )));
    }

    let k = design.first().map(Vec::len).unwrap_or(0);
    if k == 0 {
        return Err(MathError::InvalidInput(
            "Design matrix has no columns".to_string(),
        ));
    }
    if design.iter().any(|row| row.len() != k) {
        return Err(MathError::InvalidInput(
            "Design matrix rows have different lengths".to_string(),
        ));
    }
    if n < k {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} observations for {} regressors, have {}",
            k, k, n
        )));
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &target) in design.iter().zip(y) {
        for i in 0..k {
            xty[i] += row[i] * target;
            for j in i..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
    }

    let inverse = invert(&xtx)?;

    let coefficients: Vec<f64> = (0..k)
        .map(|i| (0..k).map(|j| inverse[i][j] * xty[j]).sum())
        .collect();

    let rss: f64 = design
        .iter()
        .zip(y)
        .map(|(row, &target)| {
            let fitted: f64 = row.iter().zip(&coefficients).map(|(x, b)| x * b).sum();
            (target - fitted).powi(2)
        })
        .sum();

    let dof = n - k;
    let sigma2 = if dof > 0 { rss / dof as f64 } else { f64::NAN };
    let std_errors = (0..k)
        .map(|i| (sigma2 * inverse[i][i]).max(0.0).sqrt())
        .collect();

    Ok(OlsFit {
        coefficients,
        std_errors,
        rss,
        n_obs: n,
    })
}

/// Gauss-Jordan inverse with partial pivoting
fn invert(matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let k = matrix.len();
    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let mut inv: Vec<Vec<f64>> = (0..k)
        .map(|i| (0..k).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let scale = matrix
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    for col in 0..k {
        let pivot_row = (col..k)
            .max_by(|&r1, &r2| {
                a[r1][col]
                    .abs()
                    .partial_cmp(&a[r2][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if a[pivot_row][col].abs() <= 1e-12 * scale {
            return Err(MathError::CalculationError(
                "Design matrix is singular".to_string(),
            ));
        }

        a.swap(col, pivot_row);
        inv.swap(col, pivot_row);

        let pivot = a[col][col];
        for j in 0..k {
            a[col][j] /= pivot;
            inv[col][j] /= pivot;
        }

        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..k {
                a[row][j] -= factor * a[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }

    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_line() {
        let design: Vec<Vec<f64>> = (0..10).map(|i| vec![1.0, i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| 2.0 + 3.0 * i as f64).collect();

        let fit = ols(&design, &y).unwrap();

        assert_relative_eq!(fit.coefficients[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.coefficients[1], 3.0, epsilon = 1e-9);
        assert!(fit.rss < 1e-12);
        assert_eq!(fit.n_obs, 10);
    }

    #[test]
    fn test_standard_errors_positive_with_noise() {
        let design: Vec<Vec<f64>> = (0..20).map(|i| vec![1.0, i as f64]).collect();
        let y: Vec<f64> = (0..20)
            .map(|i| 1.0 + 0.5 * i as f64 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();

        let fit = ols(&design, &y).unwrap();

        assert!(fit.std_errors.iter().all(|se| *se > 0.0));
        assert!(fit.sigma2() > 0.0);
        assert!(fit.aic().is_finite());
    }

    #[test]
    fn test_singular_design() {
        let design: Vec<Vec<f64>> = (0..5).map(|_| vec![1.0, 1.0]).collect();
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        assert!(matches!(
            ols(&design, &y),
            Err(MathError::CalculationError(_))
        ));
    }

    #[test]
    fn test_shape_errors() {
        assert!(ols(&[vec![1.0]], &[1.0, 2.0]).is_err());
        assert!(ols(&[vec![1.0, 2.0], vec![1.0]], &[1.0, 2.0]).is_err());
        assert!(matches!(
            ols(&[vec![1.0, 2.0, 3.0]], &[1.0]),
            Err(MathError::InsufficientData(_))
        ));
    }
}

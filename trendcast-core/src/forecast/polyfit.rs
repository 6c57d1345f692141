//! Ordinary least-squares polynomial fit.
//!
//! The fit runs on centred and scaled abscissae `t = (x - center) / scale`,
//! so `t` lies in [-1, 1]. Proleptic day ordinals are around 7.4e5 and their
//! squares around 5.5e11; solving the normal equations on raw ordinals loses
//! most of the mantissa. The model keeps the centred form for evaluation and
//! expands to raw-unit coefficients only on request.

use super::ForecastError;
use serde::{Deserialize, Serialize};

/// Relative pivot tolerance for the normal-equation solve.
const PIVOT_EPSILON: f64 = 1e-12;

/// A fitted polynomial `y = sum(beta_k * t^k)` with `t = (x - center) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialModel {
    /// Coefficients in the centred variable, lowest power first.
    beta: Vec<f64>,
    center: f64,
    scale: f64,
}

impl PolynomialModel {
    /// Fit a polynomial of the given degree to `(xs[i], ys[i])` pairs.
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Self, ForecastError> {
        if xs.len() != ys.len() {
            return Err(ForecastError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(ForecastError::NonFinite);
        }

        let required = degree + 1;
        let distinct = count_distinct(xs);
        if distinct < required {
            return Err(ForecastError::InsufficientData { required, distinct });
        }

        let n = xs.len() as f64;
        let center = xs.iter().sum::<f64>() / n;
        let scale = xs
            .iter()
            .map(|x| (x - center).abs())
            .fold(0.0_f64, f64::max);
        // Only reachable for degree 0 with a single distinct x.
        let scale = if scale > 0.0 { scale } else { 1.0 };

        // Power sums: moments[p] = sum(t^p) for p in 0..=2*degree.
        let mut moments = vec![0.0; 2 * degree + 1];
        let mut rhs = vec![0.0; required];
        for (&x, &y) in xs.iter().zip(ys) {
            let t = (x - center) / scale;
            let mut tp = 1.0;
            for (p, m) in moments.iter_mut().enumerate() {
                *m += tp;
                if p < required {
                    rhs[p] += tp * y;
                }
                tp *= t;
            }
        }

        let mut normal = vec![vec![0.0; required]; required];
        for (j, row) in normal.iter_mut().enumerate() {
            for (k, cell) in row.iter_mut().enumerate() {
                *cell = moments[j + k];
            }
        }

        let beta = solve_linear(normal, rhs)?;
        Ok(Self {
            beta,
            center,
            scale,
        })
    }

    pub fn degree(&self) -> usize {
        self.beta.len().saturating_sub(1)
    }

    /// Evaluate the polynomial at a raw abscissa.
    pub fn evaluate(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.scale;
        self.beta.iter().rev().fold(0.0, |acc, &b| acc * t + b)
    }

    /// Coefficients in raw `x` units, highest power first.
    pub fn coefficients(&self) -> Vec<f64> {
        let len = self.beta.len();
        let mut ascending = vec![0.0; len];
        // (x - c)^k / s^k = sum_i C(k, i) x^i (-c)^(k-i) / s^k
        for (k, &b) in self.beta.iter().enumerate() {
            let weight = b / self.scale.powi(k as i32);
            let mut binom = 1.0;
            for (i, coeff) in ascending.iter_mut().enumerate().take(k + 1) {
                *coeff += weight * binom * (-self.center).powi((k - i) as i32);
                binom = binom * (k - i) as f64 / (i + 1) as f64;
            }
        }
        ascending.reverse();
        ascending
    }
}

/// Count distinct values; exact float equality, as ordinals are integral.
fn count_distinct(xs: &[f64]) -> usize {
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

/// Gaussian elimination with partial pivoting.
fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, ForecastError> {
    let n = b.len();
    let magnitude = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |m, v| m.max(v.abs()));
    let tolerance = PIVOT_EPSILON * magnitude.max(1.0);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() <= tolerance {
            return Err(ForecastError::SingularFit);
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

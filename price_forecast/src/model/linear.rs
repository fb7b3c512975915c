//! Ordinary least squares with intercept.
//!
//! Predictors are standardized and the target centered before solving the
//! normal equations, which keeps the system well scaled when raw volume sits
//! seven orders of magnitude above percentage features. Coefficients are
//! mapped back to the raw feature scale after the solve.

use ndarray::{Array1, Array2, Axis};

use crate::{dataset::Dataset, errors::TrainingError};

/// Added to the diagonal of `Z'Z` so exactly collinear columns still factor.
const RIDGE: f64 = 1e-10;
const PIVOT_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    pub intercept: f64,
    pub coefficients: Array1<f64>,
}

impl LinearRegression {
    pub fn fit(data: &Dataset) -> Result<Self, TrainingError> {
        let n = data.n_samples();
        let p = data.n_features();
        if n == 0 {
            return Err(TrainingError::NotEnoughRows {
                required: 1,
                actual: 0,
            });
        }

        let x = to_matrix(&data.features, p)?;
        let y = Array1::from_vec(data.targets.clone());

        let means = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(p));
        let stds = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > PIVOT_EPS { s } else { 1.0 });
        let y_mean = y.mean().unwrap_or(0.0);

        let z = (&x - &means) / &stds;
        let yc = &y - y_mean;

        let mut ztz = z.t().dot(&z);
        for i in 0..p {
            ztz[[i, i]] += RIDGE;
        }
        let zty = z.t().dot(&yc);

        let beta = cholesky_solve(&ztz, &zty).or_else(|| gaussian_solve(&ztz, &zty));
        let beta = beta.ok_or(TrainingError::SingularSystem)?;

        let coefficients = &beta / &stds;
        let intercept = y_mean - coefficients.dot(&means);

        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn predict_one(&self, features: &[f64]) -> f64 {
        self.intercept
            + features
                .iter()
                .zip(self.coefficients.iter())
                .map(|(x, b)| x * b)
                .sum::<f64>()
    }
}

fn to_matrix(rows: &[Vec<f64>], p: usize) -> Result<Array2<f64>, TrainingError> {
    if let Some(bad) = rows.iter().find(|r| r.len() != p) {
        return Err(TrainingError::ShapeMismatch {
            expected: p,
            actual: bad.len(),
        });
    }
    Ok(Array2::from_shape_fn((rows.len(), p), |(i, j)| rows[i][j]))
}

/// Solves `a x = b` for symmetric positive definite `a`.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // L' x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// Gaussian elimination with partial pivoting.
fn gaussian_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut m = a.clone();
    let mut rhs = b.clone();

    for col in 0..n {
        let pivot = (col..n).max_by(|&r, &s| m[[r, col]].abs().total_cmp(&m[[s, col]].abs()))?;
        if m[[pivot, col]].abs() < PIVOT_EPS {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                m.swap([col, k], [pivot, k]);
            }
            rhs.swap(col, pivot);
        }
        for row in col + 1..n {
            let factor = m[[row, col]] / m[[col, col]];
            for k in col..n {
                m[[row, k]] -= factor * m[[col, k]];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|j| m[[i, j]] * x[j]).sum();
        x[i] = (rhs[i] - sum) / m[[i, i]];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_linear_relation() {
        // y = 3 + 2 x0 - 0.5 x1
        let features: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, ((i * 7) % 11) as f64])
            .collect();
        let targets = features.iter().map(|r| 3.0 + 2.0 * r[0] - 0.5 * r[1]).collect();
        let model = LinearRegression::fit(&Dataset { features, targets }).unwrap();

        assert!((model.intercept - 3.0).abs() < 1e-6);
        assert!((model.coefficients[0] - 2.0).abs() < 1e-6);
        assert!((model.coefficients[1] + 0.5).abs() < 1e-6);
        assert!((model.predict_one(&[100.0, 4.0]) - 201.0).abs() < 1e-5);
    }

    #[test]
    fn constant_and_duplicate_columns_still_fit() {
        let features: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![5.0, i as f64, i as f64])
            .collect();
        let targets = (0..10).map(|i| 1.0 + i as f64).collect();
        let model = LinearRegression::fit(&Dataset { features, targets }).unwrap();
        assert!((model.predict_one(&[5.0, 4.0, 4.0]) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let data = Dataset {
            features: vec![vec![1.0, 2.0], vec![1.0]],
            targets: vec![1.0, 2.0],
        };
        assert!(matches!(
            LinearRegression::fit(&data),
            Err(TrainingError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn gaussian_fallback_solves_small_system() {
        let a = Array2::from_shape_vec((2, 2), vec![0.0, 1.0, 2.0, 1.0]).unwrap();
        let b = Array1::from_vec(vec![1.0, 3.0]);
        assert!(cholesky_solve(&a, &b).is_none());
        let x = gaussian_solve(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 1.0).abs() < 1e-12);
    }
}

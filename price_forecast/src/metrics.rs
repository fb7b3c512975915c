//! Held-out regression metrics.

use serde::Serialize;

/// Predictions and error metrics over the test partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub predictions: Vec<f64>,
    pub actuals: Vec<f64>,
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
}

impl EvaluationResult {
    pub fn new(actuals: Vec<f64>, predictions: Vec<f64>) -> Self {
        let mse = mean_squared_error(&actuals, &predictions);
        Self {
            rmse: mse.sqrt(),
            r2: r_squared(&actuals, &predictions),
            mse,
            predictions,
            actuals,
        }
    }

    /// `actual - predicted` per test row.
    pub fn errors(&self) -> impl Iterator<Item = f64> + '_ {
        self.actuals
            .iter()
            .zip(&self.predictions)
            .map(|(a, p)| a - p)
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// With a constant target (`SS_tot == 0`) this is 1 for a perfect fit and 0
/// otherwise. Never exceeds 1.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - ss_res / ss_tot).min(1.0)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn perfect_fit() {
        let eval = EvaluationResult::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]);
        assert_eq!(eval.mse, 0.0);
        assert_eq!(eval.rmse, 0.0);
        assert_eq!(eval.r2, 1.0);
    }

    #[test]
    fn mean_prediction_scores_zero() {
        let eval = EvaluationResult::new(vec![1.0, 2.0, 3.0], vec![2.0, 2.0, 2.0]);
        assert!((eval.mse - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(eval.r2, 0.0);
    }

    #[test]
    fn constant_target() {
        assert_eq!(r_squared(&[4.0, 4.0], &[4.0, 4.0]), 1.0);
        assert_eq!(r_squared(&[4.0, 4.0], &[3.0, 4.0]), 0.0);
    }

    #[test]
    fn errors_are_actual_minus_predicted() {
        let eval = EvaluationResult::new(vec![10.0, 5.0], vec![8.0, 6.0]);
        assert_eq!(eval.errors().collect::<Vec<_>>(), vec![2.0, -1.0]);
    }

    proptest! {
        #[test]
        fn r2_bounded_and_rmse_is_root_of_mse(
            pairs in proptest::collection::vec((-1e4f64..1e4, -1e4f64..1e4), 1..50)
        ) {
            let (actual, predicted): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            let eval = EvaluationResult::new(actual, predicted);
            prop_assert!(eval.r2 <= 1.0);
            prop_assert!((eval.rmse - eval.mse.sqrt()).abs() <= 1e-12 * eval.mse.sqrt().max(1.0));
        }
    }
}

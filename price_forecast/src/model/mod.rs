//! The closed set of regressors a run can train.

pub mod forest;
pub mod linear;
pub mod tree;

use std::{fmt, ops::RangeInclusive};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    dataset::{DEFAULT_SEED, Dataset},
    errors::TrainingError,
    features::FEATURE_COLUMNS,
};

use self::{forest::RandomForest, linear::LinearRegression, tree::DecisionTree};

pub const MAX_DEPTH_RANGE: RangeInclusive<usize> = 3..=50;
pub const N_ESTIMATORS_RANGE: RangeInclusive<usize> = 10..=500;
pub const DEFAULT_TREE_DEPTH: usize = 5;
pub const DEFAULT_FOREST_DEPTH: usize = 10;
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// A hyperparameter fell outside its allowed range.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{name} must be between {min} and {max}, got {value}")]
pub struct InvalidModelSpec {
    pub name: &'static str,
    pub value: usize,
    pub min: usize,
    pub max: usize,
}

/// Model kind plus its kind-specific hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    #[serde(rename = "linear_regression")]
    Linear,
    DecisionTree {
        max_depth: usize,
    },
    RandomForest {
        n_estimators: usize,
        max_depth: usize,
    },
}

impl ModelSpec {
    pub fn decision_tree() -> Self {
        ModelSpec::DecisionTree {
            max_depth: DEFAULT_TREE_DEPTH,
        }
    }

    pub fn random_forest() -> Self {
        ModelSpec::RandomForest {
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_depth: DEFAULT_FOREST_DEPTH,
        }
    }

    /// Snake-case name used in file names and reports.
    pub fn slug(&self) -> &'static str {
        match self {
            ModelSpec::Linear => "linear_regression",
            ModelSpec::DecisionTree { .. } => "decision_tree",
            ModelSpec::RandomForest { .. } => "random_forest",
        }
    }

    pub fn validate(&self) -> Result<(), InvalidModelSpec> {
        match *self {
            ModelSpec::Linear => Ok(()),
            ModelSpec::DecisionTree { max_depth } => {
                check("max_depth", max_depth, &MAX_DEPTH_RANGE)
            }
            ModelSpec::RandomForest {
                n_estimators,
                max_depth,
            } => {
                check("n_estimators", n_estimators, &N_ESTIMATORS_RANGE)?;
                check("max_depth", max_depth, &MAX_DEPTH_RANGE)
            }
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSpec::Linear => write!(f, "Linear Regression"),
            ModelSpec::DecisionTree { max_depth } => {
                write!(f, "Decision Tree (max_depth={max_depth})")
            }
            ModelSpec::RandomForest {
                n_estimators,
                max_depth,
            } => write!(
                f,
                "Random Forest (n_estimators={n_estimators}, max_depth={max_depth})"
            ),
        }
    }
}

fn check(
    name: &'static str,
    value: usize,
    range: &RangeInclusive<usize>,
) -> Result<(), InvalidModelSpec> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(InvalidModelSpec {
            name,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

/// A fitted regressor of one of the supported kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Estimator {
    Linear(LinearRegression),
    Tree(DecisionTree),
    Forest(RandomForest),
}

impl Estimator {
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        match self {
            Estimator::Linear(m) => m.predict_one(features),
            Estimator::Tree(m) => m.predict_one(features),
            Estimator::Forest(m) => m.predict_one(features),
        }
    }
}

/// Fitted estimator plus the ordered feature columns it expects.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    pub spec: ModelSpec,
    pub feature_columns: Vec<&'static str>,
    estimator: Estimator,
}

impl TrainedModel {
    /// Fits `spec` on `data`. The spec must already be validated.
    pub fn fit(spec: ModelSpec, data: &Dataset) -> Result<Self, TrainingError> {
        if data.n_features() != FEATURE_COLUMNS.len() {
            return Err(TrainingError::ShapeMismatch {
                expected: FEATURE_COLUMNS.len(),
                actual: data.n_features(),
            });
        }

        let estimator = match spec {
            ModelSpec::Linear => Estimator::Linear(LinearRegression::fit(data)?),
            ModelSpec::DecisionTree { max_depth } => Estimator::Tree(DecisionTree::fit(
                data,
                &tree::TreeParams::new(max_depth, DEFAULT_SEED),
            )),
            ModelSpec::RandomForest {
                n_estimators,
                max_depth,
            } => Estimator::Forest(RandomForest::fit(data, n_estimators, max_depth, DEFAULT_SEED)),
        };

        Ok(Self {
            spec,
            feature_columns: FEATURE_COLUMNS.to_vec(),
            estimator,
        })
    }

    /// Predicts every row; a non-finite prediction is an error.
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, TrainingError> {
        features
            .iter()
            .enumerate()
            .map(|(row, x)| {
                if x.len() != self.feature_columns.len() {
                    return Err(TrainingError::ShapeMismatch {
                        expected: self.feature_columns.len(),
                        actual: x.len(),
                    });
                }
                let y = self.estimator.predict_one(x);
                if y.is_finite() {
                    Ok(y)
                } else {
                    Err(TrainingError::NonFinitePrediction { row })
                }
            })
            .collect()
    }
}

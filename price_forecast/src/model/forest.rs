//! Bagged ensemble of regression trees.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{
    dataset::Dataset,
    model::tree::{DecisionTree, TreeParams},
};

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Grows `n_estimators` trees, tree `i` on a bootstrap sample drawn with
    /// seed `seed + i` and split with the same seed.
    pub fn fit(data: &Dataset, n_estimators: usize, max_depth: usize, seed: u64) -> Self {
        let n = data.n_samples();
        let trees = (0..n_estimators as u64)
            .map(|i| {
                let tree_seed = seed.wrapping_add(i);
                let sample = bootstrap_indices(n, tree_seed);
                DecisionTree::fit_indices(data, &sample, &TreeParams::new(max_depth, tree_seed))
            })
            .collect::<Vec<_>>();
        debug!(trees = trees.len(), rows = n, "forest grown");
        Self { trees }
    }

    /// Mean of the member trees' predictions.
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return f64::NAN;
        }
        self.trees.iter().map(|t| t.predict_one(features)).sum::<f64>() / self.trees.len() as f64
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// `n` row indices drawn uniformly with replacement.
fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

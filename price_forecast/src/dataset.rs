//! Feature matrix and the seeded train/test split.

use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

use crate::features::{FEATURE_COLUMNS, FeatureRow};

/// Seed shared by the split and every seeded estimator.
pub const DEFAULT_SEED: u64 = 42;

/// Share of rows held out for evaluation, expressed as `1 / TEST_DENOMINATOR`.
const TEST_DENOMINATOR: usize = 5;

/// Row-major predictors with their targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

/// Train and test partitions, with the row index of each test sample in the
/// source feature table.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
    pub test_rows: Vec<usize>,
}

impl Dataset {
    pub fn from_rows(rows: &[FeatureRow]) -> Self {
        Self {
            features: rows.iter().map(FeatureRow::feature_vector).collect(),
            targets: rows.iter().map(|r| r.target).collect(),
        }
    }

    pub fn n_samples(&self) -> usize {
        self.targets.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.first().map_or(FEATURE_COLUMNS.len(), Vec::len)
    }

    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }

    /// Random (not chronological) 80/20 partition.
    ///
    /// Row indices are shuffled with `seed`; the first `ceil(n / 5)` shuffled
    /// rows form the test set, in shuffled order.
    pub fn random_split(&self, seed: u64) -> Split {
        let n = self.n_samples();
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));

        let (test_idx, train_idx) = indices.split_at(test_size(n));
        Split {
            train: self.subset(train_idx),
            test: self.subset(test_idx),
            test_rows: test_idx.to_vec(),
        }
    }
}

/// `ceil(0.2 * n)` without going through floating point.
pub fn test_size(n: usize) -> usize {
    n.div_ceil(TEST_DENOMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy(n: usize) -> Dataset {
        Dataset {
            features: (0..n).map(|i| vec![i as f64, 2.0 * i as f64]).collect(),
            targets: (0..n).map(|i| i as f64).collect(),
        }
    }

    #[test]
    fn test_size_rounds_up() {
        assert_eq!(test_size(49), 10);
        assert_eq!(test_size(50), 10);
        assert_eq!(test_size(51), 11);
        assert_eq!(test_size(1), 1);
        assert_eq!(test_size(0), 0);
    }

    #[test]
    fn split_partitions_every_row_once() {
        let data = toy(49);
        let split = data.random_split(DEFAULT_SEED);
        assert_eq!(split.test.n_samples(), 10);
        assert_eq!(split.train.n_samples(), 39);

        let mut seen: Vec<f64> = split
            .train
            .targets
            .iter()
            .chain(&split.test.targets)
            .copied()
            .collect();
        seen.sort_by(f64::total_cmp);
        assert_eq!(seen, data.targets);
    }

    #[test]
    fn split_is_seeded() {
        let data = toy(30);
        let a = data.random_split(DEFAULT_SEED);
        let b = data.random_split(DEFAULT_SEED);
        let c = data.random_split(7);
        assert_eq!(a.test_rows, b.test_rows);
        assert_ne!(a.test_rows, c.test_rows);
    }

    #[test]
    fn test_rows_point_back_into_source() {
        let data = toy(20);
        let split = data.random_split(DEFAULT_SEED);
        for (k, &row) in split.test_rows.iter().enumerate() {
            assert_eq!(split.test.targets[k], data.targets[row]);
        }
    }
}

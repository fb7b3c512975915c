//! CART regression tree with variance-reduction splits.

use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

use crate::dataset::Dataset;

/// Growth limits for a single tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Seeds the feature visiting order, which decides ties between equally
    /// good splits.
    pub seed: u64,
}

impl TreeParams {
    pub fn new(max_depth: usize, seed: u64) -> Self {
        Self {
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    root: Node,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl DecisionTree {
    pub fn fit(data: &Dataset, params: &TreeParams) -> Self {
        let indices: Vec<usize> = (0..data.n_samples()).collect();
        Self::fit_indices(data, &indices, params)
    }

    /// Fits on the rows named by `indices`, which may repeat (bootstrap).
    pub fn fit_indices(data: &Dataset, indices: &[usize], params: &TreeParams) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let root = build(data, indices, 0, params, &mut rng);
        Self { root }
    }

    pub fn predict_one(&self, features: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features.get(*feature).copied().unwrap_or(f64::NAN);
                    node = if x <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Depth of the deepest leaf; a lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        walk(&self.root)
    }

    pub fn n_leaves(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => walk(left) + walk(right),
            }
        }
        walk(&self.root)
    }
}

fn build(
    data: &Dataset,
    indices: &[usize],
    depth: usize,
    params: &TreeParams,
    rng: &mut ChaCha8Rng,
) -> Node {
    let (sum, sum_sq) = indices.iter().fold((0.0, 0.0), |(s, q), &i| {
        let y = data.targets[i];
        (s + y, q + y * y)
    });
    let n = indices.len() as f64;
    let value = if indices.is_empty() { 0.0 } else { sum / n };
    let sse = sum_sq - sum * sum / n.max(1.0);

    if depth >= params.max_depth || indices.len() < params.min_samples_split || sse <= 1e-12 {
        return Node::Leaf { value };
    }

    match best_split(data, indices, sse, params, rng) {
        Some(split) => Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(build(data, &split.left, depth + 1, params, rng)),
            right: Box::new(build(data, &split.right, depth + 1, params, rng)),
        },
        None => Node::Leaf { value },
    }
}

/// Exhaustive search over every feature and every boundary between distinct
/// sorted values, scoring by summed squared error of the two children.
fn best_split(
    data: &Dataset,
    indices: &[usize],
    parent_sse: f64,
    params: &TreeParams,
    rng: &mut ChaCha8Rng,
) -> Option<BestSplit> {
    let mut features: Vec<usize> = (0..data.n_features()).collect();
    features.shuffle(rng);

    let min_leaf = params.min_samples_leaf.max(1);
    let total = indices.len();
    let mut best: Option<(usize, f64, f64)> = None; // feature, threshold, sse

    let mut order: Vec<(f64, f64)> = Vec::with_capacity(total);
    for &f in &features {
        order.clear();
        order.extend(indices.iter().map(|&i| (data.features[i][f], data.targets[i])));
        order.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (all_sum, all_sq) = order
            .iter()
            .fold((0.0, 0.0), |(s, q), &(_, y)| (s + y, q + y * y));
        let (mut left_sum, mut left_sq) = (0.0, 0.0);

        for k in 0..total - 1 {
            let (x, y) = order[k];
            left_sum += y;
            left_sq += y * y;

            let n_left = k + 1;
            let n_right = total - n_left;
            if n_left < min_leaf || n_right < min_leaf || x >= order[k + 1].0 {
                continue;
            }

            let right_sum = all_sum - left_sum;
            let right_sq = all_sq - left_sq;
            let child_sse = (left_sq - left_sum * left_sum / n_left as f64)
                + (right_sq - right_sum * right_sum / n_right as f64);

            if child_sse < parent_sse - 1e-12 && best.is_none_or(|(_, _, b)| child_sse < b) {
                best = Some((f, (x + order[k + 1].0) / 2.0, child_sse));
            }
        }
    }

    let (feature, threshold, _) = best?;
    let (left, right) = indices
        .iter()
        .partition(|&&i| data.features[i][feature] <= threshold);
    Some(BestSplit {
        feature,
        threshold,
        left,
        right,
    })
}

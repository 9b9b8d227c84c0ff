//! Gradient-boosted tree ensemble for binary classification.
//!
//! Logistic objective trained with Newton boosting: per-round gradients
//! `p - y` and hessians `p * (1 - p)`, exact greedy splits maximizing the
//! regularized gain, leaf weights `-G / (H + lambda)` shrunk by the learning
//! rate. Row and column subsampling use a seeded ChaCha20 stream so training
//! is reproducible.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

const HESS_MIN: f64 = 1e-6;
const MIN_SPLIT_GAIN: f64 = 1e-6;

/// Error type for classifier training.
#[derive(Debug, thiserror::Error)]
pub enum GbdtError {
    #[error("Training matrix is empty")]
    EmptyMatrix,

    #[error("Labels length {labels} does not match matrix rows {rows}")]
    LabelShape { labels: usize, rows: usize },

    #[error("Label {0} is not 0 or 1")]
    InvalidLabel(f64),
}

/// Training hyperparameters.
///
/// Defaults follow the deployed model configuration: 300 shallow trees,
/// learning rate 0.05, 80% row and column subsampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtParams {
    /// Number of boosting rounds.
    pub n_trees: usize,
    /// Shrinkage applied to every leaf weight.
    pub learning_rate: f64,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Fraction of rows sampled (without replacement) per round.
    pub subsample: f64,
    /// Fraction of columns sampled per tree.
    pub colsample_bytree: f64,
    /// Minimum hessian sum required on each side of a split.
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights.
    pub lambda: f64,
    /// RNG seed for subsampling.
    pub seed: u64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_trees: 300,
            learning_rate: 0.05,
            max_depth: 5,
            subsample: 0.8,
            colsample_bytree: 0.8,
            min_child_weight: 1.0,
            lambda: 1.0,
            seed: 2025,
        }
    }
}

/// One tree node; trees are stored as flat vectors of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A single regression tree over the preprocessed feature space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Evaluate the tree for one row.
    #[must_use]
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] < *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Fitted gradient-boosted tree ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    base_score: f64,
    trees: Vec<Tree>,
    n_features: usize,
}

impl GradientBoostedTrees {
    /// Fit the ensemble on a dense matrix with labels in {0, 1}.
    ///
    /// # Errors
    /// Returns error on an empty matrix, mismatched label length, or labels
    /// outside {0, 1}.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &GbdtParams) -> Result<Self, GbdtError> {
        let n_rows = x.len();
        if n_rows == 0 || x[0].is_empty() {
            return Err(GbdtError::EmptyMatrix);
        }
        if y.len() != n_rows {
            return Err(GbdtError::LabelShape {
                labels: y.len(),
                rows: n_rows,
            });
        }
        if let Some(&bad) = y.iter().find(|&&l| l != 0.0 && l != 1.0) {
            return Err(GbdtError::InvalidLabel(bad));
        }
        let n_features = x[0].len();

        // Base score is the log-odds of the positive rate.
        let pos = y.iter().sum::<f64>();
        let p = (pos / n_rows as f64).clamp(1e-7, 1.0 - 1e-7);
        let base_score = (p / (1.0 - p)).ln();

        let mut margins = vec![base_score; n_rows];
        let mut gradients = vec![0.0; n_rows];
        let mut hessians = vec![0.0; n_rows];
        let mut rng = ChaCha20Rng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            for i in 0..n_rows {
                let p = sigmoid(margins[i]);
                gradients[i] = p - y[i];
                hessians[i] = (p * (1.0 - p)).max(HESS_MIN);
            }

            let rows = sample_indices(n_rows, params.subsample, &mut rng);
            let columns = sample_indices(n_features, params.colsample_bytree, &mut rng);

            let mut builder = TreeBuilder {
                x,
                gradients: &gradients,
                hessians: &hessians,
                columns: &columns,
                params,
                nodes: Vec::new(),
            };
            builder.grow(rows, 0);
            let tree = Tree {
                nodes: builder.nodes,
            };

            // The subsample shapes the tree; the margin update covers all rows.
            for i in 0..n_rows {
                margins[i] += tree.predict(&x[i]);
            }
            trees.push(tree);
        }

        Ok(Self {
            base_score,
            trees,
            n_features,
        })
    }

    /// Number of input features the ensemble was fitted on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of fitted trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Raw margin (log-odds) for one row.
    #[must_use]
    pub fn predict_margin(&self, row: &[f64]) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }

    /// Probability of the positive class for one row.
    #[must_use]
    pub fn predict_probability(&self, row: &[f64]) -> f64 {
        sigmoid(self.predict_margin(row))
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Random fraction of `0..n` without replacement, sorted. A rate at or above
/// 1.0 selects everything.
fn sample_indices(n: usize, rate: f64, rng: &mut ChaCha20Rng) -> Vec<usize> {
    if rate >= 1.0 {
        return (0..n).collect();
    }
    let keep = ((n as f64 * rate).round() as usize).clamp(1, n);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(keep);
    indices.sort_unstable();
    indices
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    gradients: &'a [f64],
    hessians: &'a [f64],
    columns: &'a [usize],
    params: &'a GbdtParams,
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl TreeBuilder<'_> {
    /// Grow a node over `rows`, returning its index in the node vector.
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let g_sum: f64 = rows.iter().map(|&i| self.gradients[i]).sum();
        let h_sum: f64 = rows.iter().map(|&i| self.hessians[i]).sum();

        let leaf_value =
            self.params.learning_rate * (-g_sum / (h_sum + self.params.lambda));

        if depth >= self.params.max_depth || rows.len() < 2 {
            return self.push_leaf(leaf_value);
        }

        let Some(split) = self.find_best_split(&rows, g_sum, h_sum) else {
            return self.push_leaf(leaf_value);
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&i| self.x[i][split.feature] < split.threshold);

        // Reserve the split slot before recursing so child indices are known.
        let node_idx = self.nodes.len();
        self.nodes.push(Node::Leaf { value: 0.0 });
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_idx
    }

    fn push_leaf(&mut self, value: f64) -> usize {
        self.nodes.push(Node::Leaf { value });
        self.nodes.len() - 1
    }

    fn find_best_split(&self, rows: &[usize], g_sum: f64, h_sum: f64) -> Option<BestSplit> {
        let lambda = self.params.lambda;
        let parent_score = g_sum * g_sum / (h_sum + lambda);
        let mut best: Option<BestSplit> = None;

        for &feature in self.columns {
            let mut ordered: Vec<(f64, f64, f64)> = rows
                .iter()
                .map(|&i| (self.x[i][feature], self.gradients[i], self.hessians[i]))
                .collect();
            ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut g_left = 0.0;
            let mut h_left = 0.0;
            for w in 0..ordered.len() - 1 {
                g_left += ordered[w].1;
                h_left += ordered[w].2;

                // Only cut between distinct values.
                if ordered[w].0 == ordered[w + 1].0 {
                    continue;
                }

                let h_right = h_sum - h_left;
                if h_left < self.params.min_child_weight || h_right < self.params.min_child_weight {
                    continue;
                }

                let g_right = g_sum - g_left;
                let gain = 0.5
                    * (g_left * g_left / (h_left + lambda) + g_right * g_right / (h_right + lambda)
                        - parent_score);
                if gain > MIN_SPLIT_GAIN && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (ordered[w].0 + ordered[w + 1].0) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well-separated clusters with a deterministic layout.
    fn separable_dataset() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let jitter = (i % 7) as f64 / 10.0;
            x.push(vec![1.0 + jitter, 2.0 - jitter]);
            y.push(0.0);
            x.push(vec![6.0 + jitter, 7.0 - jitter]);
            y.push(1.0);
        }
        (x, y)
    }

    fn small_params() -> GbdtParams {
        GbdtParams {
            n_trees: 20,
            max_depth: 3,
            learning_rate: 0.3,
            ..GbdtParams::default()
        }
    }

    #[test]
    fn learns_a_separable_problem() {
        let (x, y) = separable_dataset();
        let model = GradientBoostedTrees::fit(&x, &y, &small_params()).expect("fit");

        assert!(model.predict_probability(&[1.2, 1.8]) < 0.2);
        assert!(model.predict_probability(&[6.2, 6.8]) > 0.8);
    }

    #[test]
    fn probabilities_stay_in_unit_interval() {
        let (x, y) = separable_dataset();
        let model = GradientBoostedTrees::fit(&x, &y, &small_params()).expect("fit");

        for extreme in [[-100.0, -100.0], [100.0, 100.0], [0.0, 0.0]] {
            let p = model.predict_probability(&extreme);
            assert!((0.0..=1.0).contains(&p), "p = {p}");
        }
    }

    #[test]
    fn training_is_reproducible_for_a_fixed_seed() {
        let (x, y) = separable_dataset();
        let params = small_params();
        let a = GradientBoostedTrees::fit(&x, &y, &params).expect("fit");
        let b = GradientBoostedTrees::fit(&x, &y, &params).expect("fit");

        let row = [3.3, 4.1];
        assert!((a.predict_probability(&row) - b.predict_probability(&row)).abs() < 1e-15);
    }

    #[test]
    fn prediction_is_deterministic() {
        let (x, y) = separable_dataset();
        let model = GradientBoostedTrees::fit(&x, &y, &small_params()).expect("fit");
        let row = [2.5, 3.5];
        assert_eq!(
            model.predict_probability(&row).to_bits(),
            model.predict_probability(&row).to_bits()
        );
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            GradientBoostedTrees::fit(&[], &[], &GbdtParams::default()),
            Err(GbdtError::EmptyMatrix)
        ));
        assert!(matches!(
            GradientBoostedTrees::fit(&[vec![1.0]], &[0.0, 1.0], &GbdtParams::default()),
            Err(GbdtError::LabelShape { .. })
        ));
        assert!(matches!(
            GradientBoostedTrees::fit(&[vec![1.0]], &[2.0], &GbdtParams::default()),
            Err(GbdtError::InvalidLabel(_))
        ));
    }

    #[test]
    fn base_score_matches_class_balance() {
        // Single-class-free balanced data: base score is the log-odds of 0.5.
        let x = vec![vec![0.0], vec![1.0]];
        let y = vec![0.0, 1.0];
        let params = GbdtParams {
            n_trees: 0,
            ..GbdtParams::default()
        };
        let model = GradientBoostedTrees::fit(&x, &y, &params).expect("fit");
        assert!(model.predict_margin(&[0.5]).abs() < 1e-12);
        assert!((model.predict_probability(&[0.5]) - 0.5).abs() < 1e-12);
    }
}

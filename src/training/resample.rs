//! Class rebalancing for the training matrix.
//!
//! Both steps operate on the encoded feature matrix between preprocessing
//! and classifier fitting, and only there: they have no transform for
//! unseen rows and nothing from them is serialized into the artifact.
//!
//! [`EditedNearestNeighbours`] cleans the majority class by dropping samples
//! whose neighborhood disagrees with their label. [`BorderlineSmote`] then
//! synthesizes minority samples around the decision boundary until the
//! classes are balanced.

use rand::Rng;
use rand_chacha::ChaCha20Rng;

/// Squared Euclidean distance over encoded feature rows.
fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Indices of the `k` nearest rows to `target` among `candidates`,
/// excluding `skip` (the target's own index, or `usize::MAX` for none).
fn nearest_neighbors(
    target: &[f64],
    candidates: &[Vec<f64>],
    skip: usize,
    k: usize,
) -> Vec<usize> {
    let mut distances: Vec<(usize, f64)> = candidates
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != skip)
        .map(|(i, row)| (i, squared_distance(target, row)))
        .collect();
    distances.sort_by(|a, b| a.1.total_cmp(&b.1));
    distances.truncate(k);
    distances.into_iter().map(|(i, _)| i).collect()
}

fn class_counts(y: &[f64]) -> (usize, usize) {
    let positives = y.iter().filter(|&&v| v == 1.0).count();
    (positives, y.len() - positives)
}

/// Majority-class cleaning by k-nearest-neighbor vote.
#[derive(Debug, Clone, Copy)]
pub struct EditedNearestNeighbours {
    pub n_neighbors: usize,
}

impl Default for EditedNearestNeighbours {
    fn default() -> Self {
        Self { n_neighbors: 3 }
    }
}

impl EditedNearestNeighbours {
    /// Remove majority-class samples whose neighborhood votes against them.
    ///
    /// A majority-class sample is kept only when every one of its
    /// `n_neighbors` nearest neighbors shares its label; a single
    /// disagreeing neighbor removes it. Minority samples are never removed.
    /// Datasets too small to form a neighborhood pass through unchanged.
    pub fn fit_resample(&self, x: &[Vec<f64>], y: &[f64]) -> (Vec<Vec<f64>>, Vec<f64>) {
        if x.len() <= self.n_neighbors + 1 {
            return (x.to_vec(), y.to_vec());
        }

        let (positives, negatives) = class_counts(y);
        let majority_label = if positives > negatives { 1.0 } else { 0.0 };

        let mut kept_x = Vec::with_capacity(x.len());
        let mut kept_y = Vec::with_capacity(y.len());
        for (i, row) in x.iter().enumerate() {
            if y[i] == majority_label {
                let neighbors = nearest_neighbors(row, x, i, self.n_neighbors);
                if neighbors.iter().any(|&j| y[j] != y[i]) {
                    continue;
                }
            }
            kept_x.push(row.clone());
            kept_y.push(y[i]);
        }

        let removed = x.len() - kept_x.len();
        let (pos_after, neg_after) = class_counts(&kept_y);
        tracing::debug!(
            "Neighborhood cleaning removed {removed} samples \
             ({pos_after} resistant, {neg_after} susceptible remain)"
        );

        (kept_x, kept_y)
    }
}

/// Synthetic minority oversampling restricted to borderline samples.
#[derive(Debug, Clone, Copy)]
pub struct BorderlineSmote {
    /// Minority neighbors considered when interpolating a synthetic sample.
    pub k_neighbors: usize,
    /// Full-dataset neighbors consulted for danger-sample detection.
    pub m_neighbors: usize,
}

impl Default for BorderlineSmote {
    fn default() -> Self {
        Self {
            k_neighbors: 5,
            m_neighbors: 10,
        }
    }
}

impl BorderlineSmote {
    /// Oversample the minority class until both classes are equal in size.
    ///
    /// Danger samples are minority rows whose `m_neighbors`-neighborhood in
    /// the full dataset is mostly, but not entirely, majority class. Each
    /// synthetic row interpolates between a danger sample and one of its
    /// `k_neighbors` minority neighbors at a random position. When no sample
    /// qualifies as danger, all minority samples seed the synthesis instead.
    pub fn fit_resample(
        &self,
        x: &[Vec<f64>],
        y: &[f64],
        rng: &mut ChaCha20Rng,
    ) -> (Vec<Vec<f64>>, Vec<f64>) {
        let (positives, negatives) = class_counts(y);
        let (minority_label, deficit) = if positives < negatives {
            (1.0, negatives - positives)
        } else {
            (0.0, positives - negatives)
        };

        let minority: Vec<usize> = (0..y.len()).filter(|&i| y[i] == minority_label).collect();
        if deficit == 0 || minority.len() < 2 {
            return (x.to_vec(), y.to_vec());
        }

        let danger = self.danger_samples(x, y, &minority, minority_label);
        let seeds = if danger.is_empty() { &minority } else { &danger };
        tracing::debug!(
            "Synthesizing {deficit} minority samples from {} seed points",
            seeds.len()
        );

        let minority_rows: Vec<Vec<f64>> = minority.iter().map(|&i| x[i].clone()).collect();
        let mut out_x = x.to_vec();
        let mut out_y = y.to_vec();
        for n in 0..deficit {
            let seed_index = seeds[n % seeds.len()];
            let seed_row = &x[seed_index];
            let neighbors = nearest_neighbors(
                seed_row,
                &minority_rows,
                minority.iter().position(|&i| i == seed_index).unwrap_or(usize::MAX),
                self.k_neighbors.min(minority_rows.len().saturating_sub(1)),
            );
            if neighbors.is_empty() {
                continue;
            }
            let neighbor = &minority_rows[neighbors[rng.gen_range(0..neighbors.len())]];
            let step: f64 = rng.gen_range(0.0..1.0);
            let synthetic = seed_row
                .iter()
                .zip(neighbor)
                .map(|(a, b)| a + step * (b - a))
                .collect();
            out_x.push(synthetic);
            out_y.push(minority_label);
        }

        (out_x, out_y)
    }

    /// Minority samples with at least half, but not all, majority neighbors.
    fn danger_samples(
        &self,
        x: &[Vec<f64>],
        y: &[f64],
        minority: &[usize],
        minority_label: f64,
    ) -> Vec<usize> {
        let k = self.m_neighbors.min(x.len().saturating_sub(1));
        if k == 0 {
            return Vec::new();
        }
        minority
            .iter()
            .copied()
            .filter(|&i| {
                let neighbors = nearest_neighbors(&x[i], x, i, k);
                let majority_count = neighbors
                    .iter()
                    .filter(|&&j| y[j] != minority_label)
                    .count();
                majority_count * 2 >= k && majority_count < k
            })
            .collect()
    }
}

use std::cmp::Ordering;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::Label;

use super::{matrix::Dataset, FeatureError, SparseVector};

/// Synthetic minority oversampling (SMOTE).
///
/// Only ever run on a training split: synthetic rows in an evaluation split
/// would inflate the measured accuracy.
#[derive(Debug, Clone, Copy)]
pub struct Smote {
    pub k_neighbors: usize,
    pub seed: u64,
}

impl Smote {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Self { k_neighbors, seed }
    }

    pub fn fit_resample(&self, data: &Dataset) -> Result<Dataset, FeatureError> {
        let counts = data.class_counts();
        if counts[0] == counts[1] {
            return Ok(data.clone());
        }
        let minority = if counts[0] < counts[1] {
            Label::Ham
        } else {
            Label::Spam
        };
        let members: Vec<usize> = data
            .labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == minority)
            .map(|(idx, _)| idx)
            .collect();
        if members.is_empty() {
            return Err(FeatureError::SingleClass(minority.other()));
        }
        let needed = counts[minority.other().index()] - members.len();

        let neighbors = self.nearest_neighbors(data, &members);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut resampled = data.clone();
        resampled.rows.reserve(needed);
        resampled.labels.reserve(needed);

        for i in 0..needed {
            let slot = i % members.len();
            let base = &data.rows[members[slot]];
            let synthetic = match neighbors[slot].as_slice() {
                [] => base.clone(),
                candidates => {
                    let neighbor = &data.rows[candidates[rng.gen_range(0..candidates.len())]];
                    base.interpolate(neighbor, rng.gen::<f64>())
                }
            };
            resampled.rows.push(synthetic);
            resampled.labels.push(minority);
        }

        tracing::info!(
            target: "features",
            minority = %minority,
            synthetic = needed,
            total = resampled.len(),
            "minority class oversampled"
        );
        Ok(resampled)
    }

    fn nearest_neighbors(&self, data: &Dataset, members: &[usize]) -> Vec<Vec<usize>> {
        let k = self.k_neighbors.min(members.len().saturating_sub(1));
        members
            .iter()
            .map(|&row| {
                let base: &SparseVector = &data.rows[row];
                let mut distances: Vec<(f64, usize)> = members
                    .iter()
                    .filter(|&&other| other != row)
                    .map(|&other| (base.squared_distance(&data.rows[other]), other))
                    .collect();
                distances.sort_by(|a, b| {
                    a.0.partial_cmp(&b.0)
                        .unwrap_or(Ordering::Equal)
                        .then(a.1.cmp(&b.1))
                });
                distances.into_iter().take(k).map(|(_, idx)| idx).collect()
            })
            .collect()
    }
}

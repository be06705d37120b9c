use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    domain::Label,
    features::{Dataset, SparseVector},
};

use super::{check_training_set, BinaryClassifier, ModelError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvmParams {
    pub lambda: f64,
    pub epochs: usize,
    pub seed: u64,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            lambda: 1e-3,
            epochs: 10,
            seed: 42,
        }
    }
}

/// Linear SVM trained with Pegasos (stochastic sub-gradient descent on the
/// hinge loss). Produces a margin, not a probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSvm {
    weights: Vec<f64>,
    bias: f64,
}

impl LinearSvm {
    pub fn fit(data: &Dataset, params: &SvmParams) -> Result<Self, ModelError> {
        check_training_set(data)?;

        let mut rng = StdRng::seed_from_u64(params.seed);
        // weights are kept as `scale * v` so the shrink step stays O(1)
        let mut v = vec![0.0; data.width];
        let mut v_bias = 0.0;
        let mut scale = 1.0;

        let steps = params.epochs.max(1) * data.len();
        for t in 1..=steps {
            let sample = rng.gen_range(0..data.len());
            let row = &data.rows[sample];
            let y = if data.labels[sample] == Label::Spam {
                1.0
            } else {
                -1.0
            };
            let eta = 1.0 / (params.lambda * t as f64);
            let margin = y * scale * (row.dot_dense(&v) + v_bias);

            let shrink = 1.0 - eta * params.lambda;
            if shrink <= 0.0 {
                v.iter_mut().for_each(|w| *w = 0.0);
                v_bias = 0.0;
                scale = 1.0;
            } else {
                scale *= shrink;
            }

            if margin < 1.0 {
                let step = eta * y / scale;
                for (column, value) in row.iter() {
                    v[column] += step * value;
                }
                v_bias += step;
            }

            if scale < 1e-9 {
                v.iter_mut().for_each(|w| *w *= scale);
                v_bias *= scale;
                scale = 1.0;
            }
        }

        Ok(Self {
            weights: v.into_iter().map(|w| w * scale).collect(),
            bias: v_bias * scale,
        })
    }

    pub fn width(&self) -> usize {
        self.weights.len()
    }

    pub fn decision_function(&self, row: &SparseVector) -> f64 {
        row.dot_dense(&self.weights) + self.bias
    }
}

impl BinaryClassifier for LinearSvm {
    fn predict(&self, row: &SparseVector) -> Label {
        if self.decision_function(row) > 0.0 {
            Label::Spam
        } else {
            Label::Ham
        }
    }

    fn spam_probability(&self, _row: &SparseVector) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Dataset {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            let jitter = i as f64 * 0.01;
            rows.push(SparseVector::new(vec![(0, 0.9 + jitter)]));
            labels.push(Label::Ham);
            rows.push(SparseVector::new(vec![(1, 0.9 + jitter)]));
            labels.push(Label::Spam);
        }
        Dataset::new(2, "fp".into(), rows, labels).unwrap()
    }

    #[test]
    fn finds_separating_margin() {
        let model = LinearSvm::fit(&data(), &SvmParams::default()).unwrap();
        assert_eq!(model.predict(&SparseVector::new(vec![(1, 1.0)])), Label::Spam);
        assert_eq!(model.predict(&SparseVector::new(vec![(0, 1.0)])), Label::Ham);
    }

    #[test]
    fn offers_no_probability() {
        let model = LinearSvm::fit(&data(), &SvmParams::default()).unwrap();
        assert_eq!(model.spam_probability(&SparseVector::new(vec![(1, 1.0)])), None);
    }

    #[test]
    fn same_seed_same_weights() {
        let a = LinearSvm::fit(&data(), &SvmParams::default()).unwrap();
        let b = LinearSvm::fit(&data(), &SvmParams::default()).unwrap();
        assert_eq!(a, b);
    }
}

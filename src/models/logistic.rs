use serde::{Deserialize, Serialize};

use crate::{
    domain::Label,
    features::{Dataset, SparseVector},
};

use super::{check_training_set, BinaryClassifier, ModelError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticParams {
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iter: usize,
    pub learning_rate: f64,
    pub tolerance: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1_000,
            learning_rate: 1.0,
            tolerance: 1e-4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticRegression {
    pub fn fit(data: &Dataset, params: &LogisticParams) -> Result<Self, ModelError> {
        check_training_set(data)?;

        let n = data.len() as f64;
        let lambda = 1.0 / (params.c * n);
        let mut weights = vec![0.0; data.width];
        let mut bias = 0.0;
        let mut gradient = vec![0.0; data.width];

        let mut converged = false;
        for iteration in 0..params.max_iter {
            gradient
                .iter_mut()
                .zip(&weights)
                .for_each(|(g, w)| *g = lambda * w);
            let mut bias_gradient = 0.0;

            for (row, label) in data.iter() {
                let target = if label == Label::Spam { 1.0 } else { 0.0 };
                let error = (sigmoid(row.dot_dense(&weights) + bias) - target) / n;
                for (column, value) in row.iter() {
                    gradient[column] += error * value;
                }
                bias_gradient += error;
            }

            let largest = gradient
                .iter()
                .fold(bias_gradient.abs(), |acc, g| acc.max(g.abs()));

            weights
                .iter_mut()
                .zip(&gradient)
                .for_each(|(w, g)| *w -= params.learning_rate * g);
            bias -= params.learning_rate * bias_gradient;

            if largest < params.tolerance {
                tracing::debug!(target: "train", iteration, "logistic regression converged");
                converged = true;
                break;
            }
        }
        if !converged {
            tracing::warn!(
                target: "train",
                max_iter = params.max_iter,
                "logistic regression stopped before converging"
            );
        }

        Ok(Self { weights, bias })
    }

    pub fn width(&self) -> usize {
        self.weights.len()
    }
}

impl BinaryClassifier for LogisticRegression {
    fn predict(&self, row: &SparseVector) -> Label {
        match self.spam_probability(row) {
            Some(p) if p > 0.5 => Label::Spam,
            _ => Label::Ham,
        }
    }

    fn spam_probability(&self, row: &SparseVector) -> Option<f64> {
        Some(sigmoid(row.dot_dense(&self.weights) + self.bias))
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separates_linearly_separable_classes() {
        let rows = vec![
            SparseVector::new(vec![(0, 1.0)]),
            SparseVector::new(vec![(0, 0.9), (1, 0.1)]),
            SparseVector::new(vec![(1, 1.0)]),
            SparseVector::new(vec![(1, 0.8), (0, 0.2)]),
        ];
        let labels = vec![Label::Ham, Label::Ham, Label::Spam, Label::Spam];
        let data = Dataset::new(2, "fp".into(), rows, labels).unwrap();

        let model = LogisticRegression::fit(&data, &LogisticParams::default()).unwrap();
        assert_eq!(model.predict(&SparseVector::new(vec![(1, 1.0)])), Label::Spam);
        assert_eq!(model.predict(&SparseVector::new(vec![(0, 1.0)])), Label::Ham);
        assert!(model.spam_probability(&SparseVector::new(vec![(1, 1.0)])).unwrap() > 0.5);
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(1_000.0), 1.0);
        assert_eq!(sigmoid(-1_000.0), 0.0);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_class_training_fails() {
        let rows = vec![SparseVector::new(vec![(0, 1.0)])];
        let data = Dataset::new(1, "fp".into(), rows, vec![Label::Spam]).unwrap();
        assert!(matches!(
            LogisticRegression::fit(&data, &LogisticParams::default()),
            Err(ModelError::SingleClass(Label::Spam))
        ));
    }
}

use serde::{Deserialize, Serialize};

use crate::{
    domain::Label,
    features::{Dataset, SparseVector},
};

use super::{check_training_set, BinaryClassifier, ModelError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    class_log_prior: [f64; 2],
    feature_log_prob: [Vec<f64>; 2],
}

impl MultinomialNb {
    pub fn fit(data: &Dataset, alpha: f64) -> Result<Self, ModelError> {
        check_training_set(data)?;

        let mut feature_count = [vec![0.0; data.width], vec![0.0; data.width]];
        for (row, label) in data.iter() {
            for (column, value) in row.iter() {
                if value < 0.0 {
                    return Err(ModelError::NegativeFeature { column, value });
                }
                feature_count[label.index()][column] += value;
            }
        }

        let counts = data.class_counts();
        let total = data.len() as f64;
        let class_log_prior = [
            (counts[0] as f64 / total).ln(),
            (counts[1] as f64 / total).ln(),
        ];

        let smoothed_width = alpha * data.width as f64;
        let feature_log_prob = feature_count.map(|per_class| {
            let denominator = (per_class.iter().sum::<f64>() + smoothed_width).ln();
            per_class
                .into_iter()
                .map(|count| (count + alpha).ln() - denominator)
                .collect::<Vec<_>>()
        });

        Ok(Self {
            class_log_prior,
            feature_log_prob,
        })
    }

    pub fn width(&self) -> usize {
        self.feature_log_prob[0].len()
    }

    fn joint_log_likelihood(&self, row: &SparseVector) -> [f64; 2] {
        [
            self.class_log_prior[0] + row.dot_dense(&self.feature_log_prob[0]),
            self.class_log_prior[1] + row.dot_dense(&self.feature_log_prob[1]),
        ]
    }
}

impl BinaryClassifier for MultinomialNb {
    fn predict(&self, row: &SparseVector) -> Label {
        let [ham, spam] = self.joint_log_likelihood(row);
        if spam > ham {
            Label::Spam
        } else {
            Label::Ham
        }
    }

    fn spam_probability(&self, row: &SparseVector) -> Option<f64> {
        let [ham, spam] = self.joint_log_likelihood(row);
        Some(1.0 / (1.0 + (ham - spam).exp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Dataset {
        // columns: 0 = "meeting", 1 = "free", 2 = "money"
        let rows = vec![
            SparseVector::new(vec![(0, 0.9)]),
            SparseVector::new(vec![(0, 0.8), (2, 0.1)]),
            SparseVector::new(vec![(1, 0.7), (2, 0.7)]),
            SparseVector::new(vec![(1, 1.0)]),
        ];
        let labels = vec![Label::Ham, Label::Ham, Label::Spam, Label::Spam];
        Dataset::new(3, "fp".into(), rows, labels).unwrap()
    }

    #[test]
    fn learns_keyword_evidence() {
        let model = MultinomialNb::fit(&data(), 1.0).unwrap();
        let spammy = SparseVector::new(vec![(1, 0.8), (2, 0.6)]);
        let hammy = SparseVector::new(vec![(0, 1.0)]);
        assert_eq!(model.predict(&spammy), Label::Spam);
        assert_eq!(model.predict(&hammy), Label::Ham);
        assert!(model.spam_probability(&spammy).unwrap() > 0.5);
    }

    #[test]
    fn empty_row_falls_back_to_priors() {
        let model = MultinomialNb::fit(&data(), 1.0).unwrap();
        let p = model.spam_probability(&SparseVector::default()).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn negative_features_are_rejected() {
        let rows = vec![
            SparseVector::new(vec![(0, -1.0)]),
            SparseVector::new(vec![(0, 1.0)]),
        ];
        let data = Dataset::new(1, "fp".into(), rows, vec![Label::Ham, Label::Spam]).unwrap();
        assert!(matches!(
            MultinomialNb::fit(&data, 1.0),
            Err(ModelError::NegativeFeature { column: 0, .. })
        ));
    }
}

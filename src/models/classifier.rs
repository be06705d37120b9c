use serde::{Deserialize, Serialize};

use crate::{
    domain::{Label, Prediction},
    features::{Dataset, SparseVector},
};

use super::{
    forest::{ForestParams, RandomForest},
    logistic::{LogisticParams, LogisticRegression},
    naive_bayes::MultinomialNb,
    svm::{LinearSvm, SvmParams},
    BinaryClassifier, ModelError,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassifierKind {
    NaiveBayes { alpha: f64 },
    LogisticRegression(LogisticParams),
    RandomForest(ForestParams),
    Svm(SvmParams),
}

impl ClassifierKind {
    /// The candidate set evaluated during model selection, in selection order.
    pub fn candidates(seed: u64) -> Vec<ClassifierKind> {
        vec![
            ClassifierKind::NaiveBayes { alpha: 1.0 },
            ClassifierKind::LogisticRegression(LogisticParams::default()),
            ClassifierKind::RandomForest(ForestParams {
                seed,
                ..ForestParams::default()
            }),
            ClassifierKind::Svm(SvmParams {
                seed,
                ..SvmParams::default()
            }),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClassifierKind::NaiveBayes { .. } => "Naive Bayes",
            ClassifierKind::LogisticRegression(_) => "Logistic Regression",
            ClassifierKind::RandomForest(_) => "Random Forest",
            ClassifierKind::Svm(_) => "SVM",
        }
    }

    pub fn fit(&self, data: &Dataset) -> Result<Classifier, ModelError> {
        Ok(match self {
            ClassifierKind::NaiveBayes { alpha } => {
                Classifier::NaiveBayes(MultinomialNb::fit(data, *alpha)?)
            }
            ClassifierKind::LogisticRegression(params) => {
                Classifier::LogisticRegression(LogisticRegression::fit(data, params)?)
            }
            ClassifierKind::RandomForest(params) => {
                Classifier::RandomForest(RandomForest::fit(data, params)?)
            }
            ClassifierKind::Svm(params) => Classifier::Svm(LinearSvm::fit(data, params)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Classifier {
    NaiveBayes(MultinomialNb),
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
    Svm(LinearSvm),
}

impl Classifier {
    pub fn name(&self) -> &'static str {
        match self {
            Classifier::NaiveBayes(_) => "Naive Bayes",
            Classifier::LogisticRegression(_) => "Logistic Regression",
            Classifier::RandomForest(_) => "Random Forest",
            Classifier::Svm(_) => "SVM",
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Classifier::NaiveBayes(model) => model.width(),
            Classifier::LogisticRegression(model) => model.width(),
            Classifier::RandomForest(model) => model.width(),
            Classifier::Svm(model) => model.width(),
        }
    }

    fn inner(&self) -> &dyn BinaryClassifier {
        match self {
            Classifier::NaiveBayes(model) => model,
            Classifier::LogisticRegression(model) => model,
            Classifier::RandomForest(model) => model,
            Classifier::Svm(model) => model,
        }
    }

    pub fn predict(&self, row: &SparseVector) -> Label {
        self.inner().predict(row)
    }

    pub fn predict_many(&self, data: &Dataset) -> Vec<Label> {
        data.rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Label plus the probability of that label, when the model has one.
    pub fn classify(&self, row: &SparseVector) -> Prediction {
        let inner = self.inner();
        let label = inner.predict(row);
        let confidence = inner.spam_probability(row).map(|spam| match label {
            Label::Spam => spam,
            Label::Ham => 1.0 - spam,
        });
        Prediction { label, confidence }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Dataset {
        let rows = vec![
            SparseVector::new(vec![(0, 1.0)]),
            SparseVector::new(vec![(0, 0.8), (1, 0.2)]),
            SparseVector::new(vec![(1, 1.0)]),
            SparseVector::new(vec![(1, 0.9), (0, 0.1)]),
        ];
        let labels = vec![Label::Ham, Label::Ham, Label::Spam, Label::Spam];
        Dataset::new(2, "fp".into(), rows, labels).unwrap()
    }

    #[test]
    fn every_candidate_fits_and_keeps_its_name() {
        let data = data();
        for kind in ClassifierKind::candidates(7) {
            let model = kind.fit(&data).unwrap();
            assert_eq!(model.name(), kind.name());
            assert_eq!(model.width(), 2);
            assert_eq!(model.predict_many(&data).len(), data.len());
        }
    }

    #[test]
    fn confidence_refers_to_the_predicted_label() {
        let model = ClassifierKind::NaiveBayes { alpha: 1.0 }.fit(&data()).unwrap();
        let prediction = model.classify(&SparseVector::new(vec![(0, 1.0)]));
        assert_eq!(prediction.label, Label::Ham);
        assert!(prediction.confidence.unwrap() > 0.5);
    }

    #[test]
    fn margin_models_report_no_confidence() {
        let model = ClassifierKind::Svm(SvmParams::default()).fit(&data()).unwrap();
        assert_eq!(model.classify(&SparseVector::new(vec![(1, 1.0)])).confidence, None);
    }
}

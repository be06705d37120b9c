//! Classifiers, model selection and inference.

pub mod classifier;
pub mod forest;
pub mod logistic;
pub mod metrics;
pub mod naive_bayes;
pub mod predictor;
pub mod svm;
pub mod trainer;

use thiserror::Error;

use crate::{
    domain::Label,
    features::{Dataset, FeatureError},
};

pub use classifier::{Classifier, ClassifierKind};
pub use metrics::{accuracy, ClassificationReport};
pub use predictor::{predict_email_class, Predictor};
pub use trainer::{evaluate_model, train_models, TrainedModel};

pub trait BinaryClassifier {
    fn predict(&self, row: &crate::features::SparseVector) -> Label;

    /// Estimated probability that `row` is spam, for models that produce one.
    fn spam_probability(&self, row: &crate::features::SparseVector) -> Option<f64>;
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{0} split is empty")]
    EmptySet(&'static str),
    #[error("training split only contains {0} samples")]
    SingleClass(Label),
    #[error("feature width mismatch: model expects {expected} columns, got {found}")]
    WidthMismatch { expected: usize, found: usize },
    #[error("train and test splits come from different vocabularies ({train} vs {test})")]
    SplitMismatch { train: String, test: String },
    #[error("model was trained on vocabulary {model} but the vectorizer has {vectorizer}")]
    VocabularyMismatch { model: String, vectorizer: String },
    #[error("negative value {value} in column {column}; multinomial features must be non-negative")]
    NegativeFeature { column: usize, value: f64 },
    #[error("every candidate classifier failed to fit")]
    NoViableCandidate,
    #[error(transparent)]
    Feature(#[from] FeatureError),
}

pub(crate) fn check_training_set(data: &Dataset) -> Result<(), ModelError> {
    data.validate()?;
    if data.is_empty() {
        return Err(ModelError::EmptySet("training"));
    }
    match data.class_counts() {
        [0, _] => Err(ModelError::SingleClass(Label::Spam)),
        [_, 0] => Err(ModelError::SingleClass(Label::Ham)),
        _ => Ok(()),
    }
}

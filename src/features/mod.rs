//! Text preprocessing, TF-IDF vectorization, splitting and class balancing.

pub mod lemmatizer;
pub mod matrix;
pub mod oversampling;
pub mod preprocessing;
pub mod split;
pub mod stopwords;
pub mod vectorizer;

use thiserror::Error;

use crate::domain::Label;

pub use matrix::{Dataset, SparseVector};
pub use oversampling::Smote;
pub use preprocessing::{Preprocessor, PreprocessorConfig};
pub use split::train_test_split;
pub use vectorizer::{TfidfVectorizer, VectorizerConfig};

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("empty vocabulary; documents contain no terms")]
    EmptyVocabulary,
    #[error("feature width mismatch: expected {expected} columns, found {found}")]
    WidthMismatch { expected: usize, found: usize },
    #[error("{rows} feature rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("cannot balance a data set that only contains {0} samples")]
    SingleClass(Label),
    #[error("test size must lie strictly between 0 and 1, got {0}")]
    InvalidTestSize(f64),
    #[error("splitting {rows} rows with test size {test_size} leaves an empty split")]
    EmptySplit { rows: usize, test_size: f64 },
}

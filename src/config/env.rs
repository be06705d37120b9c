use std::path::PathBuf;

use thiserror::Error;

use crate::features::{PreprocessorConfig, VectorizerConfig};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub directories: DirectoryConfig,
    pub artifacts: ArtifactConfig,
    pub corpus: CorpusConfig,
    pub features: FeatureConfig,
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub input_dir: String,
    pub interim_dir: String,
    pub processed_dir: String,
    pub models_dir: String,
    pub logs_dir: String,
}

#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub parsed_csv: PathBuf,
    pub processed_csv: PathBuf,
    pub train_file: PathBuf,
    pub test_file: PathBuf,
    pub vectorizer_file: PathBuf,
    pub model_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CorpusConfig {
    pub ham_categories: Vec<String>,
    pub spam_categories: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FeatureConfig {
    pub vectorizer: VectorizerConfig,
    pub test_size: f64,
    pub smote_neighbors: usize,
}

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub random_seed: u64,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl FeatureConfig {
    pub fn preprocessing(&self) -> &PreprocessorConfig {
        &self.vectorizer.preprocessing
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for environment variable {key}")]
    Invalid { key: &'static str, value: String },
    #[error("environment variable {0} must name at least one category")]
    EmptyList(&'static str),
}

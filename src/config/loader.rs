use std::{env, path::Path, str::FromStr};

use super::env::{
    AppConfig, ArtifactConfig, ConfigError, CorpusConfig, DirectoryConfig, FeatureConfig,
    LoggingConfig, TrainingConfig,
};
use crate::features::{PreprocessorConfig, VectorizerConfig};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let directories = DirectoryConfig {
            input_dir: env::var("INPUT_DIR").unwrap_or_else(|_| "data/raw".to_string()),
            interim_dir: env::var("INTERIM_DIR").unwrap_or_else(|_| "data/interim".to_string()),
            processed_dir: env::var("PROCESSED_DIR")
                .unwrap_or_else(|_| "data/processed".to_string()),
            models_dir: env::var("MODELS_DIR").unwrap_or_else(|_| "models".to_string()),
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
        };

        let artifacts = ArtifactConfig {
            parsed_csv: path_or("INPUT_FILE", &directories.interim_dir, "parsed_emails.csv"),
            processed_csv: path_or(
                "OUTPUT_PROCESSED_FILE",
                &directories.processed_dir,
                "processed_email.csv",
            ),
            train_file: path_or("TRAIN_FILE", &directories.processed_dir, "train_data.bin"),
            test_file: path_or("TEST_FILE", &directories.processed_dir, "test_data.bin"),
            vectorizer_file: path_or(
                "VECTORIZER_FILE",
                &directories.models_dir,
                "tfidf_vectorizer.bin",
            ),
            model_file: path_or(
                "MODEL_FILE",
                &directories.models_dir,
                "spam_classifier_model.bin",
            ),
        };

        let corpus = CorpusConfig {
            ham_categories: parse_list("HAM_CATEGORIES", &["easy_ham", "hard_ham"])?,
            spam_categories: parse_list("SPAM_CATEGORIES", &["spam_2"])?,
        };

        let preprocessing = PreprocessorConfig {
            lemmatize: parse_or("LEMMATIZE", true)?,
            extra_stop_words: env::var("EXTRA_STOP_WORDS")
                .map(|value| split_list(&value, ','))
                .unwrap_or_default(),
        };

        let features = FeatureConfig {
            vectorizer: VectorizerConfig {
                max_features: parse_or("MAX_FEATURES", 5_000)?,
                preprocessing,
            },
            test_size: parse_or("TEST_SIZE", 0.2)?,
            smote_neighbors: parse_or("SMOTE_NEIGHBORS", 5)?,
        };

        let training = TrainingConfig {
            random_seed: parse_or("RANDOM_SEED", 42)?,
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        Ok(Self {
            directories,
            artifacts,
            corpus,
            features,
            training,
            logging,
        })
    }
}

fn path_or(key: &str, dir: &str, filename: &str) -> std::path::PathBuf {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .map(Into::into)
        .unwrap_or_else(|| Path::new(dir).join(filename))
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::Invalid { key, value })
        }
        _ => Ok(default),
    }
}

fn parse_list(key: &'static str, default: &[&str]) -> Result<Vec<String>, ConfigError> {
    let values = env::var(key)
        .map(|value| split_list(&value, ','))
        .unwrap_or_else(|_| default.iter().map(|v| v.to_string()).collect());
    if values.is_empty() {
        return Err(ConfigError::EmptyList(key));
    }
    Ok(values)
}

fn split_list(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

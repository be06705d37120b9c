pub mod env;
mod loader;

pub use env::{
    AppConfig, ArtifactConfig, ConfigError, CorpusConfig, DirectoryConfig, FeatureConfig,
    LoggingConfig, TrainingConfig,
};
pub use loader::load_config;

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{lemmatizer::Lemmatizer, stopwords};

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation regex"));
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid word regex"));

/// Settings that shape preprocessing. Persisted with the fitted vectorizer so
/// inference runs with exactly the settings used at fit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessorConfig {
    pub lemmatize: bool,
    pub extra_stop_words: Vec<String>,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            lemmatize: true,
            extra_stop_words: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessorConfig,
    stop_words: HashSet<String>,
    lemmatizer: Lemmatizer,
}

impl Preprocessor {
    pub fn new(config: PreprocessorConfig) -> Self {
        let stop_words = stopwords::ENGLISH
            .iter()
            .map(|word| word.to_string())
            .chain(config.extra_stop_words.iter().map(|word| word.to_lowercase()))
            .collect();
        Self {
            config,
            stop_words,
            lemmatizer: Lemmatizer::new(),
        }
    }

    pub fn preprocess(&self, body: &str) -> String {
        let lowered = body.to_lowercase();
        let stripped = NON_WORD.replace_all(&lowered, "");

        WORD.find_iter(&stripped)
            .map(|token| token.as_str())
            .filter(|token| !self.stop_words.contains(*token))
            .map(|token| {
                if self.config.lemmatize {
                    self.lemmatizer.lemmatize(token)
                } else {
                    token.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

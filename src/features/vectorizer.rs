use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{matrix::SparseVector, preprocessing::PreprocessorConfig, FeatureError};

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    pub max_features: usize,
    pub preprocessing: PreprocessorConfig,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 5_000,
            preprocessing: PreprocessorConfig::default(),
        }
    }
}

/// TF-IDF weighting over a vocabulary frozen at fit time.
///
/// Columns are the selected terms in alphabetical order. Weights are
/// `count * idf` with smoothed `idf = ln((1 + n) / (1 + df)) + 1`, and every
/// row is L2-normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn fit<S: AsRef<str>>(documents: &[S], config: &VectorizerConfig) -> Result<Self, FeatureError> {
        // term -> (total occurrences, documents containing it)
        let mut stats: HashMap<String, (usize, usize)> = HashMap::new();
        for document in documents {
            let counts = term_counts(document.as_ref());
            for (term, count) in counts {
                let entry = stats.entry(term).or_default();
                entry.0 += count;
                entry.1 += 1;
            }
        }
        if stats.is_empty() {
            return Err(FeatureError::EmptyVocabulary);
        }

        let mut ranked: Vec<(String, (usize, usize))> = stats.into_iter().collect();
        ranked.sort_by(|(term_a, (total_a, _)), (term_b, (total_b, _))| {
            total_b.cmp(total_a).then_with(|| term_a.cmp(term_b))
        });
        ranked.truncate(config.max_features.max(1));
        ranked.sort_by(|(term_a, _), (term_b, _)| term_a.cmp(term_b));

        let n = documents.len() as f64;
        let idf = ranked
            .iter()
            .map(|(_, (_, df))| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();
        let vocabulary: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        let index = vocabulary
            .iter()
            .enumerate()
            .map(|(column, term)| (term.clone(), column))
            .collect();

        tracing::info!(
            target: "features",
            documents = documents.len(),
            vocabulary = vocabulary.len(),
            "tf-idf vocabulary fitted"
        );

        Ok(Self {
            config: config.clone(),
            vocabulary,
            index,
            idf,
        })
    }

    pub fn fit_transform<S: AsRef<str>>(
        documents: &[S],
        config: &VectorizerConfig,
    ) -> Result<(Self, Vec<SparseVector>), FeatureError> {
        let vectorizer = Self::fit(documents, config)?;
        let rows = vectorizer.transform_many(documents);
        Ok((vectorizer, rows))
    }

    pub fn transform(&self, document: &str) -> SparseVector {
        let mut weights: Vec<(usize, f64)> = term_counts(document)
            .into_iter()
            .filter_map(|(term, count)| {
                self.index
                    .get(&term)
                    .map(|&column| (column, count as f64 * self.idf[column]))
            })
            .collect();

        let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            weights.iter_mut().for_each(|(_, w)| *w /= norm);
        }
        SparseVector::new(weights)
    }

    pub fn transform_many<S: AsRef<str>>(&self, documents: &[S]) -> Vec<SparseVector> {
        documents.iter().map(|doc| self.transform(doc.as_ref())).collect()
    }

    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Hex SHA-256 of the vocabulary in column order; identifies the feature space.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for term in &self.vocabulary {
            hasher.update(term.as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }
}

fn term_counts(document: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for token in TOKEN.find_iter(document) {
        *counts.entry(token.as_str().to_lowercase()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "free money claim reward".to_string(),
            "meeting agenda attached".to_string(),
            "free reward free prize".to_string(),
            "lunch meeting tomorrow".to_string(),
        ]
    }

    #[test]
    fn vocabulary_is_alphabetical_and_capped() {
        let config = VectorizerConfig {
            max_features: 3,
            ..VectorizerConfig::default()
        };
        let vectorizer = TfidfVectorizer::fit(&corpus(), &config).unwrap();
        // free (3), meeting (2), reward (2) outrank every single-use term
        assert_eq!(vectorizer.vocabulary(), ["free", "meeting", "reward"]);
        assert_eq!(vectorizer.width(), 3);
    }

    #[test]
    fn transform_is_repeatable_and_normalized() {
        let docs = corpus();
        let (vectorizer, rows) =
            TfidfVectorizer::fit_transform(&docs, &VectorizerConfig::default()).unwrap();
        let again = vectorizer.transform(&docs[0]);
        assert_eq!(rows[0], again);
        assert!((again.squared_norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unseen_and_empty_documents_give_zero_vectors() {
        let vectorizer = TfidfVectorizer::fit(&corpus(), &VectorizerConfig::default()).unwrap();
        assert!(vectorizer.transform("").is_zero());
        assert!(vectorizer.transform("completely novel words").is_zero());
    }

    #[test]
    fn rarer_terms_weigh_more() {
        let vectorizer = TfidfVectorizer::fit(&corpus(), &VectorizerConfig::default()).unwrap();
        let row = vectorizer.transform("free prize");
        let free = vectorizer.vocabulary().iter().position(|t| t == "free").unwrap();
        let prize = vectorizer.vocabulary().iter().position(|t| t == "prize").unwrap();
        assert!(row.get(prize) > row.get(free));
    }

    #[test]
    fn fingerprint_tracks_vocabulary() {
        let a = TfidfVectorizer::fit(&corpus(), &VectorizerConfig::default()).unwrap();
        let b = TfidfVectorizer::fit(&corpus(), &VectorizerConfig::default()).unwrap();
        let c = TfidfVectorizer::fit(&["other words entirely"], &VectorizerConfig::default()).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn all_empty_corpus_is_rejected() {
        let err = TfidfVectorizer::fit(&["", "a"], &VectorizerConfig::default()).unwrap_err();
        assert!(matches!(err, FeatureError::EmptyVocabulary));
    }
}

use std::path::Path;

use anyhow::Result;

use crate::{
    domain::Prediction,
    features::{Preprocessor, TfidfVectorizer},
    infrastructure::storage::load_artifact,
};

use super::{trainer::TrainedModel, ModelError};

/// The frozen inference chain: preprocessing, vectorization and classification.
///
/// Built once from a matching vectorizer/model pair and reused for every
/// request; nothing in it is refitted or mutated.
#[derive(Debug, Clone)]
pub struct Predictor {
    preprocessor: Preprocessor,
    vectorizer: TfidfVectorizer,
    model: TrainedModel,
}

impl Predictor {
    pub fn new(vectorizer: TfidfVectorizer, model: TrainedModel) -> Result<Self, ModelError> {
        let fingerprint = vectorizer.fingerprint();
        if model.fingerprint != fingerprint {
            return Err(ModelError::VocabularyMismatch {
                model: model.fingerprint,
                vectorizer: fingerprint,
            });
        }
        let width = model.classifier.width();
        if width != vectorizer.width() || width != model.width {
            return Err(ModelError::WidthMismatch {
                expected: width,
                found: vectorizer.width(),
            });
        }

        let preprocessor = Preprocessor::new(vectorizer.config().preprocessing.clone());
        Ok(Self {
            preprocessor,
            vectorizer,
            model,
        })
    }

    pub fn load(vectorizer_path: &Path, model_path: &Path) -> Result<Self> {
        tracing::info!(target: "predict", path = %vectorizer_path.display(), "loading the trained vectorizer");
        let vectorizer: TfidfVectorizer = load_artifact(vectorizer_path)?;
        tracing::info!(target: "predict", path = %model_path.display(), "loading the trained model");
        let model: TrainedModel = load_artifact(model_path)?;
        Ok(Self::new(vectorizer, model)?)
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn predict(&self, body: &str) -> Prediction {
        let processed = self.preprocessor.preprocess(body);
        let row = self.vectorizer.transform(&processed);
        let prediction = self.model.classifier.classify(&row);
        tracing::debug!(
            target: "predict",
            model = %self.model.name,
            label = %prediction.label,
            confidence = ?prediction.confidence,
            "email classified"
        );
        prediction
    }
}

pub fn predict_email_class(body: &str, vectorizer_path: &Path, model_path: &Path) -> Result<Prediction> {
    let predictor = Predictor::load(vectorizer_path, model_path)?;
    Ok(predictor.predict(body))
}

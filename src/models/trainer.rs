use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::Dataset;

use super::{
    classifier::{Classifier, ClassifierKind},
    metrics::ClassificationReport,
    ModelError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub name: String,
    pub classifier: Classifier,
    pub accuracy: f64,
    pub fingerprint: String,
    pub width: usize,
    pub trained_at: DateTime<Utc>,
}

pub fn evaluate_model(classifier: &Classifier, test: &Dataset) -> (f64, ClassificationReport) {
    let predicted = classifier.predict_many(test);
    let report = ClassificationReport::new(&test.labels, &predicted);
    (report.accuracy, report)
}

/// Fits every candidate on `train`, scores it on `test` and keeps the most
/// accurate one. Ties go to the earlier candidate. A candidate that fails to
/// fit is logged and left out of the selection.
pub fn train_models(
    train: &Dataset,
    test: &Dataset,
    candidates: &[ClassifierKind],
) -> Result<TrainedModel, ModelError> {
    train.validate()?;
    test.validate()?;
    if test.is_empty() {
        return Err(ModelError::EmptySet("test"));
    }
    if train.fingerprint != test.fingerprint {
        return Err(ModelError::SplitMismatch {
            train: train.fingerprint.clone(),
            test: test.fingerprint.clone(),
        });
    }
    if train.width != test.width {
        return Err(ModelError::WidthMismatch {
            expected: train.width,
            found: test.width,
        });
    }

    let mut best: Option<(Classifier, f64)> = None;
    for kind in candidates {
        let name = kind.name();
        tracing::info!(target: "train", model = name, rows = train.len(), "training candidate");

        let classifier = match kind.fit(train) {
            Ok(classifier) => classifier,
            Err(err) => {
                tracing::error!(target: "train", model = name, error = %err, "candidate failed to fit; excluded");
                continue;
            }
        };

        let (accuracy, report) = evaluate_model(&classifier, test);
        tracing::info!(target: "train", model = name, accuracy = %format!("{accuracy:.4}"), "candidate evaluated");
        tracing::info!(target: "train", "classification report for {name}:\n{report}");

        if best.as_ref().map_or(true, |(_, best_accuracy)| accuracy > *best_accuracy) {
            best = Some((classifier, accuracy));
        }
    }

    let (classifier, accuracy) = best.ok_or(ModelError::NoViableCandidate)?;
    tracing::info!(
        target: "train",
        model = classifier.name(),
        accuracy = %format!("{accuracy:.4}"),
        "best model selected"
    );

    Ok(TrainedModel {
        name: classifier.name().to_string(),
        classifier,
        accuracy,
        fingerprint: train.fingerprint.clone(),
        width: train.width,
        trained_at: Utc::now(),
    })
}

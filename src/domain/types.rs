use std::fmt;

use serde::{Deserialize, Serialize};

/// Binary class of an email. Serialized as `0` (ham) or `1` (spam).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    Ham,
    Spam,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Ham, Label::Spam];

    pub fn index(self) -> usize {
        match self {
            Label::Ham => 0,
            Label::Spam => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Ham => "Ham",
            Label::Spam => "Spam",
        }
    }

    pub fn other(self) -> Label {
        match self {
            Label::Ham => Label::Spam,
            Label::Spam => Label::Ham,
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.index() as u8
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Ham),
            1 => Ok(Label::Spam),
            other => Err(format!("label must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a single email body.
///
/// `confidence` is the probability the model assigns to `label`. Models
/// without probability estimates leave it empty instead of guessing one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    pub confidence: Option<f64>,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.confidence {
            Some(confidence) => write!(f, "{} (Confidence: {:.2})", self.label, confidence),
            None => write!(f, "{} (Confidence: n/a)", self.label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_round_trips_through_numeric_code() {
        assert_eq!(u8::from(Label::Spam), 1);
        assert_eq!(Label::try_from(0u8), Ok(Label::Ham));
        assert!(Label::try_from(2u8).is_err());
    }

    #[test]
    fn prediction_without_probability_is_flagged() {
        let prediction = Prediction {
            label: Label::Ham,
            confidence: None,
        };
        assert_eq!(prediction.to_string(), "Ham (Confidence: n/a)");
    }
}

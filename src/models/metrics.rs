use std::fmt;

use crate::domain::Label;

pub fn accuracy(truth: &[Label], predicted: &[Label]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / truth.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn new(truth: &[Label], predicted: &[Label]) -> Self {
        let classes = Label::ALL.map(|label| class_metrics(label, truth, predicted));
        let total = truth.len();

        let macro_avg = ClassMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / 2.0,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / 2.0,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / 2.0,
            support: total,
        };
        let weight = |pick: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                return 0.0;
            }
            classes
                .iter()
                .map(|c| pick(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        };
        let weighted_avg = ClassMetrics {
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1: weight(|c| c.f1),
            support: total,
        };

        Self {
            classes,
            accuracy: accuracy(truth, predicted),
            macro_avg,
            weighted_avg,
        }
    }
}

fn class_metrics(label: Label, truth: &[Label], predicted: &[Label]) -> ClassMetrics {
    let mut true_positive = 0usize;
    let mut predicted_positive = 0usize;
    let mut support = 0usize;
    for (t, p) in truth.iter().zip(predicted) {
        if *p == label {
            predicted_positive += 1;
        }
        if *t == label {
            support += 1;
            if *p == label {
                true_positive += 1;
            }
        }
    }
    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let precision = ratio(true_positive, predicted_positive);
    let recall = ratio(true_positive, support);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    ClassMetrics {
        precision,
        recall,
        f1,
        support,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for (label, metrics) in Label::ALL.iter().zip(&self.classes) {
            write_row(f, &label.index().to_string(), metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        name, m.precision, m.recall, m.f1, m.support
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Label::{Ham, Spam};

    #[test]
    fn accuracy_counts_exact_matches() {
        assert_eq!(accuracy(&[Ham, Spam, Spam, Ham], &[Ham, Spam, Ham, Ham]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn report_computes_per_class_scores() {
        let truth = [Ham, Ham, Spam, Spam];
        let predicted = [Ham, Spam, Spam, Spam];
        let report = ClassificationReport::new(&truth, &predicted);

        let ham = report.classes[0];
        assert_eq!((ham.precision, ham.recall, ham.support), (1.0, 0.5, 2));
        let spam = report.classes[1];
        assert!((spam.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(spam.recall, 1.0);
        assert_eq!(report.accuracy, 0.75);
        assert!(report.to_string().contains("weighted avg"));
    }

    #[test]
    fn classes_never_predicted_score_zero() {
        let report = ClassificationReport::new(&[Ham, Spam], &[Ham, Ham]);
        assert_eq!(report.classes[1].precision, 0.0);
        assert_eq!(report.classes[1].f1, 0.0);
    }
}

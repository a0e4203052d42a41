// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 The signews-eval Authors

//! Evaluation metrics for the binary significance classifier
//!
//! Implements:
//! - Confusion Matrix
//! - Accuracy
//! - Per-class Precision, Recall, F-Score and support
//! - Unweighted means of the per-class scores
//!
//! The means ignore class support, so on an imbalanced test set a poor
//! minority class weighs as much as the majority. The per-class breakdown is
//! kept in the report for that reason.

use crate::datasets::Label;
use crate::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};

/// Confusion matrix with `Significant` as the positive class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Significant predicted as significant
    pub tp: usize,
    /// Not significant predicted as not significant
    pub tn: usize,
    /// Not significant predicted as significant
    pub fp: usize,
    /// Significant predicted as not significant
    pub fn_: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(ground_truth: &[Label], predictions: &[Label]) -> Result<Self> {
        if predictions.len() != ground_truth.len() {
            return Err(ClassifierError::invalid(format!(
                "prediction and ground truth lengths must match, got {} and {}",
                predictions.len(),
                ground_truth.len()
            )));
        }

        let mut matrix = Self::default();
        for (truth, pred) in ground_truth.iter().zip(predictions) {
            match (truth, pred) {
                (Label::Significant, Label::Significant) => matrix.tp += 1,
                (Label::NotSignificant, Label::NotSignificant) => matrix.tn += 1,
                (Label::NotSignificant, Label::Significant) => matrix.fp += 1,
                (Label::Significant, Label::NotSignificant) => matrix.fn_ += 1,
            }
        }
        Ok(matrix)
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// Accuracy: (TP + TN) / Total
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// Scores for one class, treating it as the positive class
    pub fn class_metrics(&self, label: Label) -> ClassMetrics {
        let (hits, false_alarms, misses) = match label {
            Label::Significant => (self.tp, self.fp, self.fn_),
            Label::NotSignificant => (self.tn, self.fn_, self.fp),
        };

        let precision = ratio(hits, hits + false_alarms);
        let recall = ratio(hits, hits + misses);
        let f_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        ClassMetrics {
            precision,
            recall,
            f_score,
            support: hits + misses,
        }
    }
}

/// Zero denominators score 0.0
fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f_score: f64,
    pub support: usize,
}

/// Accuracy plus per-class scores and their unweighted means
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub accuracy: f64,
    /// Indexed by class: 0 = not significant, 1 = significant
    pub per_class: Vec<ClassMetrics>,
    pub precision: f64,
    pub recall: f64,
    pub f_score: f64,
    pub confusion_matrix: ConfusionMatrix,
}

impl MetricsReport {
    pub fn compute(ground_truth: &[Label], predictions: &[Label]) -> Result<Self> {
        if ground_truth.is_empty() {
            return Err(ClassifierError::invalid("cannot compute metrics on an empty test set"));
        }
        let cm = ConfusionMatrix::from_predictions(ground_truth, predictions)?;

        let per_class = vec![
            cm.class_metrics(Label::NotSignificant),
            cm.class_metrics(Label::Significant),
        ];
        let mean = |f: fn(&ClassMetrics) -> f64| per_class.iter().map(f).sum::<f64>() / per_class.len() as f64;

        Ok(Self {
            accuracy: cm.accuracy(),
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f_score: mean(|m| m.f_score),
            per_class,
            confusion_matrix: cm,
        })
    }

    /// Format as a human-readable string
    pub fn format(&self) -> String {
        let cm = &self.confusion_matrix;
        let mut output = format!(
            r#"Classification Report
=====================
Accuracy:   {:.4} ({:.2}%)
Precision:  {:.4} (mean over classes)
Recall:     {:.4} (mean over classes)
F-Score:    {:.4} (mean over classes)
Support:    {}

Confusion Matrix:
                      Predicted
                      Significant  Not
Actual Significant    {:>6}       {:>6}
       Not            {:>6}       {:>6}

Per-Class Metrics:
"#,
            self.accuracy,
            self.accuracy * 100.0,
            self.precision,
            self.recall,
            self.f_score,
            cm.total(),
            cm.tp,
            cm.fn_,
            cm.fp,
            cm.tn,
        );

        for (class, m) in self.per_class.iter().enumerate() {
            output.push_str(&format!(
                "  {}: P={:.4} R={:.4} F={:.4} (n={})\n",
                class, m.precision, m.recall, m.f_score, m.support
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::Label::{NotSignificant as N, Significant as S};

    #[test]
    fn test_confusion_matrix_counts() {
        let truth = vec![S, S, N, N, S];
        let pred = vec![S, N, S, N, S];
        let cm = ConfusionMatrix::from_predictions(&truth, &pred).unwrap();

        assert_eq!(cm, ConfusionMatrix { tp: 2, tn: 1, fp: 1, fn_: 1 });
        assert!((cm.accuracy() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_perfect_predictions() {
        let truth = vec![S, N, N, S, N];
        let report = MetricsReport::compute(&truth, &truth).unwrap();

        assert!((report.accuracy - 1.0).abs() < 1e-6);
        assert!((report.precision - 1.0).abs() < 1e-6);
        assert!((report.recall - 1.0).abs() < 1e-6);
        assert!((report.f_score - 1.0).abs() < 1e-6);
        assert_eq!(report.per_class[0].support, 3);
        assert_eq!(report.per_class[1].support, 2);
    }

    #[test]
    fn test_per_class_scores() {
        // class 1: P = 2/3, R = 2/3 ; class 0: P = 1/2, R = 1/2
        let truth = vec![S, S, S, N, N];
        let pred = vec![S, S, N, S, N];
        let report = MetricsReport::compute(&truth, &pred).unwrap();

        let sig = report.per_class[1];
        assert!((sig.precision - 2.0 / 3.0).abs() < 1e-6);
        assert!((sig.recall - 2.0 / 3.0).abs() < 1e-6);

        let not = report.per_class[0];
        assert!((not.precision - 0.5).abs() < 1e-6);
        assert!((not.recall - 0.5).abs() < 1e-6);

        assert!((report.precision - (2.0 / 3.0 + 0.5) / 2.0).abs() < 1e-6);
        assert!((report.accuracy - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_metric_bounds_with_missing_class() {
        // No significant predictions at all: class 1 precision has a zero denominator
        let truth = vec![S, N, S, N];
        let pred = vec![N, N, N, N];
        let report = MetricsReport::compute(&truth, &pred).unwrap();

        for m in &report.per_class {
            for v in [m.precision, m.recall, m.f_score] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
        assert_eq!(report.per_class[1].precision, 0.0);
        assert!((report.accuracy - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = MetricsReport::compute(&[S, N], &[S]).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidConfiguration(_)));
        assert!(MetricsReport::compute(&[], &[]).is_err());
    }

    #[test]
    fn test_report_format() {
        let report = MetricsReport::compute(&[S, N, N], &[S, S, N]).unwrap();
        let formatted = report.format();

        assert!(formatted.contains("Classification Report"));
        assert!(formatted.contains("Accuracy"));
        assert!(formatted.contains("Confusion Matrix"));
        assert!(formatted.contains("Per-Class Metrics"));
    }
}

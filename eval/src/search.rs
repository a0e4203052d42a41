// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 The signews-eval Authors

//! Regularization-strength sweep
//!
//! Candidates are validated in list order and a candidate replaces the current
//! best only with a strictly greater score, so ties keep the earliest one. If
//! every candidate scores 0 the first candidate is returned.

use crate::classifier::{AlgorithmSettings, LogisticRegression, SignificantTextClassifier};
use crate::datasets::Label;
use crate::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};

/// Regularization strengths swept by default
pub const DEFAULT_C_VALUES: [f64; 6] = [1.0, 50.0, 100.0, 200.0, 300.0, 400.0];

/// Produces a validation score for one candidate value of C
pub trait CandidateScorer {
    fn score(&self, texts: &[String], labels: &[Label], c: f64) -> Result<f64>;
}

/// Scores a candidate by cross-validating a fresh logistic regression
pub struct ClassifierScorer<'a> {
    classifier: &'a SignificantTextClassifier,
    settings: AlgorithmSettings,
}

impl<'a> ClassifierScorer<'a> {
    pub fn new(classifier: &'a SignificantTextClassifier, settings: AlgorithmSettings) -> Self {
        Self { classifier, settings }
    }
}

impl CandidateScorer for ClassifierScorer<'_> {
    fn score(&self, texts: &[String], labels: &[Label], c: f64) -> Result<f64> {
        let algorithm = LogisticRegression::with_settings(c, self.settings)?;
        self.classifier.validate_model(texts, labels, &algorithm)
    }
}

/// One evaluated candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub c: f64,
    pub score: f64,
}

/// Winning hyperparameter and its validation score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestConfiguration {
    pub c: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub best: BestConfiguration,
    /// Every trial, in candidate order
    pub trials: Vec<Trial>,
}

#[derive(Debug, Clone)]
pub struct HyperparameterSearch {
    candidates: Vec<f64>,
}

impl Default for HyperparameterSearch {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_C_VALUES.to_vec(),
        }
    }
}

impl HyperparameterSearch {
    pub fn new(candidates: Vec<f64>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(ClassifierError::invalid("candidate list is empty"));
        }
        if let Some(bad) = candidates.iter().find(|c| !c.is_finite() || **c <= 0.0) {
            return Err(ClassifierError::invalid(format!(
                "candidate values must be positive and finite, got {}",
                bad
            )));
        }
        Ok(Self { candidates })
    }

    pub fn candidates(&self) -> &[f64] {
        &self.candidates
    }

    /// Sweep every candidate on the training data and pick the best
    pub fn run<S: CandidateScorer + ?Sized>(
        &self,
        scorer: &S,
        texts: &[String],
        labels: &[Label],
    ) -> Result<SearchOutcome> {
        if texts.len() != labels.len() {
            return Err(ClassifierError::invalid(format!(
                "train texts and labels must have the same length, got {} and {}",
                texts.len(),
                labels.len()
            )));
        }
        if texts.is_empty() {
            return Err(ClassifierError::invalid("training set is empty"));
        }

        let mut best: Option<BestConfiguration> = None;
        let mut trials = Vec::with_capacity(self.candidates.len());

        for &c in &self.candidates {
            let score = scorer.score(texts, labels, c)?;
            tracing::debug!("C={} validation score={:.4}", c, score);
            trials.push(Trial { c, score });

            match best {
                Some(current) if score <= current.score => {}
                _ => best = Some(BestConfiguration { c, score }),
            }
        }

        let best = best.ok_or_else(|| ClassifierError::invalid("no candidate was evaluated"))?;
        tracing::info!("Best C={}", best.c);

        Ok(SearchOutcome { best, trials })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Returns canned scores keyed by candidate and records call order
    struct FixedScores {
        scores: Vec<(f64, f64)>,
        calls: RefCell<Vec<f64>>,
    }

    impl FixedScores {
        fn new(scores: &[(f64, f64)]) -> Self {
            Self {
                scores: scores.to_vec(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CandidateScorer for FixedScores {
        fn score(&self, _texts: &[String], _labels: &[Label], c: f64) -> Result<f64> {
            self.calls.borrow_mut().push(c);
            Ok(self.scores.iter().find(|(k, _)| *k == c).map(|(_, s)| *s).unwrap_or(0.0))
        }
    }

    struct FailingScorer;

    impl CandidateScorer for FailingScorer {
        fn score(&self, _texts: &[String], _labels: &[Label], _c: f64) -> Result<f64> {
            Err(ClassifierError::training(crate::error::Stage::Validate, "vectorizer exploded"))
        }
    }

    fn train_data() -> (Vec<String>, Vec<Label>) {
        (
            vec!["storm".to_string(), "coffee".to_string()],
            vec![Label::Significant, Label::NotSignificant],
        )
    }

    #[test]
    fn test_first_strictly_greater_wins() {
        let (texts, labels) = train_data();
        let scorer = FixedScores::new(&[(1.0, 0.7), (50.0, 0.9), (100.0, 0.9)]);
        let search = HyperparameterSearch::new(vec![1.0, 50.0, 100.0]).unwrap();

        let outcome = search.run(&scorer, &texts, &labels).unwrap();
        assert_eq!(outcome.best, BestConfiguration { c: 50.0, score: 0.9 });
        assert_eq!(*scorer.calls.borrow(), vec![1.0, 50.0, 100.0]);
        assert_eq!(outcome.trials.len(), 3);
    }

    #[test]
    fn test_increasing_scores_pick_last() {
        let (texts, labels) = train_data();
        let scorer = FixedScores::new(&[(1.0, 0.5), (50.0, 0.6), (100.0, 0.7), (200.0, 0.8)]);
        let search = HyperparameterSearch::new(vec![1.0, 50.0, 100.0, 200.0]).unwrap();
        assert_eq!(search.run(&scorer, &texts, &labels).unwrap().best.c, 200.0);
    }

    #[test]
    fn test_decreasing_scores_pick_first() {
        let (texts, labels) = train_data();
        let scorer = FixedScores::new(&[(1.0, 0.8), (50.0, 0.7), (100.0, 0.6)]);
        let search = HyperparameterSearch::new(vec![1.0, 50.0, 100.0]).unwrap();
        let best = search.run(&scorer, &texts, &labels).unwrap().best;
        assert_eq!(best, BestConfiguration { c: 1.0, score: 0.8 });
    }

    #[test]
    fn test_all_zero_scores_return_first_candidate() {
        let (texts, labels) = train_data();
        let scorer = FixedScores::new(&[]);
        let best = HyperparameterSearch::default().run(&scorer, &texts, &labels).unwrap().best;
        assert_eq!(best, BestConfiguration { c: 1.0, score: 0.0 });
    }

    #[test]
    fn test_negative_scores_are_still_compared() {
        let (texts, labels) = train_data();
        let scorer = FixedScores::new(&[(1.0, -0.5), (50.0, -0.2)]);
        let search = HyperparameterSearch::new(vec![1.0, 50.0]).unwrap();
        assert_eq!(search.run(&scorer, &texts, &labels).unwrap().best.c, 50.0);
    }

    #[test]
    fn test_empty_candidates_fail() {
        let err = HyperparameterSearch::new(vec![]).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_non_positive_candidate_fails() {
        assert!(HyperparameterSearch::new(vec![1.0, 0.0]).is_err());
        assert!(HyperparameterSearch::new(vec![f64::INFINITY]).is_err());
    }

    #[test]
    fn test_mismatched_training_data_fails_before_scoring() {
        let scorer = FixedScores::new(&[]);
        let err = HyperparameterSearch::default()
            .run(&scorer, &["a".to_string()], &[])
            .unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidConfiguration(_)));
        assert!(scorer.calls.borrow().is_empty());
    }

    #[test]
    fn test_scorer_failure_propagates() {
        let (texts, labels) = train_data();
        let err = HyperparameterSearch::default()
            .run(&FailingScorer, &texts, &labels)
            .unwrap_err();
        assert!(matches!(err, ClassifierError::TrainingFailure { .. }));
    }

    #[test]
    fn test_default_candidates() {
        assert_eq!(HyperparameterSearch::default().candidates(), &DEFAULT_C_VALUES);
    }
}

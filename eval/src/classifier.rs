// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 The signews-eval Authors

//! Significant-text classifier: vectorizer plus regularized logistic regression
//!
//! The learning algorithm is a value-like configuration. Every `train` call
//! builds fresh parameters, so validation during the search and the final fit
//! never share state.

use crate::datasets::{rng_from_seed, Label};
use crate::error::{ClassifierError, Result, Stage};
use crate::vectorizer::{SparseVector, Vectorizer, VectorizerKind};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Trait for learning algorithms that produce a linear model
pub trait LearningAlgorithm {
    /// Fit fresh parameters on the given features
    fn train(&self, features: &[SparseVector], labels: &[Label], n_features: usize) -> Result<LinearModel>;

    fn name(&self) -> &str;
}

/// Solver settings shared by every candidate of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmSettings {
    pub max_iter: usize,
    pub learning_rate: f64,
    pub tolerance: f64,
}

impl Default for AlgorithmSettings {
    fn default() -> Self {
        Self {
            max_iter: 300,
            learning_rate: 1.0,
            tolerance: 1e-5,
        }
    }
}

/// L2-regularized logistic regression
///
/// Minimizes mean log-loss + ||w||² / (2·C·n), which has the same minimizer as
/// ½||w||² + C·Σ log-loss. Larger `c` means weaker regularization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    c: f64,
    settings: AlgorithmSettings,
}

impl LogisticRegression {
    pub fn new(c: f64) -> Result<Self> {
        Self::with_settings(c, AlgorithmSettings::default())
    }

    pub fn with_settings(c: f64, settings: AlgorithmSettings) -> Result<Self> {
        if !c.is_finite() || c <= 0.0 {
            return Err(ClassifierError::invalid(format!(
                "regularization strength C must be positive and finite, got {}",
                c
            )));
        }
        if settings.max_iter == 0 || !(settings.learning_rate > 0.0) {
            return Err(ClassifierError::invalid(
                "max_iter and learning_rate must be positive",
            ));
        }
        Ok(Self { c, settings })
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }
}

impl LearningAlgorithm for LogisticRegression {
    fn train(&self, features: &[SparseVector], labels: &[Label], n_features: usize) -> Result<LinearModel> {
        if features.len() != labels.len() {
            return Err(ClassifierError::invalid(format!(
                "features and labels must have the same length, got {} and {}",
                features.len(),
                labels.len()
            )));
        }
        if features.is_empty() {
            return Err(ClassifierError::training(Stage::Fit, "cannot fit with zero samples"));
        }

        let n = features.len() as f64;
        let penalty = 1.0 / (self.c * n);
        // Features are L2-normalized, so the log-loss gradient is 0.5-Lipschitz
        let step = self.settings.learning_rate.min(1.0 / (0.5 + penalty));
        let targets: Vec<f64> = labels.iter().map(|l| l.to_binary() as f64).collect();

        let mut weights = vec![0.0; n_features];
        let mut intercept = 0.0;
        let mut grad = vec![0.0; n_features];

        for _ in 0..self.settings.max_iter {
            grad.iter_mut().for_each(|g| *g = 0.0);
            let mut intercept_grad = 0.0;

            for (x, y) in features.iter().zip(&targets) {
                let error = Self::sigmoid(x.dot(&weights) + intercept) - y;
                intercept_grad += error;
                for &(j, v) in &x.entries {
                    if j < n_features {
                        grad[j] += error * v;
                    }
                }
            }

            intercept_grad /= n;
            let mut max_grad = intercept_grad.abs();
            for (g, w) in grad.iter_mut().zip(&weights) {
                *g = *g / n + penalty * w;
                max_grad = max_grad.max(g.abs());
            }

            intercept -= step * intercept_grad;
            for (w, g) in weights.iter_mut().zip(&grad) {
                *w -= step * g;
            }

            if max_grad < self.settings.tolerance {
                break;
            }
        }

        if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(ClassifierError::training(
                Stage::Fit,
                format!("logistic regression diverged with C={}", self.c),
            ));
        }

        Ok(LinearModel { weights, intercept })
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

/// Learned linear decision function
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// P(significant | x)
    pub fn probability(&self, x: &SparseVector) -> f64 {
        LogisticRegression::sigmoid(x.dot(&self.weights) + self.intercept)
    }

    pub fn predict(&self, x: &SparseVector) -> Label {
        if self.probability(x) >= 0.5 {
            Label::Significant
        } else {
            Label::NotSignificant
        }
    }
}

/// Classifier facade: owns the vectorizer choice and validation strategy
#[derive(Debug, Clone)]
pub struct SignificantTextClassifier {
    vectorizer: VectorizerKind,
    validation_folds: usize,
    /// Fixed for the classifier's lifetime so every candidate sees the same folds
    fold_seed: u64,
}

impl SignificantTextClassifier {
    pub fn new(vectorizer: VectorizerKind) -> Self {
        Self {
            vectorizer,
            validation_folds: 5,
            fold_seed: rand::random(),
        }
    }

    pub fn with_validation_folds(mut self, folds: usize) -> Self {
        self.validation_folds = folds;
        self
    }

    /// Seed the fold shuffle; `None` draws one seed now and keeps it
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.fold_seed = seed.unwrap_or_else(rand::random);
        self
    }

    pub fn vectorizer(&self) -> VectorizerKind {
        self.vectorizer
    }

    fn check_inputs(texts: &[String], labels: &[Label]) -> Result<()> {
        if texts.len() != labels.len() {
            return Err(ClassifierError::invalid(format!(
                "texts and labels must have the same length, got {} and {}",
                texts.len(),
                labels.len()
            )));
        }
        if texts.is_empty() {
            return Err(ClassifierError::invalid("cannot train on an empty set"));
        }
        Ok(())
    }

    /// Mean k-fold cross-validated accuracy of `algorithm` on the given data
    pub fn validate_model<A: LearningAlgorithm>(
        &self,
        texts: &[String],
        labels: &[Label],
        algorithm: &A,
    ) -> Result<f64> {
        Self::check_inputs(texts, labels)?;
        let n = texts.len();
        if n < 2 {
            return Err(ClassifierError::invalid("validation needs at least two examples"));
        }

        let n_folds = self.validation_folds.clamp(2, n);
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng_from_seed(Some(self.fold_seed)));

        let mut scores = Vec::with_capacity(n_folds);
        let mut start = 0;
        for fold in 0..n_folds {
            let fold_size = n / n_folds + usize::from(fold < n % n_folds);
            let end = start + fold_size;

            let held_out = &indices[start..end];
            let fit_idx: Vec<usize> = indices[..start].iter().chain(&indices[end..]).copied().collect();

            let fit_texts: Vec<String> = fit_idx.iter().map(|&i| texts[i].clone()).collect();
            let fit_labels: Vec<Label> = fit_idx.iter().map(|&i| labels[i]).collect();

            let fitted = self.fit(&fit_texts, &fit_labels, algorithm).map_err(|e| match e {
                ClassifierError::TrainingFailure { message, .. } => ClassifierError::training(
                    Stage::Validate,
                    format!("fold {}: {}", fold, message),
                ),
                other => other,
            })?;

            let correct = held_out
                .iter()
                .filter(|&&i| fitted.predict(&texts[i]) == labels[i])
                .count();
            scores.push(correct as f64 / held_out.len() as f64);

            start = end;
        }

        Ok(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    /// Fit vectorizer and model on the full input
    pub fn fit<A: LearningAlgorithm>(
        &self,
        texts: &[String],
        labels: &[Label],
        algorithm: &A,
    ) -> Result<FittedClassifier> {
        Self::check_inputs(texts, labels)?;
        let vectorizer = Vectorizer::fit(self.vectorizer, texts)?;
        let features = vectorizer.transform_all(texts);
        let model = algorithm.train(&features, labels, vectorizer.vocabulary_size())?;
        Ok(FittedClassifier { vectorizer, model })
    }
}

/// Vectorizer and learned parameters from one fit; immutable afterward
#[derive(Debug, Clone)]
pub struct FittedClassifier {
    vectorizer: Vectorizer,
    model: LinearModel,
}

impl FittedClassifier {
    pub fn predict(&self, text: &str) -> Label {
        self.model.predict(&self.vectorizer.transform(text))
    }

    pub fn probability(&self, text: &str) -> f64 {
        self.model.probability(&self.vectorizer.transform(text))
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }
}

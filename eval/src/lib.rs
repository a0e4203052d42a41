// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 The signews-eval Authors

//! Model selection and evaluation for the significant-text classifier
//!
//! This crate provides:
//! - Dataset loading (CSV, synthetic) and randomized train/test splitting
//! - TF-IDF, count and binary text vectorizers
//! - L2-regularized logistic regression with cross-validated scoring
//! - A regularization-strength sweep with first-strictly-greater selection
//! - Accuracy and per-class Precision, Recall, F-Score
//! - False-negative and false-positive artifacts for error analysis
//! - Run-scoped logging to stdout and `classifier.log`

pub mod classifier;
pub mod datasets;
pub mod error;
pub mod error_report;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod search;
pub mod vectorizer;

pub use classifier::{FittedClassifier, LearningAlgorithm, LogisticRegression, SignificantTextClassifier};
pub use datasets::{CsvDataset, Dataset, DatasetProvider, Example, Label, SyntheticDataset};
pub use error::{ClassifierError, Result, Stage};
pub use error_report::{ErrorReporter, MisclassificationSummary};
pub use logging::{LoggingConfig, RunLogging};
pub use metrics::{ClassMetrics, ConfusionMatrix, MetricsReport};
pub use pipeline::{DatasetSource, RunReport, TrainingConfig, TrainingPipeline};
pub use search::{BestConfiguration, CandidateScorer, HyperparameterSearch, SearchOutcome, DEFAULT_C_VALUES};
pub use vectorizer::VectorizerKind;

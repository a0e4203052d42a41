// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 The signews-eval Authors

//! End-to-end training and evaluation pipeline
//!
//! Orchestrates, strictly in order:
//! - Dataset loading
//! - Randomized train/test split
//! - Regularization sweep on the training split only
//! - Final fit with the winning C
//! - Per-example prediction on the test split
//! - Metrics and misclassification artifacts
//! - Optional results serialization

use crate::classifier::{AlgorithmSettings, LogisticRegression, SignificantTextClassifier};
use crate::datasets::{rng_from_seed, train_test_split, CsvDataset, Dataset, DatasetProvider, Label, SyntheticDataset};
use crate::error::{ClassifierError, Result};
use crate::error_report::{staging_file, ErrorReporter, MisclassificationSummary};
use crate::logging::LoggingConfig;
use crate::metrics::MetricsReport;
use crate::search::{CandidateScorer, ClassifierScorer, HyperparameterSearch, SearchOutcome, DEFAULT_C_VALUES};
use crate::vectorizer::VectorizerKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where the full dataset comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetSource {
    Synthetic { size: usize },
    Csv { path: PathBuf },
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub dataset: DatasetSource,
    /// Held-out fraction for the test split
    pub test_fraction: f64,
    /// Regularization strengths, evaluated in order
    pub candidates: Vec<f64>,
    /// Vectorizer name ("tfidf", "count", "binary")
    pub vectorizer: String,
    pub validation_folds: usize,
    /// Fixed seed for split, folds and synthetic data; `None` draws from entropy
    pub seed: Option<u64>,
    pub max_iter: usize,
    pub learning_rate: f64,
    pub tolerance: f64,
    /// Directory for artifacts, log file and results
    pub output_dir: PathBuf,
    /// Results JSON file name inside `output_dir`, written only on success
    pub results_file: Option<String>,
    pub logging: LoggingConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let solver = AlgorithmSettings::default();
        Self {
            dataset: DatasetSource::Synthetic { size: 1000 },
            test_fraction: 0.2,
            candidates: DEFAULT_C_VALUES.to_vec(),
            vectorizer: "tfidf".to_string(),
            validation_folds: 5,
            seed: None,
            max_iter: solver.max_iter,
            learning_rate: solver.learning_rate,
            tolerance: solver.tolerance,
            output_dir: PathBuf::from("."),
            results_file: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ClassifierError::io(path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn algorithm_settings(&self) -> AlgorithmSettings {
        AlgorithmSettings {
            max_iter: self.max_iter,
            learning_rate: self.learning_rate,
            tolerance: self.tolerance,
        }
    }

    pub fn vectorizer_kind(&self) -> Result<VectorizerKind> {
        self.vectorizer.parse()
    }

    /// Reject bad settings before anything is loaded or fitted
    pub fn validate(&self) -> Result<()> {
        HyperparameterSearch::new(self.candidates.clone())?;
        self.vectorizer_kind()?;
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ClassifierError::invalid(format!(
                "test_fraction must be between 0 and 1, got {}",
                self.test_fraction
            )));
        }
        if self.validation_folds < 2 {
            return Err(ClassifierError::invalid("validation_folds must be at least 2"));
        }
        if self.max_iter == 0 || !(self.learning_rate > 0.0) || !(self.tolerance >= 0.0) {
            return Err(ClassifierError::invalid(
                "max_iter and learning_rate must be positive and tolerance non-negative",
            ));
        }
        if let DatasetSource::Synthetic { size: 0 } = self.dataset {
            return Err(ClassifierError::invalid("synthetic dataset size must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub name: String,
    pub total_samples: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub label_distribution: BTreeMap<String, usize>,
}

/// Complete results of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub config: TrainingConfig,
    pub dataset_info: DatasetInfo,
    pub search: SearchOutcome,
    pub metrics: MetricsReport,
    pub misclassifications: MisclassificationSummary,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Main training pipeline
pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Dataset provider for the configured source
    pub fn provider(&self) -> Box<dyn DatasetProvider> {
        match &self.config.dataset {
            DatasetSource::Synthetic { size } => {
                Box::new(SyntheticDataset::new(*size, self.config.seed.unwrap_or(42)))
            }
            DatasetSource::Csv { path } => Box::new(CsvDataset::new(path.clone())),
        }
    }

    /// Run the full pipeline on the configured dataset
    pub fn run(&self) -> Result<RunReport> {
        let provider = self.provider();
        self.run_with(provider.as_ref())
    }

    /// Run the full pipeline on any dataset provider
    pub fn run_with(&self, provider: &dyn DatasetProvider) -> Result<RunReport> {
        self.config.validate()?;
        let classifier = self.classifier()?;
        let scorer = ClassifierScorer::new(&classifier, self.config.algorithm_settings());
        self.execute(provider, &classifier, &scorer)
    }

    /// Run the full pipeline with a custom candidate scorer for the sweep
    ///
    /// The final fit still uses the configured classifier and the winning C.
    pub fn run_with_scorer<S: CandidateScorer + ?Sized>(
        &self,
        provider: &dyn DatasetProvider,
        scorer: &S,
    ) -> Result<RunReport> {
        self.config.validate()?;
        let classifier = self.classifier()?;
        self.execute(provider, &classifier, scorer)
    }

    fn classifier(&self) -> Result<SignificantTextClassifier> {
        Ok(SignificantTextClassifier::new(self.config.vectorizer_kind()?)
            .with_validation_folds(self.config.validation_folds)
            .with_seed(self.config.seed))
    }

    fn execute<S: CandidateScorer + ?Sized>(
        &self,
        provider: &dyn DatasetProvider,
        classifier: &SignificantTextClassifier,
        scorer: &S,
    ) -> Result<RunReport> {
        let search = HyperparameterSearch::new(self.config.candidates.clone())?;
        let settings = self.config.algorithm_settings();

        let dataset = provider.load_dataset()?;
        if dataset.is_empty() {
            return Err(ClassifierError::invalid("dataset is empty"));
        }
        tracing::info!("Loaded dataset '{}' with {} examples", dataset.name, dataset.len());

        let mut rng = rng_from_seed(self.config.seed);
        let split = train_test_split(&dataset, self.config.test_fraction, &mut rng)?;
        tracing::info!("Split into {} train and {} test examples", split.train.len(), split.test.len());

        let train_texts: Vec<String> = split.train.iter().map(|e| e.text.clone()).collect();
        let train_labels: Vec<Label> = split.train.iter().map(|e| e.label).collect();

        tracing::info!("Training a regularized logistic regression algorithm");
        let outcome = search.run(scorer, &train_texts, &train_labels)?;

        let algorithm = LogisticRegression::with_settings(outcome.best.c, settings)?;
        let fitted = classifier.fit(&train_texts, &train_labels, &algorithm)?;

        let test_texts: Vec<&str> = split.test.iter().map(|e| e.text.as_str()).collect();
        let test_labels: Vec<Label> = split.test.iter().map(|e| e.label).collect();
        let predictions: Vec<Label> = test_texts.iter().map(|text| fitted.predict(text)).collect();

        let metrics = MetricsReport::compute(&test_labels, &predictions)?;
        tracing::info!(
            "Accuracy:{}, Precision:{}, Recall:{}, Fscore:{}",
            metrics.accuracy,
            metrics.precision,
            metrics.recall,
            metrics.f_score
        );

        let misclassifications =
            ErrorReporter::new(&self.config.output_dir).write(&test_labels, &predictions, &test_texts)?;

        let report = RunReport {
            config: self.config.clone(),
            dataset_info: Self::dataset_info(&dataset, split.train.len(), split.test.len()),
            search: outcome,
            metrics,
            misclassifications,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };

        if let Some(name) = &self.config.results_file {
            Self::save_results(&report, &self.config.output_dir.join(name))?;
        }

        Ok(report)
    }

    fn dataset_info(dataset: &Dataset, train_samples: usize, test_samples: usize) -> DatasetInfo {
        DatasetInfo {
            name: dataset.name.clone(),
            total_samples: dataset.len(),
            train_samples,
            test_samples,
            label_distribution: Dataset::label_distribution(&dataset.examples)
                .iter()
                .map(|(k, v)| (k.to_binary().to_string(), *v))
                .collect(),
        }
    }

    /// Save results to a JSON file, replacing it atomically
    pub fn save_results(report: &RunReport, output_path: &Path) -> Result<()> {
        let dir = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| ClassifierError::io(dir, e))?;

        let json = serde_json::to_string_pretty(report)?;
        let mut file = staging_file(dir).map_err(|e| ClassifierError::io(dir, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| ClassifierError::io(output_path, e))?;
        file.persist(output_path)
            .map_err(|e| ClassifierError::io(output_path, e.error))?;

        tracing::info!("Results saved to {}", output_path.display());
        Ok(())
    }

    /// Generate a markdown report
    pub fn generate_report(report: &RunReport) -> String {
        let mut out = String::new();

        out.push_str("# Significant-Text Classifier Report\n\n");
        out.push_str(&format!("**Generated:** {}\n\n", report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")));
        out.push_str(&format!("**Version:** {}\n\n", report.version));

        out.push_str("## Dataset\n\n");
        out.push_str(&format!("- **Name:** {}\n", report.dataset_info.name));
        out.push_str(&format!("- **Total Samples:** {}\n", report.dataset_info.total_samples));
        out.push_str(&format!(
            "- **Split Sizes:** Train={}, Test={}\n",
            report.dataset_info.train_samples, report.dataset_info.test_samples
        ));
        for (label, count) in &report.dataset_info.label_distribution {
            out.push_str(&format!("- **Label {}:** {}\n", label, count));
        }

        out.push_str("\n## Regularization Sweep\n\n");
        out.push_str("| C | Validation Accuracy | Chosen |\n");
        out.push_str("|---|---------------------|--------|\n");
        for trial in &report.search.trials {
            let chosen = if trial.c == report.search.best.c { "yes" } else { "" };
            out.push_str(&format!("| {} | {:.4} | {} |\n", trial.c, trial.score, chosen));
        }

        out.push_str("\n## Test Metrics\n\n");
        out.push_str(&format!("```\n{}\n```\n\n", report.metrics.format()));

        out.push_str("## Misclassified Examples\n\n");
        out.push_str(&format!(
            "- False negatives: {} ({})\n",
            report.misclassifications.false_negatives,
            report.misclassifications.false_negative_path.display()
        ));
        out.push_str(&format!(
            "- False positives: {} ({})\n\n",
            report.misclassifications.false_positives,
            report.misclassifications.false_positive_path.display()
        ));

        out.push_str("## Configuration\n\n");
        out.push_str(&format!(
            "```json\n{}\n```\n",
            serde_json::to_string_pretty(&report.config).unwrap_or_default()
        ));

        out
    }
}

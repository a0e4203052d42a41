// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 The signews-eval Authors

//! Error types for the training and evaluation pipeline

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Pipeline stage a collaborator failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadDataset,
    Vectorize,
    Validate,
    Fit,
    Predict,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LoadDataset => "load dataset",
            Stage::Vectorize => "vectorize",
            Stage::Validate => "validate",
            Stage::Fit => "fit",
            Stage::Predict => "predict",
        };
        f.write_str(name)
    }
}

/// Main error type for the pipeline
///
/// No variant is recovered locally: a run is all-or-nothing.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Bad input detected before any fitting begins
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A collaborator (dataset, vectorizer, learning algorithm) failed
    #[error("Training failure during {stage}: {message}")]
    TrainingFailure { stage: Stage, message: String },

    /// An artifact or config file could not be opened, written or persisted
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ClassifierError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub fn training(stage: Stage, message: impl Into<String>) -> Self {
        Self::TrainingFailure {
            stage,
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_failure_names_stage() {
        let err = ClassifierError::training(Stage::Vectorize, "empty corpus");
        assert_eq!(err.to_string(), "Training failure during vectorize: empty corpus");
    }

    #[test]
    fn test_io_error_names_path() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ClassifierError::io("out/false_negative.txt", source);
        assert!(err.to_string().contains("out/false_negative.txt"));
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 The signews-eval Authors

//! Run-scoped logging to stdout and a log file

use crate::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file, relative paths resolve against the output directory
    pub log_file: String,
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: "classifier.log".to_string(),
            level: "info".to_string(),
        }
    }
}

/// Logging context for one pipeline run
///
/// Installs a subscriber as the thread's default for as long as it lives and
/// restores the previous one on drop.
pub struct RunLogging {
    log_path: PathBuf,
    _guard: DefaultGuard,
}

impl RunLogging {
    pub fn install(config: &LoggingConfig, output_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(output_dir).map_err(|e| ClassifierError::io(output_dir, e))?;
        let log_path = output_dir.join(&config.log_file);
        let file = File::create(&log_path).map_err(|e| ClassifierError::io(&log_path, e))?;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

        let guard = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .set_default();

        Ok(Self {
            log_path,
            _guard: guard,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

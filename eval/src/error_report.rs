// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 The signews-eval Authors

//! Misclassified-example artifacts for manual error analysis
//!
//! Each artifact is a sequence of `<raw text>\n$$end$$\n` blocks. Both files
//! are written to temporaries in the output directory and renamed over the
//! targets only once both writes have flushed.
//!
//! The previous `false_positive.txt` is removed before either rename. If the
//! second rename fails, the directory holds the new false negatives and no
//! false-positive file, never a mix of two runs.

use crate::datasets::Label;
use crate::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const FALSE_NEGATIVE_FILE: &str = "false_negative.txt";
pub const FALSE_POSITIVE_FILE: &str = "false_positive.txt";
pub const BLOCK_DELIMITER: &str = "$$end$$";

/// Counts and locations of the written artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MisclassificationSummary {
    pub false_negatives: usize,
    pub false_positives: usize,
    pub false_negative_path: PathBuf,
    pub false_positive_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ErrorReporter {
    output_dir: PathBuf,
}

/// Temporary file in `dir` that persists with the mode `File::create` would give
pub(crate) fn staging_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Subject to the umask, like a plain create
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

/// One artifact being staged in a temporary file
struct StagedArtifact {
    target: PathBuf,
    writer: BufWriter<NamedTempFile>,
    blocks: usize,
}

impl StagedArtifact {
    fn create(dir: &Path, name: &str) -> Result<Self> {
        let file = staging_file(dir).map_err(|e| ClassifierError::io(dir, e))?;
        Ok(Self {
            target: dir.join(name),
            writer: BufWriter::new(file),
            blocks: 0,
        })
    }

    fn append(&mut self, text: &str) -> Result<()> {
        write!(self.writer, "{}\n{}\n", text, BLOCK_DELIMITER).map_err(|e| ClassifierError::io(&self.target, e))?;
        self.blocks += 1;
        Ok(())
    }

    fn finish(self) -> Result<(NamedTempFile, PathBuf, usize)> {
        let target = self.target;
        let file = self
            .writer
            .into_inner()
            .map_err(|e| ClassifierError::io(&target, e.into_error()))?;
        file.as_file().sync_all().map_err(|e| ClassifierError::io(&target, e))?;
        Ok((file, target, self.blocks))
    }
}

impl ErrorReporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn false_negative_path(&self) -> PathBuf {
        self.output_dir.join(FALSE_NEGATIVE_FILE)
    }

    pub fn false_positive_path(&self) -> PathBuf {
        self.output_dir.join(FALSE_POSITIVE_FILE)
    }

    /// Write false negatives and false positives, replacing any previous run's files
    pub fn write<S: AsRef<str>>(
        &self,
        true_labels: &[Label],
        predicted_labels: &[Label],
        texts: &[S],
    ) -> Result<MisclassificationSummary> {
        if true_labels.len() != predicted_labels.len() || true_labels.len() != texts.len() {
            return Err(ClassifierError::invalid(format!(
                "true labels, predictions and texts must have the same length, got {}, {} and {}",
                true_labels.len(),
                predicted_labels.len(),
                texts.len()
            )));
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|e| ClassifierError::io(&self.output_dir, e))?;

        // Temporaries are deleted on drop, so an early return leaves no partial file
        let mut false_negatives = StagedArtifact::create(&self.output_dir, FALSE_NEGATIVE_FILE)?;
        let mut false_positives = StagedArtifact::create(&self.output_dir, FALSE_POSITIVE_FILE)?;

        for ((truth, pred), text) in true_labels.iter().zip(predicted_labels).zip(texts) {
            match (truth, pred) {
                (Label::Significant, Label::NotSignificant) => false_negatives.append(text.as_ref())?,
                (Label::NotSignificant, Label::Significant) => false_positives.append(text.as_ref())?,
                _ => {}
            }
        }

        let (fn_file, fn_path, fn_count) = false_negatives.finish()?;
        let (fp_file, fp_path, fp_count) = false_positives.finish()?;

        match std::fs::remove_file(&fp_path) {
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(ClassifierError::io(&fp_path, e)),
            _ => {}
        }
        fn_file
            .persist(&fn_path)
            .map_err(|e| ClassifierError::io(&fn_path, e.error))?;
        fp_file
            .persist(&fp_path)
            .map_err(|e| ClassifierError::io(&fp_path, e.error))?;

        tracing::info!(
            "Wrote {} false negatives to {} and {} false positives to {}",
            fn_count,
            fn_path.display(),
            fp_count,
            fp_path.display()
        );

        Ok(MisclassificationSummary {
            false_negatives: fn_count,
            false_positives: fp_count,
            false_negative_path: fn_path,
            false_positive_path: fp_path,
        })
    }
}

/// Split an artifact back into its raw texts
pub fn parse_blocks(contents: &str) -> Vec<String> {
    let terminator = format!("\n{}\n", BLOCK_DELIMITER);
    contents
        .split_terminator(terminator.as_str())
        .map(|block| block.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::Label::{NotSignificant as N, Significant as S};

    #[test]
    fn test_error_report_partition() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = ErrorReporter::new(dir.path());

        let texts = ["text_a", "text_b", "text_c"];
        let summary = reporter.write(&[S, N, S], &[N, S, S], &texts).unwrap();

        let fn_contents = std::fs::read_to_string(reporter.false_negative_path()).unwrap();
        let fp_contents = std::fs::read_to_string(reporter.false_positive_path()).unwrap();

        assert_eq!(fn_contents, "text_a\n$$end$$\n");
        assert_eq!(fp_contents, "text_b\n$$end$$\n");
        assert!(!fn_contents.contains("text_c") && !fp_contents.contains("text_c"));
        assert_eq!(summary.false_negatives, 1);
        assert_eq!(summary.false_positives, 1);
    }

    #[test]
    fn test_reporting_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = ErrorReporter::new(dir.path());
        let texts = ["storm\nwith a newline", "lunch", "flood", "tea"];
        let truth = [S, N, S, N];
        let pred = [N, S, N, N];

        reporter.write(&truth, &pred, &texts).unwrap();
        let first = (
            std::fs::read(reporter.false_negative_path()).unwrap(),
            std::fs::read(reporter.false_positive_path()).unwrap(),
        );

        reporter.write(&truth, &pred, &texts).unwrap();
        let second = (
            std::fs::read(reporter.false_negative_path()).unwrap(),
            std::fs::read(reporter.false_positive_path()).unwrap(),
        );

        assert_eq!(first, second);
        assert_eq!(
            parse_blocks(&String::from_utf8(first.0).unwrap()),
            vec!["storm\nwith a newline".to_string(), "flood".to_string()]
        );
    }

    #[test]
    fn test_previous_contents_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = ErrorReporter::new(dir.path());
        std::fs::write(reporter.false_negative_path(), "stale\n$$end$$\n").unwrap();

        reporter.write(&[S], &[S], &["correct"]).unwrap();

        assert_eq!(std::fs::read_to_string(reporter.false_negative_path()).unwrap(), "");
        assert_eq!(std::fs::read_to_string(reporter.false_positive_path()).unwrap(), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_artifacts_get_default_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let reporter = ErrorReporter::new(dir.path());
        reporter.write(&[S, N], &[N, S], &["missed", "spurious"]).unwrap();

        let reference = dir.path().join("reference.txt");
        std::fs::File::create(&reference).unwrap();
        let mode = |path: &Path| std::fs::metadata(path).unwrap().permissions().mode() & 0o777;

        assert_eq!(mode(&reporter.false_negative_path()), mode(&reference));
        assert_eq!(mode(&reporter.false_positive_path()), mode(&reference));
    }

    #[test]
    fn test_blocked_false_positive_target_keeps_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = ErrorReporter::new(dir.path());
        std::fs::write(reporter.false_negative_path(), "previous\n$$end$$\n").unwrap();
        // A non-empty directory cannot be replaced by a file
        std::fs::create_dir(reporter.false_positive_path()).unwrap();
        std::fs::write(reporter.false_positive_path().join("keep"), "x").unwrap();

        let err = reporter.write(&[S], &[N], &["new"]).unwrap_err();
        assert!(matches!(err, ClassifierError::Io { .. }));
        assert_eq!(
            std::fs::read_to_string(reporter.false_negative_path()).unwrap(),
            "previous\n$$end$$\n"
        );
    }

    #[test]
    fn test_stale_false_positive_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = ErrorReporter::new(dir.path());
        std::fs::write(reporter.false_positive_path(), "old\n$$end$$\n").unwrap();

        let summary = reporter.write(&[N], &[S], &["fresh"]).unwrap();
        assert_eq!(summary.false_positives, 1);
        assert_eq!(
            parse_blocks(&std::fs::read_to_string(reporter.false_positive_path()).unwrap()),
            vec!["fresh".to_string()]
        );
    }

    #[test]
    fn test_length_mismatch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = ErrorReporter::new(dir.path());

        let err = reporter.write(&[S, N], &[N], &["a", "b"]).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidConfiguration(_)));
        assert!(!reporter.false_negative_path().exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unwritable_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "file").unwrap();

        let reporter = ErrorReporter::new(blocker.join("nested"));
        let err = reporter.write(&[S], &[N], &["a"]).unwrap_err();
        assert!(matches!(err, ClassifierError::Io { .. }));
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 The signews-eval Authors

//! Dataset loading and train/test splitting for significant-text classification

use crate::error::{ClassifierError, Result, Stage};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Binary label for significance detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Text does not discuss a significant topic (0)
    NotSignificant,
    /// Text discusses a significant topic (1)
    Significant,
}

impl Label {
    /// Convert to the numeric label used in datasets and artifacts
    pub fn to_binary(&self) -> u8 {
        match self {
            Label::NotSignificant => 0,
            Label::Significant => 1,
        }
    }

    /// Create from a numeric label; only 0 and 1 are valid
    pub fn from_binary(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Label::NotSignificant),
            1 => Ok(Label::Significant),
            other => Err(ClassifierError::training(
                Stage::LoadDataset,
                format!("label must be 0 or 1, got {}", other),
            )),
        }
    }
}

/// A single labeled text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
    pub label: Label,
}

impl Example {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// An ordered, loaded dataset
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub examples: Vec<Example>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, examples: Vec<Example>) -> Self {
        Self {
            name: name.into(),
            examples,
        }
    }

    /// Build from parallel text/label sequences
    pub fn from_parallel(name: impl Into<String>, texts: Vec<String>, labels: Vec<Label>) -> Result<Self> {
        if texts.len() != labels.len() {
            return Err(ClassifierError::invalid(format!(
                "texts and labels must have the same length, got {} and {}",
                texts.len(),
                labels.len()
            )));
        }
        let examples = texts
            .into_iter()
            .zip(labels)
            .map(|(text, label)| Example { text, label })
            .collect();
        Ok(Self::new(name, examples))
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn texts(&self) -> Vec<String> {
        self.examples.iter().map(|e| e.text.clone()).collect()
    }

    pub fn labels(&self) -> Vec<Label> {
        self.examples.iter().map(|e| e.label).collect()
    }

    /// Label counts, ordered by label
    pub fn label_distribution(examples: &[Example]) -> BTreeMap<Label, usize> {
        let mut dist = BTreeMap::new();
        for example in examples {
            *dist.entry(example.label).or_insert(0) += 1;
        }
        dist
    }
}

/// Source of the full labeled dataset
pub trait DatasetProvider {
    fn load_dataset(&self) -> Result<Dataset>;
}

/// CSV file with a `text,label` header
#[derive(Debug, Clone)]
pub struct CsvDataset {
    path: PathBuf,
}

impl CsvDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetProvider for CsvDataset {
    fn load_dataset(&self) -> Result<Dataset> {
        let file = File::open(&self.path).map_err(|e| ClassifierError::io(&self.path, e))?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

        let mut examples = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                ClassifierError::training(
                    Stage::LoadDataset,
                    format!("failed to read record {} in {}: {}", idx, self.path.display(), e),
                )
            })?;

            let (text, raw_label) = match (record.get(0), record.get(1)) {
                (Some(text), Some(label)) => (text, label.trim()),
                _ => {
                    return Err(ClassifierError::training(
                        Stage::LoadDataset,
                        format!("record {} in {} is missing a field", idx, self.path.display()),
                    ))
                }
            };

            let label = raw_label
                .parse::<u8>()
                .map_err(|_| {
                    ClassifierError::training(
                        Stage::LoadDataset,
                        format!("record {} in {} has label '{}'", idx, self.path.display(), raw_label),
                    )
                })
                .and_then(Label::from_binary)?;

            examples.push(Example::new(text, label));
        }

        let name = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "csv".to_string());
        Ok(Dataset::new(name, examples))
    }
}

/// Generated dataset for demos and pipeline tests
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    pub size: usize,
    pub seed: u64,
}

impl SyntheticDataset {
    pub fn new(size: usize, seed: u64) -> Self {
        Self { size, seed }
    }
}

impl DatasetProvider for SyntheticDataset {
    fn load_dataset(&self) -> Result<Dataset> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let significant_phrases = [
            "Earthquake of magnitude seven strikes coastal region",
            "Parliament passes emergency budget after election",
            "Flooding forces thousands to evacuate their homes",
            "Central bank raises interest rates amid inflation",
            "Ceasefire agreement signed between warring factions",
        ];

        let mundane_phrases = [
            "Just had the best coffee this morning",
            "Watching my favourite show again tonight",
            "Cannot decide what to cook for dinner",
            "Lovely walk with the dog in the park",
            "New sneakers arrived and they look great",
        ];

        let examples = (0..self.size)
            .map(|i| {
                let significant = rng.gen_bool(0.5);
                let phrases = if significant { &significant_phrases } else { &mundane_phrases };
                let phrase = phrases[rng.gen_range(0..phrases.len())];
                let label = if significant { Label::Significant } else { Label::NotSignificant };
                Example::new(format!("{} #{}", phrase, i), label)
            })
            .collect();

        Ok(Dataset::new("synthetic", examples))
    }
}

/// A disjoint train/test partition of a dataset
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Vec<Example>,
    pub test: Vec<Example>,
    /// Original dataset positions of `train`, in order
    pub train_indices: Vec<usize>,
    /// Original dataset positions of `test`, in order
    pub test_indices: Vec<usize>,
}

/// RNG for splits and folds: seeded when reproducibility is requested
pub fn rng_from_seed(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Randomized train/test split holding out `round(test_fraction * N)` examples
pub fn train_test_split<R: Rng>(dataset: &Dataset, test_fraction: f64, rng: &mut R) -> Result<Split> {
    if dataset.is_empty() {
        return Err(ClassifierError::invalid("dataset is empty"));
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ClassifierError::invalid(format!(
            "test fraction must be between 0 and 1, got {}",
            test_fraction
        )));
    }

    let n = dataset.len();
    let n_test = (n as f64 * test_fraction).round() as usize;
    let n_train = n - n_test.min(n);
    if n_test == 0 || n_train == 0 {
        return Err(ClassifierError::invalid(format!(
            "split would leave an empty side (n_train={}, n_test={})",
            n_train, n_test
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    let test_indices = indices[..n_test].to_vec();
    let train_indices = indices[n_test..].to_vec();

    let pick = |idx: &[usize]| idx.iter().map(|&i| dataset.examples[i].clone()).collect::<Vec<_>>();

    Ok(Split {
        train: pick(&train_indices),
        test: pick(&test_indices),
        train_indices,
        test_indices,
    })
}

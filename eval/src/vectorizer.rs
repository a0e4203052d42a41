// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 The signews-eval Authors

//! Text vectorization: raw text to sparse, L2-normalized feature vectors
//!
//! Implements:
//! - TF-IDF weighting with smoothed inverse document frequency
//! - Raw term counts
//! - Binary term presence

use crate::error::{ClassifierError, Result, Stage};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Feature extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VectorizerKind {
    TfIdf,
    Count,
    Binary,
}

impl FromStr for VectorizerKind {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tfidf" | "tf-idf" => Ok(VectorizerKind::TfIdf),
            "count" => Ok(VectorizerKind::Count),
            "binary" => Ok(VectorizerKind::Binary),
            other => Err(ClassifierError::invalid(format!(
                "unknown vectorizer '{}' (expected tfidf, count or binary)",
                other
            ))),
        }
    }
}

impl fmt::Display for VectorizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VectorizerKind::TfIdf => "tfidf",
            VectorizerKind::Count => "count",
            VectorizerKind::Binary => "binary",
        };
        f.write_str(name)
    }
}

/// Sparse feature vector as `(feature index, value)` pairs sorted by index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }

    /// Dot product with a dense weight vector
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|&(idx, v)| weights.get(idx).map(|w| w * v))
            .sum()
    }
}

/// Lowercase, split on non-alphanumerics, skip short words
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.chars().count() > 2)
        .map(|s| s.to_string())
        .collect()
}

/// A vectorizer fitted on a training corpus
#[derive(Debug, Clone)]
pub struct Vectorizer {
    kind: VectorizerKind,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl Vectorizer {
    /// Learn vocabulary and document frequencies from `texts`
    pub fn fit<S: AsRef<str>>(kind: VectorizerKind, texts: &[S]) -> Result<Self> {
        if texts.is_empty() {
            return Err(ClassifierError::training(
                Stage::Vectorize,
                "cannot fit a vectorizer on an empty corpus",
            ));
        }

        // BTreeMap keeps feature indices stable across runs
        let mut df: BTreeMap<String, usize> = BTreeMap::new();
        for text in texts {
            let unique: HashSet<String> = tokenize(text.as_ref()).into_iter().collect();
            for token in unique {
                *df.entry(token).or_insert(0) += 1;
            }
        }

        let n_docs = texts.len() as f64;
        let mut vocabulary = HashMap::with_capacity(df.len());
        let mut idf = Vec::with_capacity(df.len());
        for (idx, (term, count)) in df.into_iter().enumerate() {
            idf.push(((1.0 + n_docs) / (1.0 + count as f64)).ln() + 1.0);
            vocabulary.insert(term, idx);
        }

        Ok(Self { kind, vocabulary, idf })
    }

    pub fn kind(&self) -> VectorizerKind {
        self.kind
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Map one text to a normalized sparse vector; unknown terms are ignored
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for token in tokenize(text) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, count)| {
                let value = match self.kind {
                    VectorizerKind::TfIdf => count as f64 * self.idf[idx],
                    VectorizerKind::Count => count as f64,
                    VectorizerKind::Binary => 1.0,
                };
                (idx, value)
            })
            .collect();

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut entries {
                *v /= norm;
            }
        }

        SparseVector { entries }
    }

    pub fn transform_all<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SparseVector> {
        texts.iter().map(|t| self.transform(t.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_skips_short_words() {
        assert_eq!(tokenize("An EARTHQUAKE hit, it was big!"), vec!["earthquake", "hit", "was", "big"]);
    }

    #[test]
    fn test_vectorizer_kind_from_str() {
        assert_eq!("tfidf".parse::<VectorizerKind>().unwrap(), VectorizerKind::TfIdf);
        assert_eq!("Count".parse::<VectorizerKind>().unwrap(), VectorizerKind::Count);
        assert!("word2vec".parse::<VectorizerKind>().is_err());
    }

    #[test]
    fn test_vocabulary_is_sorted_and_stable() {
        let texts = ["zebra apple", "mango apple"];
        let vectorizer = Vectorizer::fit(VectorizerKind::TfIdf, &texts).unwrap();
        assert_eq!(vectorizer.vocabulary_size(), 3);
        assert_eq!(vectorizer.index_of("apple"), Some(0));
        assert_eq!(vectorizer.index_of("mango"), Some(1));
        assert_eq!(vectorizer.index_of("zebra"), Some(2));
    }

    #[test]
    fn test_tfidf_downweights_common_terms() {
        let texts = ["storm warning issued", "storm passed quietly", "storm again"];
        let vectorizer = Vectorizer::fit(VectorizerKind::TfIdf, &texts).unwrap();
        let v = vectorizer.transform("storm warning");

        let storm = vectorizer.index_of("storm").unwrap();
        let warning = vectorizer.index_of("warning").unwrap();
        let value = |idx| v.entries.iter().find(|(i, _)| *i == idx).map(|(_, x)| *x).unwrap();
        assert!(value(warning) > value(storm));
        assert!((v.norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_terms_are_ignored() {
        let vectorizer = Vectorizer::fit(VectorizerKind::Binary, &["known words"]).unwrap();
        assert!(vectorizer.transform("completely unseen").is_empty());
        assert_eq!(vectorizer.transform("known known").entries, vec![(0, 1.0)]);
    }

    #[test]
    fn test_fit_empty_corpus_fails() {
        let empty: [&str; 0] = [];
        let err = Vectorizer::fit(VectorizerKind::TfIdf, &empty).unwrap_err();
        assert!(matches!(err, ClassifierError::TrainingFailure { stage: Stage::Vectorize, .. }));
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 The signews-eval Authors

//! Standalone regularization sweep
//!
//! Splits the dataset, cross-validates every candidate C on the training split
//! and prints the validation table without fitting a final model.

use anyhow::{Context, Result};
use clap::Parser;
use signews_eval::classifier::SignificantTextClassifier;
use signews_eval::datasets::{rng_from_seed, train_test_split, CsvDataset, DatasetProvider, SyntheticDataset};
use signews_eval::search::{ClassifierScorer, HyperparameterSearch};
use signews_eval::vectorizer::VectorizerKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sweep-c")]
#[command(about = "Cross-validate each regularization strength on the training split")]
#[command(version)]
struct Args {
    /// CSV dataset with a `text,label` header (default: synthetic)
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Candidate C values (comma-separated)
    #[arg(short, long, value_delimiter = ',', default_value = "1,50,100,200,300,400")]
    candidates: Vec<f64>,

    /// Vectorizer (tfidf, count, binary)
    #[arg(short, long, default_value = "tfidf")]
    vectorizer: String,

    /// Number of cross-validation folds
    #[arg(short, long, default_value_t = 5)]
    folds: usize,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of samples for the synthetic dataset
    #[arg(short, long, default_value_t = 1000)]
    num_samples: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let search = HyperparameterSearch::new(args.candidates.clone())?;
    let kind: VectorizerKind = args.vectorizer.parse()?;

    let provider: Box<dyn DatasetProvider> = match args.dataset {
        Some(ref path) => Box::new(CsvDataset::new(path)),
        None => Box::new(SyntheticDataset::new(args.num_samples, args.seed.unwrap_or(42))),
    };
    let dataset = provider.load_dataset().context("Failed to load dataset")?;

    let split = train_test_split(&dataset, 0.2, &mut rng_from_seed(args.seed))?;
    let texts: Vec<String> = split.train.iter().map(|e| e.text.clone()).collect();
    let labels: Vec<_> = split.train.iter().map(|e| e.label).collect();

    println!("\nDataset: {}", dataset.name);
    println!("  Train samples: {}", split.train.len());
    println!("  Held-out samples (unused): {}", split.test.len());

    let classifier = SignificantTextClassifier::new(kind)
        .with_validation_folds(args.folds)
        .with_seed(args.seed);
    let scorer = ClassifierScorer::new(&classifier, Default::default());
    let outcome = search.run(&scorer, &texts, &labels)?;

    println!("\n{}", "=".repeat(40));
    println!("{:>10} {:>16} {:>10}", "C", "CV accuracy", "Chosen");
    println!("{:-<40}", "");
    for trial in &outcome.trials {
        let chosen = if trial.c == outcome.best.c { "*" } else { "" };
        println!("{:>10} {:>16.4} {:>10}", trial.c, trial.score, chosen);
    }
    println!("{:-<40}", "");
    println!("Best C={} (accuracy {:.4})", outcome.best.c, outcome.best.score);

    Ok(())
}

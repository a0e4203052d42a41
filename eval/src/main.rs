// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2026 The signews-eval Authors

//! Train and evaluate the significant-text classifier
//!
//! Usage:
//!   train-test
//!   train-test --dataset ./data/tweets.csv --seed 42 --output ./out

use anyhow::{Context, Result};
use clap::Parser;
use signews_eval::logging::RunLogging;
use signews_eval::pipeline::{DatasetSource, TrainingConfig, TrainingPipeline};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "train-test")]
#[command(about = "Select, train and evaluate the significant-text classifier")]
#[command(version)]
struct Args {
    /// JSON configuration file (defaults apply to missing fields)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV dataset with a `text,label` header (default: synthetic)
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Random seed for a reproducible split
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output directory for artifacts and the log file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save the JSON run report under this name in the output directory
    #[arg(short, long)]
    results: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TrainingConfig::default(),
    };
    if let Some(path) = args.dataset {
        config.dataset = DatasetSource::Csv { path };
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if args.results.is_some() {
        config.results_file = args.results;
    }

    let _logging = RunLogging::install(&config.logging, &config.output_dir).context("Failed to set up logging")?;

    let pipeline = TrainingPipeline::new(config);
    match pipeline.run() {
        Ok(report) => {
            println!("\n{}", report.metrics.format());
            Ok(())
        }
        Err(err) => {
            tracing::error!("Training run failed: {}", err);
            Err(err).context("Training run failed")
        }
    }
}

//! This module contains the main entrypoint to the arbor cli.

use self::config::Config;
use anyhow::{Context, Result};
use arbor_dataframe::{shuffle_rows, train_test_split, DataFrame, FromCsvOptions, TrainTestSplit};
use arbor_metrics::{BinaryClassificationMetrics, BinaryClassificationMetricsOutput, StreamingMetric};
use arbor_progress::ProgressCounter;
use arbor_tree::ExecutionMode;
use clap::{Args, Parser, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use std::{path::PathBuf, time::Instant};

mod config;
mod forest;
mod tree;

#[derive(Parser)]
#[clap(
	about = "Train decision trees and random forests sequentially and in parallel.",
	disable_help_subcommand = true
)]
enum Options {
	#[clap(name = "tree", about = "train a decision tree")]
	Tree(CommandOptions),
	#[clap(name = "forest", about = "train a random forest")]
	Forest(CommandOptions),
}

#[derive(Args, Debug)]
pub struct CommandOptions {
	#[clap(short, long, help = "the path to your .csv file")]
	file: PathBuf,
	#[clap(short, long, help = "the name of the column to predict")]
	target: String,
	#[clap(short, long, help = "the path to a json config file")]
	config: Option<PathBuf>,
	#[clap(
		short,
		long,
		value_enum,
		default_value = "both",
		help = "train sequentially, in parallel, or both and compare"
	)]
	mode: Mode,
	#[clap(short, long, help = "log debug messages")]
	verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum Mode {
	Sequential,
	Parallel,
	Both,
}

impl Mode {
	fn execution_modes(self) -> &'static [ExecutionMode] {
		match self {
			Mode::Sequential => &[ExecutionMode::Sequential],
			Mode::Parallel => &[ExecutionMode::Parallel],
			Mode::Both => &[ExecutionMode::Sequential, ExecutionMode::Parallel],
		}
	}
}

/// Rows evaluated by one task when computing metrics over the test set.
const EVALUATION_CHUNK_SIZE: usize = 4096;

fn main() {
	let options = Options::parse();
	let result = match options {
		Options::Tree(options) => {
			init_logger(&options);
			tree::cli_tree(&options)
		}
		Options::Forest(options) => {
			init_logger(&options);
			forest::cli_forest(&options)
		}
	};
	if let Err(error) = result {
		eprintln!("{}: {:#}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn init_logger(options: &CommandOptions) {
	let default_filter = if options.verbose { "debug" } else { "info" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
		.format_module_path(false)
		.format_timestamp(None)
		.init();
}

/// Load the csv, separate the target column, shuffle the rows and split them into a train and a test set.
fn load_data(options: &CommandOptions, config: &Config) -> Result<TrainTestSplit> {
	let len = std::fs::metadata(&options.file)
		.with_context(|| format!("failed to read {}", options.file.display()))?
		.len();
	let progress_counter = ProgressCounter::new(len);
	let dataframe = DataFrame::from_path(&options.file, &FromCsvOptions::default(), |byte| {
		progress_counter.set(byte)
	})
	.with_context(|| format!("failed to load {}", options.file.display()))?;
	log::debug!(
		"read {} of {} bytes",
		progress_counter.get(),
		progress_counter.total()
	);
	log::info!(
		"loaded {} rows and {} columns from {}",
		dataframe.nrows(),
		dataframe.ncols(),
		options.file.display(),
	);
	let (features, labels) = dataframe.split_features_labels(&options.target)?;
	let (features, labels) = match config.shuffle_seed() {
		Some(seed) => {
			log::debug!("shuffling rows with seed {}", seed);
			shuffle_rows(features.view(), labels.view(), seed)
		}
		None => (features, labels),
	};
	let split = train_test_split(features.view(), labels.view(), config.test_fraction())?;
	log::info!(
		"training on {} rows and testing on {} rows",
		split.labels_train.len(),
		split.labels_test.len(),
	);
	Ok(split)
}

/// Train once for each execution mode selected by `mode`, printing how long each run took.
fn train_in_modes<T>(
	mode: Mode,
	mut train: impl FnMut(ExecutionMode) -> Result<T>,
) -> Result<Vec<T>> {
	mode.execution_modes()
		.iter()
		.map(|execution_mode| {
			let start = Instant::now();
			let output = train(*execution_mode)?;
			println!(
				"{} training took {:?}",
				format!("{:?}", execution_mode).to_lowercase().bold(),
				start.elapsed()
			);
			Ok(output)
		})
		.collect()
}

/// Compute the binary classification metrics of `predictions` in chunks on the rayon thread pool and merge them.
fn compute_binary_classification_metrics(
	predictions: &[f32],
	labels: &[f32],
	positive_class: f32,
) -> BinaryClassificationMetricsOutput {
	predictions
		.par_chunks(EVALUATION_CHUNK_SIZE)
		.zip(labels.par_chunks(EVALUATION_CHUNK_SIZE))
		.map(|(predictions, labels)| {
			let mut metrics = BinaryClassificationMetrics::new(positive_class);
			for (prediction, label) in predictions.iter().zip(labels.iter()) {
				metrics.update((*prediction, *label));
			}
			metrics
		})
		.reduce(
			|| BinaryClassificationMetrics::new(positive_class),
			|mut a, b| {
				a.merge(b);
				a
			},
		)
		.finalize()
}

fn print_binary_classification_metrics(metrics: &BinaryClassificationMetricsOutput) {
	println!("{}", "test metrics".bold());
	println!(
		"  tp {}  fp {}  tn {}  fn {}",
		metrics.true_positives,
		metrics.false_positives,
		metrics.true_negatives,
		metrics.false_negatives,
	);
	println!("  accuracy  {:.4}", metrics.accuracy);
	println!("  precision {:.4}", metrics.precision);
	println!("  recall    {:.4}", metrics.recall);
	println!("  f1 score  {:.4}", metrics.f1_score);
}

fn print_agreement(what: &str, agree: bool) {
	let verdict = if agree {
		"agree".green()
	} else {
		"disagree".red()
	};
	println!("sequential and parallel {} {}", what, verdict);
}

#[test]
fn test_chunked_metrics_match_a_single_pass() {
	let predictions: Vec<f32> = (0..10_000).map(|i| (i % 3 == 0) as u8 as f32).collect();
	let labels: Vec<f32> = (0..10_000).map(|i| (i % 2 == 0) as u8 as f32).collect();
	let mut metrics = BinaryClassificationMetrics::new(1.0);
	for (prediction, label) in predictions.iter().zip(labels.iter()) {
		metrics.update((*prediction, *label));
	}
	assert_eq!(
		compute_binary_classification_metrics(&predictions, &labels, 1.0),
		metrics.finalize()
	);
}

#[test]
fn test_mode_execution_modes() {
	assert_eq!(
		Mode::Both.execution_modes(),
		&[ExecutionMode::Sequential, ExecutionMode::Parallel]
	);
	assert_eq!(Mode::Parallel.execution_modes(), &[ExecutionMode::Parallel]);
}

#[test]
fn test_parse_options() {
	let options = Options::try_parse_from(vec![
		"arbor", "forest", "--file", "data.csv", "--target", "label", "--mode", "parallel",
	])
	.unwrap();
	match options {
		Options::Forest(options) => {
			assert_eq!(options.file, PathBuf::from("data.csv"));
			assert_eq!(options.target, "label");
			assert_eq!(options.mode, Mode::Parallel);
			assert!(!options.verbose);
		}
		Options::Tree(_) => panic!("expected the forest command"),
	}
}

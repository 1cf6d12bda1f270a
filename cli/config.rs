/*!
This module defines the `Config` struct, which is read from the json file passed with `--config`. Every field is optional and falls back to a default chosen by the command that reads it.
*/

use anyhow::{Context, Result};
use arbor_tree::Task;
use std::path::Path;

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
	/// The fraction of rows held out for testing.
	pub test_fraction: Option<f32>,
	pub shuffle: Option<Shuffle>,
	pub max_depth: Option<usize>,
	pub n_trees: Option<usize>,
	/// Seeds the generator each forest draws its tree seeds from.
	pub seed: Option<u64>,
	pub task: Option<Task>,
	pub min_examples_to_parallelize: Option<usize>,
	/// The label treated as positive when computing precision, recall and f1 score.
	pub positive_class: Option<f32>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum Shuffle {
	Enabled(bool),
	Options { seed: u64 },
}

const DEFAULT_SHUFFLE_SEED: u64 = 42;

impl Config {
	pub fn test_fraction(&self) -> f32 {
		self.test_fraction.unwrap_or(0.2)
	}

	/// Rows are shuffled with seed 42 unless the config disables shuffling or picks another seed.
	pub fn shuffle_seed(&self) -> Option<u64> {
		match self.shuffle {
			None | Some(Shuffle::Enabled(true)) => Some(DEFAULT_SHUFFLE_SEED),
			Some(Shuffle::Enabled(false)) => None,
			Some(Shuffle::Options { seed }) => Some(seed),
		}
	}

	pub fn seed(&self) -> u64 {
		self.seed.unwrap_or(42)
	}

	pub fn positive_class(&self) -> f32 {
		self.positive_class.unwrap_or(1.0)
	}
}

pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
	if let Some(config_path) = config_path {
		let config = std::fs::read_to_string(config_path)
			.with_context(|| format!("failed to read config file {}", config_path.display()))?;
		let config = serde_json::from_str(&config)
			.with_context(|| format!("failed to parse config file {}", config_path.display()))?;
		Ok(config)
	} else {
		Ok(Config::default())
	}
}

#[test]
fn test_parse_config() {
	let config: Config = serde_json::from_str(
		r#"{ "test_fraction": 0.3, "shuffle": { "seed": 7 }, "task": "classification", "max_depth": 4 }"#,
	)
	.unwrap();
	insta::assert_debug_snapshot!(config, @r###"
	Config {
	    test_fraction: Some(
	        0.3,
	    ),
	    shuffle: Some(
	        Options {
	            seed: 7,
	        },
	    ),
	    max_depth: Some(
	        4,
	    ),
	    n_trees: None,
	    seed: None,
	    task: Some(
	        Classification,
	    ),
	    min_examples_to_parallelize: None,
	    positive_class: None,
	}
	"###);
	assert_eq!(config.shuffle_seed(), Some(7));
}

#[test]
fn test_config_defaults() {
	let config = Config::default();
	assert_eq!(config.test_fraction(), 0.2);
	assert_eq!(config.shuffle_seed(), Some(42));
	assert_eq!(config.seed(), 42);
	assert_eq!(config.positive_class(), 1.0);
	let config: Config = serde_json::from_str(r#"{ "shuffle": false }"#).unwrap();
	assert_eq!(config.shuffle_seed(), None);
}

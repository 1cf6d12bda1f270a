use super::{
	compute_binary_classification_metrics, config::load_config, load_data, print_agreement,
	print_binary_classification_metrics, train_in_modes, CommandOptions,
};
use anyhow::Result;
use arbor_metrics::{Accuracy, StreamingMetric};
use arbor_tree::{Dataset, Forest, ForestOptions, Task, TrainOptions, TrainProgress};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

/// Train a random forest and evaluate its majority votes on the test set.
pub fn cli_forest(options: &CommandOptions) -> Result<()> {
	let config = load_config(options.config.as_deref())?;
	let split = load_data(options, &config)?;
	let dataset = Dataset::new(split.features_train.clone(), split.labels_train.clone())?;
	let default_options = ForestOptions::default();
	let forest_options = ForestOptions {
		n_trees: config.n_trees.unwrap_or(default_options.n_trees),
		tree_options: TrainOptions {
			max_depth: config
				.max_depth
				.unwrap_or(default_options.tree_options.max_depth),
			task: config.task.unwrap_or(Task::Classification),
			min_examples_to_parallelize: config
				.min_examples_to_parallelize
				.unwrap_or(default_options.tree_options.min_examples_to_parallelize),
			..default_options.tree_options
		},
		execution_mode: default_options.execution_mode,
	};
	let forests = train_in_modes(options.mode, |execution_mode| {
		let forest_options = ForestOptions {
			execution_mode,
			..forest_options.clone()
		};
		// Each run starts from the same seed so both execution modes train the same trees.
		let mut rng = Xoshiro256Plus::seed_from_u64(config.seed());
		let mut progress_counter = None;
		let forest = Forest::train(&dataset, &forest_options, &mut rng, &mut |progress| {
			match progress {
				TrainProgress::Training(counter) => progress_counter = Some(counter),
			}
		})?;
		if let Some(progress_counter) = progress_counter {
			log::info!(
				"trained {} of {} trees",
				progress_counter.get(),
				progress_counter.total()
			);
		}
		Ok(forest)
	})?;
	if let [sequential, parallel] = forests.as_slice() {
		print_agreement("forests", have_the_same_trees(sequential, parallel));
	}
	let forest = &forests[0];
	let predictions = forest.predict_dataset(split.features_test.view())?.to_vec();
	let labels = split.labels_test.to_vec();
	let mut accuracy = Accuracy::new();
	for (prediction, label) in predictions.iter().zip(labels.iter()) {
		accuracy.update((*prediction, *label));
	}
	log::debug!("multiclass accuracy {}", accuracy.finalize());
	let metrics =
		compute_binary_classification_metrics(&predictions, &labels, config.positive_class());
	print_binary_classification_metrics(&metrics);
	Ok(())
}

/// Parallel training pushes trees in the order they finish, so compare the trees as multisets.
fn have_the_same_trees(a: &Forest, b: &Forest) -> bool {
	if a.len() != b.len() {
		return false;
	}
	let mut unmatched: Vec<_> = b.trees().iter().collect();
	a.trees().iter().all(|tree| {
		match unmatched.iter().position(|other| *other == tree) {
			Some(position) => {
				unmatched.remove(position);
				true
			}
			None => false,
		}
	})
}

#[test]
fn test_have_the_same_trees() {
	use arbor_tree::ExecutionMode;
	let rows: Vec<Vec<f32>> = (0..30).map(|i| vec![i as f32, (i % 7) as f32]).collect();
	let labels: Vec<f32> = (0..30).map(|i| (i % 3) as f32).collect();
	let dataset = Dataset::from_rows(&rows, &labels).unwrap();
	let train = |execution_mode, seed| {
		let options = ForestOptions {
			execution_mode,
			..Default::default()
		};
		let mut rng = Xoshiro256Plus::seed_from_u64(seed);
		Forest::train(&dataset, &options, &mut rng, &mut |_| {}).unwrap()
	};
	let sequential = train(ExecutionMode::Sequential, 42);
	let parallel = train(ExecutionMode::Parallel, 42);
	assert!(have_the_same_trees(&sequential, &parallel));
	assert!(have_the_same_trees(&sequential, &sequential));
}

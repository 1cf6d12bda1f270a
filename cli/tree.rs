use super::{
	compute_binary_classification_metrics, config::load_config, load_data, print_agreement,
	print_binary_classification_metrics, train_in_modes, CommandOptions,
};
use anyhow::Result;
use arbor_metrics::{MeanSquaredError, StreamingMetric};
use arbor_tree::{Dataset, ExecutionMode, Task, TrainOptions};

/// Train a single decision tree. Its predictions are rounded to the nearest integer to compute the classification metrics, and used as is for the mean squared error.
pub fn cli_tree(options: &CommandOptions) -> Result<()> {
	let config = load_config(options.config.as_deref())?;
	let split = load_data(options, &config)?;
	let dataset = Dataset::new(split.features_train.clone(), split.labels_train.clone())?;
	let default_options = TrainOptions::default();
	let train_options = TrainOptions {
		max_depth: config.max_depth.unwrap_or(default_options.max_depth),
		task: config.task.unwrap_or(Task::Regression),
		execution_mode: ExecutionMode::Sequential,
		min_examples_to_parallelize: config
			.min_examples_to_parallelize
			.unwrap_or(default_options.min_examples_to_parallelize),
	};
	let trees = train_in_modes(options.mode, |execution_mode| {
		let train_options = TrainOptions {
			execution_mode,
			..train_options.clone()
		};
		Ok(arbor_tree::train(&dataset, &train_options))
	})?;
	if let [sequential, parallel] = trees.as_slice() {
		print_agreement("trees", sequential == parallel);
	}
	let tree = &trees[0];
	log::info!(
		"the tree has {} nodes, {} leaves and depth {}",
		tree.nodes.len(),
		tree.n_leaves(),
		tree.depth(),
	);
	let predictions = tree.predict_dataset(split.features_test.view())?;
	let rounded_predictions: Vec<f32> = predictions.iter().map(|p| p.round()).collect();
	let labels = split.labels_test.to_vec();
	let metrics =
		compute_binary_classification_metrics(&rounded_predictions, &labels, config.positive_class());
	print_binary_classification_metrics(&metrics);
	let mut mean_squared_error = MeanSquaredError::new();
	for (prediction, label) in predictions.iter().zip(labels.iter()) {
		mean_squared_error.update((*prediction, *label));
	}
	let mean_squared_error = mean_squared_error.finalize();
	println!("  mse       {:.4}", mean_squared_error.mse);
	println!("  rmse      {:.4}", mean_squared_error.rmse);
	Ok(())
}

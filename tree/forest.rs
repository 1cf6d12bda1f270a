use crate::{
	bootstrap::bootstrap_sample, gini::ClassCounts, train::train, Dataset, Error, ExecutionMode,
	Task, TrainOptions, Tree,
};
use arbor_progress::ProgressCounter;
use ndarray::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;
use std::sync::Mutex;

/// These are the options passed to [`Forest::train`](struct.Forest.html#method.train).
#[derive(Clone, Debug)]
pub struct ForestOptions {
	/// The number of trees to train. Must be at least 1.
	pub n_trees: usize,
	/// The options used to train each tree.
	pub tree_options: TrainOptions,
	/// In `ExecutionMode::Parallel` the trees are trained concurrently on the rayon thread pool.
	pub execution_mode: ExecutionMode,
}

impl Default for ForestOptions {
	fn default() -> Self {
		Self {
			n_trees: 5,
			tree_options: TrainOptions {
				max_depth: 16,
				task: Task::Classification,
				..Default::default()
			},
			execution_mode: ExecutionMode::Sequential,
		}
	}
}

/// This is the type of the value passed to the `update_progress` callback of [`Forest::train`](struct.Forest.html#method.train).
#[derive(Clone, Debug)]
pub enum TrainProgress {
	/// The counter is incremented each time a tree finishes training.
	Training(ProgressCounter),
}

/// A `Forest` is a collection of trees trained on bootstrap samples of the same dataset. It predicts by majority vote.
#[derive(Clone, Debug, PartialEq)]
pub struct Forest {
	trees: Vec<Tree>,
}

impl Forest {
	/**
	Train a forest of `options.n_trees` trees.

	One seed per tree is drawn from `rng` before any tree is trained, and each tree draws its bootstrap sample from its own generator seeded with it. Training the same dataset with the same `rng` state therefore produces the same trees in both execution modes. In `ExecutionMode::Parallel` the trees are pushed in the order they finish, so only the order of `trees()` may differ.
	*/
	pub fn train<R: Rng + ?Sized>(
		dataset: &Dataset,
		options: &ForestOptions,
		rng: &mut R,
		update_progress: &mut dyn FnMut(TrainProgress),
	) -> Result<Forest, Error> {
		if options.n_trees == 0 {
			return Err(Error::NoTrees);
		}
		let seeds: Vec<u64> = (0..options.n_trees).map(|_| rng.gen()).collect();
		let progress_counter = ProgressCounter::new(options.n_trees as u64);
		update_progress(TrainProgress::Training(progress_counter.clone()));
		let train_tree = |seed: u64| {
			let mut rng = Xoshiro256Plus::seed_from_u64(seed);
			let sample = bootstrap_sample(dataset, &mut rng);
			let tree = train(&sample, &options.tree_options);
			progress_counter.inc(1);
			tree
		};
		let trees: Vec<Tree> = match options.execution_mode {
			ExecutionMode::Sequential => seeds.into_iter().map(train_tree).collect(),
			ExecutionMode::Parallel => {
				let trees = Mutex::new(Vec::with_capacity(options.n_trees));
				seeds.into_par_iter().for_each(|seed| {
					let tree = train_tree(seed);
					trees.lock().unwrap().push(tree);
				});
				trees.into_inner().unwrap()
			}
		};
		log::info!(
			"trained a forest of {} trees with {:?} execution",
			options.n_trees,
			options.execution_mode,
		);
		Ok(Forest { trees })
	}

	pub fn trees(&self) -> &[Tree] {
		&self.trees
	}

	pub fn len(&self) -> usize {
		self.trees.len()
	}

	/// A forest always has at least one tree.
	pub fn is_empty(&self) -> bool {
		self.trees.is_empty()
	}

	/// Count the prediction of each tree for `row`. The total is always the number of trees.
	pub fn votes(&self, row: ArrayView1<f32>) -> Result<ClassCounts, Error> {
		self.trees[0].check_row(row)?;
		Ok(self.votes_unchecked(row))
	}

	/// Predict the label with the most votes. When several labels have the most votes, the lowest of them wins.
	pub fn predict(&self, row: ArrayView1<f32>) -> Result<f32, Error> {
		self.trees[0].check_row(row)?;
		Ok(self.predict_unchecked(row))
	}

	/// Predict every row of `features` in parallel.
	pub fn predict_dataset(&self, features: ArrayView2<f32>) -> Result<Array1<f32>, Error> {
		let expected = self.trees[0].n_features;
		if features.ncols() != expected {
			return Err(Error::FeatureCountMismatch {
				expected,
				actual: features.ncols(),
			});
		}
		let predictions: Vec<f32> = (0..features.nrows())
			.into_par_iter()
			.map(|row_index| self.predict_unchecked(features.row(row_index)))
			.collect();
		Ok(Array1::from(predictions))
	}

	fn votes_unchecked(&self, row: ArrayView1<f32>) -> ClassCounts {
		ClassCounts::from_labels(self.trees.iter().map(|tree| tree.predict_unchecked(row)))
	}

	fn predict_unchecked(&self, row: ArrayView1<f32>) -> f32 {
		self.votes_unchecked(row).majority().unwrap_or(0.0)
	}
}

#[cfg(test)]
fn scenario_b() -> Dataset {
	// Two well separated classes of ten rows each.
	let mut rows = Vec::new();
	let mut labels = Vec::new();
	for i in 0..10 {
		let offset = i as f32 * 0.1;
		rows.push(vec![1.0 + offset, 2.0 - offset]);
		labels.push(0.0);
		rows.push(vec![6.0 + offset, 7.0 - offset]);
		labels.push(1.0);
	}
	Dataset::from_rows(&rows, &labels).unwrap()
}

#[test]
fn test_forest_votes() {
	let dataset = scenario_b();
	let mut rng = Xoshiro256Plus::seed_from_u64(42);
	let forest =
		Forest::train(&dataset, &ForestOptions::default(), &mut rng, &mut |_| {}).unwrap();
	assert_eq!(forest.len(), 5);
	let row = arr1(&[6.55, 6.45]);
	let votes = forest.votes(row.view()).unwrap();
	assert_eq!(votes.total(), 5);
	let prediction = forest.predict(row.view()).unwrap();
	assert!(prediction == 0.0 || prediction == 1.0);
	let predictions = forest.predict_dataset(dataset.features()).unwrap();
	assert_eq!(predictions.len(), 20);
	assert!(predictions.iter().all(|p| *p == 0.0 || *p == 1.0));
	assert_eq!(
		forest.predict_dataset(arr2(&[[1.0]]).view()),
		Err(Error::FeatureCountMismatch {
			expected: 2,
			actual: 1,
		})
	);
}

#[test]
fn test_sequential_and_parallel_forests_have_the_same_trees() {
	let mut data_rng = Xoshiro256Plus::seed_from_u64(9);
	let dataset = crate::train::random_dataset(&mut data_rng, 150, 3, 3);
	let sequential = ForestOptions {
		n_trees: 8,
		..Default::default()
	};
	let parallel = ForestOptions {
		execution_mode: ExecutionMode::Parallel,
		..sequential.clone()
	};
	let a = Forest::train(
		&dataset,
		&sequential,
		&mut Xoshiro256Plus::seed_from_u64(42),
		&mut |_| {},
	)
	.unwrap();
	let b = Forest::train(
		&dataset,
		&parallel,
		&mut Xoshiro256Plus::seed_from_u64(42),
		&mut |_| {},
	)
	.unwrap();
	assert_eq!(a.len(), b.len());
	// Every tree of one forest is matched by a distinct tree of the other.
	let mut unmatched: Vec<&Tree> = b.trees().iter().collect();
	for tree in a.trees() {
		let position = unmatched.iter().position(|other| *other == tree).unwrap();
		unmatched.remove(position);
	}
	assert!(unmatched.is_empty());
	for row in dataset.features().axis_iter(Axis(0)) {
		assert_eq!(a.votes(row).unwrap().total(), 8);
		assert_eq!(a.predict(row), b.predict(row));
	}
}

#[test]
fn test_no_trees() {
	let dataset = scenario_b();
	let options = ForestOptions {
		n_trees: 0,
		..Default::default()
	};
	let mut rng = Xoshiro256Plus::seed_from_u64(0);
	assert_eq!(
		Forest::train(&dataset, &options, &mut rng, &mut |_| {}),
		Err(Error::NoTrees)
	);
}

#[test]
fn test_progress_completes() {
	let dataset = scenario_b();
	for &execution_mode in &[ExecutionMode::Sequential, ExecutionMode::Parallel] {
		let options = ForestOptions {
			n_trees: 4,
			execution_mode,
			..Default::default()
		};
		let mut progress_counter = None;
		let mut rng = Xoshiro256Plus::seed_from_u64(1);
		Forest::train(&dataset, &options, &mut rng, &mut |progress| match progress {
			TrainProgress::Training(counter) => progress_counter = Some(counter),
		})
		.unwrap();
		let progress_counter = progress_counter.unwrap();
		assert_eq!(progress_counter.total(), 4);
		assert_eq!(progress_counter.get(), 4);
		assert!(progress_counter.is_complete());
	}
}

#[test]
fn test_vote_ties_go_to_the_lowest_label() {
	let leaf = |value| Tree {
		n_features: 1,
		nodes: vec![crate::Node::Leaf(crate::LeafNode {
			value,
			n_examples: 1,
		})],
	};
	let forest = Forest {
		trees: vec![leaf(2.0), leaf(1.0), leaf(2.0), leaf(1.0)],
	};
	let row = arr1(&[0.0]);
	assert_eq!(forest.votes(row.view()).unwrap().count(2.0), 2);
	assert_eq!(forest.predict(row.view()), Ok(1.0));
}

#[test]
fn test_rows_with_the_wrong_number_of_features() {
	let dataset = scenario_b();
	let mut rng = Xoshiro256Plus::seed_from_u64(42);
	let forest =
		Forest::train(&dataset, &ForestOptions::default(), &mut rng, &mut |_| {}).unwrap();
	let short = arr1(&[6.5]);
	assert_eq!(
		forest.predict(short.view()),
		Err(Error::FeatureCountMismatch {
			expected: 2,
			actual: 1,
		})
	);
	assert_eq!(
		forest.votes(short.view()),
		Err(Error::FeatureCountMismatch {
			expected: 2,
			actual: 1,
		})
	);
	let long = arr1(&[6.5, 6.5, 100.0]);
	assert_eq!(
		forest.predict(long.view()),
		Err(Error::FeatureCountMismatch {
			expected: 2,
			actual: 3,
		})
	);
	assert!(forest.predict(arr1(&[6.5, 6.5]).view()).is_ok());
}

use crate::{gini::gini_impurity_from_counts, Dataset, ExecutionMode};
use itertools::izip;
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use rayon::prelude::*;

/// A `Split` sends an example to the left child if its value for `feature_index` is <= `threshold`, and to the right child otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Split {
	pub feature_index: usize,
	pub threshold: f32,
}

impl Split {
	pub fn goes_left(&self, row: ArrayView1<f32>) -> bool {
		row[self.feature_index] <= self.threshold
	}
}

/// A candidate split together with the weighted gini impurity of the two sides it produces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitCandidate {
	pub feature_index: usize,
	pub threshold: f32,
	pub impurity: f64,
}

impl From<SplitCandidate> for Split {
	fn from(candidate: SplitCandidate) -> Split {
		Split {
			feature_index: candidate.feature_index,
			threshold: candidate.threshold,
		}
	}
}

/// Find the split of `dataset` with the lowest weighted gini impurity. Returns `None` if no threshold on any feature leaves both sides non-empty.
pub fn choose_best_split(
	dataset: &Dataset,
	execution_mode: ExecutionMode,
) -> Option<SplitCandidate> {
	let examples_index: Vec<usize> = (0..dataset.n_rows()).collect();
	choose_best_split_for_examples(
		dataset.features(),
		dataset.labels(),
		&examples_index,
		execution_mode,
	)
}

/**
Find the best split of the examples in `examples_index`.

Each feature is searched on its own and produces at most one candidate. In `ExecutionMode::Parallel` the features are searched concurrently, and the ordered `collect` waits for all of them. The candidates are then reduced in feature order on the calling thread, keeping the first candidate with the lowest impurity, so both modes always choose the same split.
*/
pub(crate) fn choose_best_split_for_examples(
	features: ArrayView2<f32>,
	labels: ArrayView1<f32>,
	examples_index: &[usize],
	execution_mode: ExecutionMode,
) -> Option<SplitCandidate> {
	if examples_index.is_empty() {
		return None;
	}
	let (class_ids, n_classes) = compute_class_ids(labels, examples_index);
	let mut class_counts = vec![0; n_classes];
	for class_id in class_ids.iter() {
		class_counts[*class_id] += 1;
	}
	let search_feature = |feature_index: usize| {
		choose_best_split_for_feature(
			feature_index,
			features.column(feature_index),
			examples_index,
			&class_ids,
			&class_counts,
		)
	};
	let candidates: Vec<Option<SplitCandidate>> = match execution_mode {
		ExecutionMode::Sequential => (0..features.ncols())
			.map(search_feature)
			.collect(),
		ExecutionMode::Parallel => (0..features.ncols())
			.into_par_iter()
			.map(search_feature)
			.collect(),
	};
	candidates
		.into_iter()
		.flatten()
		.fold(None, |best, candidate| match best {
			Some(best) if best.impurity <= candidate.impurity => Some(best),
			_ => Some(candidate),
		})
}

/// Find the best threshold for a single feature. The distinct values of the feature are tried as thresholds in ascending order. The examples are sorted by their value once, then each threshold moves the examples with that value from the right side to the left side.
fn choose_best_split_for_feature(
	feature_index: usize,
	feature_values: ArrayView1<f32>,
	examples_index: &[usize],
	class_ids: &[usize],
	class_counts: &[usize],
) -> Option<SplitCandidate> {
	let mut values_and_class_ids: Vec<(f32, usize)> = izip!(examples_index, class_ids)
		.map(|(example_index, class_id)| (feature_values[*example_index], *class_id))
		.collect();
	values_and_class_ids.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
	let n_examples = values_and_class_ids.len();
	let mut left_class_counts = vec![0; class_counts.len()];
	let mut right_class_counts = class_counts.to_owned();
	let mut best_split: Option<SplitCandidate> = None;
	let mut n_left = 0;
	while n_left < n_examples {
		let threshold = values_and_class_ids[n_left].0;
		while n_left < n_examples && values_and_class_ids[n_left].0 == threshold {
			let class_id = values_and_class_ids[n_left].1;
			left_class_counts[class_id] += 1;
			right_class_counts[class_id] -= 1;
			n_left += 1;
		}
		let n_right = n_examples - n_left;
		// The largest value sends every example left.
		if n_right == 0 {
			break;
		}
		let impurity = (n_left.to_f64().unwrap()
			* gini_impurity_from_counts(&left_class_counts, n_left)
			+ n_right.to_f64().unwrap() * gini_impurity_from_counts(&right_class_counts, n_right))
			/ n_examples.to_f64().unwrap();
		let is_better = match best_split {
			Some(best_split) => impurity < best_split.impurity,
			None => true,
		};
		if is_better {
			best_split = Some(SplitCandidate {
				feature_index,
				threshold,
				impurity,
			});
		}
	}
	best_split
}

/// Assign each distinct label among the examples a dense class id, in ascending label order. Returns the class id of each example in `examples_index` order and the number of classes.
fn compute_class_ids(labels: ArrayView1<f32>, examples_index: &[usize]) -> (Vec<usize>, usize) {
	let mut order: Vec<usize> = (0..examples_index.len()).collect();
	order.sort_by(|a, b| {
		labels[examples_index[*a]]
			.partial_cmp(&labels[examples_index[*b]])
			.unwrap()
	});
	let mut class_ids = vec![0; examples_index.len()];
	let mut n_classes = 0;
	let mut previous_label = None;
	for position in order {
		let label = labels[examples_index[position]];
		if previous_label != Some(label) {
			n_classes += 1;
			previous_label = Some(label);
		}
		class_ids[position] = n_classes - 1;
	}
	(class_ids, n_classes)
}

#[test]
fn test_separable() {
	let dataset = Dataset::from_rows(
		&[vec![1.0, 5.0], vec![2.0, 5.0], vec![8.0, 1.0], vec![9.0, 1.0]],
		&[0.0, 0.0, 1.0, 1.0],
	)
	.unwrap();
	let candidate = choose_best_split(&dataset, ExecutionMode::Sequential).unwrap();
	insta::assert_debug_snapshot!(candidate, @r###"
	SplitCandidate {
	    feature_index: 0,
	    threshold: 2.0,
	    impurity: 0.0,
	}
	"###);
}

#[test]
fn test_constant_feature_is_never_chosen() {
	let dataset = Dataset::from_rows(
		&[
			vec![3.0, 1.0],
			vec![3.0, 2.0],
			vec![3.0, 3.0],
			vec![3.0, 4.0],
		],
		&[0.0, 1.0, 0.0, 1.0],
	)
	.unwrap();
	for execution_mode in &[ExecutionMode::Sequential, ExecutionMode::Parallel] {
		let candidate = choose_best_split(&dataset, *execution_mode).unwrap();
		assert_eq!(candidate.feature_index, 1);
	}
	let dataset = Dataset::from_rows(&[vec![3.0], vec![3.0]], &[0.0, 1.0]).unwrap();
	assert_eq!(choose_best_split(&dataset, ExecutionMode::Sequential), None);
	assert_eq!(choose_best_split(&dataset, ExecutionMode::Parallel), None);
}

#[test]
fn test_ties_go_to_the_first_feature() {
	// Both features separate the classes perfectly.
	let dataset = Dataset::from_rows(
		&[vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0], vec![4.0, 40.0]],
		&[0.0, 0.0, 1.0, 1.0],
	)
	.unwrap();
	for execution_mode in &[ExecutionMode::Sequential, ExecutionMode::Parallel] {
		let split: Split = choose_best_split(&dataset, *execution_mode).unwrap().into();
		assert_eq!(
			split,
			Split {
				feature_index: 0,
				threshold: 2.0
			}
		);
	}
}

#[test]
fn test_sequential_and_parallel_agree() {
	use rand::{Rng, SeedableRng};
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(42);
	for _ in 0..50 {
		let n_rows: usize = rng.gen_range(1, 60);
		let n_features: usize = rng.gen_range(1, 6);
		let rows: Vec<Vec<f32>> = (0..n_rows)
			.map(|_| {
				(0..n_features)
					.map(|_| rng.gen_range::<u32, _, _>(0, 8).to_f32().unwrap())
					.collect()
			})
			.collect();
		let labels: Vec<f32> = (0..n_rows)
			.map(|_| rng.gen_range::<u32, _, _>(0, 3).to_f32().unwrap())
			.collect();
		let dataset = Dataset::from_rows(&rows, &labels).unwrap();
		assert_eq!(
			choose_best_split(&dataset, ExecutionMode::Sequential),
			choose_best_split(&dataset, ExecutionMode::Parallel),
		);
	}
}

#[test]
fn test_impurity_matches_partition() {
	let dataset = Dataset::from_rows(
		&[vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0]],
		&[0.0, 1.0, 0.0, 1.0, 1.0],
	)
	.unwrap();
	let candidate = choose_best_split(&dataset, ExecutionMode::Sequential).unwrap();
	let split: Split = candidate.into();
	let (left, right) = dataset.partition(&split);
	let left_labels = left.labels().to_vec();
	let right_labels = right.labels().to_vec();
	let expected = (left_labels.len().to_f64().unwrap()
		* crate::gini::gini_impurity(&left_labels)
		+ right_labels.len().to_f64().unwrap() * crate::gini::gini_impurity(&right_labels))
		/ 5.0;
	assert!((candidate.impurity - expected).abs() < 1e-12);
}

use anyhow::{bail, Result};
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use rand::{seq::SliceRandom, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

/// Shuffle the rows of `features` and `labels` with the same permutation, so every label stays with its row. The same `seed` always produces the same permutation.
pub fn shuffle_rows(
	features: ArrayView2<f32>,
	labels: ArrayView1<f32>,
	seed: u64,
) -> (Array2<f32>, Array1<f32>) {
	let mut rng = Xoshiro256Plus::seed_from_u64(seed);
	let mut permutation: Vec<usize> = (0..features.nrows()).collect();
	permutation.shuffle(&mut rng);
	let features = Array2::from_shape_fn(features.dim(), |(row_index, column_index)| {
		features[(permutation[row_index], column_index)]
	});
	let labels = permutation
		.iter()
		.map(|row_index| labels[*row_index])
		.collect::<Array1<f32>>();
	(features, labels)
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrainTestSplit {
	pub features_train: Array2<f32>,
	pub labels_train: Array1<f32>,
	pub features_test: Array2<f32>,
	pub labels_test: Array1<f32>,
}

/// Split the rows into a train set and a test set. The last `round(n_rows * test_fraction)` rows form the test set, so shuffle first if the rows are ordered.
pub fn train_test_split(
	features: ArrayView2<f32>,
	labels: ArrayView1<f32>,
	test_fraction: f32,
) -> Result<TrainTestSplit> {
	if !(0.0..1.0).contains(&test_fraction) {
		bail!(
			"the test fraction must be at least 0 and less than 1, but it is {}",
			test_fraction
		);
	}
	if features.nrows() != labels.len() {
		bail!(
			"there are {} rows of features but {} labels",
			features.nrows(),
			labels.len()
		);
	}
	let n_rows = features.nrows();
	let n_test = (n_rows.to_f32().unwrap() * test_fraction)
		.round()
		.to_usize()
		.unwrap();
	let n_train = n_rows - n_test;
	Ok(TrainTestSplit {
		features_train: features.slice(s![..n_train, ..]).to_owned(),
		labels_train: labels.slice(s![..n_train]).to_owned(),
		features_test: features.slice(s![n_train.., ..]).to_owned(),
		labels_test: labels.slice(s![n_train..]).to_owned(),
	})
}

#[test]
fn test_shuffle_rows_keeps_labels_with_rows() {
	let features = arr2(&[[0.0, 0.5], [1.0, 1.5], [2.0, 2.5], [3.0, 3.5], [4.0, 4.5]]);
	let labels = arr1(&[0.0, 10.0, 20.0, 30.0, 40.0]);
	let (shuffled_features, shuffled_labels) = shuffle_rows(features.view(), labels.view(), 42);
	for (row, label) in shuffled_features.axis_iter(Axis(0)).zip(shuffled_labels.iter()) {
		assert_eq!(row[1], row[0] + 0.5);
		assert_eq!(*label, row[0] * 10.0);
	}
	let mut sorted = shuffled_labels.to_vec();
	sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
	assert_eq!(sorted, labels.to_vec());
	assert_eq!(
		shuffle_rows(features.view(), labels.view(), 42),
		(shuffled_features, shuffled_labels)
	);
}

#[test]
fn test_train_test_split() {
	let features = Array2::from_shape_fn((10, 2), |(i, j)| (i * 2 + j).to_f32().unwrap());
	let labels = Array1::from_shape_fn(10, |i| i.to_f32().unwrap());
	let split = train_test_split(features.view(), labels.view(), 0.2).unwrap();
	assert_eq!(split.features_train.nrows(), 8);
	assert_eq!(split.features_test.nrows(), 2);
	assert_eq!(split.labels_test, arr1(&[8.0, 9.0]));
	assert_eq!(split.features_test, arr2(&[[16.0, 17.0], [18.0, 19.0]]));
	let split = train_test_split(features.view(), labels.view(), 0.0).unwrap();
	assert_eq!(split.labels_train.len(), 10);
	assert_eq!(split.labels_test.len(), 0);
	assert!(train_test_split(features.view(), labels.view(), 1.0).is_err());
	assert!(train_test_split(features.view(), labels.view(), -0.1).is_err());
}

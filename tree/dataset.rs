use crate::{partition::rearrange_examples_index, split::Split, Error};
use ndarray::prelude::*;

/// A `Dataset` is a matrix of number features with one row per example, together with the label for each example. Every constructor checks the shape, so code that receives a `Dataset` can index rows, features and labels without checking again.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
	features: Array2<f32>,
	labels: Array1<f32>,
}

impl Dataset {
	/// Create a dataset from a feature matrix and its labels. The matrix must have at least one row and one column, there must be one label per row, and every value must be finite.
	pub fn new(features: Array2<f32>, labels: Array1<f32>) -> Result<Dataset, Error> {
		if features.nrows() == 0 {
			return Err(Error::EmptyDataset);
		}
		if features.ncols() == 0 {
			return Err(Error::NoFeatures);
		}
		if features.nrows() != labels.len() {
			return Err(Error::LabelCountMismatch {
				n_rows: features.nrows(),
				n_labels: labels.len(),
			});
		}
		for ((row_index, feature_index), value) in features.indexed_iter() {
			if !value.is_finite() {
				return Err(Error::NonFiniteFeature {
					row_index,
					feature_index,
				});
			}
		}
		if let Some(row_index) = labels.iter().position(|label| !label.is_finite()) {
			return Err(Error::NonFiniteLabel { row_index });
		}
		Ok(Dataset { features, labels })
	}

	/// Create a dataset from rows stored as separate vectors. This additionally checks that all rows have the same length.
	pub fn from_rows(rows: &[Vec<f32>], labels: &[f32]) -> Result<Dataset, Error> {
		let n_features = match rows.first() {
			Some(row) => row.len(),
			None => return Err(Error::EmptyDataset),
		};
		if let Some((row_index, row)) = rows
			.iter()
			.enumerate()
			.find(|(_, row)| row.len() != n_features)
		{
			return Err(Error::RaggedRow {
				row_index,
				expected: n_features,
				actual: row.len(),
			});
		}
		let features = Array2::from_shape_fn((rows.len(), n_features), |(row_index, feature_index)| {
			rows[row_index][feature_index]
		});
		Dataset::new(features, Array1::from(labels.to_vec()))
	}

	pub fn features(&self) -> ArrayView2<f32> {
		self.features.view()
	}

	pub fn labels(&self) -> ArrayView1<f32> {
		self.labels.view()
	}

	pub fn row(&self, row_index: usize) -> ArrayView1<f32> {
		self.features.row(row_index)
	}

	pub fn n_rows(&self) -> usize {
		self.features.nrows()
	}

	pub fn n_features(&self) -> usize {
		self.features.ncols()
	}

	/// Build a new dataset from the rows at `examples_index`, in that order. Indexes may repeat, which is how bootstrap samples are built.
	pub(crate) fn select(&self, examples_index: &[usize]) -> Dataset {
		let features = Array2::from_shape_fn(
			(examples_index.len(), self.n_features()),
			|(row_index, feature_index)| self.features[(examples_index[row_index], feature_index)],
		);
		let labels = examples_index
			.iter()
			.map(|&example_index| self.labels[example_index])
			.collect::<Array1<f32>>();
		Dataset { features, labels }
	}

	/// Split the dataset in two. Rows whose value for `split.feature_index` is <= `split.threshold` go to the first dataset, the rest go to the second. Rows keep their relative order. Either side may be empty.
	pub fn partition(&self, split: &Split) -> (Dataset, Dataset) {
		let mut examples_index: Vec<usize> = (0..self.n_rows()).collect();
		let n_left = rearrange_examples_index(self.features.view(), split, &mut examples_index);
		let (left, right) = examples_index.split_at(n_left);
		(self.select(left), self.select(right))
	}
}

#[test]
fn test_invalid_shapes() {
	assert_eq!(
		Dataset::from_rows(&[], &[]).unwrap_err(),
		Error::EmptyDataset
	);
	assert_eq!(
		Dataset::from_rows(&[vec![], vec![]], &[0.0, 1.0]).unwrap_err(),
		Error::NoFeatures
	);
	assert_eq!(
		Dataset::from_rows(&[vec![1.0, 2.0], vec![3.0]], &[0.0, 1.0]).unwrap_err(),
		Error::RaggedRow {
			row_index: 1,
			expected: 2,
			actual: 1,
		}
	);
	assert_eq!(
		Dataset::from_rows(&[vec![1.0], vec![3.0]], &[0.0]).unwrap_err(),
		Error::LabelCountMismatch {
			n_rows: 2,
			n_labels: 1,
		}
	);
	assert_eq!(
		Dataset::from_rows(&[vec![1.0, std::f32::NAN]], &[0.0]).unwrap_err(),
		Error::NonFiniteFeature {
			row_index: 0,
			feature_index: 1,
		}
	);
	assert_eq!(
		Dataset::from_rows(&[vec![1.0], vec![2.0]], &[0.0, std::f32::INFINITY]).unwrap_err(),
		Error::NonFiniteLabel { row_index: 1 }
	);
}

#[test]
fn test_partition() {
	let dataset = Dataset::from_rows(
		&[vec![1.0, 5.0], vec![8.0, 1.0], vec![2.0, 5.0], vec![9.0, 1.0]],
		&[0.0, 1.0, 0.0, 1.0],
	)
	.unwrap();
	let split = Split {
		feature_index: 0,
		threshold: 2.0,
	};
	let (left, right) = dataset.partition(&split);
	assert_eq!(left.features(), arr2(&[[1.0, 5.0], [2.0, 5.0]]));
	assert_eq!(left.labels(), arr1(&[0.0, 0.0]));
	assert_eq!(right.features(), arr2(&[[8.0, 1.0], [9.0, 1.0]]));
	assert_eq!(right.labels(), arr1(&[1.0, 1.0]));
	// Every row is <= the largest value, so the right side is empty.
	let split = Split {
		feature_index: 0,
		threshold: 9.0,
	};
	let (left, right) = dataset.partition(&split);
	assert_eq!(left.n_rows(), 4);
	assert_eq!(right.n_rows(), 0);
}

use thiserror::Error;

/// The errors the tree and forest trainers can report. All of them describe input with the wrong shape. Degenerate splits and empty label subsets are not errors, they are handled by falling back to a leaf.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
	/// The dataset has no rows.
	#[error("the dataset has no rows")]
	EmptyDataset,
	/// The dataset's rows have no features.
	#[error("the dataset has no features")]
	NoFeatures,
	/// A row has a different number of features than the first row.
	#[error("row {row_index} has {actual} features but the first row has {expected}")]
	RaggedRow {
		row_index: usize,
		expected: usize,
		actual: usize,
	},
	/// The number of labels does not match the number of rows.
	#[error("the dataset has {n_rows} rows but {n_labels} labels")]
	LabelCountMismatch { n_rows: usize, n_labels: usize },
	/// A feature value is NaN or infinite.
	#[error("the value of feature {feature_index} in row {row_index} is not finite")]
	NonFiniteFeature {
		row_index: usize,
		feature_index: usize,
	},
	/// A label is NaN or infinite.
	#[error("the label of row {row_index} is not finite")]
	NonFiniteLabel { row_index: usize },
	/// The features passed to a trained model do not have the number of columns it was trained with.
	#[error("expected {expected} features but got {actual}")]
	FeatureCountMismatch { expected: usize, actual: usize },
	/// A forest must contain at least one tree.
	#[error("a forest must have at least one tree")]
	NoTrees,
}

#[test]
fn test_display() {
	let error = Error::RaggedRow {
		row_index: 3,
		expected: 2,
		actual: 1,
	};
	assert_eq!(error.to_string(), "row 3 has 1 features but the first row has 2");
	let error = Error::LabelCountMismatch {
		n_rows: 4,
		n_labels: 3,
	};
	assert_eq!(error.to_string(), "the dataset has 4 rows but 3 labels");
	let error = Error::FeatureCountMismatch {
		expected: 2,
		actual: 1,
	};
	assert_eq!(error.to_string(), "expected 2 features but got 1");
	let error: Box<dyn std::error::Error + Send + Sync> = Box::new(Error::NoTrees);
	assert_eq!(error.to_string(), "a forest must have at least one tree");
}

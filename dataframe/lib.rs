/*!
This crate loads numeric tables from csv files and prepares them for training: it separates the label column from the feature columns, shuffles rows, and splits the rows into a train and a test set.
*/

#![allow(clippy::tabs_in_doc_comments)]

use anyhow::{format_err, Result};
use ndarray::prelude::*;

mod load;
mod split;

pub use self::load::FromCsvOptions;
pub use self::split::{shuffle_rows, train_test_split, TrainTestSplit};

/// A `DataFrame` is a table of numbers with a name for each column.
#[derive(Clone, Debug, PartialEq)]
pub struct DataFrame {
	pub column_names: Vec<String>,
	/// The values, with one row per csv record and one column per csv column.
	pub values: Array2<f32>,
}

impl DataFrame {
	pub fn nrows(&self) -> usize {
		self.values.nrows()
	}

	pub fn ncols(&self) -> usize {
		self.values.ncols()
	}

	pub fn column_index(&self, column_name: &str) -> Option<usize> {
		self.column_names
			.iter()
			.position(|name| name == column_name)
	}

	/// Separate the column named `target_column_name` from the other columns. Returns the remaining columns in their original order as the features, and the target column as the labels.
	pub fn split_features_labels(
		&self,
		target_column_name: &str,
	) -> Result<(Array2<f32>, Array1<f32>)> {
		let target_column_index = self.column_index(target_column_name).ok_or_else(|| {
			format_err!(
				"did not find target column \"{}\" among column names \"{}\"",
				target_column_name,
				self.column_names.join(", ")
			)
		})?;
		let feature_column_indexes: Vec<usize> = (0..self.ncols())
			.filter(|column_index| *column_index != target_column_index)
			.collect();
		let features = Array2::from_shape_fn(
			(self.nrows(), feature_column_indexes.len()),
			|(row_index, feature_index)| {
				self.values[(row_index, feature_column_indexes[feature_index])]
			},
		);
		let labels = self.values.column(target_column_index).to_owned();
		Ok((features, labels))
	}
}

#[test]
fn test_split_features_labels() {
	let dataframe = DataFrame {
		column_names: vec!["a".to_owned(), "label".to_owned(), "b".to_owned()],
		values: arr2(&[[1.0, 0.0, 10.0], [2.0, 1.0, 20.0]]),
	};
	let (features, labels) = dataframe.split_features_labels("label").unwrap();
	assert_eq!(features, arr2(&[[1.0, 10.0], [2.0, 20.0]]));
	assert_eq!(labels, arr1(&[0.0, 1.0]));
	let error = dataframe.split_features_labels("missing").unwrap_err();
	assert_eq!(
		error.to_string(),
		"did not find target column \"missing\" among column names \"a, label, b\""
	);
}

use crate::DataFrame;
use anyhow::Result;
use ndarray::prelude::*;
use std::path::Path;

#[derive(Clone, Debug)]
pub struct FromCsvOptions<'a> {
	/// Cells equal to one of these strings are replaced with `invalid_value`.
	pub invalid_values: &'a [&'a str],
	/// The value used for invalid cells and for cells that do not parse as a finite number.
	pub invalid_value: f32,
}

impl<'a> Default for FromCsvOptions<'a> {
	fn default() -> Self {
		Self {
			invalid_values: DEFAULT_INVALID_VALUES,
			invalid_value: 0.0,
		}
	}
}

/// These values are the default values that are considered invalid.
const DEFAULT_INVALID_VALUES: &[&str] = &[
	"", "null", "NULL", "n/a", "N/A", "nan", "-nan", "NaN", "-NaN", "?",
];

impl DataFrame {
	pub fn from_path(
		path: &Path,
		options: &FromCsvOptions,
		progress: impl Fn(u64),
	) -> Result<DataFrame> {
		Self::from_csv(&mut csv::Reader::from_path(path)?, options, progress)
	}

	/// Read a csv with a header row. `progress` is called with the byte offset of each record as it is read.
	pub fn from_csv<R>(
		reader: &mut csv::Reader<R>,
		options: &FromCsvOptions,
		progress: impl Fn(u64),
	) -> Result<DataFrame>
	where
		R: std::io::Read,
	{
		let column_names: Vec<String> = reader
			.headers()?
			.into_iter()
			.map(|column_name| column_name.to_owned())
			.collect();
		let n_columns = column_names.len();
		let mut values: Vec<f32> = Vec::new();
		let mut n_rows = 0;
		// The reader returns an error for records whose length differs from the header.
		let mut record = csv::ByteRecord::new();
		while reader.read_byte_record(&mut record)? {
			if let Some(position) = record.position() {
				progress(position.byte());
			}
			values.extend(record.iter().map(|value| parse_value(value, options)));
			n_rows += 1;
		}
		let values = Array2::from_shape_vec((n_rows, n_columns), values)?;
		log::debug!("loaded {} rows and {} columns", n_rows, n_columns);
		Ok(DataFrame {
			column_names,
			values,
		})
	}
}

fn parse_value(value: &[u8], options: &FromCsvOptions) -> f32 {
	let is_invalid = options
		.invalid_values
		.iter()
		.any(|invalid_value| invalid_value.as_bytes() == value);
	if is_invalid {
		return options.invalid_value;
	}
	match lexical::parse::<f32, &[u8]>(value) {
		Ok(value) if value.is_finite() => value,
		_ => options.invalid_value,
	}
}

#[test]
fn test_from_csv() {
	let csv = "x,y,label\n1,2.5,0\n3,?,1\n-4,abc,1\n";
	let dataframe = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		&FromCsvOptions::default(),
		|_| {},
	)
	.unwrap();
	insta::assert_debug_snapshot!(dataframe.column_names, @r###"
	[
	    "x",
	    "y",
	    "label",
	]
	"###);
	assert_eq!(
		dataframe.values,
		arr2(&[[1.0, 2.5, 0.0], [3.0, 0.0, 1.0], [-4.0, 0.0, 1.0]])
	);
}

#[test]
fn test_invalid_value_option() {
	let csv = "x,label\nNaN,1\n";
	let options = FromCsvOptions {
		invalid_value: -1.0,
		..Default::default()
	};
	let dataframe = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		&options,
		|_| {},
	)
	.unwrap();
	assert_eq!(dataframe.values, arr2(&[[-1.0, 1.0]]));
}

#[test]
fn test_ragged_record_is_an_error() {
	let csv = "x,y,label\n1,2,0\n3,1\n";
	let result = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		&FromCsvOptions::default(),
		|_| {},
	);
	assert!(result.is_err());
}

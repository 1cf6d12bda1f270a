use crate::split::Split;
use ndarray::prelude::*;

/// Rearrange `examples_index` so that the examples `split` sends to the left child come first, followed by the examples it sends to the right child. Returns the number of examples sent left. Examples keep their relative order on each side.
pub fn rearrange_examples_index(
	features: ArrayView2<f32>,
	split: &Split,
	examples_index: &mut [usize],
) -> usize {
	let (left, right): (Vec<usize>, Vec<usize>) = examples_index
		.iter()
		.partition(|example_index| split.goes_left(features.row(**example_index)));
	let n_left = left.len();
	examples_index[..n_left].copy_from_slice(&left);
	examples_index[n_left..].copy_from_slice(&right);
	n_left
}

#[test]
fn test_rearrange_examples_index() {
	let features = arr2(&[[4.0], [1.0], [3.0], [2.0], [5.0]]);
	let split = Split {
		feature_index: 0,
		threshold: 2.5,
	};
	let mut examples_index = vec![0, 1, 2, 3, 4];
	let n_left = rearrange_examples_index(features.view(), &split, &mut examples_index);
	assert_eq!(n_left, 2);
	assert_eq!(examples_index, vec![1, 3, 0, 2, 4]);
	// Only the examples in the slice are touched.
	let mut examples_index = vec![4, 2];
	let n_left = rearrange_examples_index(features.view(), &split, &mut examples_index);
	assert_eq!(n_left, 0);
	assert_eq!(examples_index, vec![4, 2]);
}

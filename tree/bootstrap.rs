use crate::Dataset;
use rand::Rng;

/// Draw `n_examples` indexes uniformly at random from `0..n_examples`, with replacement. Some examples will appear several times and others not at all.
pub fn bootstrap_examples_index<R: Rng + ?Sized>(n_examples: usize, rng: &mut R) -> Vec<usize> {
	if n_examples == 0 {
		return Vec::new();
	}
	(0..n_examples)
		.map(|_| rng.gen_range(0, n_examples))
		.collect()
}

/// Build a bootstrap sample of `dataset`: a dataset with the same number of rows, each drawn at random with replacement. Every row keeps its own label.
pub fn bootstrap_sample<R: Rng + ?Sized>(dataset: &Dataset, rng: &mut R) -> Dataset {
	let examples_index = bootstrap_examples_index(dataset.n_rows(), rng);
	dataset.select(&examples_index)
}

#[test]
fn test_bootstrap_sample_keeps_rows_and_labels_together() {
	use ndarray::prelude::*;
	use rand::SeedableRng;
	let dataset = Dataset::from_rows(
		&[vec![0.0, 10.0], vec![1.0, 11.0], vec![2.0, 12.0], vec![3.0, 13.0]],
		&[100.0, 101.0, 102.0, 103.0],
	)
	.unwrap();
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(42);
	for _ in 0..20 {
		let sample = bootstrap_sample(&dataset, &mut rng);
		assert_eq!(sample.n_rows(), dataset.n_rows());
		assert_eq!(sample.n_features(), dataset.n_features());
		for (row, label) in sample.features().axis_iter(Axis(0)).zip(sample.labels()) {
			assert_eq!(row[1], row[0] + 10.0);
			assert_eq!(*label, row[0] + 100.0);
		}
	}
}

#[test]
fn test_bootstrap_is_deterministic_for_a_seed() {
	use rand::SeedableRng;
	let mut a = rand_xoshiro::Xoshiro256Plus::seed_from_u64(1);
	let mut b = rand_xoshiro::Xoshiro256Plus::seed_from_u64(1);
	let index_a = bootstrap_examples_index(100, &mut a);
	let index_b = bootstrap_examples_index(100, &mut b);
	assert_eq!(index_a, index_b);
	assert!(index_a.iter().all(|example_index| *example_index < 100));
	assert!(bootstrap_examples_index(0, &mut a).is_empty());
}

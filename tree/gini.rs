use num_traits::ToPrimitive;

/// `ClassCounts` tallies how many times each distinct label occurs. Labels are kept in the order they were first seen. It is used to compute gini impurity, to pick the majority class of a leaf, and to count the votes of a forest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassCounts {
	entries: Vec<(f32, usize)>,
	total: usize,
}

impl ClassCounts {
	pub fn new() -> ClassCounts {
		ClassCounts::default()
	}

	pub fn from_labels(labels: impl IntoIterator<Item = f32>) -> ClassCounts {
		let mut class_counts = ClassCounts::new();
		for label in labels {
			class_counts.add(label);
		}
		class_counts
	}

	/// Count one more occurrence of `label`.
	pub fn add(&mut self, label: f32) {
		match self.entries.iter_mut().find(|(class, _)| *class == label) {
			Some((_, count)) => *count += 1,
			None => self.entries.push((label, 1)),
		}
		self.total += 1;
	}

	/// The number of labels counted.
	pub fn total(&self) -> usize {
		self.total
	}

	/// The number of distinct labels counted.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn count(&self, label: f32) -> usize {
		self.entries
			.iter()
			.find(|(class, _)| *class == label)
			.map(|(_, count)| *count)
			.unwrap_or(0)
	}

	pub fn iter(&self) -> impl Iterator<Item = (f32, usize)> + '_ {
		self.entries.iter().copied()
	}

	pub fn gini_impurity(&self) -> f64 {
		let counts: Vec<usize> = self.entries.iter().map(|(_, count)| *count).collect();
		gini_impurity_from_counts(&counts, self.total)
	}

	/// The label with the highest count. When several labels share the highest count, the lowest of them wins, so the result does not depend on the order labels were counted in. Returns `None` if nothing was counted.
	pub fn majority(&self) -> Option<f32> {
		self.entries
			.iter()
			.fold(None, |best: Option<(f32, usize)>, &(label, count)| match best {
				Some((best_label, best_count))
					if best_count > count || (best_count == count && best_label < label) =>
				{
					Some((best_label, best_count))
				}
				_ => Some((label, count)),
			})
			.map(|(label, _)| label)
	}
}

/// Compute the gini impurity `1 - sum(p_c^2)` of a set of labels, where `p_c` is the fraction of labels in class `c`. The impurity of an empty set is 0.
pub fn gini_impurity(labels: &[f32]) -> f64 {
	ClassCounts::from_labels(labels.iter().copied()).gini_impurity()
}

/// Compute the gini impurity from the number of labels in each class. `total` must be the sum of `counts`.
pub fn gini_impurity_from_counts(counts: &[usize], total: usize) -> f64 {
	if total == 0 {
		return 0.0;
	}
	let total = total.to_f64().unwrap();
	let sum_of_squares: f64 = counts
		.iter()
		.map(|count| {
			let probability = count.to_f64().unwrap() / total;
			probability * probability
		})
		.sum();
	1.0 - sum_of_squares
}

/// The mean of the labels, or 0 if there are none.
pub fn mean(labels: impl IntoIterator<Item = f32>) -> f32 {
	let (sum, n) = labels
		.into_iter()
		.fold((0.0f64, 0usize), |(sum, n), label| {
			(sum + label.to_f64().unwrap(), n + 1)
		});
	if n == 0 {
		return 0.0;
	}
	(sum / n.to_f64().unwrap()).to_f32().unwrap()
}

/// The most frequent label, with ties going to the lowest label.
pub fn majority_label(labels: impl IntoIterator<Item = f32>) -> Option<f32> {
	ClassCounts::from_labels(labels).majority()
}

#[test]
fn test_gini_impurity() {
	assert_eq!(gini_impurity(&[]), 0.0);
	assert_eq!(gini_impurity(&[1.0, 1.0, 1.0]), 0.0);
	assert!((gini_impurity(&[0.0, 1.0]) - 0.5).abs() < 1e-12);
	assert!((gini_impurity(&[0.0, 1.0, 1.0]) - 4.0 / 9.0).abs() < 1e-12);
	assert!((gini_impurity(&[0.0, 1.0, 2.0]) - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_gini_impurity_bounds() {
	use rand::Rng;
	use rand::SeedableRng;
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(7);
	for _ in 0..500 {
		let n_labels: usize = rng.gen_range(1, 40);
		let n_classes: usize = rng.gen_range(1, 6);
		let labels: Vec<f32> = (0..n_labels)
			.map(|_| rng.gen_range::<usize, _, _>(0, n_classes).to_f32().unwrap())
			.collect();
		let impurity = gini_impurity(&labels);
		let n_distinct = ClassCounts::from_labels(labels.iter().copied()).len();
		let upper_bound = 1.0 - 1.0 / n_distinct.to_f64().unwrap();
		assert!(impurity >= 0.0);
		assert!(impurity <= upper_bound + 1e-12);
		let all_equal = labels.iter().all(|label| *label == labels[0]);
		assert_eq!(impurity == 0.0, all_equal);
	}
}

#[test]
fn test_majority_ties_go_to_lowest_label() {
	assert_eq!(majority_label(vec![2.0, 1.0, 2.0, 1.0]), Some(1.0));
	assert_eq!(majority_label(vec![1.0, 2.0, 1.0, 2.0]), Some(1.0));
	assert_eq!(majority_label(vec![3.0, 2.0, 3.0]), Some(3.0));
	assert_eq!(majority_label(Vec::new()), None);
}

#[test]
fn test_class_counts() {
	let class_counts = ClassCounts::from_labels(vec![1.0, 0.0, 1.0, 1.0]);
	assert_eq!(class_counts.total(), 4);
	assert_eq!(class_counts.len(), 2);
	assert_eq!(class_counts.count(1.0), 3);
	assert_eq!(class_counts.count(5.0), 0);
	assert_eq!(class_counts.iter().collect::<Vec<_>>(), vec![(1.0, 3), (0.0, 1)]);
}

#[test]
fn test_mean() {
	assert_eq!(mean(Vec::new()), 0.0);
	assert_eq!(mean(vec![0.0, 1.0, 1.0, 0.0]), 0.5);
}

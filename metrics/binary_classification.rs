use super::StreamingMetric;
use num_traits::ToPrimitive;

/// `BinaryClassificationMetrics` counts the cells of the confusion matrix for one positive class. Every prediction or label that is not the positive class counts as negative.
#[derive(Clone, Debug)]
pub struct BinaryClassificationMetrics {
	positive_class: f32,
	true_positives: u64,
	false_positives: u64,
	true_negatives: u64,
	false_negatives: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryClassificationMetricsOutput {
	pub true_positives: u64,
	pub false_positives: u64,
	pub true_negatives: u64,
	pub false_negatives: u64,
	/// (tp + tn) / (tp + fp + tn + fn)
	pub accuracy: f32,
	/// tp / (tp + fp)
	pub precision: f32,
	/// tp / (tp + fn)
	pub recall: f32,
	/// The harmonic mean of precision and recall.
	pub f1_score: f32,
}

impl BinaryClassificationMetrics {
	pub fn new(positive_class: f32) -> BinaryClassificationMetrics {
		BinaryClassificationMetrics {
			positive_class,
			true_positives: 0,
			false_positives: 0,
			true_negatives: 0,
			false_negatives: 0,
		}
	}
}

impl StreamingMetric<'_> for BinaryClassificationMetrics {
	/// `(prediction, label)`
	type Input = (f32, f32);
	type Output = BinaryClassificationMetricsOutput;

	fn update(&mut self, (prediction, label): Self::Input) {
		let predicted_positive = prediction == self.positive_class;
		let actual_positive = label == self.positive_class;
		match (predicted_positive, actual_positive) {
			(true, true) => self.true_positives += 1,
			(true, false) => self.false_positives += 1,
			(false, false) => self.true_negatives += 1,
			(false, true) => self.false_negatives += 1,
		}
	}

	fn merge(&mut self, other: Self) {
		self.true_positives += other.true_positives;
		self.false_positives += other.false_positives;
		self.true_negatives += other.true_negatives;
		self.false_negatives += other.false_negatives;
	}

	fn finalize(self) -> Self::Output {
		let n_examples =
			self.true_positives + self.false_positives + self.true_negatives + self.false_negatives;
		let accuracy = ratio(self.true_positives + self.true_negatives, n_examples);
		let precision = ratio(self.true_positives, self.true_positives + self.false_positives);
		let recall = ratio(self.true_positives, self.true_positives + self.false_negatives);
		let f1_score = if precision + recall == 0.0 {
			0.0
		} else {
			2.0 * precision * recall / (precision + recall)
		};
		BinaryClassificationMetricsOutput {
			true_positives: self.true_positives,
			false_positives: self.false_positives,
			true_negatives: self.true_negatives,
			false_negatives: self.false_negatives,
			accuracy,
			precision,
			recall,
			f1_score,
		}
	}
}

fn ratio(numerator: u64, denominator: u64) -> f32 {
	if denominator == 0 {
		0.0
	} else {
		numerator.to_f32().unwrap() / denominator.to_f32().unwrap()
	}
}

#[test]
fn test_binary_classification_metrics() {
	let mut metrics = BinaryClassificationMetrics::new(1.0);
	let inputs = vec![
		(1.0, 1.0),
		(1.0, 1.0),
		(1.0, 0.0),
		(0.0, 1.0),
		(0.0, 0.0),
		(0.0, 0.0),
		(0.0, 0.0),
		(1.0, 1.0),
	];
	for input in inputs {
		metrics.update(input);
	}
	insta::assert_debug_snapshot!(metrics.finalize(), @r###"
	BinaryClassificationMetricsOutput {
	    true_positives: 3,
	    false_positives: 1,
	    true_negatives: 3,
	    false_negatives: 1,
	    accuracy: 0.75,
	    precision: 0.75,
	    recall: 0.75,
	    f1_score: 0.75,
	}
	"###);
}

#[test]
fn test_zero_denominators() {
	// The model never predicts the positive class and there are no examples of it.
	let mut metrics = BinaryClassificationMetrics::new(1.0);
	metrics.update((0.0, 0.0));
	metrics.update((2.0, 0.0));
	let output = metrics.finalize();
	assert_eq!(output.true_negatives, 2);
	assert_eq!(output.accuracy, 1.0);
	assert_eq!(output.precision, 0.0);
	assert_eq!(output.recall, 0.0);
	assert_eq!(output.f1_score, 0.0);
	let output = BinaryClassificationMetrics::new(1.0).finalize();
	assert_eq!(output.accuracy, 0.0);
}

#[test]
fn test_merge_matches_a_single_pass() {
	let inputs: Vec<(f32, f32)> = (0..40)
		.map(|i| ((i % 3 == 0) as u8 as f32, (i % 2 == 0) as u8 as f32))
		.collect();
	let mut single = BinaryClassificationMetrics::new(1.0);
	for input in inputs.iter() {
		single.update(*input);
	}
	let mut merged = BinaryClassificationMetrics::new(1.0);
	for chunk in inputs.chunks(7) {
		let mut metrics = BinaryClassificationMetrics::new(1.0);
		for input in chunk {
			metrics.update(*input);
		}
		merged.merge(metrics);
	}
	assert_eq!(single.finalize(), merged.finalize());
}

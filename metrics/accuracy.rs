use super::{mean::Mean, StreamingMetric};

/// The accuracy is the proportion of examples where prediction == label. The accuracy of no examples is 0.
#[derive(Clone, Debug, Default)]
pub struct Accuracy(Mean);

impl Accuracy {
	pub fn new() -> Self {
		Self::default()
	}
}

impl StreamingMetric<'_> for Accuracy {
	/// `(prediction, label)`
	type Input = (f32, f32);
	type Output = f32;

	fn update(&mut self, (prediction, label): Self::Input) {
		self.0.update(if prediction == label { 1.0 } else { 0.0 })
	}

	fn merge(&mut self, other: Self) {
		self.0.merge(other.0)
	}

	fn finalize(self) -> f32 {
		self.0.finalize()
	}
}

#[test]
fn test_accuracy() {
	let mut accuracy = Accuracy::new();
	for input in vec![(1.0, 1.0), (0.0, 1.0), (2.0, 2.0), (0.0, 0.0)] {
		accuracy.update(input);
	}
	assert_eq!(accuracy.finalize(), 0.75);
	assert_eq!(Accuracy::new().finalize(), 0.0);
}

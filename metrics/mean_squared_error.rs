use super::{mean::Mean, StreamingMetric};

/// The mean squared error is the mean of the squared differences between the prediction and the label.
#[derive(Clone, Debug, Default)]
pub struct MeanSquaredError(Mean);

#[derive(Clone, Debug, PartialEq)]
pub struct MeanSquaredErrorOutput {
	pub mse: f32,
	/// The square root of `mse`, in the same unit as the labels.
	pub rmse: f32,
}

impl MeanSquaredError {
	pub fn new() -> Self {
		Self::default()
	}
}

impl StreamingMetric<'_> for MeanSquaredError {
	/// `(prediction, label)`
	type Input = (f32, f32);
	type Output = MeanSquaredErrorOutput;

	fn update(&mut self, (prediction, label): Self::Input) {
		self.0.update((label - prediction).powi(2))
	}

	fn merge(&mut self, other: Self) {
		self.0.merge(other.0)
	}

	fn finalize(self) -> Self::Output {
		let mse = self.0.finalize();
		MeanSquaredErrorOutput {
			mse,
			rmse: mse.sqrt(),
		}
	}
}

#[test]
fn test_mean_squared_error() {
	let mut metric = MeanSquaredError::new();
	for input in vec![(1.0, 3.0), (2.0, 2.0), (4.0, 2.0), (0.0, 0.0)] {
		metric.update(input);
	}
	insta::assert_debug_snapshot!(metric.finalize(), @r###"
	MeanSquaredErrorOutput {
	    mse: 2.0,
	    rmse: 1.4142135,
	}
	"###);
	assert_eq!(
		MeanSquaredError::new().finalize(),
		MeanSquaredErrorOutput {
			mse: 0.0,
			rmse: 0.0,
		}
	);
}

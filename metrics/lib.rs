/*!
This crate defines the [`StreamingMetric`](trait.StreamingMetric.html) trait and the metrics used to evaluate trees and forests, such as [`Accuracy`](struct.Accuracy.html), [`MeanSquaredError`](struct.MeanSquaredError.html) and [`BinaryClassificationMetrics`](struct.BinaryClassificationMetrics.html).

Every metric reports 0 rather than NaN when its denominator is 0, for example the accuracy of zero examples or the precision of a model that never predicts the positive class.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod accuracy;
mod binary_classification;
mod mean;
mod mean_squared_error;

pub use self::accuracy::Accuracy;
pub use self::binary_classification::{
	BinaryClassificationMetrics, BinaryClassificationMetricsOutput,
};
pub use self::mean::Mean;
pub use self::mean_squared_error::{MeanSquaredError, MeanSquaredErrorOutput};

/**
The `StreamingMetric` trait defines a common interface to metrics that are computed one input at a time.

After being initialized, a value of type `T` implementing the `StreamingMetric` trait can have `update()` called on it with values of the associated type `Input`. Multiple values of `T` can be merged together by calling `merge()`, which is how a metric is computed over chunks of predictions on several threads. When finished aggregating, call `finalize()` to produce the associated type `Output`.

# Examples

Here is a `Max` metric, which takes `f32`s as input and produces the largest of them.

```
use arbor_metrics::StreamingMetric;

struct Max(f32);

impl StreamingMetric<'_> for Max {
	type Input = f32;
	type Output = f32;
	fn update(&mut self, input: Self::Input) {
		self.0 = self.0.max(input)
	}
	fn merge(&mut self, other: Self) { self.0 = self.0.max(other.0) }
	fn finalize(self) -> Self::Output { self.0 }
}

let mut max = Max(std::f32::MIN);
max.update(1.0);
max.update(3.0);
assert_eq!(max.finalize(), 3.0);
```

The generic lifetime `'a` allows `Input`s to borrow from their enclosing scope.
*/
pub trait StreamingMetric<'a> {
	/// `Input` is the type to aggregate in calls to `update()`.
	type Input;
	/// `Output` is the return type of `finalize()`.
	type Output;
	/// Update this streaming metric with the `Input` `input`.
	fn update(&mut self, input: Self::Input);
	/// Merge multiple independently computed streaming metrics.
	fn merge(&mut self, other: Self);
	/// When you are done aggregating `Input`s, call `finalize()` to produce an `Output`.
	fn finalize(self) -> Self::Output;
}

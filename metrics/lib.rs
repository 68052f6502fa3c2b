/*!
This crate defines the [`Metric`](trait.Metric.html) and [`StreamingMetric`](trait.StreamingMetric.html) traits and the binary classification metrics used to evaluate and tune a disease classifier: the confusion matrix, accuracy, precision, recall and f1, the area under the ROC curve, threshold sweeps, best threshold selection and the precision recall curve.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod auc_roc;
mod best_threshold;
mod binary_classification;
mod confusion_matrix;
mod median;
mod precision_recall;
mod threshold_sweep;

pub use self::auc_roc::{auc_roc, compute_roc_curve, RocCurvePoint};
pub use self::best_threshold::{best_index, best_sweep_row, select_best_threshold};
pub use self::binary_classification::{
	BinaryClassificationMetrics, BinaryClassificationMetricsInput, MetricName, MetricSet,
	UnknownMetricError,
};
pub use self::confusion_matrix::{BinaryConfusionCounts, BinaryConfusionMatrix};
pub use self::median::Median;
pub use self::precision_recall::{
	average_precision, compute_precision_recall_curve, PrecisionRecallPoint,
};
pub use self::threshold_sweep::{
	sweep_thresholds, InvalidThresholdRangeError, SweepRow, ThresholdRange, MAX_THRESHOLDS,
};

/**
The `Metric` trait defines a common interface to metrics that can be computed when the entire input is available at once.

The generic lifetime `'a` allows `Input`s and `Output`s to borrow from their enclosing scope.
*/
pub trait Metric<'a> {
	type Input;
	type Output;
	fn compute(input: Self::Input) -> Self::Output;
}

/**
The `StreamingMetric` trait defines a common interface to metrics that can be computed in a streaming manner, where the input is available one value or one chunk at a time, such as a confusion matrix.

After being initialized, a value of type `T` implementing the `StreamingMetric` trait can have `update()` called on it with values of the associated type `Input`. Multiple values of `T` can be merged together by calling `merge()`. When finished aggregating, call `finalize()` on the metric to produce the associated type `Output`.

# Examples

Here is a basic example implementation of a `Max` metric, which takes `f64`s as input and produces the largest of them.

```
use cardio_metrics::StreamingMetric;

struct Max(f64);

impl StreamingMetric<'_> for Max {
	type Input = f64;
	type Output = f64;
	fn update(&mut self, input: Self::Input) {
		self.0 = self.0.max(input)
	}
	fn merge(&mut self, other: Self) { self.0 = self.0.max(other.0) }
	fn finalize(self) -> Self::Output { self.0 }
}
```
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

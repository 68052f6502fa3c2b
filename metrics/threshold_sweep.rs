use super::{auc_roc, BinaryConfusionCounts, BinaryConfusionMatrix, MetricSet, StreamingMetric};
use itertools::izip;
use num_traits::ToPrimitive;
use thiserror::Error;

/// Thresholds closer than this to the end of a range still belong to it, so that accumulated rounding error never drops the last threshold.
const RANGE_END_TOLERANCE: f64 = 1e-12;

/// The largest number of thresholds a range may hold.
pub const MAX_THRESHOLDS: usize = 1_000_000;

/**
A closed arithmetic range of classification thresholds: `min`, `min + step`, `min + 2 * step`, and so on up to and including `max`.
*/
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdRange {
	min: f64,
	max: f64,
	step: f64,
}

#[derive(Debug, Error, PartialEq)]
#[error(
	"invalid threshold range: min {min}, max {max}, step {step}; expected finite values with min <= max, step > 0 and at most {} thresholds",
	MAX_THRESHOLDS
)]
pub struct InvalidThresholdRangeError {
	pub min: f64,
	pub max: f64,
	pub step: f64,
}

impl Default for ThresholdRange {
	fn default() -> Self {
		Self {
			min: 0.05,
			max: 0.95,
			step: 0.05,
		}
	}
}

impl ThresholdRange {
	pub fn new(min: f64, max: f64, step: f64) -> Result<Self, InvalidThresholdRangeError> {
		let valid = min.is_finite()
			&& max.is_finite()
			&& step.is_finite()
			&& min <= max
			&& step > 0.0;
		if valid && threshold_count(min, max, step).is_some() {
			Ok(Self { min, max, step })
		} else {
			Err(InvalidThresholdRangeError { min, max, step })
		}
	}

	pub fn min(&self) -> f64 {
		self.min
	}

	pub fn max(&self) -> f64 {
		self.max
	}

	pub fn step(&self) -> f64 {
		self.step
	}

	pub fn len(&self) -> usize {
		threshold_count(self.min, self.max, self.step).unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn thresholds(&self) -> impl Iterator<Item = f64> {
		let ThresholdRange { min, step, .. } = *self;
		(0..self.len()).map(move |i| min + i as f64 * step)
	}
}

fn threshold_count(min: f64, max: f64, step: f64) -> Option<usize> {
	((max + RANGE_END_TOLERANCE - min) / step)
		.ceil()
		.to_usize()
		.filter(|count| *count <= MAX_THRESHOLDS)
}

/// The metrics of a classifier that predicts positive when the probability is greater than or equal to `threshold`.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepRow {
	pub threshold: f64,
	pub metrics: MetricSet,
	pub counts: BinaryConfusionCounts,
}

/**
Compute the metrics at every threshold in `range`.

The area under the ROC curve does not depend on the threshold, so it is computed once and copied into every row.
*/
pub fn sweep_thresholds(
	labels: &[u8],
	probabilities: &[f64],
	range: &ThresholdRange,
) -> Vec<SweepRow> {
	assert_eq!(labels.len(), probabilities.len());
	let roc_auc = auc_roc(probabilities, labels);
	range
		.thresholds()
		.map(|threshold| {
			let mut confusion_matrix = BinaryConfusionMatrix::new();
			for (label, probability) in izip!(labels, probabilities) {
				let prediction = if *probability >= threshold { 1 } else { 0 };
				confusion_matrix.update((*label, prediction));
			}
			let counts = confusion_matrix.finalize();
			SweepRow {
				threshold,
				metrics: MetricSet {
					accuracy: counts.accuracy(),
					precision: counts.precision(),
					recall: counts.recall(),
					f1: counts.f1_score(),
					roc_auc,
				},
				counts,
			}
		})
		.collect()
}

#[test]
fn test_range_includes_max() {
	let range = ThresholdRange::default();
	let thresholds: Vec<f64> = range.thresholds().collect();
	assert_eq!(thresholds.len(), 19);
	assert!((thresholds[18] - 0.95).abs() < 1e-9);
	let range = ThresholdRange::new(0.1, 0.3, 0.1).unwrap();
	assert_eq!(range.len(), 3);
	let range = ThresholdRange::new(0.5, 0.5, 0.1).unwrap();
	assert_eq!(range.thresholds().collect::<Vec<_>>(), vec![0.5]);
}

#[test]
fn test_invalid_range() {
	assert!(ThresholdRange::new(0.5, 0.4, 0.1).is_err());
	assert!(ThresholdRange::new(0.1, 0.9, 0.0).is_err());
	assert!(ThresholdRange::new(0.1, std::f64::NAN, 0.1).is_err());
	// A tiny step would yield more thresholds than can be swept.
	assert!(ThresholdRange::new(0.0, 1.0, 1e-300).is_err());
	assert!(ThresholdRange::new(0.0, 1.0, 1e-7).is_err());
	let range = ThresholdRange::new(0.0, 1.0, 1e-5).unwrap();
	assert_eq!(range.len(), 100_001);
}

#[test]
fn test_sweep() {
	let labels = [0, 0, 1, 1, 1, 0];
	let probabilities = [0.1, 0.6, 0.35, 0.8, 0.55, 0.3];
	let range = ThresholdRange::new(0.0, 1.0, 0.25).unwrap();
	let rows = sweep_thresholds(&labels, &probabilities, &range);
	assert_eq!(rows.len(), 5);
	let roc_auc = rows[0].metrics.roc_auc;
	assert!(roc_auc.is_some());
	for row in rows.iter() {
		assert_eq!(row.metrics.roc_auc, roc_auc);
		assert_eq!(row.counts.n_examples(), labels.len() as u64);
	}
	// Everything is predicted positive at threshold 0.
	assert_eq!(rows[0].counts.true_positives, 3);
	assert_eq!(rows[0].counts.false_positives, 3);
	// Nothing is predicted positive at threshold 1, which yields zero precision rather than NaN.
	assert_eq!(rows[4].counts.true_negatives, 3);
	assert_eq!(rows[4].counts.false_negatives, 3);
	assert_eq!(rows[4].metrics.precision, 0.0);
	assert_eq!(rows[4].metrics.f1, 0.0);
	// At threshold 0.5, 0.55, 0.6 and 0.8 are predicted positive.
	assert_eq!(rows[2].counts.true_positives, 2);
	assert_eq!(rows[2].counts.false_positives, 1);
}

#[test]
fn test_sweep_single_class() {
	let rows = sweep_thresholds(&[0, 0], &[0.2, 0.7], &ThresholdRange::default());
	assert!(rows.iter().all(|row| row.metrics.roc_auc.is_none()));
	assert!(rows
		.iter()
		.all(|row| row.counts.true_positives + row.counts.false_negatives == 0));
}

use super::StreamingMetric;
use ndarray::prelude::*;
use num_traits::ToPrimitive;

/**
A binary confusion matrix over the labels `[0, 1]`. The matrix always has all four cells, even when one of the classes never appears in the labels or the predictions.
*/
#[derive(Clone, Debug)]
pub struct BinaryConfusionMatrix {
	//                        prediction   label
	//                             |         |
	//                             v         v
	/// The shape of the confusion matrix is (2, 2).
	confusion_matrix: Array2<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct BinaryConfusionCounts {
	pub true_positives: u64,
	pub false_positives: u64,
	pub true_negatives: u64,
	pub false_negatives: u64,
}

impl Default for BinaryConfusionMatrix {
	fn default() -> Self {
		Self::new()
	}
}

impl BinaryConfusionMatrix {
	pub fn new() -> Self {
		Self {
			confusion_matrix: Array2::zeros((2, 2)),
		}
	}
}

impl StreamingMetric<'_> for BinaryConfusionMatrix {
	/// `(label, prediction)`, both 0 or 1. Any nonzero value counts as the positive class.
	type Input = (u8, u8);
	type Output = BinaryConfusionCounts;

	fn update(&mut self, (label, prediction): Self::Input) {
		let label: usize = if label > 0 { 1 } else { 0 };
		let prediction: usize = if prediction > 0 { 1 } else { 0 };
		self.confusion_matrix[(prediction, label)] += 1;
	}

	fn merge(&mut self, other: Self) {
		self.confusion_matrix += &other.confusion_matrix;
	}

	fn finalize(self) -> Self::Output {
		BinaryConfusionCounts {
			true_positives: self.confusion_matrix[(1, 1)],
			false_positives: self.confusion_matrix[(1, 0)],
			true_negatives: self.confusion_matrix[(0, 0)],
			false_negatives: self.confusion_matrix[(0, 1)],
		}
	}
}

impl BinaryConfusionCounts {
	pub fn n_examples(&self) -> u64 {
		self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
	}

	/// The proportion of examples classified correctly, or 0 when there are no examples.
	pub fn accuracy(&self) -> f64 {
		ratio(
			self.true_positives + self.true_negatives,
			self.n_examples(),
		)
	}

	/// tp / (tp + fp), or 0 when nothing was predicted positive.
	pub fn precision(&self) -> f64 {
		ratio(
			self.true_positives,
			self.true_positives + self.false_positives,
		)
	}

	/// tp / (tp + fn), or 0 when there are no positive labels.
	pub fn recall(&self) -> f64 {
		ratio(
			self.true_positives,
			self.true_positives + self.false_negatives,
		)
	}

	/// The harmonic mean of precision and recall, computed as 2tp / (2tp + fp + fn), or 0 when that denominator is 0.
	pub fn f1_score(&self) -> f64 {
		ratio(
			2 * self.true_positives,
			2 * self.true_positives + self.false_positives + self.false_negatives,
		)
	}
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
	if denominator == 0 {
		0.0
	} else {
		numerator.to_f64().unwrap_or(0.0) / denominator.to_f64().unwrap_or(1.0)
	}
}

#[test]
fn test_confusion_matrix() {
	let labels = [0u8, 0, 0, 1, 1, 1, 1];
	let predictions = [0u8, 1, 0, 1, 1, 0, 1];
	let mut matrix = BinaryConfusionMatrix::new();
	for (label, prediction) in labels.iter().zip(predictions.iter()) {
		matrix.update((*label, *prediction));
	}
	let counts = matrix.finalize();
	insta::assert_debug_snapshot!(counts, @r###"
 BinaryConfusionCounts {
     true_positives: 3,
     false_positives: 1,
     true_negatives: 2,
     false_negatives: 1,
 }
 "###);
	assert!((counts.accuracy() - 5.0 / 7.0).abs() < 1e-12);
	assert!((counts.precision() - 0.75).abs() < 1e-12);
	assert!((counts.recall() - 0.75).abs() < 1e-12);
	assert!((counts.f1_score() - 0.75).abs() < 1e-12);
}

#[test]
fn test_merge() {
	let mut a = BinaryConfusionMatrix::new();
	a.update((1, 1));
	let mut b = BinaryConfusionMatrix::new();
	b.update((0, 1));
	b.update((0, 0));
	a.merge(b);
	let counts = a.finalize();
	assert_eq!(counts.n_examples(), 3);
	assert_eq!(counts.false_positives, 1);
}

#[test]
fn test_zero_division() {
	let counts = BinaryConfusionCounts::default();
	assert_eq!(counts.accuracy(), 0.0);
	assert_eq!(counts.precision(), 0.0);
	assert_eq!(counts.recall(), 0.0);
	assert_eq!(counts.f1_score(), 0.0);
}

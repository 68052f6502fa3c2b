use num_traits::ToPrimitive;
use std::cmp::Ordering;

/**
This function computes the area under the receiver operating characteristic curve using the trapezoid method. Examples with equal probabilities share a single point on the curve, so the result does not depend on the order of tied examples.

The result is `None` when `labels` does not contain both classes, because the curve is undefined without positives and negatives.
*/
pub fn auc_roc(probabilities: &[f64], labels: &[u8]) -> Option<f64> {
	let roc_curve = compute_roc_curve(probabilities, labels)?;
	let auc = roc_curve
		.windows(2)
		.map(|window| {
			let left = &window[0];
			let right = &window[1];
			let y_average = (left.true_positive_rate + right.true_positive_rate) / 2.0;
			let dx = right.false_positive_rate - left.false_positive_rate;
			y_average * dx
		})
		.sum();
	Some(auc)
}

#[derive(Debug, PartialEq)]
pub struct RocCurvePoint {
	/// The classification threshold.
	pub threshold: f64,
	/// The true positive rate for all predictions with probability >= threshold.
	pub true_positive_rate: f64,
	/// The false positive rate for all predictions with probability >= threshold.
	pub false_positive_rate: f64,
}

/// This function computes the ROC curve, which plots the false positive rate on the x axis and the true positive rate on the y axis for each distinct probability used as a classification threshold.
pub fn compute_roc_curve(probabilities: &[f64], labels: &[u8]) -> Option<Vec<RocCurvePoint>> {
	assert_eq!(probabilities.len(), labels.len());
	let count_positives = labels.iter().filter(|label| **label > 0).count();
	let count_negatives = labels.len() - count_positives;
	if count_positives == 0 || count_negatives == 0 {
		return None;
	}
	let count_positives = count_positives.to_f64()?;
	let count_negatives = count_negatives.to_f64()?;
	let mut tps_fps = compute_tps_fps_by_threshold(probabilities, labels);
	for i in 1..tps_fps.len() {
		tps_fps[i].true_positives += tps_fps[i - 1].true_positives;
		tps_fps[i].false_positives += tps_fps[i - 1].false_positives;
	}
	// add a point at (0,0) on the roc curve with a dummy threshold of 1.0
	let mut roc_curve = vec![RocCurvePoint {
		threshold: 1.0,
		true_positive_rate: 0.0,
		false_positive_rate: 0.0,
	}];
	for point in tps_fps.iter() {
		roc_curve.push(RocCurvePoint {
			threshold: point.threshold,
			true_positive_rate: point.true_positives.to_f64()? / count_positives,
			false_positive_rate: point.false_positives.to_f64()? / count_negatives,
		});
	}
	Some(roc_curve)
}

#[derive(Debug)]
pub(crate) struct TpsFpsPoint {
	/// The classification threshold.
	pub threshold: f64,
	/// The true positives for this threshold.
	pub true_positives: usize,
	/// The false positives for this threshold.
	pub false_positives: usize,
}

/**
This function computes the counts of true positives and false positives at each distinct probability, sorted from the highest probability to the lowest. Unlike the roc curve, each point contains just the count of examples with exactly this probability instead of all examples with a probability greater than or equal to it.
*/
pub(crate) fn compute_tps_fps_by_threshold(
	probabilities: &[f64],
	labels: &[u8],
) -> Vec<TpsFpsPoint> {
	let mut probabilities_labels: Vec<(f64, u8)> = probabilities
		.iter()
		.copied()
		.zip(labels.iter().copied())
		.collect();
	probabilities_labels.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
	let mut tps_fps: Vec<TpsFpsPoint> = Vec::new();
	for (probability, label) in probabilities_labels {
		let tp = if label > 0 { 1 } else { 0 };
		match tps_fps.last_mut() {
			// if probability is same as the last one, add to the previous bucket
			Some(last) if last.threshold == probability => {
				last.true_positives += tp;
				last.false_positives += 1 - tp;
			}
			_ => {
				tps_fps.push(TpsFpsPoint {
					threshold: probability,
					true_positives: tp,
					false_positives: 1 - tp,
				});
			}
		}
	}
	tps_fps
}

#[test]
fn test_roc_curve() {
	let labels = vec![1, 1, 0, 0];
	let probabilities = vec![0.9, 0.4, 0.4, 0.2];
	let left = compute_roc_curve(probabilities.as_slice(), labels.as_slice()).unwrap();
	let right = vec![
		RocCurvePoint {
			threshold: 1.0,
			true_positive_rate: 0.0,
			false_positive_rate: 0.0,
		},
		RocCurvePoint {
			threshold: 0.9,
			true_positive_rate: 0.5,
			false_positive_rate: 0.0,
		},
		RocCurvePoint {
			threshold: 0.4,
			true_positive_rate: 1.0,
			false_positive_rate: 0.5,
		},
		RocCurvePoint {
			threshold: 0.2,
			true_positive_rate: 1.0,
			false_positive_rate: 1.0,
		},
	];
	assert_eq!(left, right);
	let auc = auc_roc(probabilities.as_slice(), labels.as_slice()).unwrap();
	assert!(f64::abs(auc - 0.875) < std::f64::EPSILON)
}

#[test]
fn test_single_class() {
	assert_eq!(auc_roc(&[0.1, 0.7], &[0, 0]), None);
	assert_eq!(auc_roc(&[0.1, 0.7], &[1, 1]), None);
}

#[test]
fn test_perfect_and_inverted() {
	assert_eq!(auc_roc(&[0.1, 0.2, 0.8, 0.9], &[0, 0, 1, 1]), Some(1.0));
	assert_eq!(auc_roc(&[0.9, 0.8, 0.2, 0.1], &[0, 0, 1, 1]), Some(0.0));
}

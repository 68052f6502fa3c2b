use super::auc_roc::compute_tps_fps_by_threshold;
use num_traits::ToPrimitive;

#[derive(Clone, Debug, PartialEq)]
pub struct PrecisionRecallPoint {
	/// The classification threshold, or `None` for the final point of the curve.
	pub threshold: Option<f64>,
	/// The precision for all predictions with probability >= threshold.
	pub precision: f64,
	/// The recall for all predictions with probability >= threshold.
	pub recall: f64,
}

/**
This function computes the precision recall curve. There is one point for each distinct probability, ordered from the lowest threshold to the highest, followed by a final point with precision 1 and recall 0 that has no threshold.

When `labels` contains no positives, recall is defined as 1 at every threshold.
*/
pub fn compute_precision_recall_curve(
	probabilities: &[f64],
	labels: &[u8],
) -> Vec<PrecisionRecallPoint> {
	assert_eq!(probabilities.len(), labels.len());
	let count_positives = labels.iter().filter(|label| **label > 0).count();
	let mut true_positives = 0;
	let mut false_positives = 0;
	// Walk from the highest threshold to the lowest, accumulating counts.
	let mut curve: Vec<PrecisionRecallPoint> = compute_tps_fps_by_threshold(probabilities, labels)
		.into_iter()
		.map(|point| {
			true_positives += point.true_positives;
			false_positives += point.false_positives;
			let precision = to_f64(true_positives) / to_f64(true_positives + false_positives);
			let recall = if count_positives == 0 {
				1.0
			} else {
				to_f64(true_positives) / to_f64(count_positives)
			};
			PrecisionRecallPoint {
				threshold: Some(point.threshold),
				precision,
				recall,
			}
		})
		.collect();
	curve.reverse();
	curve.push(PrecisionRecallPoint {
		threshold: None,
		precision: 1.0,
		recall: 0.0,
	});
	curve
}

/**
This function computes the average precision, the sum over thresholds from highest to lowest of the precision at each threshold weighted by the increase in recall from the previous threshold.

The result is `None` when `labels` contains no positives.
*/
pub fn average_precision(probabilities: &[f64], labels: &[u8]) -> Option<f64> {
	if !labels.iter().any(|label| *label > 0) {
		return None;
	}
	let curve = compute_precision_recall_curve(probabilities, labels);
	let mut previous_recall = 0.0;
	let mut average_precision = 0.0;
	for point in curve.iter().rev().filter(|point| point.threshold.is_some()) {
		average_precision += (point.recall - previous_recall) * point.precision;
		previous_recall = point.recall;
	}
	Some(average_precision)
}

fn to_f64(value: usize) -> f64 {
	value.to_f64().unwrap_or(std::f64::NAN)
}

#[test]
fn test_precision_recall_curve() {
	let labels = [0, 0, 1, 1];
	let probabilities = [0.1, 0.4, 0.35, 0.8];
	let curve = compute_precision_recall_curve(&probabilities, &labels);
	let thresholds: Vec<Option<f64>> = curve.iter().map(|point| point.threshold).collect();
	assert_eq!(
		thresholds,
		vec![Some(0.1), Some(0.35), Some(0.4), Some(0.8), None]
	);
	let recalls: Vec<f64> = curve.iter().map(|point| point.recall).collect();
	assert_eq!(recalls, vec![1.0, 1.0, 0.5, 0.5, 0.0]);
	let precisions: Vec<f64> = curve.iter().map(|point| point.precision).collect();
	assert_eq!(precisions[0], 0.5);
	assert!((precisions[1] - 2.0 / 3.0).abs() < 1e-12);
	assert_eq!(precisions[2], 0.5);
	assert_eq!(precisions[3], 1.0);
	assert_eq!(precisions[4], 1.0);
	let average_precision = average_precision(&probabilities, &labels).unwrap();
	assert!((average_precision - 5.0 / 6.0).abs() < 1e-12);
}

#[test]
fn test_average_precision_without_positives() {
	assert_eq!(average_precision(&[0.3, 0.6], &[0, 0]), None);
	let curve = compute_precision_recall_curve(&[0.3, 0.6], &[0, 0]);
	assert!(curve
		.iter()
		.filter(|point| point.threshold.is_some())
		.all(|point| point.recall == 1.0 && point.precision == 0.0));
}

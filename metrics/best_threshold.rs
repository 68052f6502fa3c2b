use super::{MetricName, SweepRow};
use cardio_util::finite::cmp_missing_lowest;
use std::cmp::Ordering;

/**
Find the index of the best `(threshold, score)` candidate: the highest score wins, and among equal scores the lowest threshold wins, which is the most conservative choice. Missing or NaN scores rank below every present score, and NaN thresholds rank after every other threshold.

Returns `None` when there are no candidates.
*/
pub fn best_index<I>(candidates: I) -> Option<usize>
where
	I: IntoIterator<Item = (f64, Option<f64>)>,
{
	let mut best: Option<(usize, f64, Option<f64>)> = None;
	for (index, (threshold, score)) in candidates.into_iter().enumerate() {
		let is_better = match best {
			None => true,
			Some((_, best_threshold, best_score)) => match cmp_missing_lowest(score, best_score) {
				Ordering::Greater => true,
				Ordering::Less => false,
				// A lower threshold is better, so compare the negated thresholds.
				Ordering::Equal => {
					cmp_missing_lowest(Some(-threshold), Some(-best_threshold))
						== Ordering::Greater
				}
			},
		};
		if is_better {
			best = Some((index, threshold, score));
		}
	}
	best.map(|(index, _, _)| index)
}

/// Select the best threshold from `(threshold, score)` candidates. See [`best_index`](fn.best_index.html) for the rule.
pub fn select_best_threshold<I>(candidates: I) -> Option<f64>
where
	I: IntoIterator<Item = (f64, Option<f64>)>,
{
	let candidates: Vec<(f64, Option<f64>)> = candidates.into_iter().collect();
	best_index(candidates.iter().copied()).map(|index| candidates[index].0)
}

/// Select the sweep row with the best value of `metric`.
pub fn best_sweep_row(rows: &[SweepRow], metric: MetricName) -> Option<&SweepRow> {
	best_index(rows.iter().map(|row| (row.threshold, row.metrics.get(metric))))
		.map(|index| &rows[index])
}

#[test]
fn test_tie_prefers_lower_threshold() {
	let candidates = vec![(0.30, Some(0.80)), (0.35, Some(0.82)), (0.40, Some(0.82))];
	assert_eq!(select_best_threshold(candidates), Some(0.35));
	let candidates = vec![(0.40, Some(0.82)), (0.35, Some(0.82)), (0.30, Some(0.80))];
	assert_eq!(select_best_threshold(candidates), Some(0.35));
}

#[test]
fn test_missing_scores_never_win() {
	let candidates = vec![(0.1, None), (0.2, Some(std::f64::NAN)), (0.9, Some(0.0))];
	assert_eq!(select_best_threshold(candidates), Some(0.9));
	let candidates = vec![(0.2, None), (0.1, None)];
	assert_eq!(select_best_threshold(candidates), Some(0.1));
}

#[test]
fn test_empty() {
	assert_eq!(select_best_threshold(Vec::new()), None);
}

#[test]
fn test_best_sweep_row() {
	use super::{sweep_thresholds, ThresholdRange};
	let labels = [0, 0, 1, 1];
	let probabilities = [0.2, 0.45, 0.5, 0.9];
	let range = ThresholdRange::new(0.1, 0.9, 0.1).unwrap();
	let rows = sweep_thresholds(&labels, &probabilities, &range);
	let best = best_sweep_row(&rows, MetricName::F1).unwrap();
	// Thresholds in (0.45, 0.5] separate the classes perfectly.
	assert!((best.threshold - 0.5).abs() < 1e-9);
	assert_eq!(best.metrics.f1, 1.0);
	let best = best_sweep_row(&rows, MetricName::Recall).unwrap();
	assert!((best.threshold - 0.1).abs() < 1e-9);
}

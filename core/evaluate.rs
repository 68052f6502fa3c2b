/*!
This module evaluates a predictions file against its ground truth and writes the metrics as json.
*/

use crate::{
	align::{load_and_align, Aligned, Requirements},
	error::{Error, Result},
};
use cardio_metrics::{
	BinaryClassificationMetrics, BinaryClassificationMetricsInput, Metric, MetricSet,
};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Evaluation {
	pub input: String,
	pub preds: String,
	pub n_rows: usize,
	pub metrics: MetricSet,
}

/**
Compute the metrics of aligned predictions. With a `threshold`, predicted labels are derived from the probabilities as `probability >= threshold` instead of read from the `pred` column.
*/
pub fn compute_metrics(aligned: &Aligned, threshold: Option<f64>) -> Result<MetricSet> {
	let derived;
	let predictions = match threshold {
		Some(threshold) => {
			let probabilities = aligned.probabilities.as_ref().ok_or_else(|| {
				Error::missing_columns("predictions", crate::align::PROBABILITY_COLUMN_ALIASES)
			})?;
			derived = probabilities
				.iter()
				.map(|probability| if *probability >= threshold { 1 } else { 0 })
				.collect::<Vec<u8>>();
			&derived
		}
		None => aligned
			.predictions
			.as_ref()
			.ok_or_else(|| {
				Error::missing_columns("predictions", &[crate::align::PREDICTION_COLUMN])
			})?,
	};
	Ok(BinaryClassificationMetrics::compute(
		BinaryClassificationMetricsInput {
			labels: &aligned.labels,
			predictions,
			probabilities: aligned.probabilities.as_deref(),
		},
	))
}

pub fn evaluate(input: &Path, preds: &Path, threshold: Option<f64>) -> Result<Evaluation> {
	if let Some(threshold) = threshold {
		if !threshold.is_finite() {
			return Err(Error::InvalidConfig(format!(
				"threshold must be finite, got {}",
				threshold
			)));
		}
	}
	let requirements = Requirements {
		predictions: threshold.is_none(),
		probabilities: threshold.is_some(),
	};
	let aligned = load_and_align(input, preds, requirements)?;
	let metrics = compute_metrics(&aligned, threshold)?;
	Ok(Evaluation {
		input: input.display().to_string(),
		preds: preds.display().to_string(),
		n_rows: aligned.len(),
		metrics,
	})
}

pub fn to_json(evaluation: &Evaluation) -> Result<String> {
	let mut json = serde_json::to_string_pretty(evaluation)?;
	json.push('\n');
	Ok(json)
}

pub fn write_evaluation(path: &Path, evaluation: &Evaluation) -> Result<()> {
	cardio_util::fs::write_file(path, to_json(evaluation)?)?;
	log::info!("wrote {}", path.display());
	Ok(())
}

pub fn run_evaluate(
	input: &Path,
	preds: &Path,
	output: &Path,
	threshold: Option<f64>,
) -> Result<Evaluation> {
	let evaluation = evaluate(input, preds, threshold)?;
	write_evaluation(output, &evaluation)?;
	Ok(evaluation)
}

#[test]
fn test_all_negative_predictions() {
	let aligned = Aligned {
		labels: vec![0, 0, 1, 1],
		predictions: Some(vec![0, 0, 0, 0]),
		probabilities: None,
	};
	let metrics = compute_metrics(&aligned, None).unwrap();
	assert_eq!(metrics.accuracy, 0.5);
	assert_eq!(metrics.precision, 0.0);
	assert_eq!(metrics.recall, 0.0);
	assert_eq!(metrics.f1, 0.0);
	assert_eq!(metrics.roc_auc, None);
}

#[test]
fn test_threshold_overrides_predictions() {
	let aligned = Aligned {
		labels: vec![0, 0, 1, 1],
		predictions: Some(vec![0, 0, 0, 0]),
		probabilities: Some(vec![0.1, 0.4, 0.35, 0.8]),
	};
	let metrics = compute_metrics(&aligned, Some(0.35)).unwrap();
	assert_eq!(metrics.recall, 1.0);
	assert!((metrics.precision - 2.0 / 3.0).abs() < 1e-12);
	assert_eq!(metrics.roc_auc, Some(0.75));
	let without_probabilities = Aligned {
		probabilities: None,
		..aligned
	};
	assert!(matches!(
		compute_metrics(&without_probabilities, Some(0.5)),
		Err(Error::MissingColumn { .. })
	));
}

#[test]
fn test_run_evaluate() {
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join("test.csv");
	let preds = dir.path().join("preds.csv");
	let output = dir.path().join("eval").join("eval_test.json");
	std::fs::write(&input, "age,target\n63,1\n41,1\n57,0\n50,0\n").unwrap();
	std::fs::write(&preds, "proba_disease,pred\n0.9,1\n0.4,0\n0.4,1\n0.2,0\n").unwrap();
	let evaluation = run_evaluate(&input, &preds, &output, None).unwrap();
	assert_eq!(evaluation.n_rows, 4);
	assert_eq!(evaluation.metrics.roc_auc, Some(0.875));
	let json = std::fs::read_to_string(&output).unwrap();
	assert!(json.ends_with("}\n"));
	let metrics = crate::artifact::parse_evaluation_metrics(&json).unwrap();
	assert_eq!(metrics, evaluation.metrics);
}

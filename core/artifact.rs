/*!
This module reads and writes the files that pass data between stages: csv tables, threshold files, and evaluation json files.
*/

use crate::error::{Error, Result};
use cardio_dataframe::{DataFrame, FromCsvOptions};
use cardio_metrics::MetricSet;
use std::path::Path;

/// Load a csv file, failing with `ArtifactNotFound` if it does not exist.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
	ensure_exists(path)?;
	let dataframe = DataFrame::from_path(path, FromCsvOptions::default())?;
	log::debug!(
		"loaded {} ({} rows, {} columns)",
		path.display(),
		dataframe.nrows(),
		dataframe.ncols()
	);
	Ok(dataframe)
}

/// Read a text file, failing with `ArtifactNotFound` if it does not exist.
pub fn read_text(path: &Path) -> Result<String> {
	ensure_exists(path)?;
	Ok(std::fs::read_to_string(path)?)
}

pub fn ensure_exists(path: &Path) -> Result<()> {
	if path.exists() {
		Ok(())
	} else {
		Err(Error::ArtifactNotFound(path.to_owned()))
	}
}

/// Format a threshold the way it is written to threshold files and reports.
pub fn format_threshold(threshold: f64) -> String {
	format!("{:.3}", threshold)
}

pub fn parse_threshold(text: &str) -> Result<f64> {
	let text = text.trim();
	match text.parse::<f64>() {
		Ok(threshold) if threshold.is_finite() => Ok(threshold),
		_ => Err(Error::parse(
			"threshold",
			format!("expected a number, got {:?}", text),
		)),
	}
}

pub fn read_threshold(path: &Path) -> Result<f64> {
	parse_threshold(&read_text(path)?)
}

pub fn write_threshold(path: &Path, threshold: f64) -> Result<()> {
	cardio_util::fs::write_file(path, format!("{}\n", format_threshold(threshold)))?;
	Ok(())
}

/// Evaluation files are either `{"metrics": {...}, ...}` or a bare metrics object.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum EvaluationFile {
	Wrapped { metrics: MetricSet },
	Bare(MetricSet),
}

pub fn parse_evaluation_metrics(json: &str) -> Result<MetricSet> {
	let file: EvaluationFile = serde_json::from_str(json)?;
	Ok(match file {
		EvaluationFile::Wrapped { metrics } => metrics,
		EvaluationFile::Bare(metrics) => metrics,
	})
}

pub fn read_evaluation_metrics(path: &Path) -> Result<MetricSet> {
	parse_evaluation_metrics(&read_text(path)?)
}

#[test]
fn test_threshold_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("nested").join("threshold.txt");
	write_threshold(&path, 0.35000000000000003).unwrap();
	assert_eq!(std::fs::read_to_string(&path).unwrap(), "0.350\n");
	assert_eq!(read_threshold(&path).unwrap(), 0.35);
	assert!(matches!(
		parse_threshold("best"),
		Err(Error::Parse { .. })
	));
}

#[test]
fn test_missing_artifact() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("missing.csv");
	assert!(matches!(read_csv(&path), Err(Error::ArtifactNotFound(_))));
}

#[test]
fn test_evaluation_shapes() {
	let wrapped = r#"{"input": "a.csv", "preds": "b.csv", "n_rows": 4, "metrics": {"accuracy": 0.75, "precision": 1.0, "recall": 0.5, "f1": 0.6666666666666666, "roc_auc": 0.875}}"#;
	let metrics = parse_evaluation_metrics(wrapped).unwrap();
	assert_eq!(metrics.roc_auc, Some(0.875));
	let bare = r#"{"accuracy": 0.75, "precision": 1.0, "recall": 0.5, "f1": 0.6666666666666666}"#;
	let metrics = parse_evaluation_metrics(bare).unwrap();
	assert_eq!(metrics.accuracy, 0.75);
	assert_eq!(metrics.roc_auc, None);
	assert!(parse_evaluation_metrics(r#"{"metrics": {"accuracy": 1.0}}"#).is_err());
}

/*!
This module computes the precision recall curve of a predictions file and writes it as csv along with a markdown summary of its average precision.
*/

use crate::{
	align::{load_and_align, Requirements, PROBABILITY_COLUMN_ALIASES},
	error::{Error, Result},
	report::render_pr_summary,
};
use cardio_dataframe::format_number;
use cardio_metrics::{average_precision, compute_precision_recall_curve, PrecisionRecallPoint};
use std::path::Path;

pub struct PrCurve {
	pub points: Vec<PrecisionRecallPoint>,
	pub average_precision: Option<f64>,
}

pub fn pr_curve(input: &Path, preds: &Path) -> Result<PrCurve> {
	let aligned = load_and_align(
		input,
		preds,
		Requirements {
			predictions: false,
			probabilities: true,
		},
	)?;
	let probabilities = aligned
		.probabilities
		.as_ref()
		.ok_or_else(|| Error::missing_columns("predictions", PROBABILITY_COLUMN_ALIASES))?;
	Ok(PrCurve {
		points: compute_precision_recall_curve(probabilities, &aligned.labels),
		average_precision: average_precision(probabilities, &aligned.labels),
	})
}

/// Write the curve as csv with the columns `precision,recall,threshold`. The final point has an empty threshold.
pub fn pr_curve_to_csv(points: &[PrecisionRecallPoint]) -> Result<Vec<u8>> {
	let mut writer = csv::Writer::from_writer(Vec::new());
	writer.write_record(&["precision", "recall", "threshold"])?;
	for point in points {
		writer.write_record(&[
			format_number(point.precision),
			format_number(point.recall),
			point.threshold.map(format_number).unwrap_or_default(),
		])?;
	}
	writer
		.into_inner()
		.map_err(|error| Error::Io(error.into_error()))
}

pub fn run_pr_curve(
	input: &Path,
	preds: &Path,
	output_csv: &Path,
	output_md: &Path,
) -> Result<PrCurve> {
	let curve = pr_curve(input, preds)?;
	let csv = pr_curve_to_csv(&curve.points)?;
	let summary = render_pr_summary(curve.average_precision);
	cardio_util::fs::write_file(output_csv, csv)?;
	log::info!("wrote {} ({} points)", output_csv.display(), curve.points.len());
	cardio_util::fs::write_file(output_md, summary)?;
	log::info!("wrote {}", output_md.display());
	match curve.average_precision {
		Some(average_precision) => log::info!("average precision: {:.4}", average_precision),
		None => log::info!("average precision is undefined because there are no positive labels"),
	}
	Ok(curve)
}

#[test]
fn test_run_pr_curve() {
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join("test.csv");
	let preds = dir.path().join("preds.csv");
	let output_csv = dir.path().join("pr").join("pr_curve_test.csv");
	let output_md = dir.path().join("pr").join("pr_summary.md");
	std::fs::write(&input, "target\n0\n0\n1\n1\n").unwrap();
	std::fs::write(&preds, "prob\n0.1\n0.4\n0.35\n0.8\n").unwrap();
	let curve = run_pr_curve(&input, &preds, &output_csv, &output_md).unwrap();
	assert_eq!(curve.points.len(), 5);
	insta::assert_snapshot!(std::fs::read_to_string(&output_csv).unwrap(), @r###"
 precision,recall,threshold
 0.5,1,0.1
 0.6666666666666666,1,0.35
 0.5,0.5,0.4
 1,0.5,0.8
 1,0,
 "###);
	assert_eq!(
		std::fs::read_to_string(&output_md).unwrap(),
		"# Precision–Recall (PR) summary\n\n- **Average Precision (AP):** `0.8333`\n"
	);
}

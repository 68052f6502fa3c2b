/*!
This module runs a threshold sweep over a predictions file and writes one csv row per threshold.
*/

use crate::{
	align::{load_and_align, Requirements},
	error::{Error, Result},
};
use cardio_dataframe::format_number;
use cardio_metrics::{best_sweep_row, sweep_thresholds, MetricName, SweepRow, ThresholdRange};
use std::path::Path;

/// The columns of a sweep csv, in order.
pub const SWEEP_COLUMNS: [&str; 10] = [
	"threshold",
	"accuracy",
	"precision",
	"recall",
	"f1",
	"roc_auc",
	"tp",
	"fp",
	"tn",
	"fn",
];

/// Render a sweep row's fields in the order of [`SWEEP_COLUMNS`](constant.SWEEP_COLUMNS.html). A missing `roc_auc` is an empty string.
pub fn sweep_row_fields(row: &SweepRow) -> [String; 10] {
	[
		format_number(row.threshold),
		format_number(row.metrics.accuracy),
		format_number(row.metrics.precision),
		format_number(row.metrics.recall),
		format_number(row.metrics.f1),
		row.metrics.roc_auc.map(format_number).unwrap_or_default(),
		row.counts.true_positives.to_string(),
		row.counts.false_positives.to_string(),
		row.counts.true_negatives.to_string(),
		row.counts.false_negatives.to_string(),
	]
}

pub fn write_sweep_csv<W>(rows: &[SweepRow], writer: W) -> Result<()>
where
	W: std::io::Write,
{
	let mut writer = csv::Writer::from_writer(writer);
	writer.write_record(&SWEEP_COLUMNS)?;
	for row in rows {
		writer.write_record(&sweep_row_fields(row))?;
	}
	writer.flush()?;
	Ok(())
}

pub fn sweep_to_csv(rows: &[SweepRow]) -> Result<Vec<u8>> {
	let mut bytes = Vec::new();
	write_sweep_csv(rows, &mut bytes)?;
	Ok(bytes)
}

pub fn sweep(input: &Path, preds: &Path, range: &ThresholdRange) -> Result<Vec<SweepRow>> {
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
		.ok_or_else(|| {
			Error::missing_columns("predictions", crate::align::PROBABILITY_COLUMN_ALIASES)
		})?;
	Ok(sweep_thresholds(&aligned.labels, probabilities, range))
}

pub fn run_sweep(
	input: &Path,
	preds: &Path,
	output: &Path,
	range: &ThresholdRange,
) -> Result<Vec<SweepRow>> {
	let rows = sweep(input, preds, range)?;
	cardio_util::fs::write_file(output, sweep_to_csv(&rows)?)?;
	log::info!("wrote {} ({} thresholds)", output.display(), rows.len());
	log_best_rows(&rows);
	Ok(rows)
}

fn log_best_rows(rows: &[SweepRow]) {
	for metric in [MetricName::F1, MetricName::Recall].iter() {
		if let Some(row) = best_sweep_row(rows, *metric) {
			log::info!(
				"best {}: threshold={:.3} accuracy={:.3} precision={:.3} recall={:.3} f1={:.3}",
				metric,
				row.threshold,
				row.metrics.accuracy,
				row.metrics.precision,
				row.metrics.recall,
				row.metrics.f1,
			);
		}
	}
}

#[test]
fn test_sweep_csv() {
	let labels = [1, 1, 0, 0];
	let probabilities = [0.9, 0.4, 0.4, 0.2];
	let range = ThresholdRange::new(0.3, 0.5, 0.1).unwrap();
	let rows = sweep_thresholds(&labels, &probabilities, &range);
	assert!(rows.iter().all(|row| row.metrics.roc_auc == Some(0.875)));
	assert!(rows.iter().all(|row| row.counts.n_examples() == 4));
	let csv = String::from_utf8(sweep_to_csv(&rows).unwrap()).unwrap();
	insta::assert_snapshot!(csv, @r###"
 threshold,accuracy,precision,recall,f1,roc_auc,tp,fp,tn,fn
 0.3,0.75,0.6666666666666666,1,0.8,0.875,2,1,1,0
 0.4,0.75,0.6666666666666666,1,0.8,0.875,2,1,1,0
 0.5,0.75,1,0.5,0.6666666666666666,0.875,1,0,2,1
 "###);
}

#[test]
fn test_sweep_csv_without_auc() {
	let labels = [1, 1];
	let probabilities = [0.9, 0.4];
	let range = ThresholdRange::new(0.5, 0.5, 0.1).unwrap();
	let rows = sweep_thresholds(&labels, &probabilities, &range);
	let csv = String::from_utf8(sweep_to_csv(&rows).unwrap()).unwrap();
	assert_eq!(csv.lines().nth(1), Some("0.5,0.5,1,0.5,0.6666666666666666,,1,0,0,1"));
}

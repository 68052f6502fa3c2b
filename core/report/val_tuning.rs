use crate::{
	artifact::{format_threshold, read_csv, read_evaluation_metrics, read_threshold},
	error::Result,
	select::best_row_index,
	sweep::{sweep_row_fields, SWEEP_COLUMNS},
};
use cardio_dataframe::{format_number, DataFrame};
use cardio_metrics::{MetricName, MetricSet, SweepRow};
use std::path::Path;

/// The report of how a model's threshold was tuned on val and how the model performed on test at that threshold.
pub struct ValTuningReport<'a> {
	pub model: &'a str,
	pub metric: &'a str,
	pub threshold: f64,
	/// The columns of the best sweep row on val, as `(column, value)` pairs.
	pub best_row: &'a [(String, String)],
	pub test_metrics: &'a MetricSet,
}

impl<'a> std::fmt::Display for ValTuningReport<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		writeln!(f, "# Val-tuned threshold report ({})", self.model)?;
		writeln!(f)?;
		writeln!(f, "**Optimized metric (on val):** `{}`", self.metric)?;
		writeln!(
			f,
			"**Chosen threshold:** `{}`",
			format_threshold(self.threshold)
		)?;
		writeln!(f)?;
		writeln!(f, "## Best row on val")?;
		writeln!(f)?;
		for (column, value) in self.best_row {
			writeln!(f, "- **{}**: {}", column, value)?;
		}
		writeln!(f)?;
		writeln!(f, "## Test metrics at chosen threshold")?;
		writeln!(f)?;
		for metric in MetricName::ALL.iter() {
			if let Some(value) = self.test_metrics.get(*metric) {
				writeln!(f, "- **{}**: {}", metric, format_number(value))?;
			}
		}
		Ok(())
	}
}

/// The fields of a sweep row in csv order, skipping empty values.
pub fn sweep_row_pairs(row: &SweepRow) -> Vec<(String, String)> {
	SWEEP_COLUMNS
		.iter()
		.zip(sweep_row_fields(row).iter())
		.filter(|(_, value)| !value.is_empty())
		.map(|(column, value)| ((*column).to_owned(), value.clone()))
		.collect()
}

/// The sweep columns of the row of `table` with the best value of `metric`, skipping absent columns and empty values.
pub fn best_row_pairs(table: &DataFrame, metric: &str) -> Result<Vec<(String, String)>> {
	let index = best_row_index(table, metric)?;
	Ok(SWEEP_COLUMNS
		.iter()
		.filter_map(|column| table.column(column))
		.map(|column| (column.name().to_owned(), column.text_at(index)))
		.filter(|(_, value)| !value.is_empty())
		.collect())
}

pub fn run_val_report(
	model: &str,
	sweep_csv: &Path,
	metric: &str,
	threshold_file: &Path,
	eval_json: &Path,
	output: &Path,
) -> Result<()> {
	let table = read_csv(sweep_csv)?;
	let best_row = best_row_pairs(&table, metric)?;
	let threshold = read_threshold(threshold_file)?;
	let test_metrics = read_evaluation_metrics(eval_json)?;
	let report = ValTuningReport {
		model,
		metric,
		threshold,
		best_row: &best_row,
		test_metrics: &test_metrics,
	};
	cardio_util::fs::write_file(output, report.to_string())?;
	log::info!("wrote {}", output.display());
	Ok(())
}

#[test]
fn test_render_val_tuning_report() {
	let best_row = vec![
		("threshold".to_owned(), "0.35".to_owned()),
		("precision".to_owned(), "0.85".to_owned()),
		("recall".to_owned(), "0.81".to_owned()),
		("f1".to_owned(), "0.82".to_owned()),
	];
	let test_metrics = MetricSet {
		accuracy: 0.8,
		precision: 0.75,
		recall: 0.857,
		f1: 0.8,
		roc_auc: Some(0.93),
	};
	let report = ValTuningReport {
		model: "baseline_logreg",
		metric: "f1",
		threshold: 0.35,
		best_row: &best_row,
		test_metrics: &test_metrics,
	};
	insta::assert_snapshot!(report.to_string(), @r###"
 # Val-tuned threshold report (baseline_logreg)

 **Optimized metric (on val):** `f1`
 **Chosen threshold:** `0.350`

 ## Best row on val

 - **threshold**: 0.35
 - **precision**: 0.85
 - **recall**: 0.81
 - **f1**: 0.82

 ## Test metrics at chosen threshold

 - **accuracy**: 0.8
 - **precision**: 0.75
 - **recall**: 0.857
 - **f1**: 0.8
 - **roc_auc**: 0.93
 "###);
}

#[test]
fn test_run_val_report() {
	let dir = tempfile::tempdir().unwrap();
	let sweep_csv = dir.path().join("sweep_val.csv");
	let threshold_file = dir.path().join("threshold.txt");
	let eval_json = dir.path().join("eval_test.json");
	let output = dir.path().join("val_tuning.md");
	std::fs::write(
		&sweep_csv,
		"threshold,accuracy,precision,recall,f1,roc_auc,tp,fp,tn,fn\n0.3,0.7,0.6,1,0.75,,3,2,0,0\n0.4,0.8,0.75,1,0.857,,3,1,1,0\n",
	)
	.unwrap();
	std::fs::write(&threshold_file, "0.400\n").unwrap();
	std::fs::write(
		&eval_json,
		r#"{"accuracy": 0.5, "precision": 0.5, "recall": 1.0, "f1": 0.6666666666666666}"#,
	)
	.unwrap();
	run_val_report("rf", &sweep_csv, "f1", &threshold_file, &eval_json, &output).unwrap();
	let markdown = std::fs::read_to_string(&output).unwrap();
	assert!(markdown.contains("**Chosen threshold:** `0.400`"));
	assert!(markdown.contains("- **tp**: 3\n- **fp**: 1\n"));
	assert!(!markdown.contains("roc_auc"));
}

/*!
This module runs the whole evaluation pipeline described by a [`Config`](../config/struct.Config.html). For each model, in order, the threshold is tuned on val, the model is evaluated on test at that threshold, and its reports are written to `<output_dir>/<model>/`. Then the models are compared and the final report is written. The first error stops the run.
*/

use crate::{
	artifact::write_threshold,
	config::{Config, ModelConfig},
	error::{Error, Result},
	evaluate::{evaluate, write_evaluation},
	pr_curve::{pr_curve, pr_curve_to_csv},
	report::{
		parse_comparison, render_comparison, render_final_report, render_pr_summary,
		sweep_row_pairs, ComparisonSummary, ModelReport, Section, ValTuningReport,
	},
	sweep::{sweep, sweep_to_csv},
};
use cardio_metrics::{best_sweep_row, MetricName, ThresholdRange};
use std::path::Path;

pub struct PipelineOutput {
	pub reports: Vec<ModelReport>,
	pub summary: ComparisonSummary,
}

/// The markdown reports of one model, kept for the final report.
struct ModelOutput {
	report: ModelReport,
	val_tuning: String,
	pr_summary: Option<String>,
}

pub fn run(config: &Config) -> Result<PipelineOutput> {
	let metric = config.metric()?;
	let range = config.threshold_range()?;
	let output_dir = config.output_dir.as_path();
	let mut outputs = Vec::with_capacity(config.models.len());
	for model in config.models.iter() {
		log::info!("evaluating model {}", model.name);
		let output = run_model(model, metric, &range, config.pr_curves, output_dir)?;
		outputs.push(output);
	}

	let reports: Vec<ModelReport> = outputs.iter().map(|output| output.report.clone()).collect();
	let comparison = render_comparison(&reports, metric)?;
	let summary = parse_comparison(&comparison)?;
	let details: Vec<Section> = outputs
		.iter()
		.map(|output| Section {
			model: output.report.name.clone(),
			markdown: output.val_tuning.clone(),
		})
		.collect();
	let pr_summaries: Vec<Section> = outputs
		.iter()
		.filter_map(|output| {
			output.pr_summary.as_ref().map(|markdown| Section {
				model: output.report.name.clone(),
				markdown: markdown.clone(),
			})
		})
		.collect();
	let final_report = render_final_report(&comparison, &details, &pr_summaries)?;

	let comparison_path = output_dir.join("compare_models.md");
	cardio_util::fs::write_file(&comparison_path, comparison)?;
	log::info!("wrote {}", comparison_path.display());
	let final_report_path = output_dir.join("final_report.md");
	cardio_util::fs::write_file(&final_report_path, final_report)?;
	log::info!("wrote {}", final_report_path.display());
	log::info!("winner by {}: {}", summary.metric, summary.winner);
	Ok(PipelineOutput { reports, summary })
}

fn run_model(
	model: &ModelConfig,
	metric: MetricName,
	range: &ThresholdRange,
	pr_curves: bool,
	output_dir: &Path,
) -> Result<ModelOutput> {
	let model_dir = output_dir.join(&model.name);

	// Compute everything first so a failure leaves no partial outputs for this model.
	let rows = sweep(&model.val_input, &model.val_preds, range)?;
	let best_row = best_sweep_row(&rows, metric)
		.ok_or_else(|| Error::EmptyInput("the threshold sweep".to_owned()))?;
	let threshold = best_row.threshold;
	let evaluation = evaluate(&model.test_input, &model.test_preds, Some(threshold))?;
	let best_row_pairs = sweep_row_pairs(best_row);
	let val_tuning = ValTuningReport {
		model: &model.name,
		metric: metric.as_str(),
		threshold,
		best_row: &best_row_pairs,
		test_metrics: &evaluation.metrics,
	}
	.to_string();
	let pr = if pr_curves {
		let curve = pr_curve(&model.test_input, &model.test_preds)?;
		Some((
			pr_curve_to_csv(&curve.points)?,
			render_pr_summary(curve.average_precision),
		))
	} else {
		None
	};
	let sweep_csv = sweep_to_csv(&rows)?;

	let sweep_path = model_dir.join("sweep_val.csv");
	cardio_util::fs::write_file(&sweep_path, sweep_csv)?;
	log::info!("wrote {} ({} thresholds)", sweep_path.display(), rows.len());
	let threshold_path = model_dir.join("threshold.txt");
	write_threshold(&threshold_path, threshold)?;
	log::info!("wrote {}", threshold_path.display());
	write_evaluation(&model_dir.join("eval_test.json"), &evaluation)?;
	let val_tuning_path = model_dir.join("val_tuning.md");
	cardio_util::fs::write_file(&val_tuning_path, &val_tuning)?;
	log::info!("wrote {}", val_tuning_path.display());
	let pr_summary = match pr {
		Some((csv, summary)) => {
			let csv_path = model_dir.join("pr_curve_test.csv");
			cardio_util::fs::write_file(&csv_path, csv)?;
			log::info!("wrote {}", csv_path.display());
			let summary_path = model_dir.join("pr_summary.md");
			cardio_util::fs::write_file(&summary_path, &summary)?;
			log::info!("wrote {}", summary_path.display());
			Some(summary)
		}
		None => None,
	};
	log::info!(
		"{}: threshold {:.3}, test {} {}",
		model.name,
		threshold,
		metric,
		crate::report::format_metric(evaluation.metrics.get(metric))
	);

	Ok(ModelOutput {
		report: ModelReport {
			name: model.name.clone(),
			threshold,
			metrics: evaluation.metrics,
		},
		val_tuning,
		pr_summary,
	})
}

#[cfg(test)]
fn write_model_files(
	dir: &Path,
	name: &str,
	val_probabilities: &[f64],
	test_probabilities: &[f64],
) {
	let labels = [0, 0, 1, 1, 0, 1];
	let write_preds = |path: &Path, probabilities: &[f64]| {
		let mut csv = "row_id,proba_disease\n".to_owned();
		for (index, probability) in probabilities.iter().enumerate() {
			csv.push_str(&format!("{},{}\n", index, probability));
		}
		std::fs::write(path, csv).unwrap();
	};
	let mut truth = "age,target\n".to_owned();
	for (index, label) in labels.iter().enumerate() {
		truth.push_str(&format!("{},{}\n", 50 + index, label));
	}
	std::fs::write(dir.join("val.csv"), &truth).unwrap();
	std::fs::write(dir.join("test.csv"), &truth).unwrap();
	write_preds(&dir.join(format!("{}_val.csv", name)), val_probabilities);
	write_preds(&dir.join(format!("{}_test.csv", name)), test_probabilities);
}

#[test]
fn test_run() {
	let dir = tempfile::tempdir().unwrap();
	// Perfectly separable at 0.5 on both val and test.
	write_model_files(
		dir.path(),
		"good",
		&[0.1, 0.3, 0.7, 0.9, 0.2, 0.6],
		&[0.2, 0.1, 0.8, 0.9, 0.25, 0.7],
	);
	write_model_files(
		dir.path(),
		"weak",
		&[0.6, 0.3, 0.4, 0.9, 0.2, 0.1],
		&[0.7, 0.1, 0.3, 0.9, 0.4, 0.2],
	);
	let yaml = format!(
		r#"
metric: f1
sweep:
  t_min: 0.1
  t_max: 0.9
  t_step: 0.1
output_dir: {dir}/reports
pr_curves: true
models:
  - name: good
    val_input: {dir}/val.csv
    val_preds: {dir}/good_val.csv
    test_input: {dir}/test.csv
    test_preds: {dir}/good_test.csv
  - name: weak
    val_input: {dir}/val.csv
    val_preds: {dir}/weak_val.csv
    test_input: {dir}/test.csv
    test_preds: {dir}/weak_test.csv
"#,
		dir = dir.path().display()
	);
	let config = Config::from_yaml(&yaml).unwrap();
	let output = run(&config).unwrap();
	assert_eq!(output.summary.winner, "good");
	assert_eq!(output.reports[0].metrics.f1, 1.0);
	let reports = dir.path().join("reports");
	for name in &[
		"good/sweep_val.csv",
		"good/threshold.txt",
		"good/eval_test.json",
		"good/val_tuning.md",
		"good/pr_curve_test.csv",
		"good/pr_summary.md",
		"weak/threshold.txt",
		"compare_models.md",
		"final_report.md",
	] {
		assert!(reports.join(name).exists(), "{} was not written", name);
	}
	let final_report = std::fs::read_to_string(reports.join("final_report.md")).unwrap();
	assert!(final_report.contains("## weak val-tuning report"));
	assert!(final_report.contains("### good PR summary"));
}

#[test]
fn test_fail_fast() {
	let dir = tempfile::tempdir().unwrap();
	write_model_files(dir.path(), "good", &[0.1, 0.3, 0.7, 0.9, 0.2, 0.6], &[0.2; 6]);
	let yaml = format!(
		r#"
output_dir: {dir}/reports
models:
  - name: missing
    val_input: {dir}/val.csv
    val_preds: {dir}/missing_val.csv
    test_input: {dir}/test.csv
    test_preds: {dir}/missing_test.csv
  - name: good
    val_input: {dir}/val.csv
    val_preds: {dir}/good_val.csv
    test_input: {dir}/test.csv
    test_preds: {dir}/good_test.csv
"#,
		dir = dir.path().display()
	);
	let config = Config::from_yaml(&yaml).unwrap();
	assert!(matches!(run(&config), Err(Error::ArtifactNotFound(_))));
	assert!(!dir.path().join("reports").join("good").exists());
	assert!(!dir.path().join("reports").join("compare_models.md").exists());
}

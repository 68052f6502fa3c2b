use super::format_metric;
use crate::{
	artifact::{format_threshold, read_evaluation_metrics, read_threshold},
	error::{Error, Result},
};
use cardio_metrics::{MetricName, MetricSet};
use cardio_util::{
	finite::cmp_missing_lowest,
	table::{Align, Table, TableColumn},
};
use std::{
	cmp::Ordering,
	path::{Path, PathBuf},
};

pub const COMPARISON_TITLE: &str = "# Model comparison (val-tuned thresholds)";
pub const OPTIMIZED_METRIC_PREFIX: &str = "**Optimized metric (picked on val):** `";
pub const WINNER_PREFIX: &str = "**Winner (by `";
pub const WINNER_INFIX: &str = "` on test):** `";

/// A model's test metrics at the threshold tuned for it on val.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelReport {
	pub name: String,
	pub threshold: f64,
	pub metrics: MetricSet,
}

/**
Pick the model with the highest value of `metric`. Ties are broken by `roc_auc` and then by `accuracy`, missing values rank below every present value, and a complete tie keeps the earliest model.
*/
pub fn pick_winner(reports: &[ModelReport], metric: MetricName) -> Option<&ModelReport> {
	let key = |report: &ModelReport| {
		[
			report.metrics.get(metric),
			report.metrics.roc_auc,
			Some(report.metrics.accuracy),
		]
	};
	let mut winner: Option<&ModelReport> = None;
	for report in reports {
		let is_better = match winner {
			None => true,
			Some(winner) => {
				let ordering = key(report)
					.iter()
					.zip(key(winner).iter())
					.map(|(a, b)| cmp_missing_lowest(*a, *b))
					.find(|ordering| *ordering != Ordering::Equal)
					.unwrap_or(Ordering::Equal);
				ordering == Ordering::Greater
			}
		};
		if is_better {
			winner = Some(report);
		}
	}
	winner
}

/**
Check that `name` can be written into the comparison markers and table and used as a directory name under the output directory. Names must be non-empty, must not be `.` or `..`, must not start or end with whitespace, and must not contain backticks, pipes, path separators or control characters.
*/
pub fn validate_model_name(name: &str) -> Result<()> {
	let invalid = name.is_empty()
		|| name == "."
		|| name == ".."
		|| name.trim() != name
		|| name.contains(|c: char| {
			c == '`' || c == '|' || c == '/' || c == '\\' || c.is_control()
		});
	if invalid {
		return Err(Error::InvalidConfig(format!("invalid model name {:?}", name)));
	}
	Ok(())
}

pub fn optimized_metric_line(metric: &str) -> String {
	format!("{}{}`", OPTIMIZED_METRIC_PREFIX, metric)
}

pub fn winner_line(metric: &str, winner: &str) -> String {
	format!("{}{}{}{}`", WINNER_PREFIX, metric, WINNER_INFIX, winner)
}

pub struct Comparison<'a> {
	reports: &'a [ModelReport],
	metric: MetricName,
	winner: &'a ModelReport,
}

impl<'a> Comparison<'a> {
	pub fn new(reports: &'a [ModelReport], metric: MetricName) -> Result<Self> {
		for report in reports {
			validate_model_name(&report.name)?;
		}
		let winner = pick_winner(reports, metric)
			.ok_or_else(|| Error::EmptyInput("the list of model reports".to_owned()))?;
		Ok(Self {
			reports,
			metric,
			winner,
		})
	}

	pub fn winner(&self) -> &'a ModelReport {
		self.winner
	}
}

impl<'a> std::fmt::Display for Comparison<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let metric = self.metric.as_str();
		writeln!(f, "{}", COMPARISON_TITLE)?;
		writeln!(f)?;
		writeln!(f, "{}", optimized_metric_line(metric))?;
		writeln!(f, "{}", winner_line(metric, &self.winner.name))?;
		writeln!(f)?;
		writeln!(f, "## Test metrics at each model's val-tuned threshold")?;
		writeln!(f)?;
		let mut columns = vec![
			TableColumn {
				header: "Model",
				align: Align::Left,
			},
			TableColumn {
				header: "Threshold",
				align: Align::Right,
			},
		];
		columns.extend(MetricName::ALL.iter().map(|metric| TableColumn {
			header: metric.as_str(),
			align: Align::Center,
		}));
		let mut table = Table::new(&columns);
		for report in self.reports {
			let mut row = vec![
				report.name.clone(),
				format!("`{}`", format_threshold(report.threshold)),
			];
			row.extend(
				MetricName::ALL
					.iter()
					.map(|metric| format_metric(report.metrics.get(*metric))),
			);
			table.push_row(row);
		}
		write!(f, "{}", table)?;
		writeln!(f)?;
		writeln!(f, "### Notes")?;
		writeln!(
			f,
			"- Thresholds are tuned on **val**; this table reports metrics on **test**."
		)?;
		writeln!(
			f,
			"- Different models can prefer very different thresholds; this shifts the precision/recall tradeoff."
		)?;
		Ok(())
	}
}

/// Render the comparison of `reports`, which must not be empty.
pub fn render_comparison(reports: &[ModelReport], metric: MetricName) -> Result<String> {
	Ok(Comparison::new(reports, metric)?.to_string())
}

/// The files a model's comparison row is read from.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelArtifacts {
	pub name: String,
	pub eval_json: PathBuf,
	pub threshold_file: PathBuf,
}

pub fn read_model_report(artifacts: &ModelArtifacts) -> Result<ModelReport> {
	Ok(ModelReport {
		name: artifacts.name.clone(),
		threshold: read_threshold(&artifacts.threshold_file)?,
		metrics: read_evaluation_metrics(&artifacts.eval_json)?,
	})
}

/// Compare the models and write the comparison report. Returns the winner's name.
pub fn run_compare(models: &[ModelArtifacts], metric: MetricName, output: &Path) -> Result<String> {
	let reports = models
		.iter()
		.map(read_model_report)
		.collect::<Result<Vec<_>>>()?;
	let comparison = Comparison::new(&reports, metric)?;
	let winner = comparison.winner().name.clone();
	cardio_util::fs::write_file(output, comparison.to_string())?;
	log::info!("wrote {}", output.display());
	Ok(winner)
}

#[cfg(test)]
fn report(name: &str, threshold: f64, f1: f64, roc_auc: Option<f64>, accuracy: f64) -> ModelReport {
	ModelReport {
		name: name.to_owned(),
		threshold,
		metrics: MetricSet {
			accuracy,
			precision: 0.8,
			recall: 0.9,
			f1,
			roc_auc,
		},
	}
}

#[test]
fn test_render_comparison() {
	let reports = vec![
		report("baseline_logreg", 0.35, 0.81, Some(0.9), 0.8),
		report("rf_default", 0.2, 0.75, None, 0.77),
		report("rf_tuned", 0.45, 0.87, Some(0.93), 0.85),
	];
	let markdown = render_comparison(&reports, MetricName::F1).unwrap();
	insta::assert_snapshot!(markdown, @r###"
 # Model comparison (val-tuned thresholds)

 **Optimized metric (picked on val):** `f1`
 **Winner (by `f1` on test):** `rf_tuned`

 ## Test metrics at each model's val-tuned threshold

 | Model           | Threshold | accuracy | precision | recall | f1    | roc_auc |
 |-----------------|----------:|:--------:|:---------:|:------:|:-----:|:-------:|
 | baseline_logreg |   `0.350` | 0.800    | 0.800     | 0.900  | 0.810 | 0.900   |
 | rf_default      |   `0.200` | 0.770    | 0.800     | 0.900  | 0.750 | n/a     |
 | rf_tuned        |   `0.450` | 0.850    | 0.800     | 0.900  | 0.870 | 0.930   |

 ### Notes
 - Thresholds are tuned on **val**; this table reports metrics on **test**.
 - Different models can prefer very different thresholds; this shifts the precision/recall tradeoff.
 "###);
}

#[test]
fn test_winner_tie_breaks() {
	let reports = vec![
		report("a", 0.5, 0.8, None, 0.9),
		report("b", 0.5, 0.8, Some(0.7), 0.6),
		report("c", 0.5, 0.8, Some(0.7), 0.7),
		report("d", 0.5, 0.8, Some(0.7), 0.7),
	];
	assert_eq!(pick_winner(&reports, MetricName::F1).unwrap().name, "c");
	let reports = vec![report("a", 0.5, 0.8, None, 0.9)];
	assert_eq!(pick_winner(&reports, MetricName::RocAuc).unwrap().name, "a");
	assert!(matches!(
		render_comparison(&[], MetricName::F1),
		Err(Error::EmptyInput(_))
	));
}

#[test]
fn test_run_compare() {
	let dir = tempfile::tempdir().unwrap();
	let mut models = Vec::new();
	let models_data = [
		("baseline_logreg", "0.350", 0.81),
		("rf_default", "0.500", 0.75),
		("rf_tuned", "0.200", 0.87),
	];
	for (name, threshold, f1) in models_data.iter() {
		let eval_json = dir.path().join(format!("{}_eval.json", name));
		let threshold_file = dir.path().join(format!("{}_threshold.txt", name));
		std::fs::write(
			&eval_json,
			format!(
				r#"{{"metrics": {{"accuracy": 0.8, "precision": 0.8, "recall": 0.8, "f1": {}}}}}"#,
				f1
			),
		)
		.unwrap();
		std::fs::write(&threshold_file, format!("{}\n", threshold)).unwrap();
		models.push(ModelArtifacts {
			name: (*name).to_owned(),
			eval_json,
			threshold_file,
		});
	}
	let output = dir.path().join("compare_models.md");
	let winner = run_compare(&models, MetricName::F1, &output).unwrap();
	assert_eq!(winner, "rf_tuned");
	let markdown = std::fs::read_to_string(&output).unwrap();
	assert!(markdown.contains("| rf_tuned        |   `0.200` |"));
	models[1].eval_json = dir.path().join("missing.json");
	assert!(matches!(
		run_compare(&models, MetricName::F1, &output),
		Err(Error::ArtifactNotFound(_))
	));
}

#[test]
fn test_model_names() {
	for name in &["baseline_logreg", "rf v2", "gbm-0.3"] {
		assert!(validate_model_name(name).is_ok(), "{}", name);
	}
	for name in &["", ".", "..", "a`b", "a|b", "a/b", "a\\b", "a\nb", " rf"] {
		assert!(
			matches!(validate_model_name(name), Err(Error::InvalidConfig(_))),
			"{:?}",
			name
		);
	}
	// A backtick would make the winner line unparseable, so the comparison is never rendered.
	let reports = vec![report("rf`x", 0.5, 0.8, Some(0.9), 0.8)];
	assert!(matches!(
		render_comparison(&reports, MetricName::F1),
		Err(Error::InvalidConfig(_))
	));
}

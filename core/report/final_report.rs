use super::{
	optimized_metric_line, strip_titles, winner_line, OPTIMIZED_METRIC_PREFIX, WINNER_INFIX,
	WINNER_PREFIX,
};
use crate::{
	artifact::read_text,
	error::{Error, Result},
};
use std::path::{Path, PathBuf};

/// The optimized metric and the winning model, as stated by a comparison report.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonSummary {
	pub metric: String,
	pub winner: String,
}

/// A report to embed in the final report under the model's name.
pub struct Section {
	pub model: String,
	pub markdown: String,
}

/**
Parse the optimized metric and the winner from a comparison report. The report must contain exactly one line of each of the shapes

```text
**Optimized metric (picked on val):** `f1`
**Winner (by `f1` on test):** `baseline_logreg`
```

and both lines must name the same metric.
*/
pub fn parse_comparison(markdown: &str) -> Result<ComparisonSummary> {
	let mut metric: Option<&str> = None;
	let mut winner: Option<(&str, &str)> = None;
	for line in markdown.lines().map(|line| line.trim_end()) {
		if let Some(value) = parse_optimized_metric_line(line) {
			if metric.replace(value).is_some() {
				return Err(Error::parse(
					"comparison report",
					"found more than one optimized metric line",
				));
			}
		} else if let Some(value) = parse_winner_line(line) {
			if winner.replace(value).is_some() {
				return Err(Error::parse(
					"comparison report",
					"found more than one winner line",
				));
			}
		}
	}
	let metric = metric.ok_or_else(|| {
		Error::parse(
			"comparison report",
			format!("missing a line starting with {:?}", OPTIMIZED_METRIC_PREFIX),
		)
	})?;
	let (winner_metric, winner) = winner.ok_or_else(|| {
		Error::parse(
			"comparison report",
			format!("missing a line starting with {:?}", WINNER_PREFIX),
		)
	})?;
	if winner_metric != metric {
		return Err(Error::parse(
			"comparison report",
			format!(
				"the optimized metric is {:?} but the winner was picked by {:?}",
				metric, winner_metric
			),
		));
	}
	Ok(ComparisonSummary {
		metric: metric.to_owned(),
		winner: winner.to_owned(),
	})
}

fn parse_optimized_metric_line(line: &str) -> Option<&str> {
	let value = line
		.strip_prefix(OPTIMIZED_METRIC_PREFIX)?
		.strip_suffix('`')?;
	if value.is_empty() || value.contains('`') {
		None
	} else {
		Some(value)
	}
}

fn parse_winner_line(line: &str) -> Option<(&str, &str)> {
	let rest = line.strip_prefix(WINNER_PREFIX)?.strip_suffix('`')?;
	let (metric, winner) = rest.split_once(WINNER_INFIX)?;
	if metric.is_empty() || winner.is_empty() || metric.contains('`') || winner.contains('`') {
		None
	} else {
		Some((metric, winner))
	}
}

pub struct FinalReport<'a> {
	pub summary: &'a ComparisonSummary,
	pub comparison: &'a str,
	pub details: &'a [Section],
	pub pr_summaries: &'a [Section],
}

impl<'a> std::fmt::Display for FinalReport<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		writeln!(f, "# Final report")?;
		writeln!(f)?;
		writeln!(
			f,
			"This report summarizes the models compared on test at thresholds tuned on val."
		)?;
		writeln!(f)?;
		writeln!(f, "{}", optimized_metric_line(&self.summary.metric))?;
		writeln!(
			f,
			"{}",
			winner_line(&self.summary.metric, &self.summary.winner)
		)?;
		writeln!(f)?;
		writeln!(f, "## Model comparison report")?;
		writeln!(f)?;
		writeln!(f, "{}", strip_comparison(self.comparison))?;
		for section in self.details {
			writeln!(f)?;
			writeln!(f, "## {} val-tuning report", section.model)?;
			writeln!(f)?;
			writeln!(f, "{}", strip_titles(&section.markdown))?;
		}
		if !self.pr_summaries.is_empty() {
			writeln!(f)?;
			writeln!(f, "## Precision–Recall (PR) summaries")?;
			for section in self.pr_summaries {
				writeln!(f)?;
				writeln!(f, "### {} PR summary", section.model)?;
				writeln!(f)?;
				writeln!(f, "{}", strip_titles(&section.markdown))?;
			}
		}
		Ok(())
	}
}

/// Strip the titles from an embedded comparison report along with its metric and winner lines, which the final report states once at the top.
fn strip_comparison(markdown: &str) -> String {
	let lines: Vec<&str> = markdown
		.lines()
		.filter(|line| {
			let line = line.trim_end();
			parse_optimized_metric_line(line).is_none() && parse_winner_line(line).is_none()
		})
		.collect();
	strip_titles(&lines.join("\n"))
}

/// Render the final report. The comparison report must state its metric and winner.
pub fn render_final_report(
	comparison: &str,
	details: &[Section],
	pr_summaries: &[Section],
) -> Result<String> {
	let summary = parse_comparison(comparison)?;
	let report = FinalReport {
		summary: &summary,
		comparison,
		details,
		pr_summaries,
	};
	Ok(report.to_string())
}

/// Read each `(model, path)` pair into a section.
pub fn read_sections(paths: &[(String, PathBuf)]) -> Result<Vec<Section>> {
	paths
		.iter()
		.map(|(model, path)| {
			Ok(Section {
				model: model.clone(),
				markdown: read_text(path)?,
			})
		})
		.collect()
}

pub fn run_final_report(
	comparison: &Path,
	details: &[(String, PathBuf)],
	pr_summaries: &[(String, PathBuf)],
	output: &Path,
) -> Result<ComparisonSummary> {
	let comparison = read_text(comparison)?;
	let details = read_sections(details)?;
	let pr_summaries = read_sections(pr_summaries)?;
	let summary = parse_comparison(&comparison)?;
	let markdown = render_final_report(&comparison, &details, &pr_summaries)?;
	cardio_util::fs::write_file(output, markdown)?;
	log::info!("wrote {}", output.display());
	Ok(summary)
}

#[test]
fn test_parse_comparison() {
	let markdown = "# Model comparison (val-tuned thresholds)\n\n**Optimized metric (picked on val):** `f1`\n**Winner (by `f1` on test):** `baseline_logreg`\n";
	assert_eq!(
		parse_comparison(markdown).unwrap(),
		ComparisonSummary {
			metric: "f1".to_owned(),
			winner: "baseline_logreg".to_owned(),
		}
	);
}

#[test]
fn test_parse_comparison_errors() {
	assert!(matches!(
		parse_comparison("# Model comparison\n\nno markers here\n"),
		Err(Error::Parse { .. })
	));
	let no_winner = "**Optimized metric (picked on val):** `f1`\n";
	assert!(matches!(
		parse_comparison(no_winner),
		Err(Error::Parse { .. })
	));
	let mismatch = "**Optimized metric (picked on val):** `f1`\n**Winner (by `recall` on test):** `rf`\n";
	assert!(matches!(
		parse_comparison(mismatch),
		Err(Error::Parse { .. })
	));
}

#[test]
fn test_render_final_report() {
	use super::{render_comparison, render_pr_summary, ModelReport};
	use cardio_metrics::{MetricName, MetricSet};
	let reports = vec![ModelReport {
		name: "baseline_logreg".to_owned(),
		threshold: 0.35,
		metrics: MetricSet {
			accuracy: 0.8,
			precision: 0.75,
			recall: 0.9,
			f1: 0.818,
			roc_auc: Some(0.9),
		},
	}];
	let comparison = render_comparison(&reports, MetricName::F1).unwrap();
	let details = vec![Section {
		model: "baseline_logreg".to_owned(),
		markdown: "# Val-tuned threshold report (baseline_logreg)\n\n**Chosen threshold:** `0.350`\n".to_owned(),
	}];
	let pr_summaries = vec![Section {
		model: "baseline_logreg".to_owned(),
		markdown: render_pr_summary(Some(0.9)),
	}];
	let markdown = render_final_report(&comparison, &details, &pr_summaries).unwrap();
	insta::assert_snapshot!(markdown, @r###"
 # Final report

 This report summarizes the models compared on test at thresholds tuned on val.

 **Optimized metric (picked on val):** `f1`
 **Winner (by `f1` on test):** `baseline_logreg`

 ## Model comparison report

 ## Test metrics at each model's val-tuned threshold

 | Model           | Threshold | accuracy | precision | recall | f1    | roc_auc |
 |-----------------|----------:|:--------:|:---------:|:------:|:-----:|:-------:|
 | baseline_logreg |   `0.350` | 0.800    | 0.750     | 0.900  | 0.818 | 0.900   |

 ### Notes
 - Thresholds are tuned on **val**; this table reports metrics on **test**.
 - Different models can prefer very different thresholds; this shifts the precision/recall tradeoff.

 ## baseline_logreg val-tuning report

 **Chosen threshold:** `0.350`

 ## Precision–Recall (PR) summaries

 ### baseline_logreg PR summary

 - **Average Precision (AP):** `0.9000`
 "###);
	// The final report states the metric and winner exactly once, so it parses like a comparison.
	assert_eq!(
		parse_comparison(&markdown).unwrap().winner,
		"baseline_logreg"
	);
}

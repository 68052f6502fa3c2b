/*!
This module renders the markdown reports: the model comparison, the per model validation tuning report, the precision recall summary, and the final report that aggregates them.
*/

mod comparison;
mod final_report;
mod pr_summary;
mod val_tuning;

pub use self::comparison::*;
pub use self::final_report::*;
pub use self::pr_summary::*;
pub use self::val_tuning::*;

/// Format an optional metric with 3 decimals, or `n/a` when it is missing.
pub fn format_metric(value: Option<f64>) -> String {
	match value {
		Some(value) if value.is_finite() => format!("{:.3}", value),
		_ => "n/a".to_owned(),
	}
}

/// Remove every line that starts with `# `, so a report can be embedded below another report's title.
pub fn strip_titles(markdown: &str) -> String {
	let mut stripped = String::with_capacity(markdown.len());
	for line in markdown.lines() {
		if line.starts_with("# ") {
			continue;
		}
		stripped.push_str(line);
		stripped.push('\n');
	}
	stripped.trim().to_owned()
}

#[test]
fn test_strip_titles() {
	let markdown = "# Title\n\n## Section\n\n#hashtag\n- item\n";
	assert_eq!(strip_titles(markdown), "## Section\n\n#hashtag\n- item");
	assert_eq!(format_metric(Some(0.86666)), "0.867");
	assert_eq!(format_metric(None), "n/a");
}

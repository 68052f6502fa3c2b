pub const PR_SUMMARY_TITLE: &str = "# Precision–Recall (PR) summary";

/// Render the summary of a precision recall curve. The average precision is shown with 4 decimals, or `n/a` when there were no positive labels.
pub fn render_pr_summary(average_precision: Option<f64>) -> String {
	let average_precision = match average_precision {
		Some(value) if value.is_finite() => format!("{:.4}", value),
		_ => "n/a".to_owned(),
	};
	format!(
		"{}\n\n- **Average Precision (AP):** `{}`\n",
		PR_SUMMARY_TITLE, average_precision
	)
}

#[test]
fn test_render_pr_summary() {
	insta::assert_snapshot!(render_pr_summary(Some(0.91234)), @r###"
 # Precision–Recall (PR) summary

 - **Average Precision (AP):** `0.9123`
 "###);
	assert!(render_pr_summary(None).ends_with("`n/a`\n"));
}

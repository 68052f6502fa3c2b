/*!
This module picks the best threshold from a sweep table.
*/

use crate::{
	align::invalid_value,
	error::{Error, Result},
};
use cardio_dataframe::{Column, DataFrame};
use cardio_metrics::best_index;
use std::path::Path;

/// Find the index of the row with the highest value of `metric`, breaking ties toward the lowest threshold. Empty metric cells rank below every value.
pub fn best_row_index(table: &DataFrame, metric: &str) -> Result<usize> {
	let missing: Vec<&str> = ["threshold", metric]
		.iter()
		.copied()
		.filter(|column| !table.has_column(column))
		.collect();
	if !missing.is_empty() {
		return Err(Error::missing_columns("sweep table", &missing));
	}
	if table.nrows() == 0 {
		return Err(Error::EmptyInput("the sweep table".to_owned()));
	}
	let thresholds = read_numbers(column(table, "threshold")?)?;
	let scores = read_numbers(column(table, metric)?)?;
	let candidates = thresholds
		.into_iter()
		.zip(scores)
		.map(|(threshold, score)| (threshold, Some(score)));
	best_index(candidates).ok_or_else(|| Error::EmptyInput("the sweep table".to_owned()))
}

pub fn pick_best_threshold(table: &DataFrame, metric: &str) -> Result<f64> {
	let index = best_row_index(table, metric)?;
	let column = column(table, "threshold")?;
	match column.number_at(index) {
		Some(threshold) if threshold.is_finite() => Ok(threshold),
		_ => Err(invalid_value(column, index, "expected a threshold")),
	}
}

fn column<'a>(table: &'a DataFrame, name: &str) -> Result<&'a Column> {
	table
		.column(name)
		.ok_or_else(|| Error::missing_columns("sweep table", &[name]))
}

/// Read a column as numbers. Empty cells are NaN.
fn read_numbers(column: &Column) -> Result<Vec<f64>> {
	match column {
		Column::Text(text) => {
			let row = text
				.data
				.iter()
				.position(|value| value.parse::<f64>().is_err())
				.unwrap_or(0);
			Err(invalid_value(column, row, "expected a number"))
		}
		_ => Ok((0..column.len())
			.filter_map(|index| column.number_at(index))
			.collect()),
	}
}

pub fn run_pick_threshold(sweep_csv: &Path, metric: &str, output: Option<&Path>) -> Result<f64> {
	let table = crate::artifact::read_csv(sweep_csv)?;
	let threshold = pick_best_threshold(&table, metric)?;
	if let Some(output) = output {
		crate::artifact::write_threshold(output, threshold)?;
		log::info!("wrote {}", output.display());
	}
	Ok(threshold)
}

#[cfg(test)]
fn frame(csv: &str) -> DataFrame {
	DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		cardio_dataframe::FromCsvOptions::default(),
	)
	.unwrap()
}

#[test]
fn test_tie_prefers_lower_threshold() {
	let table = frame("threshold,f1\n0.40,0.82\n0.30,0.80\n0.35,0.82\n");
	assert_eq!(pick_best_threshold(&table, "f1").unwrap(), 0.35);
	assert_eq!(best_row_index(&table, "f1").unwrap(), 2);
}

#[test]
fn test_missing_values_rank_last() {
	let table = frame("threshold,roc_auc,recall\n0.1,,0.2\n0.2,,0.9\n");
	assert_eq!(pick_best_threshold(&table, "roc_auc").unwrap(), 0.1);
	let table = frame("threshold,precision\n0.1,\n0.2,0.0\n");
	assert_eq!(pick_best_threshold(&table, "precision").unwrap(), 0.2);
}

#[test]
fn test_errors() {
	let table = frame("threshold,f1\n0.1,0.5\n");
	assert!(matches!(
		pick_best_threshold(&table, "recall"),
		Err(Error::MissingColumn { .. })
	));
	let empty = frame("threshold,f1\n");
	assert!(matches!(
		pick_best_threshold(&empty, "f1"),
		Err(Error::EmptyInput(_))
	));
	let text = frame("threshold,f1\n0.1,high\n");
	assert!(matches!(
		pick_best_threshold(&text, "f1"),
		Err(Error::InvalidValue { .. })
	));
}

#[test]
fn test_run_pick_threshold() {
	let dir = tempfile::tempdir().unwrap();
	let sweep_csv = dir.path().join("sweep_val.csv");
	let output = dir.path().join("threshold.txt");
	std::fs::write(&sweep_csv, "threshold,f1,recall\n0.3,0.8,0.9\n0.35,0.82,0.8\n").unwrap();
	let threshold = run_pick_threshold(&sweep_csv, "f1", Some(&output)).unwrap();
	assert_eq!(threshold, 0.35);
	assert_eq!(std::fs::read_to_string(&output).unwrap(), "0.350\n");
}

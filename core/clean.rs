/*!
This module cleans a raw dataset: the `target` column is coerced to a binary label and missing values in every other number column are replaced by the column's median.
*/

use crate::{
	align::TARGET_COLUMN,
	error::{Error, Result},
};
use cardio_dataframe::{Column, DataFrame};
use cardio_metrics::{Median, Metric};
use std::path::Path;

#[derive(Clone, Debug, PartialEq)]
pub struct CleanSummary {
	pub n_rows: usize,
	pub n_positives: usize,
	/// The number of missing values replaced in each imputed column.
	pub n_imputed: Vec<(String, usize)>,
}

pub fn clean(mut dataframe: DataFrame) -> Result<(DataFrame, CleanSummary)> {
	let n_positives = binarize_target(&mut dataframe)?;
	let mut n_imputed = Vec::new();
	for column in dataframe.columns.iter_mut() {
		if column.name() == TARGET_COLUMN {
			continue;
		}
		let column = match column {
			Column::Number(column) => column,
			_ => continue,
		};
		let n_missing = column.data.iter().filter(|value| value.is_nan()).count();
		if n_missing == 0 {
			continue;
		}
		// A column with no valid values has no median and is left as is.
		let median = match Median::compute(&column.data) {
			Some(median) => median,
			None => continue,
		};
		for value in column.data.iter_mut().filter(|value| value.is_nan()) {
			*value = median;
		}
		n_imputed.push((column.name.clone(), n_missing));
	}
	let summary = CleanSummary {
		n_rows: dataframe.nrows(),
		n_positives,
		n_imputed,
	};
	Ok((dataframe, summary))
}

/// Replace every target value with 1 if it is greater than 0 and 0 otherwise. Returns the number of positives.
fn binarize_target(dataframe: &mut DataFrame) -> Result<usize> {
	let column = dataframe
		.column_mut(TARGET_COLUMN)
		.ok_or_else(|| Error::missing_columns("input", &[TARGET_COLUMN]))?;
	let message = "expected a numeric target";
	let data = match column {
		Column::Number(number) => &mut number.data,
		Column::Text(text) => {
			let row = text
				.data
				.iter()
				.position(|value| value.parse::<f64>().is_err())
				.unwrap_or(0);
			return Err(Error::InvalidValue {
				column: text.name.clone(),
				row,
				value: text.data.get(row).cloned().unwrap_or_default(),
				message: message.to_owned(),
			});
		}
		Column::Unknown(unknown) => {
			if unknown.len == 0 {
				return Ok(0);
			}
			return Err(Error::InvalidValue {
				column: unknown.name.clone(),
				row: 0,
				value: String::new(),
				message: message.to_owned(),
			});
		}
	};
	if let Some(row) = data.iter().position(|value| value.is_nan()) {
		return Err(Error::InvalidValue {
			column: TARGET_COLUMN.to_owned(),
			row,
			value: String::new(),
			message: message.to_owned(),
		});
	}
	let mut n_positives = 0;
	for value in data.iter_mut() {
		*value = if *value > 0.0 {
			n_positives += 1;
			1.0
		} else {
			0.0
		};
	}
	Ok(n_positives)
}

pub fn run_clean(input: &Path, output: &Path) -> Result<CleanSummary> {
	let dataframe = crate::artifact::read_csv(input)?;
	let (dataframe, summary) = clean(dataframe)?;
	cardio_util::fs::write_file(output, dataframe.to_csv_bytes()?)?;
	log::info!(
		"wrote {} ({} rows, {} positive)",
		output.display(),
		summary.n_rows,
		summary.n_positives
	);
	for (column, n_missing) in summary.n_imputed.iter() {
		log::debug!("imputed {} missing values in {}", n_missing, column);
	}
	Ok(summary)
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
fn test_clean() {
	let dataframe = frame("age,ca,thal,sex,target\n63,0,6,m,0\n67,3,?,f,2\n41,?,7,f,1\n57,?,3,m,4\n");
	let (dataframe, summary) = clean(dataframe).unwrap();
	assert_eq!(
		dataframe.column("target").unwrap().as_number().unwrap().data,
		vec![0.0, 1.0, 1.0, 1.0]
	);
	assert_eq!(
		dataframe.column("ca").unwrap().as_number().unwrap().data,
		vec![0.0, 3.0, 1.5, 1.5]
	);
	assert_eq!(
		dataframe.column("thal").unwrap().as_number().unwrap().data,
		vec![6.0, 6.0, 7.0, 3.0]
	);
	insta::assert_debug_snapshot!(summary, @r###"
 CleanSummary {
     n_rows: 4,
     n_positives: 3,
     n_imputed: [
         (
             "ca",
             2,
         ),
         (
             "thal",
             1,
         ),
     ],
 }
 "###);
}

#[test]
fn test_invalid_target() {
	let missing = frame("age,target\n63,1\n41,?\n");
	assert!(matches!(
		clean(missing),
		Err(Error::InvalidValue { row: 1, .. })
	));
	let text = frame("age,target\n63,yes\n41,no\n");
	assert!(matches!(
		clean(text),
		Err(Error::InvalidValue { row: 0, .. })
	));
	// Every target value is missing, so no column type could be inferred.
	let unknown = frame("age,target\n63,?\n41,\n");
	assert!(matches!(
		clean(unknown),
		Err(Error::InvalidValue { row: 0, .. })
	));
	let absent = frame("age\n63\n");
	assert!(matches!(clean(absent), Err(Error::MissingColumn { .. })));
}

/*!
This module aligns a predictions table with its ground truth table. When the predictions carry a `row_id` column, rows are joined on it one to one. Otherwise rows are matched by position, which requires both tables to have the same number of rows.
*/

use crate::error::{Error, Result};
use cardio_dataframe::{Column, DataFrame};
use fnv::FnvHashMap;
use std::path::Path;

pub const TARGET_COLUMN: &str = "target";
pub const PREDICTION_COLUMN: &str = "pred";
pub const ROW_ID_COLUMN: &str = "row_id";
/// The accepted names of the probability column, in priority order.
pub const PROBABILITY_COLUMN_ALIASES: &[&str] = &["proba_disease", "proba", "prob"];

/// Which prediction columns the caller needs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Requirements {
	pub predictions: bool,
	pub probabilities: bool,
}

/// Labels and predictions with one entry per aligned row, in prediction order.
#[derive(Clone, Debug, PartialEq)]
pub struct Aligned {
	pub labels: Vec<u8>,
	pub predictions: Option<Vec<u8>>,
	pub probabilities: Option<Vec<f64>>,
}

impl Aligned {
	pub fn len(&self) -> usize {
		self.labels.len()
	}

	pub fn is_empty(&self) -> bool {
		self.labels.is_empty()
	}
}

pub fn load_and_align(
	input_path: &Path,
	predictions_path: &Path,
	requirements: Requirements,
) -> Result<Aligned> {
	let input = crate::artifact::read_csv(input_path)?;
	let predictions = crate::artifact::read_csv(predictions_path)?;
	align(&input, &predictions, requirements)
}

pub fn align(
	input: &DataFrame,
	predictions: &DataFrame,
	requirements: Requirements,
) -> Result<Aligned> {
	let label_column = input
		.column(TARGET_COLUMN)
		.ok_or_else(|| Error::missing_columns("input", &[TARGET_COLUMN]))?;
	let prediction_column = predictions.column(PREDICTION_COLUMN);
	let probability_column = probability_column(predictions);
	let mut missing = Vec::new();
	if requirements.predictions && prediction_column.is_none() {
		missing.push(PREDICTION_COLUMN);
	}
	if (requirements.probabilities || prediction_column.is_none()) && probability_column.is_none() {
		missing.extend_from_slice(PROBABILITY_COLUMN_ALIASES);
	}
	if !missing.is_empty() {
		return Err(Error::missing_columns("predictions", &missing));
	}

	// For each prediction row, the index of the matching input row.
	let input_indices: Vec<usize> = match predictions.column(ROW_ID_COLUMN) {
		Some(prediction_ids) => join_by_row_id(input, prediction_ids)?,
		None => {
			if input.nrows() != predictions.nrows() {
				return Err(Error::RowCountMismatch {
					input: input.nrows(),
					predictions: predictions.nrows(),
				});
			}
			(0..input.nrows()).collect()
		}
	};
	if input_indices.is_empty() {
		return Err(Error::EmptyInput("the aligned predictions".to_owned()));
	}
	if input_indices.len() < input.nrows() {
		log::debug!(
			"{} input rows have no prediction and were dropped",
			input.nrows() - input_indices.len()
		);
	}

	let labels = read_binary_column(label_column)?;
	let labels = input_indices.iter().map(|index| labels[*index]).collect();
	let predictions = prediction_column.map(read_binary_column).transpose()?;
	let probabilities = probability_column.map(read_probability_column).transpose()?;
	Ok(Aligned {
		labels,
		predictions,
		probabilities,
	})
}

/// Find the first probability column alias present in `predictions`.
pub fn probability_column(predictions: &DataFrame) -> Option<&Column> {
	PROBABILITY_COLUMN_ALIASES
		.iter()
		.find_map(|alias| predictions.column(alias))
}

fn join_by_row_id(input: &DataFrame, prediction_ids: &Column) -> Result<Vec<usize>> {
	let input_ids = match input.column(ROW_ID_COLUMN) {
		Some(column) => read_row_ids(column)?,
		None => (0..input.nrows())
			.map(|index| index as i64)
			.collect(),
	};
	let mut input_index_by_id: FnvHashMap<i64, usize> = FnvHashMap::default();
	for (index, id) in input_ids.iter().enumerate() {
		if input_index_by_id.insert(*id, index).is_some() {
			return Err(Error::Alignment(format!(
				"row_id {} appears more than once in the input",
				id
			)));
		}
	}
	let prediction_ids = read_row_ids(prediction_ids)?;
	let mut seen: FnvHashMap<i64, usize> = FnvHashMap::default();
	prediction_ids
		.iter()
		.enumerate()
		.map(|(index, id)| {
			if let Some(first) = seen.insert(*id, index) {
				return Err(Error::Alignment(format!(
					"row_id {} appears more than once in the predictions, at rows {} and {}",
					id, first, index
				)));
			}
			input_index_by_id.get(id).copied().ok_or_else(|| {
				Error::Alignment(format!("row_id {} has no match in the input", id))
			})
		})
		.collect()
}

fn read_row_ids(column: &Column) -> Result<Vec<i64>> {
	(0..column.len())
		.map(|index| {
			let value = column.number_at(index);
			match value {
				Some(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
				_ => Err(invalid_value(column, index, "expected an integer row_id")),
			}
		})
		.collect()
}

/// Read a column whose values must all be exactly 0 or 1.
pub(crate) fn read_binary_column(column: &Column) -> Result<Vec<u8>> {
	(0..column.len())
		.map(|index| match column.number_at(index) {
			Some(value) if value == 0.0 => Ok(0),
			Some(value) if value == 1.0 => Ok(1),
			_ => Err(invalid_value(column, index, "expected 0 or 1")),
		})
		.collect()
}

fn read_probability_column(column: &Column) -> Result<Vec<f64>> {
	(0..column.len())
		.map(|index| match column.number_at(index) {
			Some(value) if (0.0..=1.0).contains(&value) => Ok(value),
			_ => Err(invalid_value(
				column,
				index,
				"expected a probability between 0 and 1",
			)),
		})
		.collect()
}

pub(crate) fn invalid_value(column: &Column, row: usize, message: &str) -> Error {
	Error::InvalidValue {
		column: column.name().to_owned(),
		row,
		value: column.text_at(row),
		message: message.to_owned(),
	}
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
fn test_positional() {
	let input = frame("age,target\n63,1\n41,0\n57,1\n");
	let predictions = frame("proba,pred\n0.9,1\n0.2,0\n0.4,0\n");
	let aligned = align(
		&input,
		&predictions,
		Requirements {
			predictions: true,
			probabilities: true,
		},
	)
	.unwrap();
	insta::assert_debug_snapshot!(aligned, @r###"
 Aligned {
     labels: [
         1,
         0,
         1,
     ],
     predictions: Some(
         [
             1,
             0,
             0,
         ],
     ),
     probabilities: Some(
         [
             0.9,
             0.2,
             0.4,
         ],
     ),
 }
 "###);
}

#[test]
fn test_row_count_mismatch() {
	let input = frame("target\n1\n0\n1\n");
	let predictions = frame("pred\n1\n0\n");
	let error = align(&input, &predictions, Requirements::default()).unwrap_err();
	assert!(matches!(
		error,
		Error::RowCountMismatch {
			input: 3,
			predictions: 2
		}
	));
}

#[test]
fn test_row_id_join() {
	let input = frame("row_id,target\n10,0\n11,1\n12,1\n");
	let predictions = frame("row_id,proba_disease,prob\n12,0.7,0.1\n10,0.3,0.9\n");
	let aligned = align(
		&input,
		&predictions,
		Requirements {
			predictions: false,
			probabilities: true,
		},
	)
	.unwrap();
	assert_eq!(aligned.labels, vec![1, 0]);
	assert_eq!(aligned.probabilities, Some(vec![0.7, 0.3]));
	assert_eq!(aligned.predictions, None);
	// Without a row_id column in the input, identifiers are row positions.
	let input = frame("target\n0\n1\n1\n");
	let predictions = frame("row_id,pred\n2,1\n0,0\n");
	let aligned = align(&input, &predictions, Requirements::default()).unwrap();
	assert_eq!(aligned.labels, vec![1, 0]);
}

#[test]
fn test_row_id_errors() {
	let input = frame("row_id,target\n1,0\n2,1\n");
	let duplicate = frame("row_id,pred\n1,0\n1,1\n");
	assert!(matches!(
		align(&input, &duplicate, Requirements::default()),
		Err(Error::Alignment(_))
	));
	let unmatched = frame("row_id,pred\n1,0\n3,1\n");
	assert!(matches!(
		align(&input, &unmatched, Requirements::default()),
		Err(Error::Alignment(_))
	));
	let empty = frame("row_id,pred\n");
	assert!(matches!(
		align(&input, &empty, Requirements::default()),
		Err(Error::EmptyInput(_))
	));
	let duplicate_input = frame("row_id,target\n1,0\n1,1\n2,0\n");
	let predictions = frame("row_id,pred\n2,0\n");
	match align(&duplicate_input, &predictions, Requirements::default()) {
		Err(Error::Alignment(message)) => assert!(message.contains("in the input")),
		_ => panic!("expected an alignment error"),
	}
}

#[test]
fn test_missing_and_invalid_columns() {
	let input = frame("target\n1\n0\n");
	let predictions = frame("pred\n1\n0\n");
	let error = align(
		&input,
		&predictions,
		Requirements {
			predictions: true,
			probabilities: true,
		},
	)
	.unwrap_err();
	assert_eq!(
		error.to_string(),
		"predictions is missing required column(s): proba_disease, proba, prob"
	);
	let input = frame("target\n2\n0\n");
	assert!(matches!(
		align(&input, &predictions, Requirements::default()),
		Err(Error::InvalidValue { row: 0, .. })
	));
	let input = frame("target\n1\n0\n");
	let predictions = frame("proba\n1.5\n0.1\n");
	assert!(matches!(
		align(&input, &predictions, Requirements::default()),
		Err(Error::InvalidValue { row: 0, .. })
	));
}

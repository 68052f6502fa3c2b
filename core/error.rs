/*!
This module defines the errors every pipeline stage can fail with. Errors are never retried: a stage that fails writes none of its outputs and the error is surfaced to the caller as is.
*/

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
	/// A table is missing one or more required columns.
	#[error("{table} is missing required column(s): {}", .columns.join(", "))]
	MissingColumn { table: String, columns: Vec<String> },
	/// Joining predictions to ground truth by row identifier was not one to one.
	#[error("failed to align predictions by row_id: {0}")]
	Alignment(String),
	/// Positional alignment was impossible because the row counts differ.
	#[error("row count mismatch: input has {input} rows but predictions have {predictions} rows, and there is no row_id column to align them")]
	RowCountMismatch { input: usize, predictions: usize },
	#[error("{0} is empty")]
	EmptyInput(String),
	#[error("failed to parse {what}: {message}")]
	Parse { what: String, message: String },
	#[error("{} does not exist", .0.display())]
	ArtifactNotFound(PathBuf),
	/// A value in a table violates the column's schema.
	#[error("invalid value {value:?} in column {column} at row {row}: {message}")]
	InvalidValue {
		column: String,
		row: usize,
		value: String,
		message: String,
	},
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error(transparent)]
	Csv(#[from] csv::Error),
	#[error(transparent)]
	Json(#[from] serde_json::Error),
	#[error(transparent)]
	Yaml(#[from] serde_yaml::Error),
}

impl Error {
	pub(crate) fn missing_columns(table: impl std::fmt::Display, columns: &[&str]) -> Self {
		Error::MissingColumn {
			table: table.to_string(),
			columns: columns.iter().map(|column| (*column).to_owned()).collect(),
		}
	}

	pub(crate) fn parse(what: impl std::fmt::Display, message: impl std::fmt::Display) -> Self {
		Error::Parse {
			what: what.to_string(),
			message: message.to_string(),
		}
	}
}

impl From<cardio_metrics::InvalidThresholdRangeError> for Error {
	fn from(error: cardio_metrics::InvalidThresholdRangeError) -> Self {
		Error::InvalidConfig(error.to_string())
	}
}

impl From<cardio_metrics::UnknownMetricError> for Error {
	fn from(error: cardio_metrics::UnknownMetricError) -> Self {
		Error::InvalidConfig(error.to_string())
	}
}

#[test]
fn test_messages() {
	let error = Error::missing_columns("predictions.csv", &["proba_disease", "proba"]);
	assert_eq!(
		error.to_string(),
		"predictions.csv is missing required column(s): proba_disease, proba"
	);
	let error = Error::RowCountMismatch {
		input: 3,
		predictions: 2,
	};
	assert!(error.to_string().starts_with("row count mismatch"));
}

/*!
This crate provides a small implementation of dataframes, which are two dimensional tables where each column has its own data type, like a spreadsheet. It only implements what the cardio pipeline needs: loading csv files with type inference, looking up columns by name, selecting rows, and writing csv files back out.
*/

use itertools::izip;

mod load;

pub use self::load::*;

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
	pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
	Unknown(UnknownColumn),
	Number(NumberColumn),
	Text(TextColumn),
}

/// A column where every value was invalid, so no type could be inferred.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownColumn {
	pub name: String,
	pub len: usize,
}

/// A column of numbers. Invalid values are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumn {
	pub name: String,
	pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextColumn {
	pub name: String,
	pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
	Unknown,
	Number,
	Text,
}

impl DataFrame {
	pub fn new(column_names: Vec<String>, column_types: Vec<ColumnType>) -> Self {
		let columns = izip!(column_names, column_types)
			.map(|(column_name, column_type)| match column_type {
				ColumnType::Unknown => Column::Unknown(UnknownColumn::new(column_name)),
				ColumnType::Number => Column::Number(NumberColumn::new(column_name)),
				ColumnType::Text => Column::Text(TextColumn::new(column_name)),
			})
			.collect();
		Self { columns }
	}

	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|column| column.name() == name)
	}

	pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
		self.columns.iter_mut().find(|column| column.name() == name)
	}

	pub fn has_column(&self, name: &str) -> bool {
		self.column(name).is_some()
	}

	/// Create a new dataframe with the rows at `indices`, in that order. Every index must be less than `nrows()`.
	pub fn take_rows(&self, indices: &[usize]) -> Self {
		let columns = self
			.columns
			.iter()
			.map(|column| column.take_rows(indices))
			.collect();
		Self { columns }
	}

	/// Render the dataframe as csv in memory.
	pub fn to_csv_bytes(&self) -> Result<Vec<u8>, csv::Error> {
		let mut writer = csv::Writer::from_writer(Vec::new());
		self.to_csv(&mut writer)?;
		writer
			.into_inner()
			.map_err(|error| csv::Error::from(error.into_error()))
	}

	/// Write the dataframe as csv with a header row. NaN numbers and unknown values are written as empty fields.
	pub fn to_csv<W>(&self, writer: &mut csv::Writer<W>) -> Result<(), csv::Error>
	where
		W: std::io::Write,
	{
		writer.write_record(self.columns.iter().map(|column| column.name()))?;
		let mut record: Vec<String> = Vec::with_capacity(self.ncols());
		for row_index in 0..self.nrows() {
			record.clear();
			for column in self.columns.iter() {
				let value = match column {
					Column::Unknown(_) => String::new(),
					Column::Number(column) => format_number(column.data[row_index]),
					Column::Text(column) => column.data[row_index].clone(),
				};
				record.push(value);
			}
			writer.write_record(&record)?;
		}
		writer.flush()?;
		Ok(())
	}
}

/// Format a number the way it is written to csv files: the shortest representation that round trips, and an empty string for NaN.
pub fn format_number(value: f64) -> String {
	if value.is_nan() {
		String::new()
	} else {
		value.to_string()
	}
}

impl Column {
	pub fn len(&self) -> usize {
		match self {
			Self::Unknown(s) => s.len,
			Self::Number(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Unknown(s) => s.name.as_str(),
			Self::Number(s) => s.name.as_str(),
			Self::Text(s) => s.name.as_str(),
		}
	}

	pub fn column_type(&self) -> ColumnType {
		match self {
			Self::Unknown(_) => ColumnType::Unknown,
			Self::Number(_) => ColumnType::Number,
			Self::Text(_) => ColumnType::Text,
		}
	}

	pub fn as_number(&self) -> Option<&NumberColumn> {
		match self {
			Self::Number(s) => Some(s),
			_ => None,
		}
	}

	/// Read the value at `index` as a number. Unknown columns yield NaN and text columns yield `None`.
	pub fn number_at(&self, index: usize) -> Option<f64> {
		match self {
			Self::Unknown(_) => Some(std::f64::NAN),
			Self::Number(column) => Some(column.data[index]),
			Self::Text(_) => None,
		}
	}

	/// Render the value at `index` as it appears in a csv file.
	pub fn text_at(&self, index: usize) -> String {
		match self {
			Self::Unknown(_) => String::new(),
			Self::Number(column) => format_number(column.data[index]),
			Self::Text(column) => column.data[index].clone(),
		}
	}

	fn take_rows(&self, indices: &[usize]) -> Self {
		match self {
			Self::Unknown(column) => Self::Unknown(UnknownColumn {
				name: column.name.clone(),
				len: indices.len(),
			}),
			Self::Number(column) => Self::Number(NumberColumn {
				name: column.name.clone(),
				data: indices.iter().map(|index| column.data[*index]).collect(),
			}),
			Self::Text(column) => Self::Text(TextColumn {
				name: column.name.clone(),
				data: indices
					.iter()
					.map(|index| column.data[*index].clone())
					.collect(),
			}),
		}
	}
}

impl UnknownColumn {
	pub fn new(name: String) -> Self {
		Self { name, len: 0 }
	}
}

impl NumberColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}
}

impl TextColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}
}

#[test]
fn test_take_rows_and_write() {
	let dataframe = DataFrame {
		columns: vec![
			Column::Number(NumberColumn {
				name: "age".to_owned(),
				data: vec![63.0, std::f64::NAN, 41.5],
			}),
			Column::Text(TextColumn {
				name: "sex".to_owned(),
				data: vec!["m".to_owned(), "f".to_owned(), "f".to_owned()],
			}),
			Column::Unknown(UnknownColumn {
				name: "ca".to_owned(),
				len: 3,
			}),
		],
	};
	let subset = dataframe.take_rows(&[2, 1]);
	assert_eq!(subset.nrows(), 2);
	let mut writer = csv::Writer::from_writer(Vec::new());
	subset.to_csv(&mut writer).unwrap();
	let csv = String::from_utf8(writer.into_inner().unwrap()).unwrap();
	assert_eq!(csv, "age,sex,ca\n41.5,f,\n,f,\n");
}

use super::*;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Clone, Default)]
pub struct FromCsvOptions<'a> {
	/// Columns listed here skip inference and load with the given type.
	pub column_types: Option<BTreeMap<String, ColumnType>>,
	pub invalid_values: Option<&'a [&'a str]>,
}

/// These values are the default values that are considered invalid.
pub const DEFAULT_INVALID_VALUES: &[&str] = &[
	"", "null", "NULL", "n/a", "N/A", "nan", "-nan", "NaN", "-NaN", "?",
];

impl DataFrame {
	pub fn from_path(path: &Path, options: FromCsvOptions) -> Result<Self, csv::Error> {
		let mut reader = csv::ReaderBuilder::new()
			.trim(csv::Trim::All)
			.from_path(path)?;
		Self::from_csv(&mut reader, options)
	}

	pub fn from_csv<R>(
		reader: &mut csv::Reader<R>,
		options: FromCsvOptions,
	) -> Result<Self, csv::Error>
	where
		R: std::io::Read + std::io::Seek,
	{
		let invalid_values = options.invalid_values.unwrap_or(DEFAULT_INVALID_VALUES);
		let column_names: Vec<String> = reader
			.headers()?
			.into_iter()
			.map(|column_name| column_name.to_owned())
			.collect();
		let start_position = reader.position().clone();

		// Retrieve any column types present in the options. The others are inferred.
		let mut infer_stats: Vec<Option<InferStats>> = column_names
			.iter()
			.map(|column_name| {
				let specified = options
					.column_types
					.as_ref()
					.and_then(|column_types| column_types.get(column_name));
				match specified {
					Some(_) => None,
					None => Some(InferStats::new(invalid_values)),
				}
			})
			.collect();

		// Passing over the csv to infer column types is only necessary if one or more columns did not have its type specified.
		let needs_infer = infer_stats.iter().any(|stats| stats.is_some());
		let mut n_rows = None;
		if needs_infer {
			let mut record = csv::StringRecord::new();
			let mut n_rows_computed = 0;
			while reader.read_record(&mut record)? {
				n_rows_computed += 1;
				for (value, stats) in record.iter().zip(infer_stats.iter_mut()) {
					if let Some(stats) = stats {
						stats.update(value);
					}
				}
			}
			n_rows = Some(n_rows_computed);
			// After inference, return back to the beginning of the csv to load the values.
			reader.seek(start_position)?;
		}
		let column_types: Vec<ColumnType> = izip!(column_names.iter(), infer_stats)
			.map(|(column_name, stats)| match stats {
				Some(stats) => stats.finalize(),
				None => options
					.column_types
					.as_ref()
					.and_then(|column_types| column_types.get(column_name))
					.cloned()
					.unwrap_or(ColumnType::Text),
			})
			.collect();

		let mut dataframe = Self::new(column_names, column_types);
		// If an inference pass was done, reserve storage for the values because we know how many rows are in the csv.
		if let Some(n_rows) = n_rows {
			for column in dataframe.columns.iter_mut() {
				match column {
					Column::Unknown(_) => {}
					Column::Number(column) => column.data.reserve_exact(n_rows),
					Column::Text(column) => column.data.reserve_exact(n_rows),
				}
			}
		}
		// Read each csv record and insert the values into the columns of the dataframe.
		let mut record = csv::StringRecord::new();
		while reader.read_record(&mut record)? {
			for (index, column) in dataframe.columns.iter_mut().enumerate() {
				let value = record.get(index).unwrap_or("");
				match column {
					Column::Unknown(column) => {
						column.len += 1;
					}
					Column::Number(column) => {
						column.data.push(parse_number(value, invalid_values));
					}
					Column::Text(column) => column.data.push(value.to_owned()),
				}
			}
		}
		Ok(dataframe)
	}
}

/// Parse a number, mapping invalid and non-finite values to NaN.
fn parse_number(value: &str, invalid_values: &[&str]) -> f64 {
	if invalid_values.contains(&value) {
		return std::f64::NAN;
	}
	match lexical::parse::<f64, _>(value) {
		Ok(value) if value.is_finite() => value,
		_ => std::f64::NAN,
	}
}

#[derive(Clone, Debug)]
struct InferStats<'a> {
	invalid_values: &'a [&'a str],
	column_type: InferColumnType,
}

#[derive(PartialEq, Clone, Copy, Debug)]
enum InferColumnType {
	Unknown,
	Number,
	Text,
}

impl<'a> InferStats<'a> {
	fn new(invalid_values: &'a [&'a str]) -> Self {
		Self {
			invalid_values,
			column_type: InferColumnType::Unknown,
		}
	}

	fn update(&mut self, value: &str) {
		if self.invalid_values.contains(&value) {
			return;
		}
		match self.column_type {
			InferColumnType::Unknown | InferColumnType::Number => {
				if lexical::parse::<f64, _>(value)
					.map(|v| v.is_finite())
					.unwrap_or(false)
				{
					self.column_type = InferColumnType::Number;
				} else {
					self.column_type = InferColumnType::Text;
				}
			}
			InferColumnType::Text => {}
		}
	}

	fn finalize(self) -> ColumnType {
		match self.column_type {
			InferColumnType::Unknown => ColumnType::Unknown,
			InferColumnType::Number => ColumnType::Number,
			InferColumnType::Text => ColumnType::Text,
		}
	}
}

#[test]
fn test_infer() {
	let csv = r#"age,thal,ca,note
63,6.0,?,hello
41,?,,world
"#;
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions::default(),
	)
	.unwrap();
	insta::assert_debug_snapshot!(df, @r###"
 DataFrame {
     columns: [
         Number(
             NumberColumn {
                 name: "age",
                 data: [
                     63.0,
                     41.0,
                 ],
             },
         ),
         Number(
             NumberColumn {
                 name: "thal",
                 data: [
                     6.0,
                     NaN,
                 ],
             },
         ),
         Unknown(
             UnknownColumn {
                 name: "ca",
                 len: 2,
             },
         ),
         Text(
             TextColumn {
                 name: "note",
                 data: [
                     "hello",
                     "world",
                 ],
             },
         ),
     ],
 }
 "###);
}

#[test]
fn test_column_types() {
	let csv = r#"row_id,target
1,0
2,1
"#;
	let mut column_types = BTreeMap::new();
	column_types.insert("row_id".to_owned(), ColumnType::Text);
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions {
			column_types: Some(column_types),
			..Default::default()
		},
	)
	.unwrap();
	assert_eq!(df.column("row_id").unwrap().column_type(), ColumnType::Text);
	assert_eq!(
		df.column("target").unwrap().as_number().unwrap().data,
		vec![0.0, 1.0]
	);
}

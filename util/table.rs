/*!
This module renders GitHub flavored markdown tables with padded, aligned columns.
*/

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Align {
	Left,
	Center,
	Right,
}

pub struct TableColumn<'a> {
	pub header: &'a str,
	pub align: Align,
}

pub struct Table<'a> {
	columns: &'a [TableColumn<'a>],
	rows: Vec<Vec<String>>,
}

impl<'a> Table<'a> {
	pub fn new(columns: &'a [TableColumn<'a>]) -> Self {
		Self {
			columns,
			rows: Vec::new(),
		}
	}

	/// Append a row. Missing trailing cells render empty and extra cells are ignored.
	pub fn push_row(&mut self, row: Vec<String>) {
		self.rows.push(row);
	}

	fn column_widths(&self) -> Vec<usize> {
		let mut column_widths: Vec<usize> = self
			.columns
			.iter()
			.map(|column| usize::max(3, width(column.header)))
			.collect();
		for row in self.rows.iter() {
			for (column_width, value) in column_widths.iter_mut().zip(row.iter()) {
				*column_width = usize::max(*column_width, width(value));
			}
		}
		column_widths
	}
}

impl<'a> std::fmt::Display for Table<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let column_widths = self.column_widths();
		let header: Vec<&str> = self.columns.iter().map(|column| column.header).collect();
		let row = Row {
			columns: self.columns,
			column_widths: &column_widths,
			values: &header,
		};
		writeln!(f, "{}", row)?;
		let line = Line {
			columns: self.columns,
			column_widths: &column_widths,
		};
		writeln!(f, "{}", line)?;
		for values in self.rows.iter() {
			let values: Vec<&str> = values.iter().map(|value| value.as_str()).collect();
			let row = Row {
				columns: self.columns,
				column_widths: &column_widths,
				values: &values,
			};
			writeln!(f, "{}", row)?;
		}
		Ok(())
	}
}

fn width(value: &str) -> usize {
	value.chars().count()
}

struct Line<'a> {
	columns: &'a [TableColumn<'a>],
	column_widths: &'a [usize],
}

impl<'a> std::fmt::Display for Line<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for (column, column_width) in self.columns.iter().zip(self.column_widths.iter()) {
			let (left, right) = match column.align {
				Align::Left => ("-", "-"),
				Align::Center => (":", ":"),
				Align::Right => ("-", ":"),
			};
			write!(f, "{}", left)?;
			for _ in 0..*column_width {
				write!(f, "-")?;
			}
			write!(f, "{}|", right)?;
		}
		Ok(())
	}
}

struct Row<'a> {
	columns: &'a [TableColumn<'a>],
	column_widths: &'a [usize],
	values: &'a [&'a str],
}

impl<'a> std::fmt::Display for Row<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for (index, (column, column_width)) in
			self.columns.iter().zip(self.column_widths).enumerate()
		{
			let value = self.values.get(index).copied().unwrap_or("");
			match column.align {
				Align::Right => write!(f, " {:>width$} |", value, width = *column_width)?,
				Align::Left | Align::Center => {
					write!(f, " {:<width$} |", value, width = *column_width)?
				}
			}
		}
		Ok(())
	}
}

#[test]
fn test_table() {
	let columns = [
		TableColumn {
			header: "Model",
			align: Align::Left,
		},
		TableColumn {
			header: "Threshold",
			align: Align::Right,
		},
		TableColumn {
			header: "f1",
			align: Align::Center,
		},
	];
	let mut table = Table::new(&columns);
	table.push_row(vec![
		"baseline_logreg".to_owned(),
		"`0.350`".to_owned(),
		"0.812".to_owned(),
	]);
	table.push_row(vec!["rf".to_owned(), "`0.200`".to_owned()]);
	let expected = "\
| Model           | Threshold | f1    |
|-----------------|----------:|:-----:|
| baseline_logreg |   `0.350` | 0.812 |
| rf              |   `0.200` |       |
";
	assert_eq!(table.to_string(), expected);
}

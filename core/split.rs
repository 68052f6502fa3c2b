/*!
This module splits a cleaned dataset into train, val and test sets, stratified on the target so each set has approximately the class balance of the whole.
*/

use crate::{
	align::{read_binary_column, TARGET_COLUMN},
	error::{Error, Result},
};
use cardio_dataframe::DataFrame;
use num_traits::ToPrimitive;
use rand::{seq::SliceRandom, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use std::path::Path;

#[derive(Clone, Debug, PartialEq)]
pub struct SplitOptions {
	pub seed: u64,
	/// The fraction of all rows that go to test.
	pub test_fraction: f64,
	/// The fraction of all rows that go to val.
	pub val_fraction: f64,
}

impl Default for SplitOptions {
	fn default() -> Self {
		Self {
			seed: 42,
			test_fraction: 0.15,
			val_fraction: 0.15,
		}
	}
}

pub struct Split {
	pub train: DataFrame,
	pub val: DataFrame,
	pub test: DataFrame,
}

/// The row indices of each set, each in ascending order.
#[derive(Debug, PartialEq)]
pub struct SplitIndices {
	pub train: Vec<usize>,
	pub val: Vec<usize>,
	pub test: Vec<usize>,
}

impl SplitOptions {
	fn validate(&self) -> Result<()> {
		let in_range = |fraction: f64| fraction > 0.0 && fraction < 1.0;
		if !in_range(self.test_fraction)
			|| !in_range(self.val_fraction)
			|| self.test_fraction + self.val_fraction >= 1.0
		{
			return Err(Error::InvalidConfig(format!(
				"test_fraction ({}) and val_fraction ({}) must each be between 0 and 1 and sum to less than 1",
				self.test_fraction, self.val_fraction
			)));
		}
		Ok(())
	}
}

pub fn split(dataframe: &DataFrame, options: &SplitOptions) -> Result<Split> {
	let column = dataframe
		.column(TARGET_COLUMN)
		.ok_or_else(|| Error::missing_columns("input", &[TARGET_COLUMN]))?;
	let labels = read_binary_column(column)?;
	let indices = split_indices(&labels, options)?;
	Ok(Split {
		train: dataframe.take_rows(&indices.train),
		val: dataframe.take_rows(&indices.val),
		test: dataframe.take_rows(&indices.test),
	})
}

/**
Compute a stratified split of rows with the given labels. The test set takes `ceil(test_fraction * n)` rows, then val takes `ceil(val_fraction / (1 - test_fraction))` of the remaining rows, and train takes the rest. Within each set, the number of rows of each class is proportional to the class's share of the rows being split, with the remainder going to the classes with the largest fractional quotas.
*/
pub fn split_indices(labels: &[u8], options: &SplitOptions) -> Result<SplitIndices> {
	options.validate()?;
	let n = labels.len();
	if n == 0 {
		return Err(Error::EmptyInput("the dataset".to_owned()));
	}
	let n_test = ceil(options.test_fraction * to_f64(n)).min(n);
	let n_remaining = n - n_test;
	let val_fraction = options.val_fraction / (1.0 - options.test_fraction);
	let n_val = ceil(val_fraction * to_f64(n_remaining)).min(n_remaining);
	if n_test == 0 || n_val == 0 || n_val == n_remaining {
		return Err(Error::InvalidConfig(format!(
			"cannot split {} rows into non-empty train, val and test sets",
			n
		)));
	}

	// Shuffle the rows of each class with a seeded rng so the split is reproducible.
	let mut rng = Xoshiro256Plus::seed_from_u64(options.seed);
	let mut by_class: Vec<Vec<usize>> = vec![Vec::new(), Vec::new()];
	for (index, label) in labels.iter().enumerate() {
		by_class[*label as usize].push(index);
	}
	for class in by_class.iter_mut() {
		class.shuffle(&mut rng);
	}

	let mut test = take_stratified(&mut by_class, n_test);
	let mut val = take_stratified(&mut by_class, n_val);
	let mut train: Vec<usize> = by_class.into_iter().flatten().collect();
	test.sort_unstable();
	val.sort_unstable();
	train.sort_unstable();
	Ok(SplitIndices { train, val, test })
}

/// Remove `n_take` indices from the front of the class lists, in proportion to their sizes.
fn take_stratified(by_class: &mut [Vec<usize>], n_take: usize) -> Vec<usize> {
	let n_total: usize = by_class.iter().map(|class| class.len()).sum();
	let mut quotas: Vec<usize> = by_class
		.iter()
		.map(|class| n_take * class.len() / n_total)
		.collect();
	let mut remainders: Vec<(usize, usize)> = by_class
		.iter()
		.enumerate()
		.map(|(class_index, class)| (class_index, n_take * class.len() % n_total))
		.collect();
	// Largest remainder first, then the larger class, then the lower label.
	remainders.sort_by(|(a, a_remainder), (b, b_remainder)| {
		b_remainder
			.cmp(a_remainder)
			.then(by_class[*b].len().cmp(&by_class[*a].len()))
			.then(a.cmp(b))
	});
	let n_left = n_take - quotas.iter().sum::<usize>();
	for (class_index, _) in remainders.into_iter().take(n_left) {
		quotas[class_index] += 1;
	}
	let mut taken = Vec::with_capacity(n_take);
	for (class, quota) in by_class.iter_mut().zip(quotas) {
		taken.extend(class.drain(..quota));
	}
	taken
}

pub fn run_split(input: &Path, output_dir: &Path, options: &SplitOptions) -> Result<Split> {
	let dataframe = crate::artifact::read_csv(input)?;
	let split = split(&dataframe, options)?;
	// Render every set before writing any so a failure leaves no partial outputs.
	let mut outputs = Vec::with_capacity(3);
	for (name, dataframe) in [
		("train.csv", &split.train),
		("val.csv", &split.val),
		("test.csv", &split.test),
	]
	.iter()
	{
		let bytes = dataframe.to_csv_bytes()?;
		outputs.push((output_dir.join(name), bytes, dataframe.nrows()));
	}
	for (path, bytes, n_rows) in outputs {
		cardio_util::fs::write_file(&path, bytes)?;
		log::info!("wrote {} ({} rows)", path.display(), n_rows);
	}
	Ok(split)
}

fn ceil(value: f64) -> usize {
	value.ceil().to_usize().unwrap_or(0)
}

fn to_f64(value: usize) -> f64 {
	value.to_f64().unwrap_or(std::f64::NAN)
}

#[test]
fn test_stratified() {
	// 12 positives and 8 negatives.
	let labels: Vec<u8> = (0..20).map(|index| if index % 5 < 3 { 1 } else { 0 }).collect();
	let options = SplitOptions {
		seed: 42,
		test_fraction: 0.25,
		val_fraction: 0.25,
	};
	let indices = split_indices(&labels, &options).unwrap();
	assert_eq!(indices.test.len(), 5);
	assert_eq!(indices.val.len(), 5);
	assert_eq!(indices.train.len(), 10);
	let count_positives = |indices: &[usize]| {
		indices
			.iter()
			.filter(|index| labels[**index] == 1)
			.count()
	};
	// 5 * 12 / 20 = 3 positives in test, then 5 * 9 / 15 = 3 positives in val.
	assert_eq!(count_positives(&indices.test), 3);
	assert_eq!(count_positives(&indices.val), 3);
	assert_eq!(count_positives(&indices.train), 6);
	let mut all: Vec<usize> = indices
		.train
		.iter()
		.chain(indices.val.iter())
		.chain(indices.test.iter())
		.copied()
		.collect();
	all.sort_unstable();
	assert_eq!(all, (0..20).collect::<Vec<_>>());
	assert!(indices.test.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_deterministic() {
	let labels: Vec<u8> = (0..50).map(|index| (index % 3 == 0) as u8).collect();
	let options = SplitOptions::default();
	let a = split_indices(&labels, &options).unwrap();
	let b = split_indices(&labels, &options).unwrap();
	assert_eq!(a, b);
	let c = split_indices(
		&labels,
		&SplitOptions {
			seed: 7,
			..SplitOptions::default()
		},
	)
	.unwrap();
	assert_eq!(c.test.len(), a.test.len());
}

#[test]
fn test_invalid_options() {
	let labels = [0, 1, 0, 1];
	let options = SplitOptions {
		seed: 42,
		test_fraction: 0.6,
		val_fraction: 0.4,
	};
	assert!(matches!(
		split_indices(&labels, &options),
		Err(Error::InvalidConfig(_))
	));
	assert!(matches!(
		split_indices(&[], &SplitOptions::default()),
		Err(Error::EmptyInput(_))
	));
}

#[test]
fn test_run_split() {
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join("clean.csv");
	let mut csv = "age,target\n".to_owned();
	for index in 0..20 {
		csv.push_str(&format!("{},{}\n", 40 + index, index % 2));
	}
	std::fs::write(&input, csv).unwrap();
	let output_dir = dir.path().join("splits");
	let split = run_split(&input, &output_dir, &SplitOptions::default()).unwrap();
	assert_eq!(split.test.nrows(), 3);
	assert_eq!(split.val.nrows(), 3);
	assert_eq!(split.train.nrows(), 14);
	for (name, dataframe) in &[
		("train.csv", &split.train),
		("val.csv", &split.val),
		("test.csv", &split.test),
	] {
		let written = std::fs::read(output_dir.join(name)).unwrap();
		assert_eq!(written, dataframe.to_csv_bytes().unwrap());
	}
	// A failed split writes nothing.
	let invalid = SplitOptions {
		test_fraction: 0.6,
		val_fraction: 0.6,
		..SplitOptions::default()
	};
	let failed_dir = dir.path().join("failed");
	assert!(run_split(&input, &failed_dir, &invalid).is_err());
	assert!(!failed_dir.exists());
}

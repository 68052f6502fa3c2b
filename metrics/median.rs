use super::Metric;
use cardio_util::finite::{Finite, ToFinite};

/// The median of the finite values in a slice. NaN values are ignored. For an even number of values, the median is the mean of the two middle values.
pub struct Median;

impl<'a> Metric<'a> for Median {
	type Input = &'a [f64];
	type Output = Option<f64>;

	fn compute(input: Self::Input) -> Self::Output {
		let mut values: Vec<Finite<f64>> = input
			.iter()
			.filter_map(|value| value.to_finite().ok())
			.collect();
		if values.is_empty() {
			return None;
		}
		values.sort_unstable();
		let middle = values.len() / 2;
		if values.len() % 2 == 0 {
			Some((values[middle - 1].get() + values[middle].get()) / 2.0)
		} else {
			Some(values[middle].get())
		}
	}
}

#[test]
fn test_median() {
	assert_eq!(Median::compute(&[3.0, 1.0, 2.0]), Some(2.0));
	assert_eq!(Median::compute(&[4.0, std::f64::NAN, 1.0, 2.0, 3.0]), Some(2.5));
	assert_eq!(Median::compute(&[std::f64::NAN]), None);
	assert_eq!(Median::compute(&[]), None);
}

use num_traits::Float;
use std::cmp::{Ord, Ordering};
use thiserror::Error;

/// A float that is guaranteed to be neither NaN nor infinite, and is therefore totally ordered.
#[derive(Clone, Copy, Debug)]
pub struct Finite<T>(T)
where
	T: Float;

#[derive(Debug, Error)]
#[error("not finite")]
pub struct NotFiniteError;

impl<T> Finite<T>
where
	T: Float,
{
	pub fn new(value: T) -> Result<Self, NotFiniteError> {
		if value.is_finite() {
			Ok(Self(value))
		} else {
			Err(NotFiniteError)
		}
	}

	pub fn get(self) -> T {
		self.0
	}
}

impl<T> PartialEq for Finite<T>
where
	T: Float,
{
	#[inline]
	fn eq(&self, other: &Self) -> bool {
		self.0.eq(&other.0)
	}
}

impl<T> Eq for Finite<T> where T: Float {}

impl<T> PartialOrd for Finite<T>
where
	T: Float,
{
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl<T> Ord for Finite<T>
where
	T: Float,
{
	fn cmp(&self, other: &Self) -> Ordering {
		// Both values are finite, so partial_cmp always succeeds.
		self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
	}
}

pub trait ToFinite<T>
where
	T: Float,
{
	/// If the value is finite, return `Ok(Finite(self))`, otherwise return an error.
	fn to_finite(self) -> Result<Finite<T>, NotFiniteError>;
}

impl<T> ToFinite<T> for T
where
	T: Float,
{
	fn to_finite(self) -> Result<Finite<T>, NotFiniteError> {
		Finite::new(self)
	}
}

/**
Compare two optional scores where a missing or NaN score ranks below every present score. Two missing scores compare equal.

This is the ordering used whenever a "best" value is picked from values that may be absent, so that an absent value can never win.
*/
pub fn cmp_missing_lowest(a: Option<f64>, b: Option<f64>) -> Ordering {
	let a = a.and_then(|a| if a.is_nan() { None } else { Some(a) });
	let b = b.and_then(|b| if b.is_nan() { None } else { Some(b) });
	match (a, b) {
		(None, None) => Ordering::Equal,
		(None, Some(_)) => Ordering::Less,
		(Some(_), None) => Ordering::Greater,
		(Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
	}
}

#[test]
fn test_finite_sort() {
	let mut values: Vec<Finite<f64>> = [3.0, -1.0, 2.5]
		.iter()
		.map(|value| value.to_finite().unwrap())
		.collect();
	values.sort();
	let values: Vec<f64> = values.into_iter().map(|value| value.get()).collect();
	assert_eq!(values, vec![-1.0, 2.5, 3.0]);
	assert!(std::f64::NAN.to_finite().is_err());
	assert!(std::f64::INFINITY.to_finite().is_err());
}

#[test]
fn test_cmp_missing_lowest() {
	assert_eq!(cmp_missing_lowest(None, Some(-1e300)), Ordering::Less);
	assert_eq!(cmp_missing_lowest(Some(std::f64::NAN), Some(0.0)), Ordering::Less);
	assert_eq!(cmp_missing_lowest(Some(0.8), Some(0.7)), Ordering::Greater);
	assert_eq!(cmp_missing_lowest(None, Some(std::f64::NAN)), Ordering::Equal);
}

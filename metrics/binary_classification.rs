use super::{auc_roc, BinaryConfusionMatrix, Metric, StreamingMetric};
use itertools::izip;
use thiserror::Error;

/// `BinaryClassificationMetrics` computes the [`MetricSet`](struct.MetricSet.html) for hard predictions, and the area under the ROC curve when probabilities are given.
pub struct BinaryClassificationMetrics;

pub struct BinaryClassificationMetricsInput<'a> {
	/// The true labels, each 0 or 1.
	pub labels: &'a [u8],
	/// The predicted labels, each 0 or 1.
	pub predictions: &'a [u8],
	/// The predicted probability of the positive class, if available.
	pub probabilities: Option<&'a [f64]>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MetricSet {
	pub accuracy: f64,
	pub precision: f64,
	pub recall: f64,
	pub f1: f64,
	/// `None` when the labels do not contain both classes or no probabilities were given.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub roc_auc: Option<f64>,
}

/// The metrics a threshold or a model can be selected by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricName {
	Accuracy,
	Precision,
	Recall,
	F1,
	RocAuc,
}

#[derive(Debug, Error)]
#[error("unknown metric {0:?}, expected one of accuracy, precision, recall, f1, roc_auc")]
pub struct UnknownMetricError(pub String);

impl<'a> Metric<'a> for BinaryClassificationMetrics {
	type Input = BinaryClassificationMetricsInput<'a>;
	type Output = MetricSet;

	fn compute(input: Self::Input) -> Self::Output {
		assert_eq!(input.labels.len(), input.predictions.len());
		let mut confusion_matrix = BinaryConfusionMatrix::new();
		for (label, prediction) in izip!(input.labels, input.predictions) {
			confusion_matrix.update((*label, *prediction));
		}
		let counts = confusion_matrix.finalize();
		let roc_auc = input
			.probabilities
			.and_then(|probabilities| auc_roc(probabilities, input.labels));
		MetricSet {
			accuracy: counts.accuracy(),
			precision: counts.precision(),
			recall: counts.recall(),
			f1: counts.f1_score(),
			roc_auc,
		}
	}
}

impl MetricSet {
	pub fn get(&self, metric: MetricName) -> Option<f64> {
		match metric {
			MetricName::Accuracy => Some(self.accuracy),
			MetricName::Precision => Some(self.precision),
			MetricName::Recall => Some(self.recall),
			MetricName::F1 => Some(self.f1),
			MetricName::RocAuc => self.roc_auc,
		}
	}
}

impl MetricName {
	/// All metrics, in the order they appear in tables and reports.
	pub const ALL: [MetricName; 5] = [
		MetricName::Accuracy,
		MetricName::Precision,
		MetricName::Recall,
		MetricName::F1,
		MetricName::RocAuc,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			MetricName::Accuracy => "accuracy",
			MetricName::Precision => "precision",
			MetricName::Recall => "recall",
			MetricName::F1 => "f1",
			MetricName::RocAuc => "roc_auc",
		}
	}
}

impl std::fmt::Display for MetricName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for MetricName {
	type Err = UnknownMetricError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		MetricName::ALL
			.iter()
			.copied()
			.find(|metric| metric.as_str() == s)
			.ok_or_else(|| UnknownMetricError(s.to_owned()))
	}
}

#[test]
fn test_no_positive_predictions() {
	let metrics = BinaryClassificationMetrics::compute(BinaryClassificationMetricsInput {
		labels: &[0, 0, 1, 1],
		predictions: &[0, 0, 0, 0],
		probabilities: None,
	});
	assert_eq!(metrics.accuracy, 0.5);
	assert_eq!(metrics.precision, 0.0);
	assert_eq!(metrics.recall, 0.0);
	assert_eq!(metrics.f1, 0.0);
	assert_eq!(metrics.roc_auc, None);
}

#[test]
fn test_roc_auc_requires_both_classes() {
	let metrics = BinaryClassificationMetrics::compute(BinaryClassificationMetricsInput {
		labels: &[1, 1, 1],
		predictions: &[1, 0, 1],
		probabilities: Some(&[0.9, 0.2, 0.7]),
	});
	assert_eq!(metrics.roc_auc, None);
	assert!((metrics.accuracy - 2.0 / 3.0).abs() < 1e-12);
	let metrics = BinaryClassificationMetrics::compute(BinaryClassificationMetricsInput {
		labels: &[1, 1, 0, 0],
		predictions: &[1, 0, 0, 0],
		probabilities: Some(&[0.9, 0.4, 0.4, 0.2]),
	});
	assert_eq!(metrics.roc_auc, Some(0.875));
	assert_eq!(metrics.precision, 1.0);
	assert_eq!(metrics.recall, 0.5);
}

#[test]
fn test_metric_name() {
	for metric in MetricName::ALL.iter() {
		assert_eq!(metric.as_str().parse::<MetricName>().unwrap(), *metric);
	}
	assert!("auc".parse::<MetricName>().is_err());
}

#[test]
fn test_metric_set_json() {
	let metrics = MetricSet {
		accuracy: 0.5,
		precision: 0.25,
		recall: 1.0,
		f1: 0.4,
		roc_auc: None,
	};
	let json = serde_json::to_string(&metrics).unwrap();
	assert_eq!(json, r#"{"accuracy":0.5,"precision":0.25,"recall":1.0,"f1":0.4}"#);
}

/*!
This module defines the `Config` struct, which is used to configure a pipeline run with [`pipeline::run`](../pipeline/fn.run.html).

```yaml
metric: f1
sweep:
  t_min: 0.05
  t_max: 0.95
  t_step: 0.05
output_dir: reports
pr_curves: true
models:
  - name: baseline_logreg
    val_input: data/splits/val.csv
    val_preds: preds/logreg_val.csv
    test_input: data/splits/test.csv
    test_preds: preds/logreg_test.csv
```
*/

use crate::{
	error::{Error, Result},
	report::validate_model_name,
};
use cardio_metrics::{MetricName, ThresholdRange};
use std::path::{Path, PathBuf};

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// The metric thresholds are tuned for and models are compared by.
	#[serde(default = "default_metric")]
	pub metric: String,
	#[serde(default)]
	pub sweep: SweepConfig,
	pub output_dir: PathBuf,
	/// Compute a precision recall curve on test for every model.
	#[serde(default)]
	pub pr_curves: bool,
	pub models: Vec<ModelConfig>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
	pub t_min: f64,
	pub t_max: f64,
	pub t_step: f64,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
	pub name: String,
	pub val_input: PathBuf,
	pub val_preds: PathBuf,
	pub test_input: PathBuf,
	pub test_preds: PathBuf,
}

fn default_metric() -> String {
	"f1".to_owned()
}

impl Default for SweepConfig {
	fn default() -> Self {
		let range = ThresholdRange::default();
		Self {
			t_min: range.min(),
			t_max: range.max(),
			t_step: range.step(),
		}
	}
}

impl Config {
	pub fn from_path(path: &Path) -> Result<Self> {
		let text = crate::artifact::read_text(path)?;
		Self::from_yaml(&text)
	}

	pub fn from_yaml(text: &str) -> Result<Self> {
		let config: Config = serde_yaml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	pub fn metric(&self) -> Result<MetricName> {
		Ok(self.metric.parse()?)
	}

	pub fn threshold_range(&self) -> Result<ThresholdRange> {
		Ok(ThresholdRange::new(
			self.sweep.t_min,
			self.sweep.t_max,
			self.sweep.t_step,
		)?)
	}

	fn validate(&self) -> Result<()> {
		self.metric()?;
		self.threshold_range()?;
		if self.models.is_empty() {
			return Err(Error::InvalidConfig("no models are configured".to_owned()));
		}
		for (index, model) in self.models.iter().enumerate() {
			validate_model_name(&model.name)?;
			if self.models[..index]
				.iter()
				.any(|other| other.name == model.name)
			{
				return Err(Error::InvalidConfig(format!(
					"model {:?} is configured more than once",
					model.name
				)));
			}
		}
		Ok(())
	}
}

#[test]
fn test_defaults() {
	let config = Config::from_yaml(
		r#"
output_dir: reports
models:
  - name: baseline_logreg
    val_input: val.csv
    val_preds: logreg_val.csv
    test_input: test.csv
    test_preds: logreg_test.csv
"#,
	)
	.unwrap();
	assert_eq!(config.metric().unwrap(), MetricName::F1);
	assert_eq!(config.threshold_range().unwrap().len(), 19);
	assert!(!config.pr_curves);
	assert_eq!(config.models[0].name, "baseline_logreg");
}

#[test]
fn test_invalid() {
	let models = r#"
models:
  - name: a
    val_input: val.csv
    val_preds: a_val.csv
    test_input: test.csv
    test_preds: a_test.csv
"#;
	let unknown_metric = format!("output_dir: out\nmetric: auc\n{}", models);
	assert!(matches!(
		Config::from_yaml(&unknown_metric),
		Err(Error::InvalidConfig(_))
	));
	let bad_range = format!(
		"output_dir: out\nsweep:\n  t_min: 0.9\n  t_max: 0.1\n  t_step: 0.05\n{}",
		models
	);
	assert!(matches!(
		Config::from_yaml(&bad_range),
		Err(Error::InvalidConfig(_))
	));
	let duplicate = format!(
		"output_dir: out\n{}{}",
		models,
		models.trim_start_matches("\nmodels:\n")
	);
	assert!(matches!(
		Config::from_yaml(&duplicate),
		Err(Error::InvalidConfig(_))
	));
	assert!(matches!(
		Config::from_yaml("output_dir: out\nmodels: []\n"),
		Err(Error::InvalidConfig(_))
	));
	for name in &["\"..\"", "\"a`b\"", "\"a|b\"", "\"a/b\""] {
		let yaml = format!(
			"output_dir: out\nmodels:\n  - name: {}\n    val_input: v.csv\n    val_preds: p.csv\n    test_input: t.csv\n    test_preds: q.csv\n",
			name
		);
		assert!(matches!(
			Config::from_yaml(&yaml),
			Err(Error::InvalidConfig(_))
		));
	}
}

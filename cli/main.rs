//! This module contains the main entrypoint to the cardio cli.

use anyhow::{anyhow, Context, Result};
use cardio_core::{
	clean::run_clean,
	config::Config,
	evaluate::run_evaluate,
	pipeline,
	pr_curve::run_pr_curve,
	report::{run_compare, run_final_report, run_val_report, ModelArtifacts},
	select::run_pick_threshold,
	split::{run_split, SplitOptions},
	sweep::run_sweep,
};
use cardio_metrics::{MetricName, ThresholdRange};
use clap::{Args, Parser};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
	name = "cardio",
	about = "Tune classification thresholds on val, evaluate on test, and compare models.",
	disable_help_subcommand = true
)]
enum Options {
	/// clean a raw dataset
	Clean(CleanOptions),
	/// split a cleaned dataset into train, val and test sets
	Split(SplitCommandOptions),
	/// evaluate a predictions file
	Evaluate(EvaluateOptions),
	/// compute metrics at every threshold of a range
	Sweep(SweepOptions),
	/// pick the best threshold from a sweep csv
	PickThreshold(PickThresholdOptions),
	/// compute the precision recall curve of a predictions file
	PrCurve(PrCurveOptions),
	/// write the report of a model's val-tuned threshold
	ValReport(ValReportOptions),
	/// compare models at their val-tuned thresholds
	Compare(CompareOptions),
	/// aggregate the comparison and per model reports into one document
	FinalReport(FinalReportOptions),
	/// run the whole pipeline from a config file
	Run(RunOptions),
}

#[derive(Args)]
struct CleanOptions {
	/// the path to the raw .csv file
	#[arg(short, long)]
	input: PathBuf,
	/// the path to write the cleaned .csv file to
	#[arg(short, long)]
	output: PathBuf,
}

#[derive(Args)]
struct SplitCommandOptions {
	/// the path to the cleaned .csv file
	#[arg(short, long)]
	input: PathBuf,
	/// the directory to write train.csv, val.csv and test.csv to
	#[arg(short, long)]
	output_dir: PathBuf,
	#[arg(long, default_value_t = 42)]
	seed: u64,
	#[arg(long, default_value_t = 0.15)]
	test_fraction: f64,
	#[arg(long, default_value_t = 0.15)]
	val_fraction: f64,
}

#[derive(Args)]
struct EvaluateOptions {
	/// the path to the ground truth .csv file
	#[arg(short, long)]
	input: PathBuf,
	/// the path to the predictions .csv file
	#[arg(short, long)]
	preds: PathBuf,
	/// the path to write the evaluation .json file to
	#[arg(short, long)]
	output: PathBuf,
	/// derive predicted labels from probabilities at this threshold instead of reading the pred column
	#[arg(long, conflicts_with = "threshold_file")]
	threshold: Option<f64>,
	/// read the threshold from a threshold file
	#[arg(long)]
	threshold_file: Option<PathBuf>,
}

#[derive(Args)]
struct SweepOptions {
	/// the path to the ground truth .csv file
	#[arg(short, long)]
	input: PathBuf,
	/// the path to the predictions .csv file
	#[arg(short, long)]
	preds: PathBuf,
	/// the path to write the sweep .csv file to
	#[arg(short, long)]
	output: PathBuf,
	#[arg(long, default_value_t = 0.05)]
	t_min: f64,
	#[arg(long, default_value_t = 0.95)]
	t_max: f64,
	#[arg(long, default_value_t = 0.05)]
	t_step: f64,
}

#[derive(Args)]
struct PickThresholdOptions {
	/// the path to the sweep .csv file
	#[arg(long)]
	sweep_csv: PathBuf,
	/// the metric to maximize
	#[arg(short, long, default_value = "f1")]
	metric: String,
	/// the path to write the threshold file to
	#[arg(short, long)]
	output: Option<PathBuf>,
}

#[derive(Args)]
struct PrCurveOptions {
	/// the path to the ground truth .csv file
	#[arg(short, long)]
	input: PathBuf,
	/// the path to the predictions .csv file
	#[arg(short, long)]
	preds: PathBuf,
	/// the path to write the curve .csv file to
	#[arg(long)]
	output_csv: PathBuf,
	/// the path to write the markdown summary to
	#[arg(long)]
	output_md: PathBuf,
}

#[derive(Args)]
struct ValReportOptions {
	/// the name of the model
	#[arg(long, default_value = "baseline")]
	name: String,
	/// the path to the sweep .csv file computed on val
	#[arg(long)]
	sweep_csv: PathBuf,
	#[arg(short, long, default_value = "f1")]
	metric: String,
	/// the path to the threshold file
	#[arg(long)]
	threshold_file: PathBuf,
	/// the path to the evaluation .json file computed on test
	#[arg(long)]
	eval_json: PathBuf,
	#[arg(short, long)]
	output: PathBuf,
}

#[derive(Args)]
struct CompareOptions {
	/// a model to compare, as name=eval.json,threshold.txt
	#[arg(long = "model", required = true, value_parser = parse_model_artifacts)]
	models: Vec<ModelArtifacts>,
	#[arg(short, long, default_value = "f1")]
	metric: String,
	#[arg(short, long)]
	output: PathBuf,
}

#[derive(Args)]
struct FinalReportOptions {
	/// the path to the comparison report
	#[arg(long)]
	comparison: PathBuf,
	/// a model's val-tuning report, as name=path
	#[arg(long = "detail", value_parser = parse_named_path)]
	details: Vec<(String, PathBuf)>,
	/// a model's precision recall summary, as name=path
	#[arg(long = "pr-summary", value_parser = parse_named_path)]
	pr_summaries: Vec<(String, PathBuf)>,
	#[arg(short, long)]
	output: PathBuf,
}

#[derive(Args)]
struct RunOptions {
	/// the path to the pipeline config file
	#[arg(short, long)]
	config: PathBuf,
}

fn main() {
	let env = env_logger::Env::default().default_filter_or("cardio_core=info,cardio_cli=info");
	env_logger::Builder::from_env(env)
		.format_level(false)
		.format_module_path(false)
		.format_timestamp(None)
		.init();
	let options = Options::parse();
	let result = match options {
		Options::Clean(options) => cli_clean(options),
		Options::Split(options) => cli_split(options),
		Options::Evaluate(options) => cli_evaluate(options),
		Options::Sweep(options) => cli_sweep(options),
		Options::PickThreshold(options) => cli_pick_threshold(options),
		Options::PrCurve(options) => cli_pr_curve(options),
		Options::ValReport(options) => cli_val_report(options),
		Options::Compare(options) => cli_compare(options),
		Options::FinalReport(options) => cli_final_report(options),
		Options::Run(options) => cli_run(options),
	};
	if let Err(error) = result {
		eprintln!("{}: {:#}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn cli_clean(options: CleanOptions) -> Result<()> {
	let summary = run_clean(&options.input, &options.output)
		.with_context(|| format!("failed to clean {}", options.input.display()))?;
	log::info!(
		"{} rows, {} columns imputed",
		summary.n_rows,
		summary.n_imputed.len()
	);
	Ok(())
}

fn cli_split(options: SplitCommandOptions) -> Result<()> {
	let split_options = SplitOptions {
		seed: options.seed,
		test_fraction: options.test_fraction,
		val_fraction: options.val_fraction,
	};
	run_split(&options.input, &options.output_dir, &split_options)
		.with_context(|| format!("failed to split {}", options.input.display()))?;
	Ok(())
}

fn cli_evaluate(options: EvaluateOptions) -> Result<()> {
	let threshold = match (options.threshold, options.threshold_file.as_ref()) {
		(Some(threshold), _) => Some(threshold),
		(None, Some(path)) => Some(cardio_core::artifact::read_threshold(path)?),
		(None, None) => None,
	};
	let evaluation = run_evaluate(&options.input, &options.preds, &options.output, threshold)
		.with_context(|| format!("failed to evaluate {}", options.preds.display()))?;
	print!("{}", cardio_core::evaluate::to_json(&evaluation)?);
	Ok(())
}

fn cli_sweep(options: SweepOptions) -> Result<()> {
	let range = ThresholdRange::new(options.t_min, options.t_max, options.t_step)?;
	run_sweep(&options.input, &options.preds, &options.output, &range)
		.with_context(|| format!("failed to sweep thresholds for {}", options.preds.display()))?;
	Ok(())
}

fn cli_pick_threshold(options: PickThresholdOptions) -> Result<()> {
	let threshold = run_pick_threshold(
		&options.sweep_csv,
		&options.metric,
		options.output.as_deref(),
	)
	.with_context(|| format!("failed to pick a threshold from {}", options.sweep_csv.display()))?;
	println!("{}", cardio_core::artifact::format_threshold(threshold));
	Ok(())
}

fn cli_pr_curve(options: PrCurveOptions) -> Result<()> {
	run_pr_curve(
		&options.input,
		&options.preds,
		&options.output_csv,
		&options.output_md,
	)
	.with_context(|| format!("failed to compute the pr curve for {}", options.preds.display()))?;
	Ok(())
}

fn cli_val_report(options: ValReportOptions) -> Result<()> {
	run_val_report(
		&options.name,
		&options.sweep_csv,
		&options.metric,
		&options.threshold_file,
		&options.eval_json,
		&options.output,
	)
	.context("failed to write the val-tuning report")?;
	Ok(())
}

fn cli_compare(options: CompareOptions) -> Result<()> {
	let metric: MetricName = options.metric.parse()?;
	let winner = run_compare(&options.models, metric, &options.output)
		.context("failed to compare models")?;
	println!("{}", winner);
	Ok(())
}

fn cli_final_report(options: FinalReportOptions) -> Result<()> {
	let summary = run_final_report(
		&options.comparison,
		&options.details,
		&options.pr_summaries,
		&options.output,
	)
	.context("failed to write the final report")?;
	log::info!("winner by {}: {}", summary.metric, summary.winner);
	Ok(())
}

fn cli_run(options: RunOptions) -> Result<()> {
	let config = Config::from_path(&options.config)
		.with_context(|| format!("failed to load config file {}", options.config.display()))?;
	let output = pipeline::run(&config).context("failed to run the pipeline")?;
	println!("{}", output.summary.winner);
	Ok(())
}

/// Parse `name=path`.
fn parse_named_path(value: &str) -> Result<(String, PathBuf)> {
	let (name, path) = value
		.split_once('=')
		.ok_or_else(|| anyhow!("expected name=path, got {:?}", value))?;
	if name.is_empty() || path.is_empty() {
		return Err(anyhow!("expected name=path, got {:?}", value));
	}
	Ok((name.to_owned(), PathBuf::from(path)))
}

/// Parse `name=eval.json,threshold.txt`.
fn parse_model_artifacts(value: &str) -> Result<ModelArtifacts> {
	let (name, paths) = parse_named_path(value)?;
	let paths = paths.to_string_lossy().into_owned();
	let (eval_json, threshold_file) = paths
		.split_once(',')
		.ok_or_else(|| anyhow!("expected name=eval.json,threshold.txt, got {:?}", value))?;
	Ok(ModelArtifacts {
		name,
		eval_json: PathBuf::from(eval_json),
		threshold_file: PathBuf::from(threshold_file),
	})
}

#[test]
fn test_parse_model_artifacts() {
	let artifacts = parse_model_artifacts("rf=out/rf/eval_test.json,out/rf/threshold.txt").unwrap();
	assert_eq!(artifacts.name, "rf");
	assert_eq!(artifacts.eval_json, PathBuf::from("out/rf/eval_test.json"));
	assert_eq!(artifacts.threshold_file, PathBuf::from("out/rf/threshold.txt"));
	assert!(parse_model_artifacts("rf=eval.json").is_err());
	assert!(parse_named_path("=report.md").is_err());
}

#[test]
fn test_options() {
	use clap::CommandFactory;
	Options::command().debug_assert();
}

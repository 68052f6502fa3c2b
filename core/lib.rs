/*!
This crate implements the stages of the cardio pipeline: cleaning and splitting a dataset, aligning predictions with ground truth, evaluating predictions, sweeping and selecting classification thresholds, computing precision recall summaries, and rendering markdown reports. Every stage reads its inputs from disk, computes in memory, and writes all of its outputs only once everything has been computed.
*/

#![allow(clippy::tabs_in_doc_comments)]

pub mod align;
pub mod artifact;
pub mod clean;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod pipeline;
pub mod pr_curve;
pub mod report;
pub mod select;
pub mod split;
pub mod sweep;

pub use self::error::{Error, Result};

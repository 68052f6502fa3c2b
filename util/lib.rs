/*!
This crate contains small utilities shared by the other cardio crates: a `Finite` wrapper that gives floats a total order, a markdown table renderer, and file system helpers.
*/

#![allow(clippy::tabs_in_doc_comments)]

pub mod finite;
pub mod fs;
pub mod table;

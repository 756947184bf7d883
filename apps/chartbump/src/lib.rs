//! chartbump core library.
//!
//! This crate exposes programmatic APIs for detecting, from `ct lint`
//! output, that a Helm chart's version was not bumped, and for bumping the
//! patch version in `Chart.yaml` without disturbing the rest of the file.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `detect`: Lint output classifier and multi-chart extractor.
//! - `manifest`: `Chart.yaml` reading and format-preserving version update.
//! - `version`: Patch version arithmetic.
//! - `tools`: `helm` / `ct` invocation behind the `ChartTools` trait.
//! - `workflow`: Single-chart and batch bump workflows.
//! - `models`: Chart manifest and run report structs.
//! - `output`: Human/JSON printers.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod manifest;
pub mod models;
pub mod output;
pub mod tools;
pub mod utils;
pub mod version;
pub mod workflow;

pub use error::{Error, Result};

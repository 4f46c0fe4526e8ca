//! Use case orchestration for scanforge.
//!
//! This crate provides the application layer: the report-generation use
//! case that coordinates extraction, aggregation, assembly, chart
//! rendering and compilation. It is intentionally thin and delegates the
//! heavy lifting to the appropriate layers.
//!
//! The CLI crate depends on this; it only handles argument parsing and
//! logging setup.

#![forbid(unsafe_code)]

pub mod placeholders;
mod report;

pub use report::{run_report, ReportInput, ReportOutput};

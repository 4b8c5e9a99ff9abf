//! Output formatting module
//!
//! Provides various output formats for run results.

mod formatter;

pub use formatter::{write_report_to_file, OutputFormat, ResultFormatter, RunReport};

//! Output formatters for run results
//!
//! Provides text, JSON, and summary output formats.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::models::{PackageSpec, RunResult, StepOutput};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// A run result tagged with the operation and package it came from
#[derive(Clone, Debug, Serialize)]
pub struct RunReport<'a> {
    pub operation: &'a str,
    pub package: &'a PackageSpec,
    pub recorded_at: DateTime<Utc>,
    pub result: &'a RunResult,
}

impl<'a> RunReport<'a> {
    pub fn new(operation: &'a str, package: &'a PackageSpec, result: &'a RunResult) -> Self {
        Self {
            operation,
            package,
            recorded_at: Utc::now(),
            result,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a workflow report
    pub fn format_report(&self, report: &RunReport<'_>) -> String {
        match self.format {
            OutputFormat::Text => self.format_report_text(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Summary => self.format_report_summary(report),
        }
    }

    fn status(&self, successful: bool) -> &'static str {
        match (successful, self.colorize) {
            (true, true) => "\x1b[32m✓ SUCCESS\x1b[0m",
            (false, true) => "\x1b[31m✗ FAILURE\x1b[0m",
            (true, false) => "✓ SUCCESS",
            (false, false) => "✗ FAILURE",
        }
    }

    fn format_report_text(&self, report: &RunReport<'_>) -> String {
        let mut output = String::new();

        output.push_str("\n═══════════════════════════════════════════════════════════════\n");
        output.push_str(&format!(" {} {}\n", report.operation, report.package));
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str(&report.result.transcript);
        if !report.result.transcript.ends_with('\n') {
            output.push('\n');
        }
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            " {} | last success: {}\n",
            self.status(report.result.successful),
            report.result.kind
        ));

        output
    }

    fn format_report_summary(&self, report: &RunReport<'_>) -> String {
        format!(
            "{} {} {}: {}",
            self.status(report.result.successful),
            report.operation,
            report.package,
            report.result.kind
        )
    }

    /// Format a single raw step
    pub fn format_step(&self, step: &StepOutput) -> String {
        match self.format {
            OutputFormat::Text => format!("{}\n{}", step.block(), step),
            OutputFormat::Json => serde_json::to_string(step).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(step).unwrap_or_default(),
            OutputFormat::Summary => format!(
                "{} {} ({}ms)",
                self.status(step.succeeded()),
                step.command,
                step.duration_ms
            ),
        }
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}

/// Write a report to a file
pub fn write_report_to_file(
    path: &str,
    report: &RunReport<'_>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_report(report);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

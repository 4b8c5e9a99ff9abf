//! Run result models
//!
//! A `StepOutput` is the raw outcome of one child process. A `RunResult`
//! folds one or more steps of a workflow into a single verdict and transcript.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which workflow step last completed successfully
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Initial value, and the value kept when no step has succeeded
    #[default]
    Failure,
    ConfigureSucceeded,
    BuildSucceeded,
    HaddockSucceeded,
    InstallSucceeded,
    TestSucceeded,
    BenchSucceeded,
}

impl OutcomeKind {
    pub fn name(&self) -> &'static str {
        match self {
            OutcomeKind::Failure => "Failure",
            OutcomeKind::ConfigureSucceeded => "Configure Succeeded",
            OutcomeKind::BuildSucceeded => "Build Succeeded",
            OutcomeKind::HaddockSucceeded => "Haddock Succeeded",
            OutcomeKind::InstallSucceeded => "Install Succeeded",
            OutcomeKind::TestSucceeded => "Test Succeeded",
            OutcomeKind::BenchSucceeded => "Bench Succeeded",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Raw outcome of a single process invocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutput {
    /// Quoted command line plus the working directory it ran in
    pub command: String,

    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,

    /// Combined stdout and stderr, in the order the child wrote it
    pub output: String,

    pub duration_ms: u64,
}

impl StepOutput {
    pub fn new(command: impl Into<String>, exit_code: Option<i32>, output: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            exit_code,
            output: output.into(),
            duration_ms: 0,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Transcript block for this step
    pub fn block(&self) -> String {
        format!("{}\n{}", self.command, self.output)
    }
}

impl fmt::Display for StepOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "{} exited with {code}", self.command),
            None => write!(f, "{} terminated by signal", self.command),
        }
    }
}

/// Accumulated outcome of a chained workflow operation.
///
/// `successful` is the only authoritative verdict: a fresh result and a
/// failed one both carry `OutcomeKind::Failure`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub successful: bool,
    pub kind: OutcomeKind,
    pub transcript: String,
}

impl Default for RunResult {
    fn default() -> Self {
        Self::new()
    }
}

impl RunResult {
    pub fn new() -> Self {
        Self {
            successful: true,
            kind: OutcomeKind::Failure,
            transcript: String::new(),
        }
    }

    /// Fold a step into the result, tagging `on_success` if it exited zero
    pub fn record(mut self, step: &StepOutput, on_success: OutcomeKind) -> Self {
        if step.succeeded() {
            self.kind = on_success;
        } else {
            self.successful = false;
        }
        self.append(step)
    }

    /// Append a step's block to the transcript without touching the verdict
    pub fn append(mut self, step: &StepOutput) -> Self {
        if !self.transcript.is_empty() {
            self.transcript.push('\n');
        }
        self.transcript.push_str(&step.block());
        self
    }

    /// Transcript with carriage returns stripped and line breaks collapsed to spaces
    pub fn normalized_output(&self) -> String {
        self.transcript
            .replace('\r', "")
            .lines()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.successful { "SUCCESS" } else { "FAILURE" };
        write!(f, "{verdict} ({})", self.kind)
    }
}

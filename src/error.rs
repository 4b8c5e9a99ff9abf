//! Harness errors
//!
//! Step failures are recorded in a `RunResult`; only conditions that make the
//! rest of a workflow meaningless surface as a `HarnessError`.

use std::io;
use thiserror::Error;

use crate::assertions::AssertionError;

/// Fatal harness errors
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Failed to launch {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to capture output of {command}: {source}")]
    Capture {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Clean failed: {command}\n{output}")]
    CleanFailed { command: String, output: String },

    #[error("Compiling custom build script failed: {command}\n{output}")]
    SetupCompileFailed { command: String, output: String },

    #[error("Unregistering {library} failed: {command}\n{output}")]
    UnregisterFailed {
        library: String,
        command: String,
        output: String,
    },

    #[error("Invalid value {value:?} for {var}: expected silent, normal, verbose, deafening or 0-3")]
    InvalidVerbosity { var: String, value: String },

    #[error(transparent)]
    Assertion(#[from] AssertionError),
}

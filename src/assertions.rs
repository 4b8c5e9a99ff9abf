//! Assertions over completed run results
//!
//! Each check passes silently or returns an `AssertionError` carrying the
//! full transcript. Output checks compare against the transcript with
//! carriage returns removed and line breaks collapsed to single spaces.

use thiserror::Error;

use crate::models::RunResult;

/// A failed expectation about a run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}\n{transcript}")]
pub struct AssertionError {
    pub message: String,
    pub transcript: String,
}

impl AssertionError {
    fn new(message: impl Into<String>, result: &RunResult) -> Self {
        Self {
            message: message.into(),
            transcript: result.transcript.clone(),
        }
    }
}

/// The whole chain exited successfully
pub fn succeeded(result: &RunResult) -> Result<(), AssertionError> {
    if result.successful {
        Ok(())
    } else {
        Err(AssertionError::new(
            format!("Expected success, but got failure (last success: {}):", result.kind),
            result,
        ))
    }
}

/// Some step of the chain failed
pub fn failed(result: &RunResult) -> Result<(), AssertionError> {
    if result.successful {
        Err(AssertionError::new(
            format!("Expected failure, but got success ({}):", result.kind),
            result,
        ))
    } else {
        Ok(())
    }
}

pub fn output_contains(needle: &str, result: &RunResult) -> Result<(), AssertionError> {
    if result.normalized_output().contains(needle) {
        Ok(())
    } else {
        Err(AssertionError::new(
            format!("Expected output to contain '{needle}', output was:"),
            result,
        ))
    }
}

pub fn output_does_not_contain(needle: &str, result: &RunResult) -> Result<(), AssertionError> {
    if result.normalized_output().contains(needle) {
        Err(AssertionError::new(
            format!("Expected output not to contain '{needle}', output was:"),
            result,
        ))
    } else {
        Ok(())
    }
}

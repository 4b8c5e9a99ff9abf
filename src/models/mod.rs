//! Data models for package workflow runs
//!
//! Packages under test, verbosity levels, and accumulated run results.

mod package;
mod run_result;
mod verbosity;

pub use package::PackageSpec;
pub use run_result::{OutcomeKind, RunResult, StepOutput};
pub use verbosity::Verbosity;

//! pkgtest-harness - drive a package build tool against sample packages
//!
//! Runs the build tool's verbs (configure, build, haddock, install, test,
//! bench, unregister) as child processes, one at a time, folds their exit
//! status and combined output into a `RunResult`, and offers assertions
//! over the result.
//!
//! Diagnostics, including the command echo at verbose levels, are `tracing`
//! events. Install a subscriber (`utils::init_logger` does) to see them.
//!
//! ```no_run
//! use pkgtest_harness::{assertions, PackageSpec, SuiteConfig, Workflow};
//!
//! # async fn demo() -> Result<(), pkgtest_harness::HarnessError> {
//! let workflow = Workflow::new(SuiteConfig::from_env()?);
//! let package = PackageSpec::new("tests/packages/samplePkg");
//!
//! let result = workflow.build(&package).await?;
//! assertions::succeeded(&result)?;
//! assertions::output_contains("Linking", &result)?;
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod output;
pub mod utils;
pub mod workflow;

pub use config::SuiteConfig;
pub use error::HarnessError;
pub use models::{OutcomeKind, PackageSpec, RunResult, StepOutput, Verbosity};
pub use workflow::Workflow;

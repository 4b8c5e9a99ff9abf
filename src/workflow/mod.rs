//! Workflow operations
//!
//! One operation per build-tool verb. Each is a short fixed chain of steps
//! that stops at the first failing step and writes the accumulated
//! transcript into the package directory.

mod operations;

pub use operations::{Workflow, NOT_FOUND_MARKER};

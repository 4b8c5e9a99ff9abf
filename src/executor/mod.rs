//! Process execution engine
//!
//! Runs external tools one at a time and decides which driver handles a
//! build-tool verb.

mod dispatcher;
mod process;

pub use dispatcher::{Dispatcher, SetupDispatcher};
pub use process::{describe, resolve_executable, resolve_executable_in, ProcessRunner};

//! Child process execution
//!
//! Runs one executable at a time with stdout and stderr merged into a single
//! pipe, so the captured text keeps the exact order the child wrote it in.
//! There is no timeout: a child that never exits blocks the caller.

use std::env;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::HarnessError;
use crate::models::{StepOutput, Verbosity};
use crate::utils::Timer;

/// Runs external commands and captures their combined output
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner {
    verbosity: Verbosity,
}

impl ProcessRunner {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Run `program` with `args` in `cwd` (or the current directory) to completion
    pub async fn run(
        &self,
        cwd: Option<&Path>,
        program: &Path,
        args: &[String],
    ) -> Result<StepOutput, HarnessError> {
        let program = resolve_executable(program);

        if self.verbosity.is_verbose() {
            info!("{} {}", program.display(), args.join(" "));
        }

        let dir = match cwd {
            Some(dir) => dir.to_path_buf(),
            None => env::current_dir().map_err(|source| HarnessError::Spawn {
                command: program.display().to_string(),
                source,
            })?,
        };
        let command = describe(&program, args, &dir);
        let timer = Timer::start(&command);

        let spawn_err = |source| HarnessError::Spawn {
            command: command.clone(),
            source,
        };

        let (mut reader, writer) = io::pipe().map_err(spawn_err)?;
        let err_writer = writer.try_clone().map_err(spawn_err)?;

        // The Command owns our copies of the write end; it has to be dropped
        // before reading or the pipe never reports end-of-stream.
        let mut child = {
            let mut cmd = Command::new(&program);
            cmd.args(args).stdout(writer).stderr(err_writer);
            if let Some(dir) = cwd {
                cmd.current_dir(dir);
            }
            cmd.spawn().map_err(spawn_err)?
        };

        let captured = tokio::task::spawn_blocking(move || {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).map(|_| buf)
        })
        .await
        .map_err(io::Error::other)
        .and_then(|read| read)
        .map_err(|source| HarnessError::Capture {
            command: command.clone(),
            source,
        })?;

        let status = child
            .wait()
            .await
            .map_err(|source| HarnessError::Capture {
                command: command.clone(),
                source,
            })?;

        let duration_ms = timer.stop();
        debug!("{} -> {:?}", command, status.code());

        Ok(StepOutput::new(
            command,
            status.code(),
            String::from_utf8_lossy(&captured).into_owned(),
        )
        .with_duration(duration_ms))
    }
}

/// Resolve an executable path so a working-directory change cannot break lookup.
///
/// The path is anchored to the current directory; when nothing exists at the
/// literal path the platform executable suffix is appended. A bare name with
/// no file behind it in either form is left alone for `PATH` lookup.
pub fn resolve_executable(path: &Path) -> PathBuf {
    match env::current_dir() {
        Ok(base) => resolve_executable_in(path, &base),
        Err(_) => path.to_path_buf(),
    }
}

/// [`resolve_executable`] against an explicit base directory
pub fn resolve_executable_in(path: &Path, base: &Path) -> PathBuf {
    let literal = base.join(path);
    let candidate = if literal.is_file() {
        literal
    } else {
        let mut with_suffix = literal.into_os_string();
        with_suffix.push(env::consts::EXE_SUFFIX);
        PathBuf::from(with_suffix)
    };

    let bare = !path.is_absolute() && path.components().count() <= 1;
    if bare && !candidate.is_file() {
        return path.to_path_buf();
    }

    std::path::absolute(&candidate).unwrap_or(candidate)
}

/// Human-readable command line plus working directory
pub fn describe(program: &Path, args: &[String], dir: &Path) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    format!("\"{line}\" in {}", dir.display())
}

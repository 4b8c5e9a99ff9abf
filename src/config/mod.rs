//! Configuration module
//!
//! A `SuiteConfig` is assembled once at startup (defaults, then file, then
//! environment) and passed down into every workflow.

mod env;
mod file;

pub use env::{EnvBuilder, EnvConfig, EnvGuard, VERBOSITY_VAR};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::HarnessError;
use crate::models::Verbosity;

/// Harness configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Compiler passed to configure and used to build custom scripts
    pub compiler: PathBuf,

    /// Package registry tool used by unregister
    pub registry_tool: PathBuf,

    /// Shared pre-built driver, relative to the current directory
    pub driver: PathBuf,

    /// In-place package registry referenced when compiling custom scripts
    pub inplace_db: PathBuf,

    /// Custom build script looked up inside each package
    pub setup_script: String,

    /// Executable name the custom script compiles to
    pub setup_exe: String,

    /// Transcript file written inside each package
    pub log_file: String,

    pub verbosity: Verbosity,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            compiler: PathBuf::from("ghc"),
            registry_tool: PathBuf::from("ghc-pkg"),
            driver: PathBuf::from("dist/setup/setup"),
            inplace_db: PathBuf::from("dist/package.conf.inplace"),
            setup_script: "Setup.hs".to_string(),
            setup_exe: "setup".to_string(),
            log_file: "test-log.txt".to_string(),
            verbosity: Verbosity::default(),
        }
    }
}

impl SuiteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compiler(mut self, path: impl Into<PathBuf>) -> Self {
        self.compiler = path.into();
        self
    }

    pub fn registry_tool(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_tool = path.into();
        self
    }

    pub fn driver(mut self, path: impl Into<PathBuf>) -> Self {
        self.driver = path.into();
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self, HarnessError> {
        Ok(Self::default().with_env(&EnvConfig::load()?))
    }

    /// Apply environment overrides on top of this configuration
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(verbosity) = env.verbosity {
            self.verbosity = verbosity;
        }
        if let Some(ref compiler) = env.compiler {
            self.compiler = compiler.into();
        }
        if let Some(ref tool) = env.registry_tool {
            self.registry_tool = tool.into();
        }
        if let Some(ref driver) = env.driver {
            self.driver = driver.into();
        }
        self
    }
}

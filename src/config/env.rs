//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration. The
//! environment is read once, at startup, by `EnvConfig::load`.

use std::env::{self, VarError};

use crate::error::HarnessError;
use crate::models::Verbosity;

/// Environment variable prefix
const ENV_PREFIX: &str = "PKGTEST";

/// Variable controlling harness verbosity
pub const VERBOSITY_VAR: &str = "PKGTEST_VERBOSITY";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Verbosity from PKGTEST_VERBOSITY
    pub verbosity: Option<Verbosity>,
    /// Compiler from PKGTEST_COMPILER
    pub compiler: Option<String>,
    /// Registry tool from PKGTEST_REGISTRY_TOOL
    pub registry_tool: Option<String>,
    /// Shared driver from PKGTEST_DRIVER
    pub driver: Option<String>,
    /// Config file from PKGTEST_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    ///
    /// An unset verbosity means "use the default"; any value that does not
    /// parse is an error.
    pub fn load() -> Result<Self, HarnessError> {
        Ok(Self {
            verbosity: get_verbosity()?,
            compiler: get_env("COMPILER"),
            registry_tool: get_env("REGISTRY_TOOL"),
            driver: get_env("DRIVER"),
            config_file: get_env("CONFIG"),
        })
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.verbosity.is_some()
            || self.compiler.is_some()
            || self.registry_tool.is_some()
            || self.driver.is_some()
            || self.config_file.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {VERBOSITY_VAR}:      {:?}", self.verbosity);
        println!("  {ENV_PREFIX}_COMPILER:       {:?}", self.compiler);
        println!("  {ENV_PREFIX}_REGISTRY_TOOL:  {:?}", self.registry_tool);
        println!("  {ENV_PREFIX}_DRIVER:         {:?}", self.driver);
        println!("  {ENV_PREFIX}_CONFIG:         {:?}", self.config_file);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

fn get_verbosity() -> Result<Option<Verbosity>, HarnessError> {
    match env::var(VERBOSITY_VAR) {
        Ok(value) => Verbosity::from_str(&value)
            .map(Some)
            .ok_or(HarnessError::InvalidVerbosity {
                var: VERBOSITY_VAR.to_string(),
                value,
            }),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(HarnessError::InvalidVerbosity {
            var: VERBOSITY_VAR.to_string(),
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, Option<String>)>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn verbosity(mut self, value: impl Into<String>) -> Self {
        self.vars
            .push((VERBOSITY_VAR.to_string(), Some(value.into())));
        self
    }

    /// Remove the verbosity variable for the guard's lifetime
    pub fn no_verbosity(mut self) -> Self {
        self.vars.push((VERBOSITY_VAR.to_string(), None));
        self
    }

    pub fn compiler(mut self, path: impl Into<String>) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_COMPILER"), Some(path.into())));
        self
    }

    pub fn driver(mut self, path: impl Into<String>) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_DRIVER"), Some(path.into())));
        self
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.verbosity.is_none());
        assert!(!config.has_any());
    }

    // All cases touch the same process-wide variables, so they run in one test.
    #[test]
    fn test_env_loading() {
        {
            let _guard = EnvBuilder::new().no_verbosity().apply_scoped();
            let config = EnvConfig::load().unwrap();
            assert_eq!(config.verbosity, None);
        }

        {
            let _guard = EnvBuilder::new()
                .verbosity("verbose")
                .compiler("/usr/local/bin/ghc")
                .driver("/tmp/setup")
                .apply_scoped();
            let config = EnvConfig::load().unwrap();
            assert_eq!(config.verbosity, Some(Verbosity::Verbose));
            assert_eq!(config.compiler.as_deref(), Some("/usr/local/bin/ghc"));
            assert_eq!(config.driver.as_deref(), Some("/tmp/setup"));
            assert!(config.has_any());
        }

        {
            let _guard = EnvBuilder::new().verbosity("chatty").apply_scoped();
            let err = EnvConfig::load().unwrap_err();
            assert!(matches!(
                err,
                HarnessError::InvalidVerbosity { ref value, .. } if value == "chatty"
            ));
        }
    }
}

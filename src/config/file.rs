//! Configuration file management
//!
//! Handles finding, loading, and saving configuration files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::SuiteConfig;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./pkgtest.yaml",
    "./pkgtest.yml",
    "./.pkgtest.yaml",
    "~/.config/pkgtest/config.yaml",
];

impl SuiteConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location, or defaults if none exists
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    ///
    /// Tool paths written as `~/...` are expanded against the home directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let parsed = if is_yaml_file(path) {
            serde_yaml::from_str::<Self>(&content).map_err(anyhow::Error::from)
        } else {
            serde_json::from_str::<Self>(&content).map_err(anyhow::Error::from)
        };
        let mut config =
            parsed.with_context(|| format!("Invalid config file: {}", path.display()))?;

        for tool in [
            &mut config.compiler,
            &mut config.registry_tool,
            &mut config.driver,
            &mut config.inplace_db,
        ] {
            if let Some(raw) = tool.to_str() {
                *tool = expand_path(raw);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.log_file.trim().is_empty() {
            anyhow::bail!("log_file must not be empty");
        }
        if self.setup_script.trim().is_empty() || self.setup_exe.trim().is_empty() {
            anyhow::bail!("setup_script and setup_exe must not be empty");
        }
        if Path::new(&self.log_file).is_absolute() {
            anyhow::bail!(
                "log_file must be relative to the package directory: {}",
                self.log_file
            );
        }
        Ok(())
    }
}

/// Expand `~/` to the home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

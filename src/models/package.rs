//! Sample package description

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A sample package exercised by the harness
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Package directory
    directory: PathBuf,

    /// Extra options passed to the configure step
    config_opts: Vec<String>,

    /// Optional build directory handed to every build-tool invocation
    build_dir: Option<PathBuf>,
}

impl PackageSpec {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            config_opts: Vec::new(),
            build_dir: None,
        }
    }

    pub fn with_config_opts<I, S>(mut self, opts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_opts = opts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = Some(dir.into());
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn config_opts(&self) -> &[String] {
        &self.config_opts
    }

    /// `--builddir=` flag when a build directory is set
    pub fn build_dir_flag(&self) -> Option<String> {
        self.build_dir
            .as_ref()
            .map(|dir| format!("--builddir={}", dir.display()))
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.directory.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_defaults() {
        let spec = PackageSpec::new("samplePkg");
        assert_eq!(spec.directory(), Path::new("samplePkg"));
        assert!(spec.config_opts().is_empty());
        assert_eq!(spec.build_dir_flag(), None);
    }

    #[test]
    fn test_package_builder() {
        let spec = PackageSpec::new("samplePkg")
            .with_config_opts(["--enable-tests", "--ghc-option=-Werror"])
            .with_build_dir("dist-test");

        assert_eq!(spec.config_opts().len(), 2);
        assert_eq!(spec.build_dir_flag().as_deref(), Some("--builddir=dist-test"));
        assert_eq!(spec.to_string(), "samplePkg");
    }
}

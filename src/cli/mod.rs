//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Drive package build tool workflows against sample packages
#[derive(Parser, Debug)]
#[command(name = "pkgtest")]
#[command(author = "hephaex@gmail.com")]
#[command(version)]
#[command(about = "Run configure/build/haddock/install/test/bench against sample packages")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clean and configure a package
    Configure(PackageArgs),

    /// Configure and build a package
    Build(PackageArgs),

    /// Configure and generate documentation
    Haddock(PackageArgs),

    /// Build and install a package
    Install(PackageArgs),

    /// Run a package's test suites
    Test(PackageArgs),

    /// Run a package's benchmarks
    Bench(PackageArgs),

    /// Remove a library from the user package registry
    Unregister {
        /// Library name
        library: String,
    },

    /// Compile a package's custom build script
    CompileSetup {
        /// Package directory
        dir: PathBuf,
    },

    /// Run an executable built inside a package
    Run {
        /// Package directory
        dir: PathBuf,

        /// Executable path, relative to the package directory
        exe: PathBuf,

        /// Arguments for the executable
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Inspect configuration
    Config(ConfigArgs),
}

/// Arguments shared by the package workflow commands
#[derive(Parser, Debug)]
pub struct PackageArgs {
    /// Package directory
    pub dir: PathBuf,

    /// Extra configure option (repeatable)
    #[arg(short, long = "opt", allow_hyphen_values = true)]
    pub opts: Vec<String>,

    /// Build directory passed to every build-tool invocation
    #[arg(long)]
    pub builddir: Option<PathBuf>,

    /// Output format (text, json, json-pretty, summary)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Expect the workflow to fail
    #[arg(long)]
    pub expect_failure: bool,

    /// Require this text in the transcript (repeatable)
    #[arg(long)]
    pub contains: Vec<String>,

    /// Forbid this text in the transcript (repeatable)
    #[arg(long)]
    pub not_contains: Vec<String>,

    /// Save the report to a file
    #[arg(long)]
    pub output: Option<String>,

    /// Extra arguments for haddock, test and bench
    #[arg(last = true)]
    pub extra: Vec<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Target path
        #[arg(default_value = "pkgtest.yaml")]
        path: PathBuf,
    },
}

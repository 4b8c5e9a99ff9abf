//! pkgtest - drive package build tool workflows from the command line
//!
//! ## Usage
//!
//! ```bash
//! # Clean, configure and build a sample package
//! pkgtest build tests/packages/samplePkg
//!
//! # Expect configure to reject an option
//! pkgtest configure samplePkg --opt=--bogus --expect-failure
//!
//! # Run test suites with extra arguments
//! pkgtest test samplePkg -- --show-details=always
//!
//! # Drop a library from the user registry (no-op if absent)
//! pkgtest unregister mylib
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use pkgtest_harness::assertions::{self, AssertionError};
use pkgtest_harness::cli::{Args, Command, ConfigAction, PackageArgs};
use pkgtest_harness::config::EnvConfig;
use pkgtest_harness::output::{write_report_to_file, OutputFormat, ResultFormatter, RunReport};
use pkgtest_harness::utils::init_logger;
use pkgtest_harness::{PackageSpec, RunResult, SuiteConfig, Verbosity, Workflow};

#[derive(Clone, Copy, Debug)]
enum Operation {
    Configure,
    Build,
    Haddock,
    Install,
    Test,
    Bench,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Configure => "configure",
            Operation::Build => "build",
            Operation::Haddock => "haddock",
            Operation::Install => "install",
            Operation::Test => "test",
            Operation::Bench => "bench",
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let (config, env) = load_config(&args)?;

    init_logger(config.verbosity.to_log_level());

    match args.command {
        Command::Configure(pkg) => run_operation(config, Operation::Configure, pkg).await,
        Command::Build(pkg) => run_operation(config, Operation::Build, pkg).await,
        Command::Haddock(pkg) => run_operation(config, Operation::Haddock, pkg).await,
        Command::Install(pkg) => run_operation(config, Operation::Install, pkg).await,
        Command::Test(pkg) => run_operation(config, Operation::Test, pkg).await,
        Command::Bench(pkg) => run_operation(config, Operation::Bench, pkg).await,
        Command::Unregister { library } => {
            if Workflow::new(config).unregister(&library).await? {
                println!("Unregistered {library}");
            } else {
                println!("{library} is not registered");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::CompileSetup { dir } => compile_setup(config, dir).await,
        Command::Run { dir, exe, args } => {
            let workflow = Workflow::new(config);
            let step = workflow
                .run_executable(&PackageSpec::new(dir), &exe, &args)
                .await?;
            println!("{}", ResultFormatter::default().format_step(&step));
            Ok(exit_code(step.succeeded()))
        }
        Command::Config(config_args) => match config_args.action {
            ConfigAction::Show => {
                let yaml = serde_yaml::to_string(&config).context("Failed to serialize config")?;
                println!("{yaml}");
                env.print_summary();
                Ok(ExitCode::SUCCESS)
            }
            ConfigAction::Init { path } => {
                SuiteConfig::default().save(&path)?;
                println!("Configuration written to {}", path.display());
                Ok(ExitCode::SUCCESS)
            }
        },
    }
}

/// Defaults < config file < environment < command line
fn load_config(args: &Args) -> Result<(SuiteConfig, EnvConfig)> {
    let env = EnvConfig::load()?;

    let file = args
        .config
        .clone()
        .or_else(|| env.config_file.as_ref().map(PathBuf::from));
    let base = match file {
        Some(path) => SuiteConfig::load(&path)?,
        None => SuiteConfig::load_default()?,
    };

    let mut config = base.with_env(&env);
    if args.verbose {
        config.verbosity = config.verbosity.max(Verbosity::Verbose);
    }

    Ok((config, env))
}

async fn run_operation(
    config: SuiteConfig,
    operation: Operation,
    args: PackageArgs,
) -> Result<ExitCode> {
    let format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", args.format))?;

    let mut package = PackageSpec::new(&args.dir).with_config_opts(args.opts.iter().cloned());
    if let Some(ref dir) = args.builddir {
        package = package.with_build_dir(dir);
    }

    let workflow = Workflow::new(config);
    let result = match operation {
        Operation::Configure => workflow.configure(&package).await?,
        Operation::Build => workflow.build(&package).await?,
        Operation::Haddock => workflow.haddock(&package, &args.extra).await?,
        Operation::Install => workflow.install(&package).await?,
        Operation::Test => workflow.test(&package, &args.extra).await?,
        Operation::Bench => workflow.bench(&package, &args.extra).await?,
    };

    let report = RunReport::new(operation.name(), &package, &result);
    println!("{}", ResultFormatter::new(format).format_report(&report));

    if let Some(ref path) = args.output {
        write_report_to_file(path, &report, format)?;
        info!("Report saved to {}", path);
    }

    match check_expectations(&args, &result) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn check_expectations(args: &PackageArgs, result: &RunResult) -> Result<(), AssertionError> {
    if args.expect_failure {
        assertions::failed(result)?;
    } else {
        assertions::succeeded(result)?;
    }
    for needle in &args.contains {
        assertions::output_contains(needle, result)?;
    }
    for needle in &args.not_contains {
        assertions::output_does_not_contain(needle, result)?;
    }
    Ok(())
}

async fn compile_setup(config: SuiteConfig, dir: PathBuf) -> Result<ExitCode> {
    let script = config.setup_script.clone();
    let workflow = Workflow::new(config);

    match workflow.compile_setup(&PackageSpec::new(&dir)).await? {
        Some(step) => println!("{}", ResultFormatter::default().format_step(&step)),
        None => println!("No {} in {}, the shared driver is used", script, dir.display()),
    }
    Ok(ExitCode::SUCCESS)
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgtest_harness::{OutcomeKind, StepOutput};

    fn package_args(extra: &[&str]) -> PackageArgs {
        let mut argv = vec!["build", "samplePkg"];
        argv.extend_from_slice(extra);
        PackageArgs::parse_from(argv)
    }

    fn failed_result() -> RunResult {
        let step = StepOutput::new("\"setup build -v\" in samplePkg", Some(1), "src/Foo.hs:3:1: error\n");
        RunResult::new().record(&step, OutcomeKind::BuildSucceeded)
    }

    #[test]
    fn test_expectation_failure_carries_transcript() {
        let err = check_expectations(&package_args(&[]), &failed_result()).unwrap_err();
        let logged = err.to_string();

        assert!(logged.starts_with("Expected success"));
        assert!(logged.contains("src/Foo.hs:3:1: error"));
    }

    #[test]
    fn test_expected_failure_with_needle() {
        let args = package_args(&["--expect-failure", "--contains", "Foo.hs:3:1"]);
        check_expectations(&args, &failed_result()).unwrap();

        let args = package_args(&["--expect-failure", "--not-contains", "error"]);
        assert!(check_expectations(&args, &failed_result()).is_err());
    }
}

//! Build-tool verbs
//!
//! `build` implies `configure`, `install` implies `build`; `test` and
//! `bench` run on their own. A failing step ends the chain and its result is
//! returned as-is. Clean, custom-script compilation and unexpected
//! unregister failures abort with an error instead.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::SuiteConfig;
use crate::error::HarnessError;
use crate::executor::{Dispatcher, SetupDispatcher};
use crate::models::{OutcomeKind, PackageSpec, RunResult, StepOutput};

/// Registry output meaning the library was never registered
pub const NOT_FOUND_MARKER: &str = "cannot find package";

/// Runs build-tool workflows against sample packages
pub struct Workflow<D = SetupDispatcher> {
    config: SuiteConfig,
    dispatcher: D,
}

impl Workflow<SetupDispatcher> {
    pub fn new(config: SuiteConfig) -> Self {
        let dispatcher = SetupDispatcher::new(&config);
        Self { config, dispatcher }
    }
}

impl<D: Dispatcher> Workflow<D> {
    pub fn with_dispatcher(config: SuiteConfig, dispatcher: D) -> Self {
        Self { config, dispatcher }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Clean, then configure
    pub async fn configure(&self, package: &PackageSpec) -> Result<RunResult, HarnessError> {
        let result = self.do_configure(package).await?;
        self.record(package, &result);
        Ok(result)
    }

    /// Configure, then build verbosely
    pub async fn build(&self, package: &PackageSpec) -> Result<RunResult, HarnessError> {
        let result = self.do_build(package).await?;
        self.record(package, &result);
        Ok(result)
    }

    /// Configure, then generate documentation
    pub async fn haddock(
        &self,
        package: &PackageSpec,
        extra_args: &[String],
    ) -> Result<RunResult, HarnessError> {
        let configured = self.do_configure(package).await?;
        let result = if configured.successful {
            info!("Generating documentation for {}", package);
            let step = self.step(package, "haddock", extra_args).await?;
            configured.record(&step, OutcomeKind::HaddockSucceeded)
        } else {
            configured
        };

        self.record(package, &result);
        Ok(result)
    }

    /// Build, then install
    pub async fn install(&self, package: &PackageSpec) -> Result<RunResult, HarnessError> {
        let built = self.do_build(package).await?;
        let result = if built.successful {
            info!("Installing {}", package);
            let step = self.step(package, "install", &[]).await?;
            built.record(&step, OutcomeKind::InstallSucceeded)
        } else {
            built
        };

        self.record(package, &result);
        Ok(result)
    }

    /// Run the package's test suites; no configure or build beforehand
    pub async fn test(
        &self,
        package: &PackageSpec,
        extra_args: &[String],
    ) -> Result<RunResult, HarnessError> {
        info!("Testing {}", package);
        let step = self.step(package, "test", extra_args).await?;
        let result = RunResult::new().record(&step, OutcomeKind::TestSucceeded);

        self.record(package, &result);
        Ok(result)
    }

    /// Run the package's benchmarks; no configure or build beforehand
    pub async fn bench(
        &self,
        package: &PackageSpec,
        extra_args: &[String],
    ) -> Result<RunResult, HarnessError> {
        info!("Benchmarking {}", package);
        let step = self.step(package, "bench", extra_args).await?;
        let result = RunResult::new().record(&step, OutcomeKind::BenchSucceeded);

        self.record(package, &result);
        Ok(result)
    }

    /// Remove `library` from the user package registry.
    ///
    /// A library that is not registered counts as success; the returned flag
    /// tells whether anything was actually removed.
    pub async fn unregister(&self, library: &str) -> Result<bool, HarnessError> {
        let args = vec![
            "unregister".to_string(),
            "--user".to_string(),
            library.to_string(),
        ];
        let step = self.dispatcher.registry(&args).await?;

        if step.succeeded() {
            info!("Unregistered {}", library);
            return Ok(true);
        }
        if step.output.contains(NOT_FOUND_MARKER) {
            debug!("{} was not registered", library);
            return Ok(false);
        }

        Err(HarnessError::UnregisterFailed {
            library: library.to_string(),
            command: step.command,
            output: step.output,
        })
    }

    /// Compile the package's custom build script, if it has one
    pub async fn compile_setup(
        &self,
        package: &PackageSpec,
    ) -> Result<Option<StepOutput>, HarnessError> {
        self.dispatcher.compile_setup(package).await
    }

    /// Run an executable built inside the package, path relative to it
    pub async fn run_executable(
        &self,
        package: &PackageSpec,
        program: impl AsRef<Path>,
        args: &[String],
    ) -> Result<StepOutput, HarnessError> {
        self.dispatcher.exec(package, program.as_ref(), args).await
    }

    async fn do_configure(&self, package: &PackageSpec) -> Result<RunResult, HarnessError> {
        let clean = self.step(package, "clean", &[]).await?;
        if !clean.succeeded() {
            return Err(HarnessError::CleanFailed {
                command: clean.command,
                output: clean.output,
            });
        }

        info!("Configuring {}", package);
        let mut flags = vec![
            "--user".to_string(),
            "-w".to_string(),
            self.config.compiler.display().to_string(),
        ];
        flags.extend(package.config_opts().iter().cloned());

        let step = self.step(package, "configure", &flags).await?;
        Ok(RunResult::new()
            .append(&clean)
            .record(&step, OutcomeKind::ConfigureSucceeded))
    }

    async fn do_build(&self, package: &PackageSpec) -> Result<RunResult, HarnessError> {
        let configured = self.do_configure(package).await?;
        if !configured.successful {
            return Ok(configured);
        }

        info!("Building {}", package);
        let step = self.step(package, "build", &["-v".to_string()]).await?;
        Ok(configured.record(&step, OutcomeKind::BuildSucceeded))
    }

    async fn step(
        &self,
        package: &PackageSpec,
        verb: &str,
        extra_args: &[String],
    ) -> Result<StepOutput, HarnessError> {
        let mut args = vec![verb.to_string()];
        args.extend(package.build_dir_flag());
        args.extend(extra_args.iter().cloned());

        let step = self.dispatcher.dispatch(package, &args).await?;
        debug!("{}", step);
        Ok(step)
    }

    /// Overwrite the package's transcript log; failures are only logged
    fn record(&self, package: &PackageSpec, result: &RunResult) {
        let path = package.directory().join(&self.config.log_file);
        match std::fs::write(&path, &result.transcript) {
            Ok(()) => debug!("Transcript written to {}", path.display()),
            Err(e) => warn!("Failed to write transcript to {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::{tempdir, TempDir};

    /// Dispatcher that records every invocation and fails chosen verbs
    #[derive(Default)]
    struct FakeDispatcher {
        fail_verbs: Vec<&'static str>,
        calls: RefCell<Vec<Vec<String>>>,
        registry_output: &'static str,
        registry_code: i32,
    }

    impl FakeDispatcher {
        fn failing(verbs: &[&'static str]) -> Self {
            Self {
                fail_verbs: verbs.to_vec(),
                ..Default::default()
            }
        }

        fn verbs(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|c| c[0].clone()).collect()
        }
    }

    impl Dispatcher for FakeDispatcher {
        async fn dispatch(
            &self,
            package: &PackageSpec,
            args: &[String],
        ) -> Result<StepOutput, HarnessError> {
            self.calls.borrow_mut().push(args.to_vec());
            let verb = args[0].as_str();
            let code = if self.fail_verbs.contains(&verb) { 1 } else { 0 };
            Ok(StepOutput::new(
                format!("\"fake {}\" in {}", args.join(" "), package),
                Some(code),
                format!("{verb} output\n"),
            ))
        }

        async fn registry(&self, args: &[String]) -> Result<StepOutput, HarnessError> {
            self.calls.borrow_mut().push(args.to_vec());
            Ok(StepOutput::new(
                format!("\"fake-pkg {}\"", args.join(" ")),
                Some(self.registry_code),
                self.registry_output,
            ))
        }

        async fn compile_setup(
            &self,
            _package: &PackageSpec,
        ) -> Result<Option<StepOutput>, HarnessError> {
            Ok(None)
        }

        async fn exec(
            &self,
            package: &PackageSpec,
            program: &Path,
            args: &[String],
        ) -> Result<StepOutput, HarnessError> {
            Ok(StepOutput::new(
                format!("\"{} {}\" in {}", program.display(), args.join(" "), package),
                Some(0),
                "ran\n",
            ))
        }
    }

    fn setup(dispatcher: FakeDispatcher) -> (TempDir, PackageSpec, Workflow<FakeDispatcher>) {
        let dir = tempdir().unwrap();
        let package = PackageSpec::new(dir.path()).with_config_opts(["--enable-tests"]);
        let workflow = Workflow::with_dispatcher(SuiteConfig::new().compiler("/opt/ghc"), dispatcher);
        (dir, package, workflow)
    }

    fn log_of(dir: &TempDir) -> String {
        std::fs::read_to_string(dir.path().join("test-log.txt")).unwrap()
    }

    #[tokio::test]
    async fn test_configure_success() {
        let (dir, package, workflow) = setup(FakeDispatcher::default());
        let result = workflow.configure(&package).await.unwrap();

        assert!(result.successful);
        assert_eq!(result.kind, OutcomeKind::ConfigureSucceeded);
        assert_eq!(workflow.dispatcher().verbs(), vec!["clean", "configure"]);
        assert_eq!(
            workflow.dispatcher().calls.borrow()[1],
            vec!["configure", "--user", "-w", "/opt/ghc", "--enable-tests"]
        );
        assert_eq!(log_of(&dir), result.transcript);
    }

    #[tokio::test]
    async fn test_clean_failure_aborts() {
        let (_dir, package, workflow) = setup(FakeDispatcher::failing(&["clean"]));
        let err = workflow.build(&package).await.unwrap_err();

        assert!(matches!(err, HarnessError::CleanFailed { .. }));
        assert_eq!(workflow.dispatcher().verbs(), vec!["clean"]);
    }

    #[tokio::test]
    async fn test_build_chain() {
        let (dir, package, workflow) = setup(FakeDispatcher::default());
        let result = workflow.build(&package).await.unwrap();

        assert!(result.successful);
        assert_eq!(result.kind, OutcomeKind::BuildSucceeded);
        assert_eq!(workflow.dispatcher().verbs(), vec!["clean", "configure", "build"]);
        assert!(result.transcript.contains("\"fake build -v\""));
        assert_eq!(log_of(&dir), result.transcript);
    }

    #[tokio::test]
    async fn test_build_skipped_after_configure_failure() {
        let (dir, package, workflow) = setup(FakeDispatcher::failing(&["configure"]));
        let result = workflow.build(&package).await.unwrap();

        assert!(!result.successful);
        assert_eq!(result.kind, OutcomeKind::Failure);
        assert_eq!(workflow.dispatcher().verbs(), vec!["clean", "configure"]);
        assert!(!result.transcript.contains("fake build"));
        assert_eq!(log_of(&dir), result.transcript);
    }

    #[tokio::test]
    async fn test_install_stops_after_build_failure() {
        let (_dir, package, workflow) = setup(FakeDispatcher::failing(&["build"]));
        let result = workflow.install(&package).await.unwrap();

        assert!(!result.successful);
        assert_eq!(result.kind, OutcomeKind::ConfigureSucceeded);
        assert_eq!(workflow.dispatcher().verbs(), vec!["clean", "configure", "build"]);
    }

    #[tokio::test]
    async fn test_install_chain() {
        let (_dir, package, workflow) = setup(FakeDispatcher::default());
        let result = workflow.install(&package).await.unwrap();

        assert!(result.successful);
        assert_eq!(result.kind, OutcomeKind::InstallSucceeded);
        assert_eq!(
            workflow.dispatcher().verbs(),
            vec!["clean", "configure", "build", "install"]
        );
    }

    #[tokio::test]
    async fn test_haddock_passes_extra_args() {
        let (_dir, package, workflow) = setup(FakeDispatcher::default());
        let result = workflow
            .haddock(&package, &["--hyperlink-source".to_string()])
            .await
            .unwrap();

        assert_eq!(result.kind, OutcomeKind::HaddockSucceeded);
        assert_eq!(
            workflow.dispatcher().calls.borrow()[2],
            vec!["haddock", "--hyperlink-source"]
        );
    }

    #[tokio::test]
    async fn test_haddock_failure_keeps_configure_kind() {
        let (_dir, package, workflow) = setup(FakeDispatcher::failing(&["haddock"]));
        let result = workflow.haddock(&package, &[]).await.unwrap();

        assert!(!result.successful);
        assert_eq!(result.kind, OutcomeKind::ConfigureSucceeded);
    }

    #[test]
    fn test_test_runs_alone() {
        let (dir, package, workflow) = setup(FakeDispatcher::default());
        let result =
            tokio_test::block_on(workflow.test(&package, &["--show-details=always".to_string()]))
                .unwrap();

        assert!(result.successful);
        assert_eq!(result.kind, OutcomeKind::TestSucceeded);
        assert_eq!(workflow.dispatcher().verbs(), vec!["test"]);
        assert_eq!(log_of(&dir), result.transcript);
    }

    #[test]
    fn test_bench_failure() {
        let (_dir, package, workflow) = setup(FakeDispatcher::failing(&["bench"]));
        let result = tokio_test::block_on(workflow.bench(&package, &[])).unwrap();

        assert!(!result.successful);
        assert_eq!(result.kind, OutcomeKind::Failure);
        assert_eq!(workflow.dispatcher().verbs(), vec!["bench"]);
    }

    #[tokio::test]
    async fn test_build_dir_flag_on_every_step() {
        let dir = tempdir().unwrap();
        let package = PackageSpec::new(dir.path()).with_build_dir("dist-alt");
        let workflow = Workflow::with_dispatcher(SuiteConfig::new(), FakeDispatcher::default());

        workflow.build(&package).await.unwrap();
        for call in workflow.dispatcher().calls.borrow().iter() {
            assert_eq!(call[1], "--builddir=dist-alt");
        }
    }

    #[tokio::test]
    async fn test_unregister_not_found_is_success() {
        let dispatcher = FakeDispatcher {
            registry_output: "ghc-pkg: cannot find package mylib\n",
            registry_code: 1,
            ..Default::default()
        };
        let workflow = Workflow::with_dispatcher(SuiteConfig::new(), dispatcher);

        assert!(!workflow.unregister("mylib").await.unwrap());
        assert!(!workflow.unregister("mylib").await.unwrap());
        assert_eq!(
            workflow.dispatcher().calls.borrow()[0],
            vec!["unregister", "--user", "mylib"]
        );
    }

    #[tokio::test]
    async fn test_unregister_reports_removal() {
        let dispatcher = FakeDispatcher {
            registry_output: "",
            registry_code: 0,
            ..Default::default()
        };
        let workflow = Workflow::with_dispatcher(SuiteConfig::new(), dispatcher);

        assert!(workflow.unregister("mylib").await.unwrap());
    }

    #[tokio::test]
    async fn test_unregister_other_failure_is_fatal() {
        let dispatcher = FakeDispatcher {
            registry_output: "ghc-pkg: permission denied\n",
            registry_code: 1,
            ..Default::default()
        };
        let workflow = Workflow::with_dispatcher(SuiteConfig::new(), dispatcher);

        let err = workflow.unregister("mylib").await.unwrap_err();
        assert!(matches!(err, HarnessError::UnregisterFailed { ref library, .. } if library == "mylib"));
    }

    #[tokio::test]
    async fn test_log_write_failure_does_not_fail_operation() {
        let package = PackageSpec::new("/nonexistent/pkgtest/samplePkg");
        let workflow = Workflow::with_dispatcher(SuiteConfig::new(), FakeDispatcher::default());

        let result = workflow.test(&package, &[]).await.unwrap();
        assert!(result.successful);
    }

    #[tokio::test]
    async fn test_run_executable() {
        let (_dir, package, workflow) = setup(FakeDispatcher::default());
        let step = workflow
            .run_executable(&package, "dist/build/hello/hello", &[])
            .await
            .unwrap();

        assert!(step.succeeded());
        assert!(step.command.contains("dist/build/hello/hello"));
        assert!(workflow.compile_setup(&package).await.unwrap().is_none());
    }
}

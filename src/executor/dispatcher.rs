//! Build-tool dispatch
//!
//! Chooses which driver runs a build-tool verb for a package: a custom build
//! script compiled from the package's own source, or the shared driver.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::process::ProcessRunner;
use crate::config::SuiteConfig;
use crate::error::HarnessError;
use crate::models::{PackageSpec, StepOutput};

/// Invokes the external tools a workflow needs
#[allow(async_fn_in_trait)]
pub trait Dispatcher {
    /// Run one build-tool invocation for `package`
    async fn dispatch(
        &self,
        package: &PackageSpec,
        args: &[String],
    ) -> Result<StepOutput, HarnessError>;

    /// Run the package registry tool
    async fn registry(&self, args: &[String]) -> Result<StepOutput, HarnessError>;

    /// Compile the package's custom build script, `None` when it has none
    async fn compile_setup(
        &self,
        package: &PackageSpec,
    ) -> Result<Option<StepOutput>, HarnessError>;

    /// Run an arbitrary executable inside the package directory
    async fn exec(
        &self,
        package: &PackageSpec,
        program: &Path,
        args: &[String],
    ) -> Result<StepOutput, HarnessError>;
}

/// Dispatcher backed by real child processes
#[derive(Clone, Debug)]
pub struct SetupDispatcher {
    runner: ProcessRunner,
    compiler: PathBuf,
    registry_tool: PathBuf,
    driver: PathBuf,
    inplace_db: PathBuf,
    setup_script: String,
    setup_exe: String,
}

impl SetupDispatcher {
    pub fn new(config: &SuiteConfig) -> Self {
        Self {
            runner: ProcessRunner::new(config.verbosity),
            compiler: config.compiler.clone(),
            registry_tool: config.registry_tool.clone(),
            driver: config.driver.clone(),
            inplace_db: config.inplace_db.clone(),
            setup_script: config.setup_script.clone(),
            setup_exe: config.setup_exe.clone(),
        }
    }

    /// Whether the package ships its own build script
    pub fn has_custom_script(&self, package: &PackageSpec) -> bool {
        package.directory().join(&self.setup_script).is_file()
    }

    fn compile_args(&self) -> Vec<String> {
        // The child runs inside the package directory, so the registry path
        // has to be anchored to ours.
        let inplace_db = std::path::absolute(&self.inplace_db)
            .unwrap_or_else(|_| self.inplace_db.clone());

        vec![
            "--make".to_string(),
            "-package-db".to_string(),
            inplace_db.display().to_string(),
            self.setup_script.clone(),
            "-o".to_string(),
            self.setup_exe.clone(),
        ]
    }
}

impl Dispatcher for SetupDispatcher {
    async fn dispatch(
        &self,
        package: &PackageSpec,
        args: &[String],
    ) -> Result<StepOutput, HarnessError> {
        let dir = package.directory();

        if self.compile_setup(package).await?.is_some() {
            let program = dir.join(&self.setup_exe);
            return self.runner.run(Some(dir), &program, args).await;
        }

        debug!("Using shared driver {} for {}", self.driver.display(), package);
        self.runner.run(Some(dir), &self.driver, args).await
    }

    async fn registry(&self, args: &[String]) -> Result<StepOutput, HarnessError> {
        self.runner.run(None, &self.registry_tool, args).await
    }

    async fn compile_setup(
        &self,
        package: &PackageSpec,
    ) -> Result<Option<StepOutput>, HarnessError> {
        if !self.has_custom_script(package) {
            return Ok(None);
        }

        info!("Compiling {} for {}", self.setup_script, package);
        let step = self
            .runner
            .run(Some(package.directory()), &self.compiler, &self.compile_args())
            .await?;

        if !step.succeeded() {
            return Err(HarnessError::SetupCompileFailed {
                command: step.command,
                output: step.output,
            });
        }

        Ok(Some(step))
    }

    async fn exec(
        &self,
        package: &PackageSpec,
        program: &Path,
        args: &[String],
    ) -> Result<StepOutput, HarnessError> {
        let dir = package.directory();
        self.runner.run(Some(dir), &dir.join(program), args).await
    }
}

//! Run orchestration: report, build, discover, plan, schedule, summarize.
//!
//! Control flow for one run:
//!
//! ```text
//! validate config
//!     → write report.txt          (provenance, before any work)
//!     → build tracking artifact   (fatal on failure)
//!     → discover inputs
//!     → plan invocations
//!     → schedule batch            (bounded parallelism, failures isolated)
//!     → write summary.json
//! ```
//!
//! Fatal categories (config, report I/O, build, plan) abort before any
//! invocation is dispatched. Individual invocation failures only shape the
//! returned [`RunSummary`]; the caller decides what they mean.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::builder::{ArtifactBuilder, BuildError};
use crate::config::Settings;
use crate::discovery::{self, DiscoveryError};
use crate::planner::{self, PlanError};
use crate::process::ProcessRunner;
use crate::report::{self, ReportError};
use crate::scheduler::{CancelHandle, RunSummary, Scheduler};

/// Parameters of one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Folder containing the test videos, searched recursively.
    pub input_root: PathBuf,
    /// Working directory for all run outputs; created if absent.
    pub work_dir: PathBuf,
    /// Free-text description recorded in report.txt.
    pub description: String,
    /// Extension selecting input videos (without the dot).
    pub video_extension: String,
    /// Maximum simultaneous tracking processes.
    pub concurrency: usize,
    /// Skip the build step and run against an existing artifact.
    pub skip_build: bool,
}

impl RunConfig {
    /// Config with the defaults observed in the original workflow:
    /// mp4 inputs, sequential execution, build included.
    pub fn new(
        input_root: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            input_root: input_root.into(),
            work_dir: work_dir.into(),
            description: description.into(),
            video_extension: "mp4".to_string(),
            concurrency: 1,
            skip_build: false,
        }
    }
}

/// Fatal run errors. None of these leave a partially executed batch:
/// they all occur before the first invocation is dispatched, except
/// summary persistence which happens after the batch completes.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Invalid run configuration: {0}")]
    Config(String),

    #[error("Failed to record run: {0}")]
    Report(#[from] ReportError),

    #[error("Build step failed: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Coordinates one end-to-end run over a folder of input videos.
pub struct Orchestrator<'a> {
    settings: Settings,
    runner: &'a dyn ProcessRunner,
}

impl<'a> Orchestrator<'a> {
    pub fn new(settings: Settings, runner: &'a dyn ProcessRunner) -> Self {
        Self { settings, runner }
    }

    /// Execute a full run and return its summary.
    ///
    /// The report is written before the build so the run's intent is
    /// recorded even if later steps fail. An empty discovery result is not
    /// an error; the run completes with an empty summary.
    pub fn run(
        &self,
        config: &RunConfig,
        cancel: Option<&CancelHandle>,
    ) -> Result<RunSummary, RunError> {
        self.validate(config)?;

        report::write_report(&config.work_dir, &config.description)?;

        if config.skip_build {
            tracing::info!("Skipping build step");
        } else {
            ArtifactBuilder::new(self.runner, &self.settings.build).build()?;
        }

        let inputs = discovery::discover(&config.input_root, &config.video_extension)?;
        let specs = planner::plan(
            &inputs,
            &config.work_dir,
            &self.settings.tracking.graph_config,
        )?;

        let scheduler = Scheduler::new(
            self.runner,
            &self.settings.tracking.executable,
            config.concurrency,
        );
        let results = scheduler.run(specs, cancel);

        let summary = RunSummary::from_results(&results);
        report::write_summary(&config.work_dir, &summary)?;

        tracing::info!(
            "Run complete: {}/{} invocation(s) succeeded, {} failed",
            summary.succeeded,
            summary.total,
            summary.failed.len()
        );

        Ok(summary)
    }

    fn validate(&self, config: &RunConfig) -> Result<(), RunError> {
        if !config.input_root.is_dir() {
            return Err(RunError::Config(format!(
                "Input folder not found or not a directory: {}",
                config.input_root.display()
            )));
        }

        if config.concurrency == 0 {
            return Err(RunError::Config(
                "Concurrency must be at least 1".to_string(),
            ));
        }

        if dirs_alias(&config.input_root, &config.work_dir) {
            return Err(RunError::Config(format!(
                "Input folder and work directory must not alias: {}",
                config.work_dir.display()
            )));
        }

        Ok(())
    }
}

/// Whether two directory paths refer to the same location. The work dir
/// may not exist yet, in which case only the lexical form can be compared.
fn dirs_alias(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}

//! track-eval - CLI front end for the tracking evaluation orchestrator.
//!
//! Usage:
//!   track-eval <INPUT_FOLDER> <WORKDIR> <DESCRIPTION>
//!
//! Builds the tracking executable, runs it once per video found under the
//! input folder, and records the run's description and summary in the
//! working directory.
//!
//! Exit codes: 0 on full success, 1 on fatal errors (config, report,
//! build), 2 when the run completed but at least one invocation failed.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use tev_core::config::Settings;
use tev_core::logging;
use tev_core::orchestrator::{Orchestrator, RunConfig};
use tev_core::process::SystemRunner;
use tev_core::scheduler::RunSummary;

#[derive(Parser)]
#[command(name = "track-eval")]
#[command(about = "Batch runner for the object-tracking evaluation pipeline")]
#[command(version)]
struct Cli {
    /// Folder containing the test videos (searched recursively)
    input_folder: PathBuf,

    /// Working directory for run outputs (created if missing)
    workdir: PathBuf,

    /// Description of the experiment, recorded in report.txt
    description: String,

    /// Extension selecting input videos, without the dot
    #[arg(short = 'e', long, default_value = "mp4")]
    extension: String,

    /// Maximum simultaneous tracking processes
    #[arg(short = 'j', long, default_value = "1")]
    jobs: usize,

    /// Override the calculator graph configuration file
    #[arg(long, value_name = "PATH")]
    graph_config: Option<PathBuf>,

    /// Override the tracking executable path
    #[arg(long, value_name = "PATH")]
    tracker: Option<PathBuf>,

    /// Skip the build step and run an already-built tracker
    #[arg(long)]
    skip_build: bool,

    /// Optional TOML settings file
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);

    match run(cli) {
        Ok(summary) if summary.all_succeeded() => {
            println!("== Done ==");
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            for input in &summary.failed {
                eprintln!("failed: {}", input.path.display());
            }
            eprintln!(
                "{} of {} invocation(s) failed",
                summary.failed.len(),
                summary.total
            );
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<RunSummary> {
    tracing::debug!("track-eval {} starting", tev_core::version());

    let mut settings =
        Settings::load_or_default(cli.config.as_deref()).context("Failed to load settings")?;

    if let Some(graph_config) = cli.graph_config {
        settings.tracking.graph_config = graph_config;
    }
    if let Some(tracker) = cli.tracker {
        settings.tracking.executable = tracker;
    }

    let run_config = RunConfig {
        input_root: cli.input_folder,
        work_dir: cli.workdir,
        description: cli.description,
        video_extension: cli.extension,
        concurrency: cli.jobs,
        skip_build: cli.skip_build,
    };

    let runner = SystemRunner;
    let orchestrator = Orchestrator::new(settings, &runner);

    Ok(orchestrator.run(&run_config, None)?)
}

//! Bounded-parallel execution of planned invocations.
//!
//! A fixed-size pool of workers pulls specs from a shared channel and runs
//! each as an independent external process, writing its result into a
//! pre-sized slot indexed by spec position. Failure isolation is the core
//! contract: one invocation's non-zero exit never cancels or skips any
//! other pending invocation. Only the exit status carries control
//! information.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

use crate::discovery::InputVideo;
use crate::planner::InvocationSpec;
use crate::process::ProcessRunner;

/// Terminal status of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationStatus {
    Success,
    Failure { exit_code: i32 },
}

/// Result of one invocation. Produced exactly once per dispatched spec.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    pub input: InputVideo,
    pub status: InvocationStatus,
    /// Wall-clock time spent in the external process.
    pub duration: Duration,
}

impl InvocationResult {
    pub fn succeeded(&self) -> bool {
        self.status == InvocationStatus::Success
    }
}

/// Aggregate outcome of a batch. Terminal artifact of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    /// Failing inputs, in submission order.
    pub failed: Vec<InputVideo>,
}

impl RunSummary {
    /// Aggregate per-invocation results (assumed in submission order).
    pub fn from_results(results: &[InvocationResult]) -> Self {
        let failed: Vec<InputVideo> = results
            .iter()
            .filter(|r| !r.succeeded())
            .map(|r| r.input.clone())
            .collect();

        Self {
            total: results.len(),
            succeeded: results.len() - failed.len(),
            failed,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Handle for cooperatively cancelling a running batch.
///
/// Cancelling stops the dispatch of new invocations; in-flight external
/// processes run to completion and their results are still collected.
#[derive(Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next dispatch boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Executes invocation specs with a configurable bound on simultaneous
/// external processes. Width 1 is the sequential degenerate case.
pub struct Scheduler<'a> {
    runner: &'a dyn ProcessRunner,
    executable: &'a std::path::Path,
    concurrency: usize,
}

impl<'a> Scheduler<'a> {
    /// Create a scheduler. `concurrency` is clamped to at least 1.
    pub fn new(
        runner: &'a dyn ProcessRunner,
        executable: &'a std::path::Path,
        concurrency: usize,
    ) -> Self {
        Self {
            runner,
            executable,
            concurrency: concurrency.max(1),
        }
    }

    /// Run every spec to completion and return one result per dispatched
    /// spec, in submission order.
    ///
    /// Without cancellation the returned sequence covers every spec, with
    /// no duplicates and no omissions. When `cancel` fires mid-batch,
    /// undispatched specs are skipped and only dispatched results are
    /// returned.
    pub fn run(
        &self,
        specs: Vec<InvocationSpec>,
        cancel: Option<&CancelHandle>,
    ) -> Vec<InvocationResult> {
        if specs.is_empty() {
            return Vec::new();
        }

        let total = specs.len();
        let workers = self.concurrency.min(total);
        tracing::info!(
            "Scheduling {} invocation(s) across {} worker(s)",
            total,
            workers
        );

        // One slot per spec, written exactly once by whichever worker runs it.
        let slots: Mutex<Vec<Option<InvocationResult>>> =
            Mutex::new((0..total).map(|_| None).collect());

        let (tx, rx) = crossbeam_channel::unbounded::<(usize, InvocationSpec)>();
        for indexed in specs.into_iter().enumerate() {
            // Send on an unbounded channel with a live receiver cannot fail.
            let _ = tx.send(indexed);
        }
        drop(tx);

        thread::scope(|scope| {
            for _ in 0..workers {
                let rx = rx.clone();
                let slots = &slots;
                scope.spawn(move || {
                    while let Ok((index, spec)) = rx.recv() {
                        if cancel.map_or(false, |c| c.is_cancelled()) {
                            tracing::info!(
                                "Cancelled; skipping invocation for {}",
                                spec.input.path.display()
                            );
                            continue;
                        }

                        let result = self.execute(&spec);
                        slots.lock()[index] = Some(result);
                    }
                });
            }
        });

        slots.into_inner().into_iter().flatten().collect()
    }

    /// Run one external invocation, blocking until the process exits.
    fn execute(&self, spec: &InvocationSpec) -> InvocationResult {
        let started = Instant::now();
        tracing::info!("Tracking {}", spec.input.path.display());

        let status = match self.runner.invoke(self.executable, &spec.to_args()) {
            Ok(exit) if exit.success() => InvocationStatus::Success,
            Ok(exit) => {
                tracing::warn!(
                    "Invocation for {} failed with exit code {}",
                    spec.input.path.display(),
                    exit.code_or_default()
                );
                if !exit.stderr.is_empty() {
                    tracing::debug!("stderr: {}", exit.stderr.trim());
                }
                InvocationStatus::Failure {
                    exit_code: exit.code_or_default(),
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Could not start tracking executable for {}: {}",
                    spec.input.path.display(),
                    e
                );
                InvocationStatus::Failure { exit_code: -1 }
            }
        };

        InvocationResult {
            input: spec.input.clone(),
            status,
            duration: started.elapsed(),
        }
    }
}

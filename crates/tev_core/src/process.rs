//! External process invocation seam.
//!
//! Every external tool (the build tool, the tracking executable) is reached
//! through the [`ProcessRunner`] trait so that callers can inject a scripted
//! runner in tests instead of spawning real processes. Only the exit status
//! carries control information; stdout/stderr are captured for diagnostics
//! and never parsed.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Command;

use parking_lot::Mutex;

/// Exit information from one external process invocation.
#[derive(Debug, Clone)]
pub struct ProcessExit {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard error, for diagnostics only.
    pub stderr: String,
}

impl ProcessExit {
    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code, mapping signal termination to -1.
    pub fn code_or_default(&self) -> i32 {
        self.code.unwrap_or(-1)
    }
}

/// Trait for invoking external processes.
///
/// Implementations must be usable from multiple scheduler workers at once.
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args` to completion and return its exit status.
    ///
    /// An `Err` means the process could not be started at all (missing
    /// binary, permissions); a non-zero exit is reported through
    /// [`ProcessExit`], not as an error.
    fn invoke(&self, program: &Path, args: &[OsString]) -> io::Result<ProcessExit>;
}

/// Runner that spawns real processes via [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn invoke(&self, program: &Path, args: &[OsString]) -> io::Result<ProcessExit> {
        tracing::debug!("Running: {}", render_command(program, args));

        let output = Command::new(program).args(args).output()?;

        Ok(ProcessExit {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Render a command line for logging and test assertions.
pub fn render_command(program: &Path, args: &[OsString]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

/// Scripted runner that records invocations without spawning processes.
///
/// By default every invocation succeeds. `fail_when` scripts a non-zero
/// exit for any command line containing the given substring. Intended for
/// tests and for embedders that want to dry-run a batch.
#[derive(Debug, Default)]
pub struct FakeRunner {
    failures: Vec<(String, i32)>,
    calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    /// Create a runner where every invocation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a failure: any command line containing `needle` exits with `code`.
    pub fn fail_when(mut self, needle: impl Into<String>, code: i32) -> Self {
        self.failures.push((needle.into(), code));
        self
    }

    /// Command lines seen so far, in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl ProcessRunner for FakeRunner {
    fn invoke(&self, program: &Path, args: &[OsString]) -> io::Result<ProcessExit> {
        let line = render_command(program, args);
        self.calls.lock().push(line.clone());

        for (needle, code) in &self.failures {
            if line.contains(needle.as_str()) {
                return Ok(ProcessExit {
                    code: Some(*code),
                    stderr: format!("scripted failure for '{}'", needle),
                });
            }
        }

        Ok(ProcessExit {
            code: Some(0),
            stderr: String::new(),
        })
    }
}

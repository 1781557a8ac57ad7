//! Artifact builder: ensure the tracking executable is built.

use std::ffi::OsString;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::config::BuildSettings;
use crate::process::ProcessRunner;

/// Errors from the build step. Always fatal to the run; a build failure is
/// assumed deterministic until the environment is fixed, so there is no retry.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to run build tool '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        program: String,
        exit_code: i32,
        message: String,
    },
}

/// Invokes the external build command with a fixed configuration profile.
pub struct ArtifactBuilder<'a> {
    runner: &'a dyn ProcessRunner,
    settings: &'a BuildSettings,
}

impl<'a> ArtifactBuilder<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, settings: &'a BuildSettings) -> Self {
        Self { runner, settings }
    }

    /// Run the build to completion.
    ///
    /// Side effect: produces or refreshes the tracking executable on the
    /// host filesystem. Non-zero exit is surfaced with the tool's stderr.
    pub fn build(&self) -> Result<(), BuildError> {
        let program = Path::new(&self.settings.program);
        let args: Vec<OsString> = self.settings.args.iter().map(OsString::from).collect();

        tracing::info!(
            "Building tracking executable: {} {}",
            self.settings.program,
            self.settings.args.join(" ")
        );

        let exit = self
            .runner
            .invoke(program, &args)
            .map_err(|source| BuildError::Spawn {
                program: self.settings.program.clone(),
                source,
            })?;

        if !exit.success() {
            return Err(BuildError::CommandFailed {
                program: self.settings.program.clone(),
                exit_code: exit.code_or_default(),
                message: exit.stderr.trim().to_string(),
            });
        }

        tracing::info!("Build completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{FakeRunner, ProcessExit};

    #[test]
    fn build_runs_the_configured_command() {
        let runner = FakeRunner::new();
        let settings = BuildSettings::default();

        ArtifactBuilder::new(&runner, &settings).build().unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("bazel build -c opt"));
        assert!(calls[0].contains("MEDIAPIPE_DISABLE_GPU=1"));
    }

    #[test]
    fn nonzero_exit_is_fatal_with_diagnostic() {
        let runner = FakeRunner::new().fail_when("bazel", 4);
        let settings = BuildSettings::default();

        let err = ArtifactBuilder::new(&runner, &settings).build().unwrap_err();

        match err {
            BuildError::CommandFailed {
                program, exit_code, ..
            } => {
                assert_eq!(program, "bazel");
                assert_eq!(exit_code, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn spawn_failure_is_reported() {
        struct BrokenRunner;
        impl ProcessRunner for BrokenRunner {
            fn invoke(
                &self,
                _program: &Path,
                _args: &[OsString],
            ) -> io::Result<ProcessExit> {
                Err(io::Error::new(io::ErrorKind::NotFound, "no such tool"))
            }
        }

        let settings = BuildSettings::default();
        let err = ArtifactBuilder::new(&BrokenRunner, &settings)
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::Spawn { .. }));
        assert!(err.to_string().contains("bazel"));
    }
}

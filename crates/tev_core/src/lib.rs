//! tev_core - Batch orchestration for the tracking evaluation pipeline.
//!
//! This crate contains all orchestration logic with zero CLI dependencies.
//! It coordinates one *run*: build the external tracking executable,
//! discover input videos, plan one invocation per input, execute the
//! invocations with bounded parallelism, and record run provenance.
//!
//! The tracking executable and the build tool are opaque collaborators
//! reached only through [`process::ProcessRunner`]; nothing in here decodes
//! video or implements tracking.

pub mod builder;
pub mod config;
pub mod discovery;
pub mod logging;
pub mod orchestrator;
pub mod planner;
pub mod process;
pub mod report;
pub mod scheduler;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}

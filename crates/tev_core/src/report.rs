//! Run provenance: report.txt and summary.json in the work directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scheduler::RunSummary;

/// File name for the run description, written before any invocation starts.
pub const REPORT_FILE: &str = "report.txt";

/// File name for the serialized run summary, written after the batch.
pub const SUMMARY_FILE: &str = "summary.json";

/// Errors while persisting run records. Always fatal: the report is the
/// run's provenance record and must exist if any invocation is to run.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to create work directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize run summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Create `work_dir` (and parents) if absent, then write the literal
/// description into `report.txt` inside it.
///
/// Overwrites any prior report at the same path; last run wins.
pub fn write_report(work_dir: &Path, description: &str) -> Result<PathBuf, ReportError> {
    ensure_work_dir(work_dir)?;

    let path = work_dir.join(REPORT_FILE);
    fs::write(&path, description).map_err(|source| ReportError::Write {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!("Wrote run report to {}", path.display());
    Ok(path)
}

/// Persist the run summary as pretty-printed JSON next to the report.
pub fn write_summary(work_dir: &Path, summary: &RunSummary) -> Result<PathBuf, ReportError> {
    ensure_work_dir(work_dir)?;

    let path = work_dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(&path, json).map_err(|source| ReportError::Write {
        path: path.display().to_string(),
        source,
    })?;

    Ok(path)
}

fn ensure_work_dir(work_dir: &Path) -> Result<(), ReportError> {
    fs::create_dir_all(work_dir).map_err(|source| ReportError::CreateDir {
        path: work_dir.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn report_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let work_dir = dir.path().join("runs/exp1");

        let path = write_report(&work_dir, "baseline run").unwrap();

        assert_eq!(path, work_dir.join(REPORT_FILE));
        assert_eq!(fs::read_to_string(&path).unwrap(), "baseline run");
    }

    #[test]
    fn report_overwrites_prior_run() {
        let dir = TempDir::new().unwrap();

        write_report(dir.path(), "first").unwrap();
        write_report(dir.path(), "second").unwrap();

        let content = fs::read_to_string(dir.path().join(REPORT_FILE)).unwrap();
        assert_eq!(content, "second");
    }

    #[test]
    fn report_fails_when_work_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("workdir");
        fs::write(&blocker, b"not a directory").unwrap();

        let result = write_report(&blocker, "desc");
        assert!(result.is_err());
    }

    #[test]
    fn summary_serializes_counts_and_failures() {
        let dir = TempDir::new().unwrap();
        let summary = RunSummary {
            total: 2,
            succeeded: 1,
            failed: vec![crate::discovery::InputVideo {
                path: PathBuf::from("/in/b.mp4"),
                stem: "b".into(),
            }],
        };

        let path = write_summary(dir.path(), &summary).unwrap();
        let json = fs::read_to_string(path).unwrap();

        assert!(json.contains("\"total\": 2"));
        assert!(json.contains("b.mp4"));
    }
}

//! Input discovery: enumerate videos under the input root.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

/// One discovered input video. Immutable after discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputVideo {
    /// Full path to the video file.
    pub path: PathBuf,
    /// Base name without extension, used as the invocation's output key.
    pub stem: String,
}

/// Errors that can occur during input discovery.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Input folder not found or not a directory: {0}")]
    RootNotFound(String),

    #[error("Failed to read {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
}

/// Recursively discover video files under `input_root` whose extension
/// matches `extension` exactly (literal, case-sensitive, without the dot).
///
/// Results are sorted lexicographically by full path so repeated runs over
/// an unchanged tree schedule invocations in the same order. Finding no
/// matches is not an error.
pub fn discover(input_root: &Path, extension: &str) -> Result<Vec<InputVideo>, DiscoveryError> {
    if !input_root.is_dir() {
        return Err(DiscoveryError::RootNotFound(
            input_root.display().to_string(),
        ));
    }

    let mut inputs = Vec::new();

    for entry in WalkDir::new(input_root) {
        let entry = entry.map_err(|source| walk_error(source, input_root))?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let matches = path
            .extension()
            .map(|ext| ext == extension)
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        inputs.push(InputVideo {
            path: path.to_path_buf(),
            stem,
        });
    }

    inputs.sort_by(|a, b| a.path.cmp(&b.path));

    tracing::info!(
        "Discovered {} input(s) under {} matching *.{}",
        inputs.len(),
        input_root.display(),
        extension
    );

    Ok(inputs)
}

/// Attribute a walk failure to the entry that failed; the root is only a
/// fallback for errors that carry no path.
fn walk_error(source: walkdir::Error, input_root: &Path) -> DiscoveryError {
    let path = source
        .path()
        .unwrap_or(input_root)
        .display()
        .to_string();
    DiscoveryError::Walk { path, source }
}

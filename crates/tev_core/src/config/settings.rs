//! Settings struct with TOML-based sections.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Build tool invocation for the tracking executable.
    #[serde(default)]
    pub build: BuildSettings,

    /// Tracking executable and its graph configuration.
    #[serde(default)]
    pub tracking: TrackingSettings,
}

impl Settings {
    /// Load settings from a TOML file, or return defaults when `path` is `None`.
    ///
    /// A missing key anywhere in the file falls back to its default, so a
    /// config file only needs to state what it overrides.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// How to build the tracking executable.
///
/// The defaults reproduce the stock CPU-only mediapipe build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Build tool binary.
    #[serde(default = "default_build_program")]
    pub program: String,

    /// Full fixed argument list, including the build target.
    #[serde(default = "default_build_args")]
    pub args: Vec<String>,
}

fn default_build_program() -> String {
    "bazel".to_string()
}

fn default_build_args() -> Vec<String> {
    [
        "build",
        "-c",
        "opt",
        "--define",
        "MEDIAPIPE_DISABLE_GPU=1",
        "mediapipe/examples/desktop/object_tracking:toy_tracking_cpu",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            program: default_build_program(),
            args: default_build_args(),
        }
    }
}

/// Where the tracking executable and its graph configuration live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingSettings {
    /// Path to the tracking executable produced by the build step.
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// Calculator graph configuration passed to every invocation.
    #[serde(default = "default_graph_config")]
    pub graph_config: PathBuf,
}

fn default_executable() -> PathBuf {
    PathBuf::from("bazel-bin/mediapipe/examples/desktop/object_tracking/toy_tracking_cpu")
}

fn default_graph_config() -> PathBuf {
    PathBuf::from("mediapipe/graphs/tracking/toy_detection_tracking_desktop_live.pbtxt")
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            graph_config: default_graph_config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_stock_build() {
        let settings = Settings::default();
        assert_eq!(settings.build.program, "bazel");
        assert!(settings
            .build
            .args
            .contains(&"MEDIAPIPE_DISABLE_GPU=1".to_string()));
        assert!(settings
            .tracking
            .executable
            .to_string_lossy()
            .contains("toy_tracking_cpu"));
    }

    #[test]
    fn missing_path_yields_defaults() {
        let settings = Settings::load_or_default(None).unwrap();
        assert_eq!(settings.build.program, "bazel");
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[tracking]\nexecutable = \"out/tracker\"\n\n[build]\nprogram = \"make\"\n"
        )
        .unwrap();

        let settings = Settings::load_or_default(Some(file.path())).unwrap();
        assert_eq!(settings.build.program, "make");
        // Unstated keys keep their defaults
        assert!(!settings.build.args.is_empty());
        assert_eq!(settings.tracking.executable, PathBuf::from("out/tracker"));
        assert_eq!(
            settings.tracking.graph_config,
            default_graph_config()
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = Settings::load_or_default(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [[[").unwrap();

        let result = Settings::load_or_default(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}

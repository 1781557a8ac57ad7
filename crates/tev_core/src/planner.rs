//! Invocation planning: map each discovered input to an invocation spec.
//!
//! Planning is a pure function of its inputs. The work directory is
//! partitioned by construction: each spec owns a distinct output path
//! derived from a unique stem, which is what makes unsynchronized parallel
//! execution safe. Two inputs sharing a stem would race on the same output
//! path, so the planner rejects the whole plan instead of letting the
//! scheduler silently overwrite.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::discovery::InputVideo;

/// One planned invocation of the tracking executable. Consumed exactly once
/// by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    /// The input video this invocation processes.
    pub input: InputVideo,
    /// Output path namespaced by the input's stem; the executable appends
    /// its own extension(s).
    pub output_path: PathBuf,
    /// Graph configuration reference passed to the executable.
    pub graph_config: PathBuf,
}

impl InvocationSpec {
    /// Argument set for the tracking executable.
    pub fn to_args(&self) -> Vec<OsString> {
        vec![
            flag_arg("--calculator_graph_config_file", &self.graph_config),
            flag_arg("--input_video_path", &self.input.path),
            flag_arg("--output_video_path", &self.output_path),
        ]
    }
}

fn flag_arg(flag: &str, value: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push("=");
    arg.push(value);
    arg
}

/// Errors that invalidate a whole plan.
#[derive(Error, Debug)]
pub enum PlanError {
    /// Two inputs map to the same output path.
    #[error("Inputs {first} and {second} share the stem '{stem}' and would overwrite each other's output")]
    StemCollision {
        stem: String,
        first: String,
        second: String,
    },
}

/// Build one [`InvocationSpec`] per input, with outputs under `work_dir`.
///
/// Fails fast on stem collision; no spec is returned from a colliding plan.
pub fn plan(
    inputs: &[InputVideo],
    work_dir: &Path,
    graph_config: &Path,
) -> Result<Vec<InvocationSpec>, PlanError> {
    let mut seen: HashMap<&str, &InputVideo> = HashMap::with_capacity(inputs.len());
    let mut specs = Vec::with_capacity(inputs.len());

    for input in inputs {
        if let Some(previous) = seen.insert(input.stem.as_str(), input) {
            return Err(PlanError::StemCollision {
                stem: input.stem.clone(),
                first: previous.path.display().to_string(),
                second: input.path.display().to_string(),
            });
        }

        specs.push(InvocationSpec {
            input: input.clone(),
            output_path: work_dir.join(&input.stem),
            graph_config: graph_config.to_path_buf(),
        });
    }

    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(path: &str) -> InputVideo {
        let path = PathBuf::from(path);
        let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
        InputVideo { path, stem }
    }

    #[test]
    fn output_paths_drop_the_extension() {
        let inputs = vec![video("/in/a.mp4"), video("/in/sub/b.mp4")];
        let specs = plan(&inputs, Path::new("/work"), Path::new("graph.pbtxt")).unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].output_path, PathBuf::from("/work/a"));
        assert_eq!(specs[1].output_path, PathBuf::from("/work/b"));
    }

    #[test]
    fn output_paths_are_pairwise_distinct() {
        let inputs = vec![video("/in/a.mp4"), video("/in/b.mp4"), video("/in/c.mp4")];
        let specs = plan(&inputs, Path::new("/work"), Path::new("g")).unwrap();

        for (i, a) in specs.iter().enumerate() {
            for b in &specs[i + 1..] {
                assert_ne!(a.output_path, b.output_path);
            }
        }
    }

    #[test]
    fn stem_collision_rejects_the_whole_plan() {
        let inputs = vec![video("/in/a/cat.mp4"), video("/in/b/cat.mp4")];
        let err = plan(&inputs, Path::new("/work"), Path::new("g")).unwrap_err();

        let PlanError::StemCollision {
            stem,
            first,
            second,
        } = err;
        assert_eq!(stem, "cat");
        assert!(first.contains("a/cat.mp4"));
        assert!(second.contains("b/cat.mp4"));
    }

    #[test]
    fn args_follow_the_executable_contract() {
        let inputs = vec![video("/in/a.mp4")];
        let specs = plan(&inputs, Path::new("/work"), Path::new("graph.pbtxt")).unwrap();

        let args: Vec<String> = specs[0]
            .to_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "--calculator_graph_config_file=graph.pbtxt",
                "--input_video_path=/in/a.mp4",
                "--output_video_path=/work/a",
            ]
        );
    }

    #[test]
    fn empty_input_list_plans_nothing() {
        let specs = plan(&[], Path::new("/work"), Path::new("g")).unwrap();
        assert!(specs.is_empty());
    }
}

//! Configuration for the tracking evaluation pipeline.
//!
//! Settings are TOML-based and organized into sections with serde defaults,
//! so an empty (or absent) config file yields a fully usable configuration
//! matching the stock mediapipe tracking setup. Nothing is read from
//! ambient/global scope; components receive the relevant section at
//! construction.

mod settings;

pub use settings::{BuildSettings, ConfigError, ConfigResult, Settings, TrackingSettings};

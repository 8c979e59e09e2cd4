//! Host project configuration: script-resolution mode and target layout

pub mod host;

pub use host::{HostProject, ScriptResolution, TargetLayout};

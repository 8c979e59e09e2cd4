//! Host tool detection
//!
//! Checks that the package managers and task runners a generation run may
//! call are present, so missing ones can be reported before anything runs.

pub mod check;

pub use check::{check_host_tools, check_tool, missing_tools, ToolInfo};

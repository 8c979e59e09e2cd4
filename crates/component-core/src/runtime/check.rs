//! Detection of the host tools a generation run may call

use crate::config::host::{HostProject, ScriptResolution};
use std::path::Path;
use std::process::Command;

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
    /// Where to get it, shown when missing
    pub hint: &'static str,
}

/// Check a tool by running `<program> --version` in `dir`
pub fn check_tool(program: &str, name: &'static str, hint: &'static str, dir: &Path) -> ToolInfo {
    let output = Command::new(program)
        .arg("--version")
        .current_dir(dir)
        .output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            ToolInfo {
                name,
                version: Some(version).filter(|v| !v.is_empty()),
                available: true,
                hint,
            }
        }
        _ => ToolInfo {
            name,
            version: None,
            available: false,
            hint,
        },
    }
}

/// Binstubs are checked for presence only; running them boots the app
fn check_binstub(root: &Path, rel: &str, name: &'static str, hint: &'static str) -> ToolInfo {
    ToolInfo {
        name,
        version: None,
        available: root.join(rel).is_file(),
        hint,
    }
}

/// Check everything a run against `host` could invoke
pub fn check_host_tools(host: &HostProject) -> Vec<ToolInfo> {
    let root = &host.root;
    let mut tools = vec![check_tool(
        "bundle",
        "Bundler",
        "gem install bundler",
        root,
    )];

    match host.script_resolution {
        ScriptResolution::Importmap => tools.push(check_binstub(
            root,
            "bin/importmap",
            "bin/importmap",
            "bin/rails importmap:install",
        )),
        ScriptResolution::Yarn => {
            tools.push(check_tool("yarn", "Yarn", "https://yarnpkg.com", root))
        }
        ScriptResolution::Npm => {
            tools.push(check_tool("npm", "npm", "https://nodejs.org", root))
        }
        ScriptResolution::Unknown => {}
    }

    if host.script_resolution.requires_manifest() {
        tools.push(check_tool("rake", "Rake", "bundle add rake", root));
    }

    tools
}

/// Human-readable lines for the tools that are missing
pub fn missing_tools(tools: &[ToolInfo]) -> Vec<String> {
    tools
        .iter()
        .filter(|t| !t.available)
        .map(|t| format!("{} (install with: {})", t.name, t.hint))
        .collect()
}

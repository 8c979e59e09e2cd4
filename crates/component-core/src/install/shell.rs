//! Collaborators backed by the host project's command-line tools
//!
//! Commands run in the project root, stream their output, and are bounded by
//! a timeout. Arguments are passed directly, never through a shell.

use super::{ControllerManifest, LanguagePackages, PinConfig, ScriptPackages};
use crate::config::host::{HostProject, ScriptResolution};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command as TokioCommand};
use tokio::runtime::Runtime;
use tokio::time::timeout;

/// Timeout for a single install command (2 minutes)
const INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Bundler, the JavaScript package manager, and the importmap file of one host project
pub struct ShellToolchain {
    root: PathBuf,
    script_resolution: ScriptResolution,
    importmap_path: PathBuf,
    timeout: Duration,
    runtime: Runtime,
}

impl ShellToolchain {
    pub fn new(host: &HostProject) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start command runtime")?;

        Ok(Self {
            root: host.root.clone(),
            script_resolution: host.script_resolution,
            importmap_path: host.importmap_path(),
            timeout: INSTALL_TIMEOUT,
            runtime,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<()> {
        let status = self
            .runtime
            .block_on(run_command(&self.root, program, args, self.timeout, Echo::Stream))?;
        if !status.success() {
            anyhow::bail!(
                "`{}` failed with exit code: {}",
                command_line(program, args),
                status.code().unwrap_or(-1)
            );
        }
        Ok(())
    }

    /// Run a command without echoing it; `Ok(false)` on a non-zero exit
    fn succeeds(&self, program: &str, args: &[&str]) -> Result<bool> {
        let status = self
            .runtime
            .block_on(run_command(&self.root, program, args, self.timeout, Echo::Quiet))?;
        Ok(status.success())
    }
}

/// Program and arguments that install a script package in `resolution` mode
fn script_install_command(resolution: ScriptResolution, name: &str) -> Option<[&str; 3]> {
    match resolution {
        ScriptResolution::Importmap => Some(["bin/importmap", "pin", name]),
        ScriptResolution::Yarn => Some(["yarn", "add", name]),
        ScriptResolution::Npm => Some(["npm", "install", name]),
        ScriptResolution::Unknown => None,
    }
}

const MANIFEST_COMMAND: [&str; 2] = ["rake", "stimulus:manifest:update"];

impl LanguagePackages for ShellToolchain {
    fn language_package_installed(&self, name: &str) -> Result<bool> {
        self.succeeds("bundle", &["show", name])
    }

    fn add_language_package(&self, name: &str) -> Result<()> {
        self.run("bundle", &["add", name])
    }
}

impl ScriptPackages for ShellToolchain {
    fn install_script_package(&self, name: &str) -> Result<()> {
        match script_install_command(self.script_resolution, name) {
            Some([program, args @ ..]) => self.run(program, &args),
            None => anyhow::bail!(
                "Could not detect a JavaScript package manager. Please install {} manually",
                name
            ),
        }
    }
}

impl PinConfig for ShellToolchain {
    fn append_pin(&self, name: &str, url: &str) -> Result<()> {
        append_pin_line(&self.importmap_path, name, url)
    }
}

impl ControllerManifest for ShellToolchain {
    fn rebuild_controller_manifest(&self) -> Result<()> {
        let [program, args @ ..] = MANIFEST_COMMAND;
        self.run(program, &args)
    }
}

/// Append `pin "<name>", to: "<url>"` to the end of the importmap file
///
/// Existing pins are left alone, so repeated runs may add duplicates.
pub fn append_pin_line(importmap: &Path, name: &str, url: &str) -> Result<()> {
    if !importmap.is_file() {
        anyhow::bail!("Importmap config not found: {}", importmap.display());
    }

    let existing = std::fs::read(importmap)
        .with_context(|| format!("Failed to read {}", importmap.display()))?;

    let mut file = OpenOptions::new()
        .append(true)
        .open(importmap)
        .with_context(|| format!("Failed to open {}", importmap.display()))?;

    let mut line = String::new();
    if existing.last().is_some_and(|b| *b != b'\n') {
        line.push('\n');
    }
    line.push_str(&format!("pin \"{}\", to: \"{}\"\n", name, url));

    file.write_all(line.as_bytes())
        .with_context(|| format!("Failed to write {}", importmap.display()))?;
    Ok(())
}

/// Whether a command's output is shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Echo {
    /// Print the command line, then stream stdout and stderr
    Stream,
    /// Discard all output
    Quiet,
}

fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command in `dir` and return its exit status, failing on timeout
async fn run_command(
    dir: &Path,
    program: &str,
    args: &[&str],
    limit: Duration,
    echo: Echo,
) -> Result<ExitStatus> {
    let display = command_line(program, args);

    let mut command = TokioCommand::new(program);
    command.args(args).current_dir(dir).kill_on_drop(true);

    // Dropping the child on timeout kills it
    let outcome = match echo {
        Echo::Stream => {
            println!("{} {}", "Running:".dimmed(), display.yellow());
            let mut child = command
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .with_context(|| format!("Failed to run `{}`", display))?;
            timeout(limit, stream_output(&mut child)).await
        }
        Echo::Quiet => {
            let mut child = command
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .with_context(|| format!("Failed to run `{}`", display))?;
            timeout(limit, child.wait()).await
        }
    };

    match outcome {
        Ok(Ok(status)) => Ok(status),
        Ok(Err(e)) => anyhow::bail!("Failed to wait for `{}`: {}", display, e),
        Err(_) => anyhow::bail!(
            "`{}` timed out after {} seconds",
            display,
            limit.as_secs()
        ),
    }
}

/// Print the child's stdout and stderr line by line until both close, then wait for it
async fn stream_output(child: &mut Child) -> std::io::Result<ExitStatus> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("stdout not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("stderr not captured"))?;

    let mut stdout_reader = BufReader::new(stdout).lines();
    let mut stderr_reader = BufReader::new(stderr).lines();
    let mut stdout_done = false;
    let mut stderr_done = false;

    while !(stdout_done && stderr_done) {
        tokio::select! {
            line = stdout_reader.next_line(), if !stdout_done => {
                match line {
                    Ok(Some(line)) => println!("  {}", line),
                    Ok(None) => stdout_done = true,
                    Err(e) => {
                        eprintln!("{} {}", "Error reading stdout:".red(), e);
                        stdout_done = true;
                    }
                }
            }
            line = stderr_reader.next_line(), if !stderr_done => {
                match line {
                    Ok(Some(line)) => eprintln!("  {}", line.yellow()),
                    Ok(None) => stderr_done = true,
                    Err(e) => {
                        eprintln!("{} {}", "Error reading stderr:".red(), e);
                        stderr_done = true;
                    }
                }
            }
        }
    }

    child.wait().await
}

//! Template bundles: locating, copying, and the dependency catalog
//!
//! This module provides:
//! - The dependency catalog types (Catalog, DependencyRecord)
//! - Template root resolution (flag, environment, installed package)
//! - Bundle lookup by component identifier
//! - Bundle copying into the host project's layout

pub mod catalog;
pub mod copier;
pub mod locator;

use crate::component::ComponentId;
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::Command;

pub use catalog::{Catalog, DependencyRecord};
pub use copier::{copy_bundle, CopiedFiles, PartialCopy};
pub use locator::{list_components, locate, TemplateBundle};

/// Find the directory holding one sub-directory per component
///
/// Precedence: explicit directory, then the product's environment variable,
/// then the template package installed in the project at `project_root`
/// (`bundle info --path`, run from that directory).
pub fn resolve_template_root<C: ProductConfig>(
    config: &C,
    template_dir: &Option<PathBuf>,
    project_root: &Path,
) -> Result<PathBuf> {
    let dir = match template_dir {
        Some(dir) => dir.clone(),
        None => match std::env::var(config.template_dir_env()) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => installed_template_root(config, project_root).with_context(|| {
                format!(
                    "Could not locate {} templates. Pass --template-dir or set {}",
                    config.display_name(),
                    config.template_dir_env()
                )
            })?,
        },
    };

    if !dir.is_dir() {
        anyhow::bail!("Template directory not found: {}", dir.display());
    }

    Ok(dir)
}

/// Templates shipped inside the installed package: `<package path>/lib/<namespace>`
fn installed_template_root<C: ProductConfig>(config: &C, project_root: &Path) -> Result<PathBuf> {
    let output = bundle_info_command(config, project_root)
        .output()
        .context("Failed to run `bundle info`")?;

    if !output.status.success() {
        anyhow::bail!(
            "`bundle info --path {}` exited with code {}",
            config.template_package(),
            output.status.code().unwrap_or(-1)
        );
    }

    let package_path =
        String::from_utf8(output.stdout).context("Package path is not valid UTF-8")?;
    Ok(Path::new(package_path.trim())
        .join("lib")
        .join(config.namespace()))
}

/// Bundler resolves the package against the Gemfile of the directory it runs in
fn bundle_info_command<C: ProductConfig>(config: &C, project_root: &Path) -> Command {
    let mut command = Command::new("bundle");
    command
        .args(["info", "--path", config.template_package()])
        .current_dir(project_root);
    command
}

/// Print available components and what each one pulls in
pub fn print_component_list<C: ProductConfig>(config: &C, template_root: &Path) -> Result<()> {
    let catalog = config.catalog()?;
    let names = list_components(template_root)?;

    println!(
        "{}",
        format!("{} components ({})", config.display_name(), names.len())
            .cyan()
            .bold()
    );
    println!();

    for name in &names {
        let record = ComponentId::parse(name)
            .map(|id| catalog.lookup(&id).clone())
            .unwrap_or_default();

        let mut requires = Vec::new();
        if !record.components.is_empty() {
            requires.push(format!("components: {}", record.components.join(", ")));
        }
        if !record.language_packages.is_empty() {
            requires.push(format!("gems: {}", record.language_packages.join(", ")));
        }
        if !record.script_packages.is_empty() {
            requires.push(format!("js: {}", record.script_packages.join(", ")));
        }

        if requires.is_empty() {
            println!("  {} {}", "->".blue(), name);
        } else {
            println!(
                "  {} {} {}",
                "->".blue(),
                name,
                format!("({})", requires.join("; ")).dimmed()
            );
        }
    }

    Ok(())
}

//! Charm-style CLI prompts using cliclack

use crate::component::ComponentId;
use crate::config::host::{HostProject, ScriptResolution};
use crate::generator::Generator;
use crate::install::ShellToolchain;
use crate::product::ProductConfig;
use crate::report::{GenerationReport, InstallAction};
use crate::runtime::check;
use crate::templates::{self, catalog::Catalog};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// CLI arguments for the add command
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    /// Component to add; prompts when missing
    pub component: Option<String>,

    /// Local directory to use for templates instead of the installed package
    pub template_dir: Option<PathBuf>,

    /// Host project directory
    pub directory: Option<PathBuf>,

    /// Override JavaScript package manager detection
    pub js_manager: Option<ScriptResolution>,

    /// Skip the host tool check
    pub skip_tool_check: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Run the add flow with interactive prompts
pub fn run<C: ProductConfig>(config: &C, args: AddArgs) -> Result<()> {
    cliclack::intro(config.display_name())?;

    // Step 1: Find the host project, then the templates installed for it
    let host = setup_host(config, &args)?;
    let template_root = setup_template_root(config, &args, &host.root)?;

    // Step 2: Check host tools (advisory)
    if args.skip_tool_check {
        cliclack::log::info("Skipping tool check")?;
    } else {
        check_tools(&host)?;
    }

    // Step 3: Select the component
    let catalog = config.catalog()?;
    let component = select_component(&template_root, catalog, &args)?;

    // Step 4: Generate
    let toolchain = ShellToolchain::new(&host)?;
    let generator = Generator::new(config, catalog, &template_root, &host, &toolchain);

    let report = match generator.generate(&component) {
        Ok(report) => report,
        Err(e) if e.is_not_found() => {
            cliclack::log::error(format!("{}", e))?;
            cliclack::outro_cancel(format!("Component not found: {}", component))?;
            anyhow::bail!("Component not found: {}", component);
        }
        Err(e) => return Err(e.into()),
    };

    // Step 5: Summarize
    print_summary(&host, &report)
}

fn setup_template_root<C: ProductConfig>(
    config: &C,
    args: &AddArgs,
    project_root: &Path,
) -> Result<PathBuf> {
    let root = templates::resolve_template_root(config, &args.template_dir, project_root)?;
    cliclack::log::info(format!("Using templates from {}", root.display()))?;
    Ok(root)
}

fn setup_host<C: ProductConfig>(config: &C, args: &AddArgs) -> Result<HostProject> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let root = match &args.directory {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => current_dir.join(dir),
        None => current_dir,
    };

    if !root.is_dir() {
        anyhow::bail!("Project directory does not exist: {}", root.display());
    }

    let host = HostProject::detect(&root, config.namespace(), args.js_manager);
    match host.script_resolution {
        ScriptResolution::Unknown => cliclack::log::warning(
            "Could not detect a JavaScript package manager (importmap, yarn, or npm)",
        )?,
        mode => cliclack::log::info(format!("JavaScript packages: {}", mode))?,
    }

    Ok(host)
}

fn check_tools(host: &HostProject) -> Result<()> {
    let tools = check::check_host_tools(host);
    let missing = check::missing_tools(&tools);

    if missing.is_empty() {
        let found: Vec<String> = tools
            .iter()
            .map(|t| match &t.version {
                Some(version) => format!("{} ({})", t.name, version),
                None => t.name.to_string(),
            })
            .collect();
        cliclack::log::success(format!("Detected tools: {}", found.join(", ")))?;
    } else {
        // Advisory: files can still be copied; installs will be reported as failures
        cliclack::log::warning(format!("Missing tools:\n{}", missing.join("\n")))?;
    }

    Ok(())
}

fn select_component(template_root: &Path, catalog: &Catalog, args: &AddArgs) -> Result<String> {
    // If a component was specified on the command line, use it directly
    if let Some(component) = &args.component {
        describe_dependencies(catalog, component)?;
        return Ok(component.clone());
    }

    let available = templates::list_components(template_root)?;
    if available.is_empty() {
        anyhow::bail!("No components found in {}", template_root.display());
    }

    let mut select = cliclack::select("Select a component");
    for (idx, name) in available.iter().enumerate() {
        select = select.item(idx, name, dependency_hint(catalog, name));
    }
    let selected_idx: usize = select.interact()?;
    let component = available[selected_idx].clone();

    describe_dependencies(catalog, &component)?;

    let confirm = if args.yes {
        true
    } else {
        cliclack::confirm(format!("Add {}?", component))
            .initial_value(true)
            .interact()?
    };

    if !confirm {
        cliclack::outro_cancel("Cancelled")?;
        anyhow::bail!("Setup cancelled.");
    }

    Ok(component)
}

fn dependency_hint(catalog: &Catalog, name: &str) -> String {
    let Ok(id) = ComponentId::parse(name) else {
        return String::new();
    };
    let record = catalog.lookup(&id);
    record
        .components
        .iter()
        .chain(record.language_packages.iter())
        .chain(record.script_packages.iter())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_dependencies(catalog: &Catalog, name: &str) -> Result<()> {
    let hint = dependency_hint(catalog, name);
    if !hint.is_empty() {
        cliclack::log::info(format!("Requires: {}", hint))?;
    }
    Ok(())
}

fn print_summary(host: &HostProject, report: &GenerationReport) -> Result<()> {
    let files = report.written_files();
    let mut unique: Vec<&PathBuf> = files.clone();
    unique.sort();
    unique.dedup();

    let packages = report
        .all_actions()
        .iter()
        .filter(|a| {
            matches!(
                a,
                InstallAction::LanguagePackageAdded(_)
                    | InstallAction::ScriptPackageInstalled(_)
                    | InstallAction::PinAppended { .. }
            )
        })
        .count();

    let summary = format!(
        "Wrote {} files to {} ({} dependency actions)",
        unique.len(),
        host.root.display(),
        packages
    );

    let failures = report.all_failures();
    if failures.is_empty() {
        cliclack::log::success(summary)?;
        cliclack::outro(format!("{} is ready", report.component))?;
        return Ok(());
    }

    cliclack::log::warning(summary)?;
    for failure in &failures {
        if failure.error.is_warning() {
            cliclack::log::warning(failure.to_string())?;
        } else {
            cliclack::log::error(failure.to_string())?;
        }
    }
    cliclack::outro_cancel("Completed with failures")?;

    anyhow::bail!(
        "{} step(s) failed while adding {}. Re-run the command to retry; finished steps are safe to repeat.",
        failures.len(),
        report.component
    )
}

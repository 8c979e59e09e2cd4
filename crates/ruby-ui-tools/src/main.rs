//! ruby-ui CLI - Add RubyUI components to a Rails project

use anyhow::Result;
use clap::{Parser, Subcommand};
use component_core::templates::{self, Catalog};
use component_core::tui::AddArgs;
use component_core::{ProductConfig, ScriptResolution};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Component dependencies shipped with the CLI
const DEPENDENCIES: &str = include_str!("../dependencies.yml");

/// RubyUI product configuration
#[derive(Clone)]
pub struct RubyUiConfig;

impl ProductConfig for RubyUiConfig {
    fn display_name(&self) -> &'static str {
        "RubyUI"
    }

    fn namespace(&self) -> &'static str {
        "ruby_ui"
    }

    fn template_package(&self) -> &'static str {
        "ruby_ui"
    }

    fn template_dir_env(&self) -> &'static str {
        "RUBY_UI_TEMPLATE_DIR"
    }

    fn catalog(&self) -> Result<&'static Catalog> {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        Catalog::load_once(&CATALOG, DEPENDENCIES)
    }
}

#[derive(Parser, Debug)]
#[command(name = "ruby-ui")]
#[command(about = "CLI for adding RubyUI components to a Rails project")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a component, the components it uses, and its gems and JavaScript packages
    Add(CliAddArgs),
    /// List available components and their dependencies
    List(ListArgs),
}

#[derive(Parser, Debug)]
pub struct CliAddArgs {
    /// Component to add (e.g. DatePicker or date_picker); prompts when omitted
    pub component: Option<String>,

    /// Local directory to use for templates instead of the installed ruby_ui gem
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Rails project directory (defaults to the current directory)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// JavaScript package manager, instead of detecting it from the project
    #[arg(long = "js-manager", value_enum)]
    pub js_manager: Option<ScriptResolution>,

    /// Skip checking for bundler and the JavaScript package manager
    #[arg(long = "skip-tool-check")]
    pub skip_tool_check: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliAddArgs> for AddArgs {
    fn from(args: CliAddArgs) -> Self {
        AddArgs {
            component: args.component,
            template_dir: args.template_dir,
            directory: args.directory,
            js_manager: args.js_manager,
            skip_tool_check: args.skip_tool_check,
            yes: args.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Local directory to use for templates instead of the installed ruby_ui gem
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Rails project whose installed ruby_ui gem provides the templates
    #[arg(short, long)]
    pub directory: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let config = RubyUiConfig;

    match args.command {
        Some(Command::Add(add_args)) => {
            let result = component_core::run(&config, add_args.into());

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
        Some(Command::List(list_args)) => {
            let project_root = match list_args.directory {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let root =
                templates::resolve_template_root(&config, &list_args.template_dir, &project_root)?;
            templates::print_component_list(&config, &root)
        }
        None => {
            // No subcommand provided, default to add behavior (interactive mode)
            let result = component_core::run(&config, AddArgs::default());

            let _ = console::Term::stderr().show_cursor();

            result
        }
    }
}

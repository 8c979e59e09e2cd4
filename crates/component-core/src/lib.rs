//! Component Core - Shared library for component scaffolding CLIs
//!
//! This library adds a UI component's template files to a host project,
//! together with everything the component depends on: other components,
//! language packages, and JavaScript packages. It is designed to be used by
//! CLI binaries that share the same generation logic but ship different
//! component libraries.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Catalog lookup, bundle location, file copying, host detection
//! - **Layer 2: Generation** - `Generator`, which drives locate -> copy -> install recursively,
//!   and `Installer`, which applies package dependencies through a `Toolchain`
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use component_core::{Generator, HostProject, ProductConfig, ShellToolchain};
//!
//! let host = HostProject::detect(&project_dir, config.namespace(), None);
//! let toolchain = ShellToolchain::new(&host)?;
//! let generator = Generator::new(&config, config.catalog()?, template_root, &host, &toolchain);
//! let report = generator.generate("DatePicker")?;
//! ```

pub mod component;
pub mod config;
pub mod error;
pub mod generator;
pub mod install;
pub mod product;
pub mod report;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use component::ComponentId;
pub use config::{HostProject, ScriptResolution, TargetLayout};
pub use error::{Failure, GenerateError};
pub use generator::Generator;
pub use install::{Installer, ShellToolchain, Toolchain};
pub use product::ProductConfig;
pub use report::{GenerationReport, InstallAction};
pub use templates::{Catalog, DependencyRecord, TemplateBundle};

#[cfg(feature = "tui")]
pub use tui::run;

//! Dependency installation
//!
//! This module provides:
//! - The collaborator traits the installer drives (package managers, pin config, manifest)
//! - `Installer`, which applies a component's package dependencies idempotently
//! - The CDN pin table for packages the standard installer gets wrong
//! - `ShellToolchain`, the real collaborators backed by the host's command-line tools

pub mod pins;
pub mod shell;

use crate::config::host::ScriptResolution;
use crate::error::GenerateError;
use crate::report::{GenerationReport, InstallAction};
use anyhow::Result;
use colored::Colorize;

pub use pins::{cdn_pins, CdnPin, PinDeclaration, CDN_PINS};
pub use shell::ShellToolchain;

/// Host language package manager (Bundler)
pub trait LanguagePackages {
    fn language_package_installed(&self, name: &str) -> Result<bool>;
    fn add_language_package(&self, name: &str) -> Result<()>;
}

/// Host JavaScript package manager; expected to no-op for installed packages
pub trait ScriptPackages {
    fn install_script_package(&self, name: &str) -> Result<()>;
}

/// Script-resolution config file (`config/importmap.rb`)
pub trait PinConfig {
    fn append_pin(&self, name: &str, url: &str) -> Result<()>;
}

/// Controllers manifest for setups that do not eager-load controllers
pub trait ControllerManifest {
    fn rebuild_controller_manifest(&self) -> Result<()>;
}

/// Everything the generator needs from the host's tooling
pub trait Toolchain: LanguagePackages + ScriptPackages + PinConfig + ControllerManifest {}

impl<T> Toolchain for T where
    T: LanguagePackages + ScriptPackages + PinConfig + ControllerManifest
{
}

/// Applies package dependencies, recording actions and failures on a report
///
/// Every package is handled on its own: a failed install is recorded and the
/// remaining packages are still attempted.
pub struct Installer<'a> {
    toolchain: &'a dyn Toolchain,
    script_resolution: ScriptResolution,
}

impl<'a> Installer<'a> {
    pub fn new(toolchain: &'a dyn Toolchain, script_resolution: ScriptResolution) -> Self {
        Self {
            toolchain,
            script_resolution,
        }
    }

    /// Add each language package that is not already installed
    pub fn install_language_packages(&self, packages: &[String], report: &mut GenerationReport) {
        for package in packages {
            let result = self
                .toolchain
                .language_package_installed(package)
                .and_then(|installed| {
                    if installed {
                        Ok(InstallAction::LanguagePackagePresent(package.clone()))
                    } else {
                        self.toolchain
                            .add_language_package(package)
                            .map(|_| InstallAction::LanguagePackageAdded(package.clone()))
                    }
                });

            match result {
                Ok(action) => {
                    match action {
                        InstallAction::LanguagePackagePresent(_) => {
                            println!("  {} gem {}", "identical".blue(), package)
                        }
                        _ => println!("  {} gem {}", "added".green(), package),
                    }
                    report.actions.push(action);
                }
                Err(e) => report.fail(GenerateError::installer(package, e)),
            }
        }
    }

    /// Install each script package, pinning special-cased packages to their CDN build
    pub fn install_script_packages(&self, packages: &[String], report: &mut GenerationReport) {
        for package in packages {
            let pins = match self.script_resolution {
                ScriptResolution::Importmap => cdn_pins(package),
                _ => None,
            };

            match pins {
                Some(pins) => self.append_pins(package, pins, report),
                None => match self.toolchain.install_script_package(package) {
                    Ok(()) => {
                        println!("  {} js {}", "installed".green(), package);
                        report
                            .actions
                            .push(InstallAction::ScriptPackageInstalled(package.clone()));
                    }
                    Err(e) => report.fail(GenerateError::installer(package, e)),
                },
            }
        }
    }

    fn append_pins(&self, package: &str, pins: &[PinDeclaration], report: &mut GenerationReport) {
        eprintln!(
            "{} Installing {} from CDN because `bin/importmap pin {}` doesn't download the correct file.",
            "WARNING:".yellow(),
            package,
            package
        );

        for pin in pins {
            match self.toolchain.append_pin(pin.name, pin.url) {
                Ok(()) => {
                    println!("  {} {}", "append".green(), pin.to_line());
                    report.actions.push(InstallAction::PinAppended {
                        package: package.to_string(),
                        pin: pin.name.to_string(),
                        url: pin.url.to_string(),
                    });
                }
                Err(e) => report.fail(GenerateError::installer(package, e)),
            }
        }
    }

    pub fn rebuild_manifest(&self, report: &mut GenerationReport) {
        println!("{}", "Updating Stimulus controllers manifest".cyan());
        match self.toolchain.rebuild_controller_manifest() {
            Ok(()) => report.actions.push(InstallAction::ManifestRebuilt),
            Err(e) => report.fail(GenerateError::installer("controllers manifest", e)),
        }
    }
}

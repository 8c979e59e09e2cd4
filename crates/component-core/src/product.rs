//! Product configuration trait for CLI binaries
//!
//! This trait defines the interface that each product (e.g. RubyUI) must implement
//! to describe where its component templates live and where they land in a host project.

use crate::templates::catalog::Catalog;
use anyhow::Result;

/// Configuration trait for different component libraries
///
/// Each product implements this trait to define:
/// - Product identity (display name)
/// - The namespace directory used on both the template and target side
/// - How to find the template bundles
/// - File extensions for definition and script-controller files
/// - The dependency catalog shipped with the product
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Directory name used under `app/components` and `app/javascript/controllers`
    fn namespace(&self) -> &'static str;

    /// Name of the package that ships the template bundles (used to locate them)
    fn template_package(&self) -> &'static str;

    /// Environment variable name for overriding the template directory
    fn template_dir_env(&self) -> &'static str;

    /// Extension of component definition files, without the dot
    fn definition_extension(&self) -> &'static str {
        "rb"
    }

    /// Extension of script-controller files, without the dot
    fn controller_extension(&self) -> &'static str {
        "js"
    }

    /// The dependency catalog, parsed once per process
    fn catalog(&self) -> Result<&'static Catalog>;
}

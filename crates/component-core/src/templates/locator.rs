//! Resolving component identifiers to template bundles

use crate::component::ComponentId;
use crate::error::GenerateError;
use crate::product::ProductConfig;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The template files for one component, before they are copied
#[derive(Debug, Clone)]
pub struct TemplateBundle {
    pub id: ComponentId,
    pub dir: PathBuf,
    /// `<id>.<ext>`; absent for aggregate components (e.g. typography)
    pub main_file: Option<PathBuf>,
    /// Every other definition file in the bundle
    pub related_files: Vec<PathBuf>,
    pub controller_files: Vec<PathBuf>,
}

impl TemplateBundle {
    pub fn file_count(&self) -> usize {
        usize::from(self.main_file.is_some())
            + self.related_files.len()
            + self.controller_files.len()
    }
}

/// Locate the template bundle for `id` under `template_root`
///
/// Fails with `ComponentNotFound` when the component directory does not exist.
pub fn locate<C: ProductConfig>(
    config: &C,
    template_root: &Path,
    id: &ComponentId,
) -> Result<TemplateBundle, GenerateError> {
    let dir = template_root.join(id.as_str());
    if !dir.is_dir() {
        return Err(GenerateError::ComponentNotFound {
            name: id.to_string(),
            path: dir,
        });
    }

    let definitions = list_files(&dir, config.definition_extension())?;
    let controller_files = list_files(&dir, config.controller_extension())?;

    let main_name = format!("{}.{}", id, config.definition_extension());
    let (main, related_files): (Vec<PathBuf>, Vec<PathBuf>) = definitions
        .into_iter()
        .partition(|path| path.file_name().is_some_and(|name| name == main_name.as_str()));

    Ok(TemplateBundle {
        id: id.clone(),
        dir,
        main_file: main.into_iter().next(),
        related_files,
        controller_files,
    })
}

/// Names of all components that have a template bundle, sorted
pub fn list_components(template_root: &Path) -> Result<Vec<String>, GenerateError> {
    let mut names = Vec::new();

    for entry in WalkDir::new(template_root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry
            .map_err(|e| GenerateError::filesystem("read", template_root, e.into()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            // Skip anything that could not be requested by name (e.g. hidden dirs)
            if ComponentId::parse(name).is_ok_and(|id| id.as_str() == name) {
                names.push(name.to_string());
            }
        }
    }

    Ok(names)
}

/// Files directly inside `dir` with the given extension, sorted by name
fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, GenerateError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| GenerateError::filesystem("read", dir, e.into()))?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == extension)
        {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

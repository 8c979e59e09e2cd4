//! Copying a template bundle into the host project

use crate::config::host::TargetLayout;
use crate::error::GenerateError;
use crate::templates::locator::TemplateBundle;
use std::fs;
use std::path::{Path, PathBuf};

/// Files written for one bundle, grouped the way they were copied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopiedFiles {
    pub main: Option<PathBuf>,
    pub related: Vec<PathBuf>,
    pub controllers: Vec<PathBuf>,
}

impl CopiedFiles {
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        self.main
            .iter()
            .chain(self.related.iter())
            .chain(self.controllers.iter())
    }

    pub fn len(&self) -> usize {
        self.all().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A copy that stopped at its first filesystem error
#[derive(Debug)]
pub struct PartialCopy {
    /// Files written before the error; they stay in place
    pub copied: CopiedFiles,
    pub error: GenerateError,
}

/// Copy every file of `bundle` to its place in `layout`
///
/// Copies are byte-for-byte and overwrite existing files, so repeating the
/// copy with unchanged templates leaves the target unchanged. The first
/// filesystem error stops the copy; files already written stay in place and
/// are returned with the error.
pub fn copy_bundle(
    bundle: &TemplateBundle,
    layout: &TargetLayout,
) -> Result<CopiedFiles, PartialCopy> {
    let mut copied = CopiedFiles::default();
    match copy_into(bundle, layout, &mut copied) {
        Ok(()) => Ok(copied),
        Err(error) => Err(PartialCopy { copied, error }),
    }
}

fn copy_into(
    bundle: &TemplateBundle,
    layout: &TargetLayout,
    copied: &mut CopiedFiles,
) -> Result<(), GenerateError> {
    if let Some(main) = &bundle.main_file {
        // The main file is already named `<id>.<ext>`
        let target = layout.components_dir.join(file_name(main)?);
        copy_file(main, &target)?;
        copied.main = Some(target);
    }

    let related_dir = layout.related_dir(&bundle.id);
    for file in &bundle.related_files {
        let target = related_dir.join(file_name(file)?);
        copy_file(file, &target)?;
        copied.related.push(target);
    }

    for file in &bundle.controller_files {
        let target = layout.controllers_dir.join(file_name(file)?);
        copy_file(file, &target)?;
        copied.controllers.push(target);
    }

    Ok(())
}

fn copy_file(source: &Path, target: &Path) -> Result<(), GenerateError> {
    // Ensure parent directories exist
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| GenerateError::filesystem("create directory", parent, e))?;
    }

    fs::copy(source, target).map_err(|e| GenerateError::filesystem("write", target, e))?;
    Ok(())
}

fn file_name(path: &Path) -> Result<&std::ffi::OsStr, GenerateError> {
    path.file_name().ok_or_else(|| {
        GenerateError::filesystem(
            "read",
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })
}

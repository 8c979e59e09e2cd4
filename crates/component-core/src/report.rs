//! What a generation run did

use crate::component::ComponentId;
use crate::error::Failure;
use crate::templates::copier::CopiedFiles;
use std::path::PathBuf;

/// One dependency action performed for a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallAction {
    LanguagePackageAdded(String),
    LanguagePackagePresent(String),
    ScriptPackageInstalled(String),
    PinAppended {
        package: String,
        pin: String,
        url: String,
    },
    ManifestRebuilt,
}

/// Result of generating one component, including its generated sub-components
#[derive(Debug)]
pub struct GenerationReport {
    pub component: ComponentId,
    pub files: CopiedFiles,
    pub actions: Vec<InstallAction>,
    /// Sub-components that were generated (failed ones are in `failures`)
    pub dependencies: Vec<GenerationReport>,
    pub failures: Vec<Failure>,
}

impl GenerationReport {
    pub fn new(component: ComponentId, files: CopiedFiles) -> Self {
        Self {
            component,
            files,
            actions: Vec::new(),
            dependencies: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub(crate) fn fail(&mut self, error: crate::error::GenerateError) {
        self.failures.push(Failure::new(&self.component, error));
    }

    /// Every file written in this tree, in generation order (may repeat for diamonds)
    ///
    /// Includes files that failed sub-components wrote before stopping.
    pub fn written_files(&self) -> Vec<&PathBuf> {
        let mut files: Vec<&PathBuf> = self.files.all().collect();
        files.extend(self.failures.iter().flat_map(|f| f.written.all()));
        for dep in &self.dependencies {
            files.extend(dep.written_files());
        }
        files
    }

    pub fn all_actions(&self) -> Vec<&InstallAction> {
        let mut actions: Vec<&InstallAction> = self.actions.iter().collect();
        for dep in &self.dependencies {
            actions.extend(dep.all_actions());
        }
        actions
    }

    pub fn all_failures(&self) -> Vec<&Failure> {
        let mut failures: Vec<&Failure> = self.failures.iter().collect();
        for dep in &self.dependencies {
            failures.extend(dep.all_failures());
        }
        failures
    }

    pub fn wrote_controllers(&self) -> bool {
        !self.files.controllers.is_empty()
            || self.failures.iter().any(|f| !f.written.controllers.is_empty())
            || self.dependencies.iter().any(|d| d.wrote_controllers())
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.dependencies.iter().all(|d| d.is_success())
    }
}

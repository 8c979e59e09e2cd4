//! Host project detection and target layout

use crate::component::ComponentId;
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

/// How the host project resolves JavaScript packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScriptResolution {
    Importmap,
    Yarn,
    Npm,
    /// No marker file found; packages must be installed by hand
    #[value(skip)]
    Unknown,
}

/// Marker files in order of preference
const MARKERS: &[(&str, ScriptResolution)] = &[
    ("config/importmap.rb", ScriptResolution::Importmap),
    ("yarn.lock", ScriptResolution::Yarn),
    ("package-lock.json", ScriptResolution::Npm),
];

impl ScriptResolution {
    /// Detect the resolution mode from marker files in the project root
    pub fn detect(root: &Path) -> Self {
        MARKERS
            .iter()
            .find(|(marker, _)| root.join(marker).is_file())
            .map(|(_, mode)| *mode)
            .unwrap_or(ScriptResolution::Unknown)
    }

    /// Importmap loads controllers with `eagerLoadControllersFrom`; every
    /// other setup keeps an explicit controllers manifest
    pub fn requires_manifest(&self) -> bool {
        !matches!(self, ScriptResolution::Importmap)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ScriptResolution::Importmap => "importmap",
            ScriptResolution::Yarn => "yarn",
            ScriptResolution::Npm => "npm",
            ScriptResolution::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ScriptResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Where copied files land in the host project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLayout {
    /// Main component files: `app/components/<ns>/<id>.rb`
    pub components_dir: PathBuf,
    /// Related files go to `<related_root>/<id>/`
    pub related_root: PathBuf,
    pub controllers_dir: PathBuf,
}

impl TargetLayout {
    pub fn new(root: &Path, namespace: &str) -> Self {
        let components_dir = root.join("app").join("components").join(namespace);
        Self {
            related_root: components_dir.clone(),
            components_dir,
            controllers_dir: root
                .join("app")
                .join("javascript")
                .join("controllers")
                .join(namespace),
        }
    }

    pub fn related_dir(&self, id: &ComponentId) -> PathBuf {
        self.related_root.join(id.as_str())
    }
}

/// The project components are generated into
#[derive(Debug, Clone)]
pub struct HostProject {
    pub root: PathBuf,
    pub script_resolution: ScriptResolution,
    pub layout: TargetLayout,
}

impl HostProject {
    /// Inspect `root`; `script_override` replaces marker-file detection
    pub fn detect(root: &Path, namespace: &str, script_override: Option<ScriptResolution>) -> Self {
        Self {
            root: root.to_path_buf(),
            script_resolution: script_override.unwrap_or_else(|| ScriptResolution::detect(root)),
            layout: TargetLayout::new(root, namespace),
        }
    }

    /// Script-resolution config file that receives pin declarations
    pub fn importmap_path(&self) -> PathBuf {
        self.root.join("config").join("importmap.rb")
    }
}

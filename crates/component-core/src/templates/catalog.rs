//! Dependency catalog types and parsing

use crate::component::ComponentId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// What a component needs besides its own files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Other components, generated through the same pipeline
    #[serde(default)]
    pub components: Vec<String>,

    /// Packages for the host language's package manager
    #[serde(default, alias = "gems")]
    pub language_packages: Vec<String>,

    /// Packages for the host's JavaScript package manager
    #[serde(default, alias = "js_packages")]
    pub script_packages: Vec<String>,
}

static EMPTY_RECORD: DependencyRecord = DependencyRecord {
    components: Vec::new(),
    language_packages: Vec::new(),
    script_packages: Vec::new(),
};

impl DependencyRecord {
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
            && self.language_packages.is_empty()
            && self.script_packages.is_empty()
    }
}

/// Static map from component identifier to its dependency record
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<ComponentId, DependencyRecord>,
}

impl Catalog {
    /// Parse a catalog definition (`dependencies.yml`)
    ///
    /// Keys are normalized the same way as requested component names, and an
    /// entry with no body counts as "no dependencies".
    pub fn from_yaml(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: BTreeMap<String, Option<DependencyRecord>> =
            serde_yaml::from_str(source).context("Failed to parse dependency catalog")?;

        let mut entries = BTreeMap::new();
        for (name, record) in raw {
            let id = ComponentId::parse(&name)
                .with_context(|| format!("Invalid component in dependency catalog: {}", name))?;
            entries.insert(id, record.unwrap_or_default());
        }

        Ok(Self { entries })
    }

    /// Parse `source` into `cell` on first use; later calls return the cached catalog
    pub fn load_once(cell: &'static OnceLock<Catalog>, source: &str) -> Result<&'static Catalog> {
        if let Some(catalog) = cell.get() {
            return Ok(catalog);
        }
        let parsed = Self::from_yaml(source)?;
        Ok(cell.get_or_init(|| parsed))
    }

    /// Dependencies of a component; components without an entry have none
    pub fn lookup(&self, id: &ComponentId) -> &DependencyRecord {
        self.entries.get(id).unwrap_or(&EMPTY_RECORD)
    }

    /// Components that declare dependencies, in name order
    pub fn components(&self) -> impl Iterator<Item = &ComponentId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

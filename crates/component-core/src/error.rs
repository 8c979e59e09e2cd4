//! Error taxonomy for component generation

use crate::templates::copier::CopiedFiles;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Component not found: {name} (no templates in {})", path.display())]
    ComponentNotFound { name: String, path: PathBuf },

    #[error("Invalid component name: '{0}'")]
    InvalidName(String),

    #[error("Failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to install '{package}': {message}")]
    Installer { package: String, message: String },

    #[error("Dependency cycle: {}", chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },
}

impl GenerateError {
    pub(crate) fn filesystem(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Wrap a collaborator error, keeping its full context chain in the message
    pub(crate) fn installer(package: &str, err: anyhow::Error) -> Self {
        Self::Installer {
            package: package.to_string(),
            message: format!("{:#}", err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ComponentNotFound { .. } | Self::InvalidName(_))
    }

    /// Installer failures are warnings: nothing already written is undone
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Installer { .. })
    }
}

/// A failure attributed to the component whose generation or dependency step produced it
#[derive(Debug)]
pub struct Failure {
    pub component: String,
    pub error: GenerateError,
    /// Files the component wrote before it failed
    pub written: CopiedFiles,
}

impl Failure {
    pub fn new(component: impl ToString, error: GenerateError) -> Self {
        Self {
            component: component.to_string(),
            error,
            written: CopiedFiles::default(),
        }
    }

    pub fn with_written(mut self, written: CopiedFiles) -> Self {
        self.written = written;
        self
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.component, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installer_error_keeps_context_chain() {
        let err = anyhow::anyhow!("exit code 1").context("bundle add rouge");
        let wrapped = GenerateError::installer("rouge", err);
        let message = wrapped.to_string();
        assert!(message.contains("rouge"));
        assert!(message.contains("exit code 1"));
        assert!(wrapped.is_warning());
    }

    #[test]
    fn test_not_found_classification() {
        let err = GenerateError::ComponentNotFound {
            name: "nope".to_string(),
            path: PathBuf::from("/tmp/nope"),
        };
        assert!(err.is_not_found());
        assert!(!err.is_warning());
        assert!(GenerateError::InvalidName("../x".to_string()).is_not_found());
    }

    #[test]
    fn test_cycle_message_lists_chain() {
        let err = GenerateError::DependencyCycle {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Dependency cycle: a -> b -> a");
    }
}

//! Error types for configuration store and registry operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
///
/// Registry rule violations carry the offending name so the CLI can print a
/// short message; storage failures carry the operation and file path.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A project with the same name is already registered.
    #[error("project \"{name}\" already exists")]
    DuplicateProject {
        /// Name passed to `add_project`.
        name: String,
    },
    /// No project is registered under the given name.
    #[error("no project named \"{name}\"")]
    UnknownProject {
        /// Name that failed lookup.
        name: String,
    },
    /// The current project cannot be removed until another one is selected.
    #[error("project \"{name}\" is the current project; select another project before removing it")]
    CurrentProjectProtected {
        /// Name of the current project.
        name: String,
    },
    /// The operation needs a current project and none is selected.
    #[error("no current project selected")]
    NoCurrentProject,
    /// No target group is stored under the given name in the current project.
    #[error("no target group named \"{name}\"")]
    UnknownGroup {
        /// Group name that failed lookup.
        name: String,
    },
    /// Project name cannot be stored.
    #[error("invalid project name \"{name}\": {reason}")]
    InvalidProjectName {
        /// Rejected name.
        name: String,
        /// Static reason for the rejection.
        reason: &'static str,
    },
    /// The platform configuration directory could not be determined.
    #[error("could not determine the platform configuration directory")]
    NoConfigDir,
    /// Filesystem access to the store failed.
    #[error("config store {operation} failed for {}", path.display())]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Store path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Encoding a value for the store failed.
    #[error("config store {operation} failed for {}", path.display())]
    Json {
        /// Operation identifier.
        operation: &'static str,
        /// Store path involved in the failure.
        path: PathBuf,
        /// Source JSON error.
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether the error is a registry rule violation rather than a storage failure.
    #[must_use]
    pub const fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateProject { .. }
                | Self::UnknownProject { .. }
                | Self::CurrentProjectProtected { .. }
                | Self::NoCurrentProject
                | Self::UnknownGroup { .. }
                | Self::InvalidProjectName { .. }
        )
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

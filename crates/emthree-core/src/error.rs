//! Error taxonomy of the resolution and acquisition engine.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single registry call.
///
/// The registry client never retries; every variant propagates unchanged to
/// the pipeline that issued the call.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found on registry: {0}")]
    NotFound(String),

    #[error("Malformed registry response: {0}")]
    Malformed(String),
}

impl RegistryError {
    /// Returns `true` for unknown ids or slugs.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Http(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }
}

/// One failed download inside a bulk operation.
#[derive(Debug)]
pub struct DownloadFailure {
    pub package: String,
    pub source: RegistryError,
}

impl std::fmt::Display for DownloadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.package, self.source)
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    /// Unknown id or slug. The package is dropped.
    #[error("{0} was not found on the registry")]
    NotFound(String),

    /// No version supports the configured loader at all. Terminal for the package.
    #[error("{package} has no version for loader '{loader}'")]
    Unavailable { package: String, loader: String },

    /// A decision callback declined the package.
    #[error("{package} skipped: {reason}")]
    Declined { package: String, reason: String },

    /// Transport or HTTP failure while acquiring a package.
    #[error("Failed to acquire {package}: {source}")]
    Acquisition {
        package: String,
        #[source]
        source: RegistryError,
    },

    /// Malformed line in a user-supplied package list. Aborts the whole list.
    #[error("Invalid entry '{entry}' on line {line} of {}", path.display())]
    Validation {
        path: PathBuf,
        line: usize,
        entry: String,
    },

    /// Destination directory is not empty on a bulk install.
    #[error("Refusing bulk install: {} is not empty", dir.display())]
    StateConflict { dir: PathBuf },

    /// One or more downloads of a bulk operation failed.
    #[error(
        "{} download(s) failed: {}",
        failures.len(),
        failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
    )]
    DownloadsFailed { failures: Vec<DownloadFailure> },

    #[error("Manifest error at {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Attribute a registry failure to a package, mapping unknown ids to `NotFound`.
    pub fn registry(package: impl Into<String>, source: RegistryError) -> Self {
        let package = package.into();
        if source.is_not_found() {
            Self::NotFound(package)
        } else {
            Self::Acquisition { package, source }
        }
    }

    /// Create a manifest error with the offending path.
    pub fn manifest(path: impl Into<PathBuf>, msg: impl std::fmt::Display) -> Self {
        Self::Manifest {
            path: path.into(),
            message: msg.to_string(),
        }
    }
}

//! Wire types for the mod registry's JSON API.
//!
//! These types mirror the subset of the registry's `project` and `version`
//! payloads the resolution engine consumes. They carry no I/O.

pub mod registry;
pub mod types;

// Re-exports
pub use registry::{
    Dependency, DependencyEdge, DependencyType, Project, Version, VersionFile, VersionType,
};
pub use types::{ProjectId, VersionId};

/// Placeholder written to the manifest for packages without a local file.
pub const NOT_INSTALLED: &str = "NOT_INSTALLED";

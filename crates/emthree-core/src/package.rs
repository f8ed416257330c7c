//! Package queries and resolved packages.

use emthree_schema::{DependencyEdge, ProjectId, Version, VersionId};

use crate::select::VersionStatus;

/// What to look up on the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PackageQuery {
    /// A user-supplied slug; the project id is learned from `project/{slug}`.
    Slug(String),
    /// A dependency edge; the slug is learned by redirect. A pinned
    /// `version_id` bypasses selection.
    ProjectId {
        id: ProjectId,
        version_id: Option<VersionId>,
    },
}

impl PackageQuery {
    /// Query for a user-supplied slug.
    pub fn slug(slug: impl Into<String>) -> Self {
        Self::Slug(slug.into())
    }

    /// Query for a dependency edge.
    pub fn from_edge(edge: &DependencyEdge) -> Self {
        Self::ProjectId {
            id: edge.project_id.clone(),
            version_id: edge.version_id.clone(),
        }
    }

    /// The identifier as typed, for logs.
    pub fn label(&self) -> &str {
        match self {
            Self::Slug(s) => s,
            Self::ProjectId { id, .. } => id.as_str(),
        }
    }
}

impl std::fmt::Display for PackageQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A package bound to its final version, plus installation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub slug: String,
    pub project_id: ProjectId,
    /// How the version was chosen.
    pub status: VersionStatus,
    pub version: Version,
    /// Required edges of `version`.
    pub dependencies: Vec<DependencyEdge>,
    pub downloaded: bool,
    pub local_filename: Option<String>,
}

impl ResolvedPackage {
    /// Mark the package installed under `filename`.
    pub fn installed(mut self, filename: String) -> Self {
        self.downloaded = true;
        self.local_filename = Some(filename);
        self
    }
}

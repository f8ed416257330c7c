//! Registry payloads: projects, versions, files and dependency edges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ProjectId, VersionId};

/// A registry project as returned by `project/{idOrSlug}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    /// Stable project id.
    pub id: ProjectId,
    /// Human-readable slug (e.g. `sodium`).
    pub slug: String,
    /// Display title, when the registry provides one.
    #[serde(default)]
    pub title: Option<String>,
}

/// Release channel of a version.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    /// Stable release.
    Release,
    /// Beta build.
    Beta,
    /// Alpha build.
    Alpha,
    /// Any channel this client does not know about; treated as non-release.
    #[serde(other)]
    Other,
}

impl VersionType {
    /// Returns `true` for the release channel.
    pub fn is_release(self) -> bool {
        self == Self::Release
    }
}

impl std::fmt::Display for VersionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Release => "release",
            Self::Beta => "beta",
            Self::Alpha => "alpha",
            Self::Other => "non-release",
        };
        f.write_str(s)
    }
}

/// How one version relates to another project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    /// Must be installed alongside.
    Required,
    /// May be installed alongside.
    Optional,
    /// Must not be installed alongside.
    Incompatible,
    /// Shipped inside the dependent's own artifact.
    Embedded,
    /// Any relation this client does not know about.
    #[serde(other)]
    Unknown,
}

/// A raw dependency entry of a version payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dependency {
    /// Target project, absent for file-only dependencies.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Exact target version, when pinned.
    #[serde(default)]
    pub version_id: Option<VersionId>,
    /// Relation kind.
    pub dependency_type: DependencyType,
}

/// A required dependency edge that participates in closure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    /// Required project.
    pub project_id: ProjectId,
    /// Required version, when the dependent pins one.
    pub version_id: Option<VersionId>,
}

/// A downloadable file attached to a version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionFile {
    /// Absolute download URL.
    pub url: String,
    /// File name to store the artifact under.
    pub filename: String,
    /// Whether the registry flags this as the version's main artifact.
    #[serde(default)]
    pub primary: bool,
}

/// One published version of a project, as returned by `version/{id}` and
/// `project/{idOrSlug}/version`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
    /// Version id.
    pub id: VersionId,
    /// Owning project, when the payload includes it.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Display name.
    pub name: String,
    /// Version number string (e.g. `0.6.0+mc1.21.1`).
    #[serde(default)]
    pub version_number: String,
    /// Release channel.
    pub version_type: VersionType,
    /// Publication time; versions of one project are ordered by it.
    pub date_published: DateTime<Utc>,
    /// Supported loader tags.
    #[serde(default)]
    pub loaders: Vec<String>,
    /// Supported platform (game) versions.
    #[serde(default)]
    pub game_versions: Vec<String>,
    /// Attached files, in registry order.
    #[serde(default)]
    pub files: Vec<VersionFile>,
    /// Raw dependency entries.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Version {
    /// Returns `true` if this version is on the release channel.
    pub fn is_release(&self) -> bool {
        self.version_type.is_release()
    }

    /// Returns `true` if this version declares the given loader tag.
    pub fn supports_loader(&self, loader: &str) -> bool {
        self.loaders.iter().any(|l| l == loader)
    }

    /// Returns `true` if this version lists the given platform version.
    pub fn supports_platform(&self, platform_version: &str) -> bool {
        self.game_versions.iter().any(|g| g == platform_version)
    }

    /// The file flagged primary, or the first file when none is flagged.
    pub fn primary_file(&self) -> Option<&VersionFile> {
        self.files
            .iter()
            .find(|f| f.primary)
            .or_else(|| self.files.first())
    }

    /// Returns `true` if some file carries the primary flag.
    pub fn has_flagged_primary(&self) -> bool {
        self.files.iter().any(|f| f.primary)
    }

    /// The required edges of this version, dropping optional, incompatible and
    /// embedded relations and file-only entries without a project.
    pub fn required_dependencies(&self) -> Vec<DependencyEdge> {
        self.dependencies
            .iter()
            .filter(|d| d.dependency_type == DependencyType::Required)
            .filter_map(|d| {
                d.project_id.clone().map(|project_id| DependencyEdge {
                    project_id,
                    version_id: d.version_id.clone(),
                })
            })
            .collect()
    }
}

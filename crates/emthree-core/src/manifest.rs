//! The persisted record of the last resolved or installed package set.
//!
//! On disk the manifest is a pretty-printed JSON array, one object per
//! package. The `file` field holds the installed filename, or
//! [`NOT_INSTALLED`] until the package has been downloaded.

use std::path::Path;

use emthree_schema::{NOT_INSTALLED, ProjectId, VersionId};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::EngineError;
use crate::package::ResolvedPackage;

/// One package in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Package slug.
    pub name: String,
    pub project_id: ProjectId,
    /// Human-readable version number.
    pub version: String,
    pub version_id: VersionId,
    /// Installed filename or `NOT_INSTALLED`.
    pub file: String,
    /// Project ids of the required dependencies.
    #[serde(default)]
    pub dependencies: Vec<ProjectId>,
}

impl ManifestEntry {
    pub fn is_installed(&self) -> bool {
        self.file != NOT_INSTALLED
    }
}

impl From<&ResolvedPackage> for ManifestEntry {
    fn from(pkg: &ResolvedPackage) -> Self {
        Self {
            name: pkg.slug.clone(),
            project_id: pkg.project_id.clone(),
            version: pkg.version.version_number.clone(),
            version_id: pkg.version.id.clone(),
            file: pkg
                .local_filename
                .clone()
                .filter(|_| pkg.downloaded)
                .unwrap_or_else(|| NOT_INSTALLED.to_string()),
            dependencies: pkg
                .dependencies
                .iter()
                .map(|d| d.project_id.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn from_packages<'a>(packages: impl IntoIterator<Item = &'a ResolvedPackage>) -> Self {
        Self {
            entries: packages.into_iter().map(ManifestEntry::from).collect(),
        }
    }

    /// Load a manifest, returning an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, EngineError> {
        if !fs::try_exists(path).await? {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| EngineError::manifest(path, e))
    }

    /// Atomically write the manifest to `path`.
    ///
    /// The JSON is written to a sibling temp file and renamed over the target,
    /// so readers never see a partial manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, the write or the rename fails.
    pub async fn save(&self, path: &Path) -> Result<(), EngineError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| EngineError::manifest(path, e))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, path).await?;

        tracing::debug!("Wrote {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn project_ids(&self) -> impl Iterator<Item = &ProjectId> {
        self.entries.iter().map(|e| &e.project_id)
    }

    /// Add or replace entries for `packages`, keyed by project id.
    pub fn upsert<'a>(&mut self, packages: impl IntoIterator<Item = &'a ResolvedPackage>) {
        for pkg in packages {
            let entry = ManifestEntry::from(pkg);
            match self
                .entries
                .iter_mut()
                .find(|e| e.project_id == entry.project_id)
            {
                Some(existing) => *existing = entry,
                None => self.entries.push(entry),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::VersionStatus;
    use emthree_schema::{DependencyEdge, Version};
    use tempfile::TempDir;

    fn pkg(slug: &str, id: &str) -> ResolvedPackage {
        let version: Version = serde_json::from_value(serde_json::json!({
            "id": format!("{id}v"),
            "name": "Release",
            "version_number": "0.6.0",
            "version_type": "release",
            "date_published": "2024-01-01T00:00:00Z",
            "loaders": ["fabric"],
            "game_versions": ["1.21.1"],
            "files": [],
            "dependencies": []
        }))
        .unwrap();
        ResolvedPackage {
            slug: slug.to_string(),
            project_id: ProjectId::new(id),
            status: VersionStatus::LatestRelease,
            version,
            dependencies: vec![DependencyEdge {
                project_id: ProjectId::new("P7dR8mSH"),
                version_id: None,
            }],
            downloaded: false,
            local_filename: None,
        }
    }

    #[test]
    fn test_entry_from_package() {
        let entry = ManifestEntry::from(&pkg("sodium", "AANobbMI"));
        assert_eq!(entry.name, "sodium");
        assert_eq!(entry.version, "0.6.0");
        assert_eq!(entry.version_id, "AANobbMIv");
        assert_eq!(entry.file, NOT_INSTALLED);
        assert_eq!(entry.dependencies, vec![ProjectId::new("P7dR8mSH")]);
        assert!(!entry.is_installed());

        let installed = pkg("sodium", "AANobbMI").installed("sodium-0.6.0.jar".into());
        let entry = ManifestEntry::from(&installed);
        assert_eq!(entry.file, "sodium-0.6.0.jar");
        assert!(entry.is_installed());
    }

    #[test]
    fn test_wire_format() {
        let manifest = Manifest::from_packages(&[pkg("sodium", "AANobbMI")]);
        let json: serde_json::Value = serde_json::to_value(&manifest).unwrap();

        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["name"], "sodium");
        assert_eq!(arr[0]["project_id"], "AANobbMI");
        assert_eq!(arr[0]["version"], "0.6.0");
        assert_eq!(arr[0]["version_id"], "AANobbMIv");
        assert_eq!(arr[0]["file"], "NOT_INSTALLED");
        assert_eq!(arr[0]["dependencies"][0], "P7dR8mSH");
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data").join("modlist.json");

        let manifest = Manifest::from_packages(&[pkg("sodium", "AANobbMI"), pkg("lithium", "gvQqBUqZ")]);
        manifest.save(&path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n"), "manifest should be pretty-printed");
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = Manifest::load(&path).await.unwrap();
        assert_eq!(loaded, manifest);
        assert!(loaded.contains("lithium"));
        assert!(!loaded.contains("iris"));
    }

    #[tokio::test]
    async fn test_load_missing_is_empty() {
        let tmp = TempDir::new().unwrap();
        let loaded = Manifest::load(&tmp.path().join("modlist.json")).await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_load_garbage_is_manifest_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("modlist.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Manifest::load(&path).await.unwrap_err();
        assert!(matches!(err, EngineError::Manifest { .. }));
    }

    #[test]
    fn test_upsert_replaces_by_project_id() {
        let mut manifest = Manifest::from_packages(&[pkg("sodium", "AANobbMI")]);
        let updated = pkg("sodium", "AANobbMI").installed("sodium.jar".into());
        manifest.upsert([&updated, &pkg("iris", "YL57xq9U")]);

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("sodium").unwrap().file, "sodium.jar");
        let ids: Vec<&str> = manifest.project_ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["AANobbMI", "YL57xq9U"]);
    }
}

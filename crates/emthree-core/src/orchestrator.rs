//! Batch resolution and bulk downloads.
//!
//! The orchestrator fans work out over a bounded number of concurrent
//! pipelines. A failure in one pipeline never cancels its siblings: failed
//! resolutions are dropped and reported, failed downloads are collected and
//! surfaced together once every download has been attempted.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use emthree_schema::ProjectId;
use futures::stream::{self, StreamExt};

use crate::closure::{self, ClosureOutcome};
use crate::error::{DownloadFailure, EngineError, RegistryError};
use crate::manifest::{Manifest, ManifestEntry};
use crate::package::{PackageQuery, ResolvedPackage};
use crate::registry::{self, RegistryClient};
use crate::reporter::Reporter;
use crate::resolve::PackageSource;

/// Outcome of a bulk download: every item, updated where it succeeded, plus
/// the failures.
#[derive(Debug)]
pub struct DownloadReport<T> {
    pub items: Vec<T>,
    pub failures: Vec<DownloadFailure>,
}

impl<T> DownloadReport<T> {
    /// Fail with every collected failure, or return the items.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DownloadsFailed`] naming each failed package.
    pub fn into_result(self) -> Result<Vec<T>, EngineError> {
        if self.failures.is_empty() {
            Ok(self.items)
        } else {
            Err(EngineError::DownloadsFailed {
                failures: self.failures,
            })
        }
    }
}

pub struct Orchestrator {
    client: RegistryClient,
    source: Arc<dyn PackageSource>,
    reporter: Arc<dyn Reporter>,
    workers: usize,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("client", &self.client)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        client: RegistryClient,
        source: Arc<dyn PackageSource>,
        reporter: Arc<dyn Reporter>,
        workers: usize,
    ) -> Self {
        Self {
            client,
            source,
            reporter,
            workers: workers.max(1),
        }
    }

    pub fn client(&self) -> &RegistryClient {
        &self.client
    }

    /// Resolve every query concurrently, at most `workers` at a time.
    ///
    /// Output order is unspecified. Queries that yield no package are dropped
    /// and reported with their cause. Two queries naming the same project
    /// produce one package.
    pub async fn resolve_batch(&self, queries: &[String]) -> Vec<ResolvedPackage> {
        self.reporter.section("Resolving");
        let source = self.source.as_ref();

        let mut results = stream::iter(queries.iter().cloned())
            .map(|name| async move {
                let query = PackageQuery::slug(name.as_str());
                let result = source.resolve(&query).await;
                (query, result)
            })
            .buffer_unordered(self.workers);

        let mut seen: HashSet<ProjectId> = HashSet::new();
        let mut resolved = Vec::new();
        while let Some((query, result)) = results.next().await {
            match result {
                Ok(pkg) => {
                    if !seen.insert(pkg.project_id.clone()) {
                        tracing::debug!("{query} duplicates {}, skipping", pkg.project_id);
                        continue;
                    }
                    self.reporter.resolved(
                        &pkg.slug,
                        &pkg.version.version_number,
                        &pkg.status.to_string(),
                    );
                    resolved.push(pkg);
                }
                Err(e) => {
                    tracing::warn!("Dropping {query}: {e}");
                    self.reporter.dropped(query.label(), &e.to_string());
                }
            }
        }
        resolved
    }

    /// Expand `roots` with their transitive required dependencies.
    pub async fn close(
        &self,
        roots: Vec<ResolvedPackage>,
        already_known: impl IntoIterator<Item = ProjectId>,
    ) -> ClosureOutcome {
        self.reporter.section("Dependencies");
        closure::expand(
            self.source.as_ref(),
            roots,
            already_known,
            self.workers,
            self.reporter.as_ref(),
        )
        .await
    }

    /// Download every package's primary file into `dest`, refusing if `dest`
    /// already holds anything.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StateConflict`] before any request if `dest` is
    /// not empty, or an IO error if it cannot be created. Individual download
    /// failures are in the report.
    pub async fn download_all(
        &self,
        packages: Vec<ResolvedPackage>,
        dest: &Path,
    ) -> Result<DownloadReport<ResolvedPackage>, EngineError> {
        check_destination(dest).await?;
        self.install(packages, dest).await
    }

    /// Like [`download_all`](Self::download_all) without the empty-directory
    /// check, for incremental installs.
    ///
    /// # Errors
    ///
    /// Returns an IO error if `dest` cannot be created.
    pub async fn install(
        &self,
        packages: Vec<ResolvedPackage>,
        dest: &Path,
    ) -> Result<DownloadReport<ResolvedPackage>, EngineError> {
        tokio::fs::create_dir_all(dest).await?;
        self.reporter.section("Downloading");
        let client = &self.client;
        let reporter = self.reporter.as_ref();

        let mut downloads = stream::iter(packages)
            .map(|pkg| async move {
                let result: Result<PathBuf, RegistryError> = async {
                    let file = registry::primary_file(&pkg.version)?;
                    reporter.downloading(&pkg.slug, &file.filename);
                    client.download(file, dest).await
                }
                .await;
                (pkg, result)
            })
            .buffer_unordered(self.workers);

        let mut report = DownloadReport {
            items: Vec::new(),
            failures: Vec::new(),
        };
        while let Some((pkg, result)) = downloads.next().await {
            match result.and_then(|path| file_name(&path)) {
                Ok(filename) => {
                    self.reporter.done(&pkg.slug, &filename);
                    report.items.push(pkg.installed(filename));
                }
                Err(e) => {
                    tracing::warn!("Download of {} failed: {e}", pkg.slug);
                    self.reporter.failed(&pkg.slug, &e.to_string());
                    report.failures.push(DownloadFailure {
                        package: pkg.slug.clone(),
                        source: e,
                    });
                    report.items.push(pkg);
                }
            }
        }
        Ok(report)
    }

    /// Install every manifest entry by version id, without re-resolving.
    ///
    /// Applies the same empty-directory check as
    /// [`download_all`](Self::download_all).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StateConflict`] if `dest` is not empty, or an
    /// IO error if it cannot be created.
    pub async fn download_manifest(
        &self,
        manifest: &Manifest,
        dest: &Path,
    ) -> Result<DownloadReport<ManifestEntry>, EngineError> {
        check_destination(dest).await?;
        tokio::fs::create_dir_all(dest).await?;
        self.reporter.section("Downloading");
        let client = &self.client;
        let reporter = self.reporter.as_ref();

        let mut downloads = stream::iter(manifest.entries.iter().cloned())
            .map(|entry| async move {
                reporter.downloading(&entry.name, &entry.version);
                let result = client.download_version(&entry.version_id, dest).await;
                (entry, result)
            })
            .buffer_unordered(self.workers);

        let mut report = DownloadReport {
            items: Vec::new(),
            failures: Vec::new(),
        };
        while let Some((mut entry, result)) = downloads.next().await {
            match result.and_then(|path| file_name(&path)) {
                Ok(filename) => {
                    self.reporter.done(&entry.name, &filename);
                    entry.file = filename;
                }
                Err(e) => {
                    tracing::warn!("Download of {} failed: {e}", entry.name);
                    self.reporter.failed(&entry.name, &e.to_string());
                    report.failures.push(DownloadFailure {
                        package: entry.name.clone(),
                        source: e,
                    });
                }
            }
            report.items.push(entry);
        }
        Ok(report)
    }
}

/// Refuse bulk installs into a directory that already has content.
///
/// A missing directory counts as empty.
///
/// # Errors
///
/// Returns [`EngineError::StateConflict`] if `dest` has any entry.
pub async fn check_destination(dest: &Path) -> Result<(), EngineError> {
    let mut entries = match tokio::fs::read_dir(dest).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    if entries.next_entry().await?.is_some() {
        tracing::warn!(
            "{} is not empty, refusing to mix a bulk install into it",
            dest.display()
        );
        return Err(EngineError::StateConflict {
            dir: dest.to_path_buf(),
        });
    }
    Ok(())
}

fn file_name(path: &Path) -> Result<String, RegistryError> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| RegistryError::Malformed(format!("no filename in {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RateLimiter;
    use crate::reporter::NullReporter;
    use crate::select::VersionStatus;
    use async_trait::async_trait;
    use emthree_schema::Version;
    use mockito::{Matcher, Server};
    use std::collections::HashMap;
    use std::time::Duration;
    use tempfile::TempDir;

    fn version(id: &str, url: Option<String>) -> Version {
        let files = match url {
            Some(url) => serde_json::json!([{"url": url, "filename": format!("{id}.jar"), "primary": true}]),
            None => serde_json::json!([]),
        };
        serde_json::from_value(serde_json::json!({
            "id": format!("{id}-v"),
            "name": id,
            "version_number": "1.0.0",
            "version_type": "release",
            "date_published": "2024-01-01T00:00:00Z",
            "loaders": ["fabric"],
            "game_versions": ["1.21.1"],
            "files": files,
            "dependencies": []
        }))
        .unwrap()
    }

    fn package(slug: &str, url: Option<String>) -> ResolvedPackage {
        ResolvedPackage {
            slug: slug.to_string(),
            project_id: ProjectId::new(format!("{slug}-id")),
            status: VersionStatus::LatestRelease,
            version: version(slug, url),
            dependencies: vec![],
            downloaded: false,
            local_filename: None,
        }
    }

    /// Resolves slugs from a fixed table; anything else is not found.
    struct Table(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl PackageSource for Table {
        async fn resolve(&self, query: &PackageQuery) -> Result<ResolvedPackage, EngineError> {
            let slug = query.label();
            let project = self
                .0
                .get(slug)
                .ok_or_else(|| EngineError::NotFound(slug.to_string()))?;
            let mut pkg = package(slug, None);
            pkg.project_id = ProjectId::new(*project);
            Ok(pkg)
        }
    }

    fn orchestrator(server: &Server, source: impl PackageSource + 'static) -> Orchestrator {
        let client = RegistryClient::new(
            &server.url(),
            &server.url(),
            Arc::new(RateLimiter::new(300, Duration::from_secs(60))),
        )
        .unwrap();
        Orchestrator::new(client, Arc::new(source), Arc::new(NullReporter), 4)
    }

    fn empty_table() -> Table {
        Table(HashMap::new())
    }

    #[tokio::test]
    async fn test_resolve_batch_drops_failures() {
        let server = Server::new_async().await;
        let table = Table(HashMap::from([("sodium", "AANobbMI"), ("lithium", "gvQqBUqZ")]));
        let orch = orchestrator(&server, table);

        let queries = vec!["sodium".to_string(), "ghost".to_string(), "lithium".to_string()];
        let mut slugs: Vec<String> = orch
            .resolve_batch(&queries)
            .await
            .into_iter()
            .map(|p| p.slug)
            .collect();
        slugs.sort();

        assert_eq!(slugs, vec!["lithium", "sodium"]);
    }

    #[tokio::test]
    async fn test_resolve_batch_collapses_same_project() {
        let server = Server::new_async().await;
        let table = Table(HashMap::from([("sodium", "AANobbMI"), ("AANobbMI", "AANobbMI")]));
        let orch = orchestrator(&server, table);

        let queries = vec!["sodium".to_string(), "AANobbMI".to_string()];
        assert_eq!(orch.resolve_batch(&queries).await.len(), 1);
    }

    #[tokio::test]
    async fn test_gate_refuses_non_empty_destination() {
        let mut server = Server::new_async().await;
        let any = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("existing.jar"), b"old").unwrap();

        let orch = orchestrator(&server, empty_table());
        let pkg = package("sodium", Some(format!("{}/sodium.jar", server.url())));
        let err = orch.download_all(vec![pkg], tmp.path()).await.unwrap_err();

        assert!(matches!(err, EngineError::StateConflict { ref dir } if dir == tmp.path()));
        assert!(!tmp.path().join("sodium.jar").exists());
        any.assert_async().await;
    }

    #[tokio::test]
    async fn test_gate_accepts_missing_and_empty() {
        let tmp = TempDir::new().unwrap();
        check_destination(tmp.path()).await.unwrap();
        check_destination(&tmp.path().join("mods")).await.unwrap();
    }

    #[tokio::test]
    async fn test_download_all_collects_failures() {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("GET", "/files/sodium.jar")
            .with_body("sodium-bytes")
            .create_async()
            .await;
        let _bad = server
            .mock("GET", "/files/lithium.jar")
            .with_status(500)
            .create_async()
            .await;
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("mods");

        let orch = orchestrator(&server, empty_table());
        let packages = vec![
            package("sodium", Some(format!("{}/files/sodium.jar", server.url()))),
            package("lithium", Some(format!("{}/files/lithium.jar", server.url()))),
            package("iris", None),
        ];
        let report = orch.download_all(packages, &dest).await.unwrap();

        assert_eq!(report.items.len(), 3);
        assert_eq!(report.failures.len(), 2);
        let sodium = report.items.iter().find(|p| p.slug == "sodium").unwrap();
        assert!(sodium.downloaded);
        assert_eq!(sodium.local_filename.as_deref(), Some("sodium.jar"));
        assert_eq!(std::fs::read(dest.join("sodium.jar")).unwrap(), b"sodium-bytes");

        let err = report.into_result().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("lithium"), "{msg}");
        assert!(msg.contains("iris"), "{msg}");
    }

    #[tokio::test]
    async fn test_install_skips_gate() {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("GET", "/files/iris.jar")
            .with_body("iris-bytes")
            .create_async()
            .await;
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("sodium.jar"), b"old").unwrap();

        let orch = orchestrator(&server, empty_table());
        let pkg = package("iris", Some(format!("{}/files/iris.jar", server.url())));
        let installed = orch
            .install(vec![pkg], tmp.path())
            .await
            .unwrap()
            .into_result()
            .unwrap();

        assert!(installed[0].downloaded);
        assert!(tmp.path().join("iris.jar").exists());
    }

    #[tokio::test]
    async fn test_download_manifest() {
        let mut server = Server::new_async().await;
        let meta = serde_json::to_string(&serde_json::json!({
            "id": "sodium-v",
            "name": "sodium",
            "version_number": "1.0.0",
            "version_type": "release",
            "date_published": "2024-01-01T00:00:00Z",
            "loaders": ["fabric"],
            "game_versions": ["1.21.1"],
            "files": [{"url": format!("{}/files/sodium.jar", server.url()), "filename": "sodium.jar", "primary": true}],
            "dependencies": []
        }))
        .unwrap();
        let _v = server
            .mock("GET", "/version/sodium-v")
            .with_body(meta)
            .create_async()
            .await;
        let _f = server
            .mock("GET", "/files/sodium.jar")
            .with_body("sodium-bytes")
            .create_async()
            .await;
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("mods");

        let manifest = Manifest::from_packages(&[package("sodium", None)]);
        let orch = orchestrator(&server, empty_table());
        let entries = orch
            .download_manifest(&manifest, &dest)
            .await
            .unwrap()
            .into_result()
            .unwrap();

        assert_eq!(entries[0].file, "sodium.jar");
        assert!(dest.join("sodium.jar").exists());
        assert_eq!(orch.client().limiter().total(), 2);
    }
}

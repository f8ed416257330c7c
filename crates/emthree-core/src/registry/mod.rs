//! Rate-limited accessor over the registry's JSON API.
//!
//! Every public method acquires exactly one limiter permit per HTTP call it
//! issues. Failures propagate as [`RegistryError`]; nothing here retries.

pub mod limiter;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use emthree_schema::{DependencyEdge, Project, ProjectId, Version, VersionFile, VersionId};
use futures::StreamExt;
use reqwest::{Client, StatusCode, header, redirect};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use crate::error::RegistryError;
pub use limiter::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW, RateLimiter};

/// Default JSON API root.
pub const DEFAULT_API_URL: &str = "https://api.modrinth.com/v2/";

/// Default public site, used for slug resolution via redirect.
pub const DEFAULT_SITE_URL: &str = "https://modrinth.com";

/// One lock per destination path, held from the existence check until the
/// file is complete or removed.
type DestinationLocks = Arc<Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>>;

/// Accessor for the registry API.
///
/// Cloning is cheap and clones share the same limiter and destination locks.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: Client,
    no_redirect: Client,
    api_url: String,
    site_url: String,
    limiter: Arc<RateLimiter>,
    destinations: DestinationLocks,
}

impl RegistryClient {
    /// Build a client against the given API root and site.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP clients cannot be constructed.
    pub fn new(
        api_url: &str,
        site_url: &str,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, RegistryError> {
        let http = Client::builder().user_agent(crate::USER_AGENT).build()?;
        let no_redirect = Client::builder()
            .user_agent(crate::USER_AGENT)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            no_redirect,
            api_url: format!("{}/", api_url.trim_end_matches('/')),
            site_url: site_url.trim_end_matches('/').to_string(),
            limiter,
            destinations: DestinationLocks::default(),
        })
    }

    /// The shared limiter handle.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RegistryError> {
        self.limiter.acquire().await;
        let url = format!("{}{}", self.api_url, path);
        tracing::debug!("GET {url}");

        let resp = self.http.get(&url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(path.to_string()));
        }
        let resp = resp.error_for_status()?;
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| RegistryError::Malformed(format!("{path}: {e}")))
    }

    /// Look up a project by id or slug.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for unknown projects.
    pub async fn get_project(&self, id_or_slug: &str) -> Result<Project, RegistryError> {
        self.get_json(&format!("project/{id_or_slug}")).await
    }

    /// Resolve a project id to its slug by following the public project URL's
    /// canonical redirect.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the id is invalid, i.e. the site
    /// answers without a redirect.
    pub async fn resolve_slug(&self, id: &ProjectId) -> Result<String, RegistryError> {
        self.limiter.acquire().await;
        let url = format!("{}/mod/{}", self.site_url, id);
        tracing::debug!("Resolving slug via {url}");

        let resp = self.no_redirect.get(&url).send().await?.error_for_status()?;
        // A valid id always redirects to the canonical slug URL.
        if !resp.status().is_redirection() {
            return Err(RegistryError::NotFound(id.to_string()));
        }

        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                RegistryError::Malformed(format!("redirect for {id} has no location"))
            })?;

        slug_from_location(location)
            .map(str::to_string)
            .ok_or_else(|| {
                RegistryError::Malformed(format!("unexpected redirect target {location}"))
            })
    }

    /// All versions of a project, ascending by publication time.
    ///
    /// The last element is the latest version; callers rely on this order.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is unknown or the response is malformed.
    pub async fn list_versions(&self, id_or_slug: &str) -> Result<Vec<Version>, RegistryError> {
        let mut versions: Vec<Version> =
            self.get_json(&format!("project/{id_or_slug}/version")).await?;
        versions.sort_by_key(|v| v.date_published);
        Ok(versions)
    }

    /// Fetch one version by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the version is unknown or the response is malformed.
    pub async fn get_version(&self, version_id: &VersionId) -> Result<Version, RegistryError> {
        self.get_json(&format!("version/{version_id}")).await
    }

    /// The required dependency edges of a version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be fetched.
    pub async fn get_required_dependencies(
        &self,
        version_id: &VersionId,
    ) -> Result<Vec<DependencyEdge>, RegistryError> {
        let version = self.get_version(version_id).await?;
        Ok(version.required_dependencies())
    }

    /// Stream a file into `dest_dir`.
    ///
    /// Idempotent: if `dest_dir/filename` already exists no request is made and
    /// the existing path is returned.
    ///
    /// Concurrent downloads of the same filename through this client are
    /// serialized: the later caller waits for the earlier one and only reports
    /// a skip once the file is complete. If the earlier download failed, the
    /// later caller fetches the file itself. The file is created with
    /// exclusive-create semantics, so a file written by another process in the
    /// meantime is kept and counted as a skip.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or if the file cannot be written.
    /// A partially written file is removed before the error is returned.
    pub async fn download(
        &self,
        file: &VersionFile,
        dest_dir: &Path,
    ) -> Result<PathBuf, RegistryError> {
        let dest = dest_dir.join(sanitize_filename(&file.filename)?);
        let lock = self.destination_lock(&dest);
        let _guard = lock.lock().await;

        if tokio::fs::try_exists(&dest).await? {
            tracing::info!("{} already exists, skipping download", file.filename);
            return Ok(dest);
        }

        self.limiter.acquire().await;
        tracing::debug!("GET {}", file.url);
        let response = self.http.get(&file.url).send().await?.error_for_status()?;

        let mut out = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&dest)
            .await
        {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                tracing::info!("{} was written by another process, skipping", file.filename);
                return Ok(dest);
            }
            Err(e) => return Err(e.into()),
        };

        let result: Result<(), RegistryError> = async {
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                out.write_all(&chunk?).await?;
            }
            out.flush().await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            drop(out);
            tokio::fs::remove_file(&dest).await.ok();
            return Err(e);
        }

        Ok(dest)
    }

    fn destination_lock(&self, dest: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .destinations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(dest.to_path_buf()).or_default().clone()
    }

    /// Fetch a version's metadata, then download its primary file.
    ///
    /// Costs two permits when the file is absent: one for the metadata and one
    /// for the bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if either call fails or the version has no files.
    pub async fn download_version(
        &self,
        version_id: &VersionId,
        dest_dir: &Path,
    ) -> Result<PathBuf, RegistryError> {
        let version = self.get_version(version_id).await?;
        let file = primary_file(&version)?;
        self.download(file, dest_dir).await
    }
}

/// The file to install for a version: the one flagged primary, otherwise the
/// first file (with a warning).
///
/// # Errors
///
/// Returns [`RegistryError::Malformed`] if the version has no files.
pub fn primary_file(version: &Version) -> Result<&VersionFile, RegistryError> {
    if !version.has_flagged_primary() && !version.files.is_empty() {
        tracing::warn!(
            "Version {} flags no primary file, using {}",
            version.id,
            version.files[0].filename
        );
    }
    version
        .primary_file()
        .ok_or_else(|| RegistryError::Malformed(format!("version {} has no files", version.id)))
}

fn slug_from_location(location: &str) -> Option<&str> {
    let path = location
        .split_once("://")
        .map_or(location, |(_, rest)| rest.find('/').map_or("", |i| &rest[i..]));
    let slug = path
        .trim_start_matches('/')
        .split('/')
        .nth(1)?
        .split(['?', '#'])
        .next()?;
    if slug.is_empty() { None } else { Some(slug) }
}

fn sanitize_filename(name: &str) -> Result<&str, RegistryError> {
    let candidate = Path::new(name);
    match candidate.file_name() {
        Some(base) if base == candidate.as_os_str() && name != "." && name != ".." => Ok(name),
        _ => Err(RegistryError::Malformed(format!(
            "refusing unsafe file name {name:?}"
        ))),
    }
}

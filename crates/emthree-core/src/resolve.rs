//! Single-package resolution: identity lookup, version selection, decision
//! handling and dependency discovery for one query.

use std::sync::Arc;

use async_trait::async_trait;
use emthree_schema::{ProjectId, Version};

use crate::decide::{Confirm, Decider};
use crate::error::EngineError;
use crate::package::{PackageQuery, ResolvedPackage};
use crate::registry::RegistryClient;
use crate::select::{self, VersionDecision, VersionStatus};

/// Anything that can turn a query into a resolved package.
///
/// The dependency closure and batch resolution only see this trait, so they
/// can be driven by an in-memory graph in tests.
#[async_trait]
pub trait PackageSource: Send + Sync {
    /// Resolve one query. Errors are local to this package.
    async fn resolve(&self, query: &PackageQuery) -> Result<ResolvedPackage, EngineError>;
}

#[async_trait]
impl<T: PackageSource + ?Sized> PackageSource for Arc<T> {
    async fn resolve(&self, query: &PackageQuery) -> Result<ResolvedPackage, EngineError> {
        (**self).resolve(query).await
    }
}

/// The platform a resolution run targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Platform (game) version, e.g. `1.21.1`.
    pub platform_version: String,
    /// Loader tag, e.g. `fabric`.
    pub loader: String,
}

impl Target {
    pub fn new(platform_version: impl Into<String>, loader: impl Into<String>) -> Self {
        Self {
            platform_version: platform_version.into(),
            loader: loader.into(),
        }
    }
}

/// Registry-backed [`PackageSource`].
pub struct Resolver {
    client: RegistryClient,
    decider: Arc<dyn Decider>,
    target: Target,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    pub fn new(client: RegistryClient, decider: Arc<dyn Decider>, target: Target) -> Self {
        Self {
            client,
            decider,
            target,
        }
    }

    async fn identify(&self, query: &PackageQuery) -> Result<(String, ProjectId), EngineError> {
        match query {
            PackageQuery::Slug(slug) => {
                let project = self
                    .client
                    .get_project(slug)
                    .await
                    .map_err(|e| EngineError::registry(slug.as_str(), e))?;
                Ok((project.slug, project.id))
            }
            PackageQuery::ProjectId { id, .. } => {
                let slug = self
                    .client
                    .resolve_slug(id)
                    .await
                    .map_err(|e| EngineError::registry(id.as_str(), e))?;
                Ok((slug, id.clone()))
            }
        }
    }
}

#[async_trait]
impl PackageSource for Resolver {
    async fn resolve(&self, query: &PackageQuery) -> Result<ResolvedPackage, EngineError> {
        tracing::info!("Fetching {query}");
        let (slug, project_id) = self.identify(query).await?;

        let decision = match query {
            PackageQuery::ProjectId {
                version_id: Some(version_id),
                ..
            } => {
                let version = self
                    .client
                    .get_version(version_id)
                    .await
                    .map_err(|e| EngineError::registry(slug.as_str(), e))?;
                VersionDecision::manual(version)
            }
            _ => {
                let versions = self
                    .client
                    .list_versions(project_id.as_str())
                    .await
                    .map_err(|e| EngineError::registry(slug.as_str(), e))?;
                select::select(
                    &versions,
                    &self.target.platform_version,
                    &self.target.loader,
                )
            }
        };

        let status = decision.status;
        let version = apply_decision(self.decider.as_ref(), &self.target, &slug, decision)?;

        // The chosen payload already carries its dependency list.
        let dependencies = version.required_dependencies();

        tracing::info!("Fetched {slug} {} ({status})", version.version_number);
        Ok(ResolvedPackage {
            slug,
            project_id,
            status,
            version,
            dependencies,
            downloaded: false,
            local_filename: None,
        })
    }
}

/// Turn a selection into the final version, consulting the decider where the
/// status calls for a human.
///
/// # Errors
///
/// Returns [`EngineError::Unavailable`] when nothing supports the loader and
/// [`EngineError::Declined`] when the decider refuses a legacy version.
pub fn apply_decision(
    decider: &dyn Decider,
    target: &Target,
    slug: &str,
    decision: VersionDecision,
) -> Result<Version, EngineError> {
    let status = decision.status;

    if status == VersionStatus::Unavailable {
        tracing::warn!("{slug} has no version for {}, skipping", target.loader);
        return Err(EngineError::Unavailable {
            package: slug.to_string(),
            loader: target.loader.clone(),
        });
    }

    if status.is_legacy() {
        tracing::warn!(
            "{slug} doesn't explicitly support {}, check whether it is maintained",
            target.platform_version
        );
        let ctx = Confirm::UnsupportedPlatform {
            package: slug,
            decision: &decision,
            platform_version: &target.platform_version,
        };
        if !decider.confirm_continue(&ctx) {
            return Err(EngineError::Declined {
                package: slug.to_string(),
                reason: format!("no support for {}", target.platform_version),
            });
        }
    }

    let use_alternate = if status.is_ambiguous() {
        if let (Some(release), Some(alt)) = (&decision.chosen, &decision.alternate) {
            tracing::info!(
                "{slug} has a newer {} version {} compared to release {}",
                alt.version_type,
                alt.version_number,
                release.version_number
            );
        }
        decider.choose_alternate(slug, &decision)
    } else {
        false
    };

    decision
        .resolve(use_alternate)
        .ok_or_else(|| EngineError::Unavailable {
            package: slug.to_string(),
            loader: target.loader.clone(),
        })
}

//! Transitive closure of required dependencies.
//!
//! Expansion runs in rounds. Every edge collected in a round is resolved
//! concurrently, and the next round only starts once all of them have
//! finished, so the set of known ids is consistent at every round boundary.

use std::collections::HashSet;

use emthree_schema::ProjectId;
use futures::StreamExt;

use crate::error::EngineError;
use crate::package::{PackageQuery, ResolvedPackage};
use crate::reporter::Reporter;
use crate::resolve::PackageSource;

/// Result of a closure run.
#[derive(Debug, Default)]
pub struct ClosureOutcome {
    /// The input packages followed by every discovered dependency.
    pub packages: Vec<ResolvedPackage>,
    /// Dependencies that could not be resolved, with the cause.
    pub dropped: Vec<(PackageQuery, EngineError)>,
    /// Number of expansion rounds that issued at least one fetch.
    pub rounds: usize,
}

impl ClosureOutcome {
    /// Packages added on top of the input set.
    pub fn discovered(&self, roots: usize) -> &[ResolvedPackage] {
        self.packages.get(roots..).unwrap_or_default()
    }
}

/// Expand `roots` with every required dependency reachable from them.
///
/// `already_known` holds ids that count as satisfied without being part of
/// `roots`, such as the entries of an existing manifest. Each project id is
/// fetched at most once per run. A failed edge is dropped with a warning and
/// never retried.
pub async fn expand<S>(
    source: &S,
    roots: Vec<ResolvedPackage>,
    already_known: impl IntoIterator<Item = ProjectId>,
    workers: usize,
    reporter: &dyn Reporter,
) -> ClosureOutcome
where
    S: PackageSource + ?Sized,
{
    let mut known: HashSet<ProjectId> = already_known.into_iter().collect();
    known.extend(roots.iter().map(|p| p.project_id.clone()));

    let mut frontier = collect_edges(&roots, &mut known);
    let mut outcome = ClosureOutcome {
        packages: roots,
        ..Default::default()
    };

    while !frontier.is_empty() {
        outcome.rounds += 1;
        tracing::debug!(
            "Dependency round {}: {} new edge(s)",
            outcome.rounds,
            frontier.len()
        );

        let results: Vec<(PackageQuery, Result<ResolvedPackage, EngineError>)> =
            futures::stream::iter(frontier)
                .map(|query| async move {
                    let result = source.resolve(&query).await;
                    (query, result)
                })
                .buffer_unordered(workers.max(1))
                .collect()
                .await;

        let mut discovered = Vec::new();
        for (query, result) in results {
            match result {
                Ok(pkg) => {
                    reporter.resolved(&pkg.slug, &pkg.version.version_number, "dependency");
                    known.insert(pkg.project_id.clone());
                    discovered.push(pkg);
                }
                Err(e) => {
                    tracing::warn!("Dropping dependency {query}: {e}");
                    reporter.dropped(query.label(), &e.to_string());
                    outcome.dropped.push((query, e));
                }
            }
        }

        frontier = collect_edges(&discovered, &mut known);
        outcome.packages.extend(discovered);
    }

    outcome
}

/// Edges of `packages` whose target is not yet known. Ids are marked known as
/// they are collected, so duplicate edges within a round collapse to one fetch.
fn collect_edges(
    packages: &[ResolvedPackage],
    known: &mut HashSet<ProjectId>,
) -> Vec<PackageQuery> {
    let mut edges = Vec::new();
    for pkg in packages {
        for edge in &pkg.dependencies {
            if known.insert(edge.project_id.clone()) {
                tracing::debug!("{} requires {}", pkg.slug, edge.project_id);
                edges.push(PackageQuery::from_edge(edge));
            }
        }
    }
    edges
}

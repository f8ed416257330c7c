//! `emthree add`: extend the manifest and mod folder with one mod.

use std::time::Instant;

use anyhow::{Context as _, Result, bail};
use emthree_core::{Confirm, Manifest};

use super::context::Context;

/// Resolve `slug` plus any dependency the manifest does not already hold,
/// record them and install them next to the existing files.
pub async fn add(ctx: &Context, slug: &str) -> Result<()> {
    let manifest_path = ctx.manifest_path();
    let mut manifest = Manifest::load(&manifest_path).await?;

    if manifest.contains(slug) {
        ctx.reporter
            .info(&format!("{slug} is already in the manifest"));
        return Ok(());
    }

    let start = Instant::now();
    let orch = &ctx.orchestrator;
    let roots = orch.resolve_batch(&[slug.to_string()]).await;
    let Some(root) = roots.first() else {
        bail!("Could not resolve {slug}");
    };
    if manifest.project_ids().any(|id| *id == root.project_id) {
        ctx.reporter.info(&format!(
            "{slug} is already in the manifest as {}",
            root.slug
        ));
        return Ok(());
    }

    let closure = orch.close(roots, manifest.project_ids().cloned()).await;
    let packages = closure.packages;

    let names: Vec<String> = packages.iter().map(|p| p.slug.clone()).collect();
    if !ctx
        .decider
        .confirm_continue(&Confirm::AddPackages { names: &names })
    {
        ctx.reporter.info("Nothing added");
        return Ok(());
    }

    manifest.upsert(&packages);
    manifest
        .save(&manifest_path)
        .await
        .context("Failed to write manifest")?;

    let report = orch.install(packages, ctx.mod_dir()).await?;
    manifest.upsert(&report.items);
    manifest
        .save(&manifest_path)
        .await
        .context("Failed to write manifest")?;

    let installed = report.into_result()?;
    ctx.report_requests();
    ctx.reporter
        .summary(installed.len(), "added", start.elapsed().as_secs_f64());
    Ok(())
}

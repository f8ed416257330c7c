//! `emthree init`: build the mod folder from a package list or the manifest.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context as _, Result, bail};
use emthree_core::orchestrator::check_destination;
use emthree_core::{Confirm, Manifest, userlist};

use super::context::Context;

/// Run init.
///
/// With a package list the list is validated first, then resolved and
/// installed. An existing manifest is only replaced if the decider agrees;
/// otherwise the manifest is installed as is. Without a list the manifest is
/// installed directly.
pub async fn init(ctx: &Context, list: Option<&Path>) -> Result<()> {
    let manifest_path = ctx.manifest_path();
    let have_manifest = tokio::fs::try_exists(&manifest_path)
        .await
        .with_context(|| format!("Failed to check {}", manifest_path.display()))?;

    match list {
        Some(path) => {
            let names = userlist::load(path)
                .await
                .with_context(|| format!("Failed to load package list {}", path.display()))?;

            if have_manifest && !ctx.decider.confirm_overwrite(&manifest_path) {
                ctx.reporter.info("Keeping the existing manifest");
                return install_manifest(ctx).await;
            }
            resolve_and_install(ctx, &names).await
        }
        None if have_manifest => install_manifest(ctx).await,
        None => bail!(
            "No package list given and no manifest at {}. Run `emthree init --userlist <FILE>`.",
            manifest_path.display()
        ),
    }
}

async fn resolve_and_install(ctx: &Context, names: &[String]) -> Result<()> {
    let mod_dir = ctx.mod_dir();
    check_destination(mod_dir).await?;

    let start = Instant::now();
    let manifest_path = ctx.manifest_path();
    let orch = &ctx.orchestrator;

    let roots = orch.resolve_batch(names).await;
    let listed = roots.len();
    let closure = orch.close(roots, []).await;
    ctx.report_requests();

    // An existing manifest is the only record of the installed set.
    if closure.packages.is_empty() {
        bail!(
            "None of the {} listed mods could be resolved, {} was left unchanged",
            names.len(),
            manifest_path.display()
        );
    }

    let dependencies = closure.discovered(listed).len();
    ctx.reporter.info(&format!(
        "Resolved {} of {} listed mods plus {} dependenc{} ({} dropped)",
        listed,
        names.len(),
        dependencies,
        if dependencies == 1 { "y" } else { "ies" },
        closure.dropped.len()
    ));
    let packages = closure.packages;
    Manifest::from_packages(&packages)
        .save(&manifest_path)
        .await
        .context("Failed to write manifest")?;

    let confirm = Confirm::Download {
        count: packages.len(),
        destination: mod_dir,
    };
    if !ctx.decider.confirm_continue(&confirm) {
        ctx.reporter.info("Skipping download. Run `emthree init` to install from the manifest.");
        return Ok(());
    }

    let report = orch.download_all(packages, mod_dir).await?;
    Manifest::from_packages(&report.items)
        .save(&manifest_path)
        .await
        .context("Failed to write manifest")?;

    let installed = report.into_result()?;
    ctx.report_requests();
    ctx.reporter
        .summary(installed.len(), "installed", start.elapsed().as_secs_f64());
    Ok(())
}

async fn install_manifest(ctx: &Context) -> Result<()> {
    let manifest_path = ctx.manifest_path();
    let manifest = Manifest::load(&manifest_path).await?;
    if manifest.is_empty() {
        ctx.reporter.warning("The manifest is empty, nothing to install");
        return Ok(());
    }

    let mod_dir = ctx.mod_dir();
    let confirm = Confirm::Download {
        count: manifest.len(),
        destination: mod_dir,
    };
    if !ctx.decider.confirm_continue(&confirm) {
        return Ok(());
    }

    let start = Instant::now();
    let report = ctx.orchestrator.download_manifest(&manifest, mod_dir).await?;
    Manifest {
        entries: report.items.clone(),
    }
    .save(&manifest_path)
    .await
    .context("Failed to write manifest")?;

    let installed = report.into_result()?;
    ctx.report_requests();
    ctx.reporter
        .summary(installed.len(), "installed", start.elapsed().as_secs_f64());
    Ok(())
}

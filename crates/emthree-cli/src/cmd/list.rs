use std::path::Path;

use anyhow::{Context, Result};
use emthree_core::Manifest;

use crate::GlobalArgs;
use crate::ui::Theme;
use crate::ui::list::{list_footer, list_header, list_row};

/// List every manifest entry with its installed file.
pub async fn list(global: &GlobalArgs) -> Result<()> {
    let config = super::load_config(global)?;
    let path = config.manifest_path();
    let manifest = Manifest::load(&path)
        .await
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;

    if manifest.is_empty() {
        println!();
        println!("  No mods in the manifest.");
        println!("  Run 'emthree init --userlist <FILE>' or 'emthree add <MOD>' to get started.");
        return Ok(());
    }

    println!();
    for line in render(&manifest, &config.mod_dir, &Theme::default()) {
        println!("{line}");
    }
    Ok(())
}

/// A recorded file only counts as installed if it is still in `mod_dir`.
fn render(manifest: &Manifest, mod_dir: &Path, theme: &Theme) -> Vec<String> {
    let mut lines = vec![list_header(theme)];
    for entry in &manifest.entries {
        let file = Some(entry.file.as_str())
            .filter(|_| entry.is_installed())
            .filter(|f| mod_dir.join(f).is_file());
        lines.push(list_row(theme, &entry.name, &entry.version, file));
    }
    lines.push(String::new());
    lines.push(list_footer(manifest.len()));
    lines
}

use anyhow::Result;

use crate::GlobalArgs;
use crate::ops;

/// Add one mod and its missing dependencies.
pub async fn add(global: &GlobalArgs, slug: &str) -> Result<()> {
    let ctx = super::context(global)?;
    ops::add::add(&ctx, slug).await
}

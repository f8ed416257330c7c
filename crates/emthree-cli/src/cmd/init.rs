use std::path::Path;

use anyhow::Result;

use crate::GlobalArgs;
use crate::ops;

/// Resolve and install a package list, or install from the manifest.
pub async fn init(global: &GlobalArgs, userlist: Option<&Path>) -> Result<()> {
    let ctx = super::context(global)?;
    ops::init::init(&ctx, userlist).await
}

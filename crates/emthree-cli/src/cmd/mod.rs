//! Command entry points: parse-level glue between [`crate::Cli`] and the flows in [`crate::ops`].

pub mod add;
pub mod init;
pub mod list;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use emthree_core::{Config, Decider, Reporter, ScriptedDecider};

use crate::GlobalArgs;
use crate::ops::Context;
use crate::ui::{Output, Prompt};

/// Config file values with command-line overrides applied.
pub fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = Config::load().context("Failed to load config")?;
    apply_overrides(&mut config, global);
    Ok(config)
}

fn apply_overrides(config: &mut Config, global: &GlobalArgs) {
    if let Some(v) = &global.game_version {
        config.game_version.clone_from(v);
    }
    if let Some(l) = &global.loader {
        config.loader.clone_from(l);
    }
    if let Some(d) = &global.mod_dir {
        config.mod_dir.clone_from(d);
    }
}

/// Build the engine context for a command.
pub fn context(global: &GlobalArgs) -> Result<Context> {
    let config = load_config(global)?;
    tracing::debug!(?config, "Loaded config");

    let decider: Arc<dyn Decider> = if global.yes {
        Arc::new(ScriptedDecider::yes())
    } else {
        Arc::new(Prompt::new())
    };
    let reporter: Arc<dyn Reporter> = Arc::new(Output::new().quiet(global.quiet));
    Context::new(config, decider, reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cli, Commands};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        let global = GlobalArgs {
            game_version: Some("1.20.1".into()),
            loader: None,
            mod_dir: Some(PathBuf::from("/tmp/mods")),
            yes: true,
            quiet: false,
        };
        apply_overrides(&mut config, &global);

        assert_eq!(config.game_version, "1.20.1");
        assert_eq!(config.loader, "fabric");
        assert_eq!(config.mod_dir, PathBuf::from("/tmp/mods"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["emthree", "list", "-q", "-y"]).unwrap();
        assert!(cli.global.quiet);
        assert!(cli.global.yes);
        assert!(matches!(cli.command, Commands::List));
    }
}

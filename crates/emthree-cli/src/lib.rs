//! emthree - keep a mod folder in sync with a registry
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Resolves a list of mods against the registry, pulls in their required
//! dependencies, downloads every file into the mod folder and records the
//! result in a JSON manifest.
//!
//! # Files
//!
//! ```text
//! $EMTHREE_HOME/config.toml   # optional settings
//! <data_dir>/modlist.json     # manifest of the last resolved set
//! <mod_dir>/*.jar             # installed files
//! ```

pub mod cmd;
pub mod ops;
pub mod ui;

pub use emthree_core::USER_AGENT;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "emthree")]
#[command(author, version, about = "Download and maintain mods from the registry")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for values otherwise taken from the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Target game version (e.g. 1.21.1)
    #[arg(long, global = true, env = "EMTHREE_GAME_VERSION")]
    pub game_version: Option<String>,

    /// Target loader (e.g. fabric)
    #[arg(long, global = true, env = "EMTHREE_LOADER")]
    pub loader: Option<String>,

    /// Mod folder to install into
    #[arg(short = 'p', long, global = true)]
    pub mod_dir: Option<PathBuf>,

    /// Answer yes to every prompt and keep releases over newer pre-releases
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve a mod list and install it, or install from the existing manifest
    Init {
        /// File with one mod slug per line
        #[arg(short, long)]
        userlist: Option<PathBuf>,
    },
    /// Add one mod and its dependencies to the manifest and install them
    Add {
        /// Mod slug
        #[arg(value_name = "MOD")]
        slug: String,
    },
    /// List the mods recorded in the manifest
    List,
}

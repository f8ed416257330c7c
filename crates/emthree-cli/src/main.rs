//! emthree CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use emthree_cli::cmd;
use emthree_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("emthree=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // The command runs on its own task so Ctrl-C is seen even while a prompt
    // holds a worker thread on stdin.
    let run = tokio::spawn(async move {
        let global = cli.global;
        match cli.command {
            Commands::Init { userlist } => cmd::init::init(&global, userlist.as_deref()).await,
            Commands::Add { slug } => cmd::add::add(&global, &slug).await,
            Commands::List => cmd::list::list(&global).await,
        }
    });

    tokio::select! {
        result = run => result?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted");
            // A pending stdin read would hold up runtime shutdown.
            std::process::exit(130);
        }
    }
}

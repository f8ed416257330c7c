//! Shared command context.
//!
//! Groups the engine pieces every command needs, wired to one registry client
//! and therefore one rate limiter.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use emthree_core::registry::DEFAULT_WINDOW;
use emthree_core::{
    Config, Decider, Orchestrator, RateLimiter, RegistryClient, Reporter, Resolver, Target,
};

pub struct Context {
    pub config: Config,
    pub orchestrator: Orchestrator,
    pub decider: Arc<dyn Decider>,
    pub reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl Context {
    pub fn new(
        config: Config,
        decider: Arc<dyn Decider>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self> {
        let limiter = Arc::new(RateLimiter::new(
            config.max_requests_per_minute,
            DEFAULT_WINDOW,
        ));
        let client = RegistryClient::new(&config.api_url, &config.site_url, limiter)
            .context("Failed to build registry client")?;

        let target = Target::new(config.game_version.clone(), config.loader.clone());
        let resolver = Resolver::new(client.clone(), Arc::clone(&decider), target);
        let orchestrator = Orchestrator::new(
            client,
            Arc::new(resolver),
            Arc::clone(&reporter),
            config.workers,
        );

        Ok(Self {
            config,
            orchestrator,
            decider,
            reporter,
        })
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.config.manifest_path()
    }

    pub fn mod_dir(&self) -> &Path {
        &self.config.mod_dir
    }

    /// Log how much of the registry budget this run used.
    pub fn report_requests(&self) {
        let limiter = self.orchestrator.client().limiter();
        let secs = limiter.elapsed().map_or(0.0, |d| d.as_secs_f64());
        tracing::info!("Made {} requests in {secs:.2} secs", limiter.total());
        self.reporter.info(&format!(
            "Made {} registry requests in {secs:.2} secs",
            limiter.total()
        ));
    }
}

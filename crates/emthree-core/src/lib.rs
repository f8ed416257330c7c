pub mod closure;
pub mod config;
pub mod decide;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod package;
pub mod paths;
pub mod registry;
pub mod resolve;
pub mod select;
pub mod userlist;

pub mod reporter;

pub use config::Config;
pub use decide::{Confirm, Decider, ScriptedDecider};
pub use error::{DownloadFailure, EngineError, RegistryError};
pub use manifest::{Manifest, ManifestEntry};
pub use orchestrator::{DownloadReport, Orchestrator};
pub use package::{PackageQuery, ResolvedPackage};
pub use registry::{RateLimiter, RegistryClient};
pub use reporter::{NullReporter, Reporter};
pub use resolve::{PackageSource, Resolver, Target};
pub use select::{VersionDecision, VersionStatus};

/// User Agent string for registry requests
pub const USER_AGENT: &str = concat!("emthree/", env!("CARGO_PKG_VERSION"));

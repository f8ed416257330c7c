//! Human-decision callbacks.
//!
//! The engine never reads stdin. Every question it needs answered goes through
//! a [`Decider`], which the CLI backs with interactive prompts and tests back
//! with a [`ScriptedDecider`].

use std::path::Path;

use crate::select::VersionDecision;

/// Context for a yes/no continuation question.
#[derive(Debug)]
pub enum Confirm<'a> {
    /// The chosen version does not list the target platform version.
    UnsupportedPlatform {
        package: &'a str,
        decision: &'a VersionDecision,
        platform_version: &'a str,
    },
    /// Add these packages to an existing manifest.
    AddPackages { names: &'a [String] },
    /// Download `count` packages into `destination`.
    Download { count: usize, destination: &'a Path },
}

pub trait Decider: Send + Sync {
    /// Answer a continuation question. `false` drops the package or aborts the step.
    fn confirm_continue(&self, ctx: &Confirm<'_>) -> bool;

    /// For ambiguous decisions: `true` installs the alternate (newer non-release),
    /// `false` keeps the release.
    fn choose_alternate(&self, package: &str, decision: &VersionDecision) -> bool;

    /// Whether to replace an existing manifest.
    fn confirm_overwrite(&self, path: &Path) -> bool;
}

impl<T: Decider + ?Sized> Decider for std::sync::Arc<T> {
    fn confirm_continue(&self, ctx: &Confirm<'_>) -> bool {
        (**self).confirm_continue(ctx)
    }
    fn choose_alternate(&self, package: &str, decision: &VersionDecision) -> bool {
        (**self).choose_alternate(package, decision)
    }
    fn confirm_overwrite(&self, path: &Path) -> bool {
        (**self).confirm_overwrite(path)
    }
}

/// Answers every question with a fixed value.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedDecider {
    pub continue_: bool,
    pub alternate: bool,
    pub overwrite: bool,
}

impl ScriptedDecider {
    /// Accept everything and prefer releases over newer pre-releases.
    pub fn yes() -> Self {
        Self {
            continue_: true,
            alternate: false,
            overwrite: true,
        }
    }

    /// Decline everything.
    pub fn no() -> Self {
        Self {
            continue_: false,
            alternate: false,
            overwrite: false,
        }
    }
}

impl Decider for ScriptedDecider {
    fn confirm_continue(&self, _: &Confirm<'_>) -> bool {
        self.continue_
    }
    fn choose_alternate(&self, _: &str, _: &VersionDecision) -> bool {
        self.alternate
    }
    fn confirm_overwrite(&self, _: &Path) -> bool {
        self.overwrite
    }
}

//! Console implementation of the engine's [`Reporter`].
//!
//! Every event is rendered as one complete line, so output from concurrent
//! pipelines interleaves by line and never mid-line.

use crossterm::style::Stylize;
use emthree_core::Reporter;

use super::theme::{Theme, format_secs};

/// Writes progress to stdout and problems to stderr.
#[derive(Debug, Clone, Default)]
pub struct Output {
    theme: Theme,
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress informational lines; warnings and failures still print.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn name(&self, name: &str) -> String {
        format!("{:<width$}", name, width = self.theme.layout.name_width)
            .with(self.theme.colors.package_name)
            .to_string()
    }

    pub fn success(&self, msg: &str) {
        println!(
            "{} {}",
            self.theme.icons.success.with(self.theme.colors.success),
            msg
        );
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        if self.quiet {
            return;
        }
        println!();
        println!("{}", title.bold());
    }

    fn resolved(&self, slug: &str, version: &str, detail: &str) {
        if self.quiet {
            return;
        }
        let version = format!("{:<width$}", version, width = self.theme.layout.version_width);
        println!(
            "  {} {} {}",
            self.name(slug),
            version.with(self.theme.colors.version),
            detail.with(self.theme.colors.secondary)
        );
    }

    fn dropped(&self, name: &str, reason: &str) {
        eprintln!(
            "  {} {} {}",
            self.theme.icons.warning.with(self.theme.colors.warning),
            self.name(name),
            reason.with(self.theme.colors.warning)
        );
    }

    fn downloading(&self, name: &str, filename: &str) {
        if self.quiet {
            return;
        }
        println!(
            "  {} {} {}",
            self.theme.icons.active.with(self.theme.colors.secondary),
            self.name(name),
            filename.with(self.theme.colors.secondary)
        );
    }

    fn done(&self, name: &str, detail: &str) {
        if self.quiet {
            return;
        }
        println!(
            "  {} {} {}",
            self.theme.icons.success.with(self.theme.colors.success),
            self.name(name),
            detail.with(self.theme.colors.secondary)
        );
    }

    fn failed(&self, name: &str, reason: &str) {
        eprintln!(
            "  {} {} {}",
            self.theme.icons.error.with(self.theme.colors.error),
            self.name(name),
            reason.with(self.theme.colors.error)
        );
    }

    fn info(&self, msg: &str) {
        if self.quiet {
            return;
        }
        println!(
            "{} {}",
            self.theme.icons.info.with(self.theme.colors.secondary),
            msg
        );
    }

    fn warning(&self, msg: &str) {
        eprintln!(
            "{} {}",
            self.theme.icons.warning.with(self.theme.colors.warning),
            msg.with(self.theme.colors.warning)
        );
    }

    fn summary(&self, count: usize, action: &str, elapsed_secs: f64) {
        println!();
        self.success(&format!(
            "{} mod{} {} in {}",
            count,
            if count == 1 { "" } else { "s" },
            action,
            format_secs(elapsed_secs)
        ));
    }
}

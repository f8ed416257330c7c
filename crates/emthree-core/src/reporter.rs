//! Reporter trait for dependency injection
//!
//! This trait allows the engine to report progress and status without
//! being coupled to a specific terminal implementation.

pub trait Reporter: Send + Sync {
    /// Indicates a new section or phase has started (e.g. "Resolving", "Downloading").
    fn section(&self, title: &str);

    /// A package was resolved to a version.
    fn resolved(&self, slug: &str, version: &str, detail: &str);

    /// A package was dropped from the set, with the reason.
    fn dropped(&self, name: &str, reason: &str);

    /// A package download started.
    fn downloading(&self, name: &str, filename: &str);

    /// Marks a package operation as successfully completed.
    fn done(&self, name: &str, detail: &str);

    /// Marks a package operation as failed with a specific reason.
    fn failed(&self, name: &str, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Display a final summary of multiple operations.
    fn summary(&self, count: usize, action: &str, elapsed_secs: f64);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn resolved(&self, slug: &str, version: &str, detail: &str) {
        (**self).resolved(slug, version, detail);
    }
    fn dropped(&self, name: &str, reason: &str) {
        (**self).dropped(name, reason);
    }
    fn downloading(&self, name: &str, filename: &str) {
        (**self).downloading(name, filename);
    }
    fn done(&self, name: &str, detail: &str) {
        (**self).done(name, detail);
    }
    fn failed(&self, name: &str, reason: &str) {
        (**self).failed(name, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn summary(&self, count: usize, action: &str, elapsed_secs: f64) {
        (**self).summary(count, action, elapsed_secs);
    }
}

/// A no-op reporter for silent operations (e.g. testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn resolved(&self, _: &str, _: &str, _: &str) {}
    fn dropped(&self, _: &str, _: &str) {}
    fn downloading(&self, _: &str, _: &str) {}
    fn done(&self, _: &str, _: &str) {}
    fn failed(&self, _: &str, _: &str) {}
    fn info(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn summary(&self, _: usize, _: &str, _: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    impl Reporter for Recording {
        fn section(&self, title: &str) {
            self.0.lock().unwrap().push(format!("section {title}"));
        }
        fn resolved(&self, slug: &str, version: &str, _: &str) {
            self.0.lock().unwrap().push(format!("resolved {slug} {version}"));
        }
        fn dropped(&self, name: &str, _: &str) {
            self.0.lock().unwrap().push(format!("dropped {name}"));
        }
        fn downloading(&self, _: &str, _: &str) {}
        fn done(&self, _: &str, _: &str) {}
        fn failed(&self, _: &str, _: &str) {}
        fn info(&self, _: &str) {}
        fn warning(&self, _: &str) {}
        fn summary(&self, _: usize, _: &str, _: f64) {}
    }

    #[test]
    fn null_reporter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NullReporter>();
    }

    #[test]
    fn arc_forwards_to_inner() {
        let inner = Arc::new(Recording::default());
        let shared: Arc<dyn Reporter> = inner.clone();
        shared.section("Resolving");
        shared.resolved("sodium", "0.6.0", "LATEST_RELEASE");
        shared.dropped("ghost", "not found");

        assert_eq!(
            *inner.0.lock().unwrap(),
            vec!["section Resolving", "resolved sodium 0.6.0", "dropped ghost"]
        );
    }
}

//! Loading of user-supplied package lists: one slug per line.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::EngineError;

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[\w!@$()`.+,"\-']{3,64}$"#).expect("package name pattern is valid")
});

/// Whether `name` is an acceptable package name.
pub fn is_valid(name: &str) -> bool {
    ENTRY.is_match(name)
}

/// Read and validate a package list.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] for the first invalid line, so a list
/// is either accepted whole or not at all, or an IO error if it cannot be read.
pub async fn load(path: &Path) -> Result<Vec<String>, EngineError> {
    let content = tokio::fs::read_to_string(path).await?;
    parse(path, &content)
}

/// Validate the contents of a package list read from `path`.
///
/// Blank lines are skipped and repeated names are kept once, in first-seen
/// order. Line numbers in errors are 1-based.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] naming the first invalid line.
pub fn parse(path: &Path, content: &str) -> Result<Vec<String>, EngineError> {
    let mut names: Vec<String> = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let name = raw.trim_end_matches('\r');
        if name.trim().is_empty() {
            continue;
        }
        if !is_valid(name) {
            return Err(EngineError::Validation {
                path: path.to_path_buf(),
                line: idx + 1,
                entry: name.to_string(),
            });
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    tracing::debug!("Loaded {} package(s) from {}", names.len(), path.display());
    Ok(names)
}

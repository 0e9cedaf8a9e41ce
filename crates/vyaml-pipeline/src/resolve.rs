//! # File Discovery
//!
//! Expands a glob pattern (including recursive `**`) into the ordered list
//! of files a batch will process. Order is lexicographic by path so that
//! diagnostics and output enumeration are reproducible.

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal discovery errors. Either aborts the batch before any file is read.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The pattern is not valid glob syntax.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    Pattern {
        /// The pattern as supplied.
        pattern: String,
        /// Parser message.
        reason: String,
    },

    /// The pattern is valid but matched no files.
    #[error("no files matched the provided input pattern: {0}")]
    NoMatch(String),
}

/// Expand `pattern` into a sorted, de-duplicated list of file paths.
///
/// Matching directories are skipped. Entries the walker cannot read are
/// logged and skipped.
///
/// # Errors
///
/// [`ResolveError::Pattern`] for malformed patterns, [`ResolveError::NoMatch`]
/// when no file matches.
pub fn resolve(pattern: &str) -> Result<Vec<PathBuf>, ResolveError> {
    let entries = glob::glob(pattern).map_err(|e| ResolveError::Pattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut paths = BTreeSet::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_dir() => {
                tracing::trace!(path = %path.display(), "skipping matched directory");
            }
            Ok(path) => {
                paths.insert(path);
            }
            Err(e) => {
                tracing::warn!(
                    path = %e.path().display(),
                    error = %e.error(),
                    "skipping unreadable glob entry"
                );
            }
        }
    }

    if paths.is_empty() {
        return Err(ResolveError::NoMatch(pattern.to_string()));
    }

    tracing::debug!(pattern, matched = paths.len(), "resolved input pattern");
    Ok(paths.into_iter().collect())
}

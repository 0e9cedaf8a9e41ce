//! # Diagnostics
//!
//! A [`Diagnostic`] is one human-readable failure. Per-file diagnostics
//! always name the offending file in their detail text; fatal diagnostics
//! (bad pattern, empty match) carry no path.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A single failure message with a short summary and a detailed cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Short, stable headline (e.g. `Error compiling schema`).
    pub summary: String,
    /// Full message including the file path and the underlying cause.
    pub detail: String,
    /// The file this diagnostic is attributed to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Diagnostic {
    /// Diagnostic attributed to one file.
    pub fn for_file(
        path: impl AsRef<Path>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// Diagnostic for a failure that is not attributable to a single file.
    pub fn fatal(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
            path: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

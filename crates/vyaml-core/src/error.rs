//! # Error Types — Structured Error Hierarchy
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations. Stage-specific errors live next to the stage that
//! raises them (`vyaml-schema`, `vyaml-pipeline`); this module holds the
//! errors of the value tree itself and the umbrella [`VyamlError`].

use thiserror::Error;

/// Top-level error type for vyaml.
#[derive(Error, Debug)]
pub enum VyamlError {
    /// A batch finished with per-file failures and was not committed.
    #[error("batch rejected: {failed} of {total} file(s) failed validation")]
    BatchRejected {
        /// Number of files that produced a diagnostic.
        failed: usize,
        /// Number of files matched by the pattern.
        total: usize,
    },

    /// Value tree conversion failed.
    #[error("value error: {0}")]
    Value(#[from] ValueError),
}

/// Error converting a YAML value tree into a [`crate::DecodedValue`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    /// Map key was a sequence, mapping, or null.
    #[error("unsupported YAML map key: {0}")]
    UnsupportedKey(String),

    /// NaN and infinities have no JSON representation.
    #[error("cannot represent float {0} as a JSON number")]
    NonFiniteNumber(f64),

    /// Number that is neither integer nor float.
    #[error("unsupported YAML number: {0}")]
    UnsupportedNumber(String),
}

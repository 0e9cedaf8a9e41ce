//! # Document Validation
//!
//! Checks a decoded document against a compiled schema.
//!
//! Each failed constraint becomes one [`Violation`] carrying the JSON
//! Pointer of the offending instance location and the engine's message.
//! Messages are passed through unchanged, with one exception: type
//! mismatches are reported as `got <actual>, want <expected>`, with the
//! expected type taken from the failed `type` keyword wherever it lives
//! (inline or behind a `$ref`). Downstream tooling matches on that form
//! (`at '/id': got number, want string`).

use std::fmt;

use jsonschema::error::{TypeKind, ValidationErrorKind};
use serde_json::Value;
use vyaml_core::DecodedValue;

use crate::registry::CompiledSchema;

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// A single constraint violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating location in the document (`""` is the root).
    pub pointer: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at '{}': {}", self.pointer, self.message)
    }
}

/// Result of validating one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    /// One entry per failed constraint, in engine order.
    Invalid(Vec<Violation>),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Violations, empty when valid.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(violations) => violations,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate `value` against `schema`.
pub fn validate(schema: &CompiledSchema, value: &DecodedValue) -> ValidationOutcome {
    let instance = value.to_json();

    let violations: Vec<Violation> = schema
        .validator()
        .iter_errors(&instance)
        .map(|e| {
            let message = match &e.kind {
                ValidationErrorKind::Type { kind } => type_mismatch(kind, &e.instance),
                _ => e.to_string(),
            };
            Violation {
                pointer: e.instance_path.to_string(),
                message,
            }
        })
        .collect();

    if violations.is_empty() {
        ValidationOutcome::Valid
    } else {
        ValidationOutcome::Invalid(violations)
    }
}

/// Render `got <actual>, want <expected>` for a failed `type` keyword.
///
/// Multiple expected types are joined with ` or ` in a fixed order
/// (array, boolean, integer, null, number, object, string).
fn type_mismatch(kind: &TypeKind, instance: &Value) -> String {
    let expected = match kind {
        TypeKind::Single(ty) => ty.to_string(),
        TypeKind::Multiple(types) => (*types)
            .into_iter()
            .map(|ty| ty.to_string())
            .collect::<Vec<_>>()
            .join(" or "),
    };
    format!("got {}, want {expected}", json_type_name(instance))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

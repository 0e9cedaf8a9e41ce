//! # vyaml-core — Foundational Types
//!
//! Leaf crate of the vyaml workspace. Defines the types every stage of the
//! validation pipeline agrees on:
//!
//! - [`DecodedValue`] — the explicit tagged value tree a YAML document
//!   decodes into. Validation only ever sees this type, never an untyped
//!   `serde_yaml::Value`.
//! - [`Diagnostic`] — one human-readable failure, attributable to one file.
//! - [`VyamlError`] — top-level error enum for callers that want a single
//!   error type across crates.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vyaml-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod diagnostic;
pub mod error;
pub mod value;

pub use diagnostic::Diagnostic;
pub use error::{ValueError, VyamlError};
pub use value::DecodedValue;

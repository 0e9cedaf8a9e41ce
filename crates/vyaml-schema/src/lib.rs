//! # vyaml-schema — Schema Registry & Validation
//!
//! ## Registry (`registry`)
//!
//! The [`SchemaRegistry`] trait is the capability the batch pipeline is
//! constructed with. [`FsSchemaRegistry`] loads schema documents from the
//! local filesystem, compiles them with the `jsonschema` crate, and caches
//! the compiled form per resolved locator for its whole lifetime. Concurrent
//! compiles of one locator coalesce into a single load.
//!
//! ## Validation (`validate`)
//!
//! [`validate`] checks a [`vyaml_core::DecodedValue`] against a
//! [`CompiledSchema`] and returns a [`ValidationOutcome`] carrying one
//! [`Violation`] per failed constraint, each with its instance pointer.
//!
//! ## Crate Policy
//!
//! - Depends only on `vyaml-core` internally.
//! - Schema loading never touches the network: sub-schema `$ref`s resolve
//!   against the referencing schema's directory.

pub mod registry;
pub mod validate;

pub use registry::{CompiledSchema, FsSchemaRegistry, SchemaCompileError, SchemaRegistry};
pub use validate::{validate, ValidationOutcome, Violation};

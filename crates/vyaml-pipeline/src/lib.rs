//! # vyaml-pipeline — Batch Validation Pipeline
//!
//! Validates every YAML file matching a glob pattern against the JSON Schema
//! each file names in its `# yaml-language-server: $schema=<path>` comment,
//! and publishes the payloads only if every file passes.
//!
//! ## Stages
//!
//! - [`resolve`](resolve::resolve) — glob → sorted file list.
//! - [`extract`](reference::extract) — find the schema reference marker.
//! - [`vyaml_schema::SchemaRegistry::compile`] — compile (or reuse) the schema.
//! - [`decode`](decode::decode) — YAML bytes → [`vyaml_core::DecodedValue`].
//! - [`vyaml_schema::validate`] — check the value against the schema.
//! - [`project`](project::project) — strip the marker from the payload.
//!
//! [`BatchPipeline`] runs these per file and applies the all-or-nothing
//! commit policy across the batch.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vyaml_pipeline::{BatchPipeline, PipelineConfig};
//! use vyaml_schema::FsSchemaRegistry;
//!
//! let pipeline = BatchPipeline::new(Arc::new(FsSchemaRegistry::new()), PipelineConfig::default());
//! let batch = pipeline.run("metadata/**/*.yaml")?;
//! if let Some(entries) = batch.entries() {
//!     for (path, content) in entries {
//!         println!("{}: {} bytes", path.display(), content.len());
//!     }
//! }
//! # Ok::<(), vyaml_pipeline::PipelineError>(())
//! ```

pub mod batch;
pub mod config;
pub mod decode;
pub mod project;
pub mod reference;
pub mod resolve;

pub use batch::{BatchPipeline, BatchResult, FileOutcome, FileResult, FileStage, PipelineError};
pub use config::{ConfigError, PipelineConfig};
pub use decode::DecodeError;
pub use reference::{ReferenceError, SchemaReference, MARKER_PREFIX};
pub use resolve::ResolveError;

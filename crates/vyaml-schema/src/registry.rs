//! # Schema Registry
//!
//! Compiles schema documents addressed by resolved locators and caches the
//! compiled validators.
//!
//! ## Caching
//!
//! The cache is keyed by the locator exactly as given; callers normalise
//! locators before asking (the pipeline folds `.` and `..` segments) so two
//! references to the same file share one entry. Entries are never evicted:
//! schemas are few and small, and are loaded once per registry lifetime.
//!
//! Each locator owns its own slot lock. The map lock is only held long
//! enough to find or create the slot, so compiles of different schemas run
//! in parallel while racing compiles of the same schema wait for the first
//! one and then read its result. Failed compiles leave the slot empty.
//!
//! ## Schema Resolution
//!
//! Sub-schema `$ref`s are resolved locally by [`LocalSchemaRetriever`]:
//!
//! - `file://` URIs load the named file.
//! - Relative references (which the engine roots at `json-schema:///`)
//!   load relative to the directory of the referencing schema.
//! - Any other URI (e.g. one built from an `https://` `$id`) falls back to
//!   its last path segment in that same directory.
//!
//! Nothing is fetched over the network.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jsonschema::{Retrieve, Uri, Validator};
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

/// Base URI the engine assigns to schemas without an absolute `$id`.
const DEFAULT_BASE_URI: &str = "json-schema:///";
const FILE_URI_PREFIX: &str = "file://";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned while loading or compiling a schema.
#[derive(Error, Debug)]
pub enum SchemaCompileError {
    /// The schema file could not be read.
    #[error("failed to read schema {path}: {source}")]
    Read {
        /// Locator of the schema.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The schema file is not valid JSON (or YAML, for `.yaml`/`.yml`).
    #[error("failed to parse schema {path}: {reason}")]
    Parse {
        /// Locator of the schema.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// The document is not a valid schema, or a `$ref` could not be resolved.
    #[error("failed to compile schema {path}: {reason}")]
    Build {
        /// Locator of the schema.
        path: String,
        /// Engine message.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Registry trait and compiled schema
// ---------------------------------------------------------------------------

/// Compiles schemas by resolved locator.
///
/// Implementations must be idempotent per locator: asking twice for the
/// same locator returns the same compiled schema without reloading it.
pub trait SchemaRegistry: Send + Sync {
    /// Compile (or fetch from cache) the schema at `locator`.
    fn compile(&self, locator: &Path) -> Result<Arc<CompiledSchema>, SchemaCompileError>;
}

/// A validator-ready schema.
pub struct CompiledSchema {
    /// Resolved locator, also the cache key.
    locator: PathBuf,
    /// Parsed schema document as loaded from disk.
    document: Value,
    /// Engine validator built from `document`.
    validator: Validator,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// Load and compile the schema document at `locator`.
    ///
    /// # Errors
    ///
    /// [`SchemaCompileError::Read`] or [`SchemaCompileError::Parse`] if the
    /// file cannot be loaded, [`SchemaCompileError::Build`] if it does not
    /// compile.
    pub fn load(locator: &Path) -> Result<Self, SchemaCompileError> {
        let document = load_document(locator)?;
        Self::from_document(locator, document)
    }

    /// Compile an already parsed schema document.
    ///
    /// Relative `$ref`s resolve against the parent directory of `locator`.
    pub fn from_document(locator: &Path, document: Value) -> Result<Self, SchemaCompileError> {
        let base_dir = locator
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut opts = jsonschema::options();
        opts.with_retriever(LocalSchemaRetriever { base_dir });

        let validator = opts
            .build(&document)
            .map_err(|e| SchemaCompileError::Build {
                path: locator.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            locator: locator.to_path_buf(),
            document,
            validator,
        })
    }

    /// The locator this schema was compiled from.
    pub fn locator(&self) -> &Path {
        &self.locator
    }

    /// The raw schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The compiled engine validator.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}

// ---------------------------------------------------------------------------
// Filesystem registry
// ---------------------------------------------------------------------------

/// One cache entry. `None` until the first successful compile; held locked
/// while compiling so concurrent callers for the same locator wait.
type Slot = Arc<Mutex<Option<Arc<CompiledSchema>>>>;

/// Filesystem-backed [`SchemaRegistry`] with a compile-once cache.
#[derive(Default)]
pub struct FsSchemaRegistry {
    /// Slot per resolved locator. This lock only guards slot creation.
    slots: Mutex<HashMap<PathBuf, Slot>>,
    /// Load-and-compile executions, for cache diagnostics.
    compiles: AtomicUsize,
}

impl fmt::Debug for FsSchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsSchemaRegistry")
            .field("cached", &self.cached_count())
            .field("compiles", &self.compile_count())
            .finish()
    }
}

impl FsSchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of schemas currently held in the cache.
    pub fn cached_count(&self) -> usize {
        let slots: Vec<Slot> = self.slots.lock().values().cloned().collect();
        slots.iter().filter(|slot| slot.lock().is_some()).count()
    }

    /// Number of load-and-compile executions performed so far, failed ones
    /// included. Cache hits do not count.
    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::Relaxed)
    }

    fn slot(&self, locator: &Path) -> Slot {
        let mut slots = self.slots.lock();
        Arc::clone(slots.entry(locator.to_path_buf()).or_default())
    }
}

impl SchemaRegistry for FsSchemaRegistry {
    fn compile(&self, locator: &Path) -> Result<Arc<CompiledSchema>, SchemaCompileError> {
        let slot = self.slot(locator);
        let mut cached = slot.lock();

        if let Some(schema) = cached.as_ref() {
            tracing::trace!(schema = %locator.display(), "schema cache hit");
            return Ok(Arc::clone(schema));
        }

        self.compiles.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(schema = %locator.display(), "compiling schema");

        let schema = Arc::new(CompiledSchema::load(locator)?);
        *cached = Some(Arc::clone(&schema));
        Ok(schema)
    }
}

// ---------------------------------------------------------------------------
// Reference retrieval
// ---------------------------------------------------------------------------

/// Resolves `$ref` URIs to schema files next to the referencing schema.
struct LocalSchemaRetriever {
    /// Directory of the referencing schema.
    base_dir: PathBuf,
}

impl LocalSchemaRetriever {
    fn candidate_path(&self, uri: &str) -> Option<PathBuf> {
        if let Some(path) = uri.strip_prefix(FILE_URI_PREFIX) {
            return Some(PathBuf::from(path));
        }
        if let Some(rel) = uri.strip_prefix(DEFAULT_BASE_URI) {
            return Some(self.base_dir.join(rel));
        }
        let filename = uri.rsplit('/').next().filter(|s| !s.is_empty())?;
        Some(self.base_dir.join(filename))
    }
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let path = self
            .candidate_path(uri_str)
            .ok_or_else(|| format!("cannot map URI to a local schema: {uri_str}"))?;

        tracing::debug!(uri = uri_str, path = %path.display(), "retrieving referenced schema");
        Ok(load_document(&path)?)
    }
}

/// Read a schema document, parsing YAML for `.yaml`/`.yml` files and JSON
/// otherwise.
fn load_document(path: &Path) -> Result<Value, SchemaCompileError> {
    let content = std::fs::read_to_string(path).map_err(|source| SchemaCompileError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parsed = match ext {
        "yaml" | "yml" => serde_yaml::from_str::<Value>(&content).map_err(|e| e.to_string()),
        _ => serde_json::from_str::<Value>(&content).map_err(|e| e.to_string()),
    };

    parsed.map_err(|reason| SchemaCompileError::Parse {
        path: path.display().to_string(),
        reason,
    })
}

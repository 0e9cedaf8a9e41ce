//! # Batch Pipeline
//!
//! Drives every matched file through its stages and decides, once all files
//! are accounted for, whether the batch commits.
//!
//! ## Per-file state machine
//!
//! ```text
//! Matched → Opened → ReferenceExtracted → SchemaResolved → Decoded → Validated → Committed
//!    └──────────┴───────────┴─────────────────┴──────────────┴──────────┴──→ Failed(stage)
//! ```
//!
//! A failing stage ends processing for that file only. Its [`FileResult`]
//! records the stage that failed and one [`Diagnostic`].
//!
//! ## Commit policy
//!
//! Processing and publishing are separate phases. Every file is processed
//! first; only then is the batch judged. One diagnostic anywhere means the
//! whole batch is rejected and no entry is exposed, even for files that
//! validated on their own. Configuration assembled from a partially valid
//! file set is worse than no configuration.
//!
//! ## Concurrency
//!
//! With more than one worker, files are processed on a bounded `rayon`
//! pool. The schema registry is the only shared state. Results are merged
//! in discovery order, so diagnostics and entries are identical to a
//! sequential run.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;
use vyaml_core::{Diagnostic, VyamlError};
use vyaml_schema::{validate, SchemaRegistry, ValidationOutcome};

use crate::config::PipelineConfig;
use crate::decode::decode;
use crate::project::project;
use crate::reference::extract;
use crate::resolve::{resolve, ResolveError};

/// Stands in for the pattern when [`BatchPipeline::run_paths`] gets no files.
const EMPTY_PATH_LIST: &str = "<empty path list>";

/// Stages a file moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileStage {
    Matched,
    Opened,
    ReferenceExtracted,
    SchemaResolved,
    Decoded,
    Validated,
    Committed,
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Matched => "matched",
            Self::Opened => "opened",
            Self::ReferenceExtracted => "reference-extracted",
            Self::SchemaResolved => "schema-resolved",
            Self::Decoded => "decoded",
            Self::Validated => "validated",
            Self::Committed => "committed",
        };
        f.write_str(s)
    }
}

/// Terminal outcome of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The projected payload.
    Committed(String),
    Failed(Diagnostic),
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    pub path: PathBuf,
    /// [`FileStage::Committed`] on success, otherwise the stage that failed.
    pub stage: FileStage,
    pub outcome: FileOutcome,
}

impl FileResult {
    pub fn is_committed(&self) -> bool {
        matches!(self.outcome, FileOutcome::Committed(_))
    }
}

/// Outcome of a whole batch.
///
/// `committed` holds exactly when no file produced a diagnostic. A rejected
/// batch carries no entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    entries: BTreeMap<PathBuf, String>,
    diagnostics: Vec<Diagnostic>,
    committed: bool,
    file_count: usize,
}

impl BatchResult {
    /// Merge per-file results (in discovery order) and make the commit
    /// decision.
    pub fn from_results(results: Vec<FileResult>) -> Self {
        let file_count = results.len();
        let mut entries = BTreeMap::new();
        let mut diagnostics = Vec::new();

        for result in results {
            match result.outcome {
                FileOutcome::Committed(content) => {
                    entries.insert(result.path, content);
                }
                FileOutcome::Failed(diagnostic) => diagnostics.push(diagnostic),
            }
        }

        let committed = diagnostics.is_empty();
        if !committed {
            entries.clear();
        }

        Self {
            entries,
            diagnostics,
            committed,
            file_count,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// The path → payload mapping, only when the batch committed.
    pub fn entries(&self) -> Option<&BTreeMap<PathBuf, String>> {
        self.committed.then_some(&self.entries)
    }

    /// Consume the result, yielding the mapping or a rejection error.
    pub fn into_entries(self) -> Result<BTreeMap<PathBuf, String>, VyamlError> {
        if self.committed {
            Ok(self.entries)
        } else {
            Err(VyamlError::BatchRejected {
                failed: self.diagnostics.len(),
                total: self.file_count,
            })
        }
    }

    /// One diagnostic per failed file, in discovery order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics rendered as `summary: detail` strings.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }

    /// Number of files the pattern matched.
    pub fn file_count(&self) -> usize {
        self.file_count
    }
}

/// Fatal errors that abort a batch before any file is processed.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

impl PipelineError {
    /// Render as a user-facing diagnostic.
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            Self::Resolve(ResolveError::Pattern { reason, .. }) => Diagnostic::fatal(
                "Error reading input files",
                format!("Could not read input files: {reason}"),
            ),
            Self::Resolve(ResolveError::NoMatch(pattern)) => Diagnostic::fatal(
                "No input files found",
                format!("No files matched the provided input pattern: {pattern}"),
            ),
            Self::WorkerPool(reason) => {
                Diagnostic::fatal("Error starting workers", format!("Could not start worker pool: {reason}"))
            }
        }
    }
}

struct StageFailure {
    stage: FileStage,
    diagnostic: Diagnostic,
}

impl StageFailure {
    fn new(stage: FileStage, path: &Path, summary: &str, detail: String) -> Self {
        Self {
            stage,
            diagnostic: Diagnostic::for_file(path, summary, detail),
        }
    }
}

/// Validates batches of YAML files against their referenced schemas.
pub struct BatchPipeline {
    registry: Arc<dyn SchemaRegistry>,
    config: PipelineConfig,
}

impl fmt::Debug for BatchPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BatchPipeline {
    /// Create a pipeline that compiles schemas through `registry`.
    ///
    /// The registry outlives individual batches; share one instance across
    /// runs to reuse compiled schemas.
    pub fn new(registry: Arc<dyn SchemaRegistry>, config: PipelineConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validate every file matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] only for failures that prevent processing
    /// altogether (bad pattern, no match). Per-file failures are reported
    /// through [`BatchResult::diagnostics`].
    pub fn run(&self, pattern: &str) -> Result<BatchResult, PipelineError> {
        let paths = resolve(pattern)?;
        self.run_paths(&paths)
    }

    /// Validate an already discovered, ordered list of files.
    ///
    /// # Errors
    ///
    /// An empty list is rejected with [`ResolveError::NoMatch`], the same
    /// as a pattern that matches nothing.
    pub fn run_paths(&self, paths: &[PathBuf]) -> Result<BatchResult, PipelineError> {
        if paths.is_empty() {
            return Err(ResolveError::NoMatch(EMPTY_PATH_LIST.to_string()).into());
        }
        let results = self.process_all(paths)?;
        let batch = BatchResult::from_results(results);

        tracing::info!(
            files = batch.file_count(),
            failed = batch.diagnostics().len(),
            committed = batch.is_committed(),
            "batch finished"
        );
        Ok(batch)
    }

    fn process_all(&self, paths: &[PathBuf]) -> Result<Vec<FileResult>, PipelineError> {
        let workers = self.config.workers.min(paths.len()).max(1);
        if workers == 1 {
            return Ok(paths.iter().map(|p| self.process_file(p)).collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("vyaml-worker-{i}"))
            .build()
            .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;

        tracing::debug!(workers, files = paths.len(), "processing files concurrently");
        Ok(pool.install(|| paths.par_iter().map(|p| self.process_file(p)).collect()))
    }

    /// Run one file through every stage.
    pub fn process_file(&self, path: &Path) -> FileResult {
        tracing::debug!(file = %path.display(), stage = %FileStage::Matched, "processing file");

        match self.advance(path) {
            Ok(content) => {
                tracing::debug!(file = %path.display(), stage = %FileStage::Committed, "file committed");
                FileResult {
                    path: path.to_path_buf(),
                    stage: FileStage::Committed,
                    outcome: FileOutcome::Committed(content),
                }
            }
            Err(failure) => {
                tracing::warn!(
                    file = %path.display(),
                    stage = %failure.stage,
                    "{}",
                    failure.diagnostic
                );
                FileResult {
                    path: path.to_path_buf(),
                    stage: failure.stage,
                    outcome: FileOutcome::Failed(failure.diagnostic),
                }
            }
        }
    }

    fn advance(&self, path: &Path) -> Result<String, StageFailure> {
        let file = path.display();

        let bytes = std::fs::read(path).map_err(|e| {
            StageFailure::new(
                FileStage::Opened,
                path,
                "Error reading file",
                format!("Could not read file {file}: {e}"),
            )
        })?;
        let content = std::str::from_utf8(&bytes).map_err(|e| {
            StageFailure::new(
                FileStage::Opened,
                path,
                "Error reading file",
                format!("Could not read file {file}: invalid UTF-8: {e}"),
            )
        })?;
        tracing::trace!(file = %file, stage = %FileStage::Opened, bytes = bytes.len());

        let reference = extract(path, content).map_err(|_| {
            StageFailure::new(
                FileStage::ReferenceExtracted,
                path,
                "Error validating file",
                format!(
                    "File {file} does not contain a valid schema reference, e.g. '# yaml-language-server: $schema=path'"
                ),
            )
        })?;
        let schema_path = reference.resolved_locator().display();
        tracing::trace!(file = %file, stage = %FileStage::ReferenceExtracted, schema = %schema_path);

        let schema = self
            .registry
            .compile(reference.resolved_locator())
            .map_err(|e| {
                StageFailure::new(
                    FileStage::SchemaResolved,
                    path,
                    "Error compiling schema",
                    format!("Could not compile schema {schema_path} for file {file}: {e}"),
                )
            })?;
        tracing::trace!(file = %file, stage = %FileStage::SchemaResolved);

        let value = decode(&bytes).map_err(|e| {
            StageFailure::new(
                FileStage::Decoded,
                path,
                "Error decoding YAML",
                format!("Could not decode YAML file {file}: {e}"),
            )
        })?;
        tracing::trace!(file = %file, stage = %FileStage::Decoded);

        if let ValidationOutcome::Invalid(violations) = validate(&schema, &value) {
            let mut detail = format!("YAML file {file} does not conform to schema {schema_path}:");
            for violation in &violations {
                detail.push_str("\n- ");
                detail.push_str(&violation.to_string());
            }
            return Err(StageFailure::new(
                FileStage::Validated,
                path,
                "Error validating YAML",
                detail,
            ));
        }
        tracing::trace!(file = %file, stage = %FileStage::Validated);

        Ok(project(content, &reference))
    }
}

//! # Validate Subcommand
//!
//! Runs one batch over a glob pattern. On success the path → payload
//! mapping is written as JSON (default) or YAML; on failure every
//! diagnostic goes to stderr and nothing is written.
//!
//! Exit codes: 0 committed, 1 batch rejected, 2 fatal (bad pattern, no
//! match).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use vyaml_pipeline::{BatchPipeline, PipelineConfig};
use vyaml_schema::FsSchemaRegistry;

/// Output encoding for the validated mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Arguments for the `vyaml validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Glob pattern selecting the YAML files, e.g. `metadata/**/*.yaml`.
    #[arg(value_name = "PATTERN")]
    pub pattern: String,

    /// Number of files validated concurrently (overrides VYAML_WORKERS).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Encoding of the validated mapping.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the mapping to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on validation failure, 2 on fatal error.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let config = pipeline_config(args.workers, |var| std::env::var(var).ok())?;
    tracing::debug!(workers = config.workers, pattern = %args.pattern, "starting batch");

    let pipeline = BatchPipeline::new(Arc::new(FsSchemaRegistry::new()), config);

    let batch = match pipeline.run(&args.pattern) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("{}", e.diagnostic());
            return Ok(2);
        }
    };

    if !batch.is_committed() {
        for diagnostic in batch.diagnostics() {
            eprintln!("{diagnostic}");
        }
        eprintln!(
            "\n{} of {} file(s) failed validation; no values published.",
            batch.diagnostics().len(),
            batch.file_count()
        );
        return Ok(1);
    }

    let file_count = batch.file_count();
    let entries = batch.into_entries()?;
    let rendered = render(&entries, args.format)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(files = file_count, output = %path.display(), "wrote validated values");
        }
        None => println!("{rendered}"),
    }

    Ok(0)
}

/// Build the pipeline configuration. An explicit `--workers` takes
/// precedence and skips the environment entirely.
fn pipeline_config(
    workers: Option<usize>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<PipelineConfig> {
    match workers {
        Some(workers) => Ok(PipelineConfig::default().with_workers(workers)?),
        None => PipelineConfig::from_lookup(lookup).context("failed to load pipeline configuration"),
    }
}

/// Encode the mapping. Keys keep discovery order.
pub fn render(entries: &BTreeMap<PathBuf, String>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(entries).context("failed to encode values as JSON")
        }
        OutputFormat::Yaml => serde_yaml::to_string(entries).context("failed to encode values as YAML"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SCHEMA: &str = r#"{"type": "object", "properties": {"id": {"type": "string"}}, "required": ["id"]}"#;

    fn args(pattern: String, output: Option<PathBuf>) -> ValidateArgs {
        ValidateArgs {
            pattern,
            workers: Some(1),
            format: OutputFormat::Json,
            output,
        }
    }

    #[test]
    fn test_render_json_and_yaml() {
        let entries = BTreeMap::from([(PathBuf::from("a/x.yaml"), "id: a".to_string())]);
        let json: serde_json::Value =
            serde_json::from_str(&render(&entries, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["a/x.yaml"], "id: a");

        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&render(&entries, OutputFormat::Yaml).unwrap()).unwrap();
        assert_eq!(yaml["a/x.yaml"], serde_yaml::Value::String("id: a".into()));
    }

    #[test]
    fn test_committed_batch_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
        let file = dir.path().join("ok.yaml");
        fs::write(&file, "# yaml-language-server: $schema=schema.json\nid: a\n").unwrap();
        let out = dir.path().join("values.json");

        let pattern = dir.path().join("*.yaml").to_string_lossy().into_owned();
        let code = run_validate(&args(pattern, Some(out.clone()))).unwrap();
        assert_eq!(code, 0);

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(written[file.to_str().unwrap()], "id: a");
    }

    #[test]
    fn test_rejected_batch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
        fs::write(
            dir.path().join("bad.yaml"),
            "# yaml-language-server: $schema=schema.json\nid: 1\n",
        )
        .unwrap();
        let out = dir.path().join("values.json");

        let pattern = dir.path().join("*.yaml").to_string_lossy().into_owned();
        let code = run_validate(&args(pattern, Some(out.clone()))).unwrap();
        assert_eq!(code, 1);
        assert!(!out.exists());
    }

    #[test]
    fn test_no_match_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.yaml").to_string_lossy().into_owned();
        assert_eq!(run_validate(&args(pattern, None)).unwrap(), 2);
    }

    #[test]
    fn test_workers_flag_overrides_invalid_env() {
        let config = pipeline_config(Some(3), |_| Some("not-a-number".to_string())).unwrap();
        assert_eq!(config.workers, 3);
    }

    #[test]
    fn test_env_used_without_flag() {
        let config = pipeline_config(None, |var| {
            (var == vyaml_pipeline::config::WORKERS_ENV).then(|| "2".to_string())
        })
        .unwrap();
        assert_eq!(config.workers, 2);

        assert!(pipeline_config(None, |_| Some("0".to_string())).is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut a = args("*.yaml".to_string(), None);
        a.workers = Some(0);
        assert!(run_validate(&a).is_err());
    }
}

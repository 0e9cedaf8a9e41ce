//! Pipeline configuration.
//!
//! Defaults suit interactive use. Override via environment variables or
//! explicit construction.

use std::num::NonZeroUsize;

use thiserror::Error;

/// Environment variable holding the worker count.
pub const WORKERS_ENV: &str = "VYAML_WORKERS";

/// Configuration for a [`crate::BatchPipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of files processed concurrently. `1` processes files one
    /// after another on the calling thread.
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

impl PipelineConfig {
    /// Strictly sequential processing.
    pub fn sequential() -> Self {
        Self { workers: 1 }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `VYAML_WORKERS` (default: available parallelism)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(WORKERS_ENV) {
            config.workers = parse_workers(WORKERS_ENV, &raw)?;
        }
        Ok(config)
    }

    /// Override the worker count.
    pub fn with_workers(mut self, workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::Invalid {
                var: "workers".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        self.workers = workers;
        Ok(self)
    }
}

fn parse_workers(var: &str, raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: var.to_string(),
        reason,
    };
    let workers: usize = raw
        .trim()
        .parse()
        .map_err(|e| invalid(format!("'{raw}': {e}")))?;
    if workers == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    Ok(workers)
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_at_least_one_worker() {
        assert!(PipelineConfig::default().workers >= 1);
    }

    #[test]
    fn test_lookup_overrides_workers() {
        let config =
            PipelineConfig::from_lookup(|v| (v == WORKERS_ENV).then(|| " 3 ".to_string())).unwrap();
        assert_eq!(config.workers, 3);
    }

    #[test]
    fn test_lookup_absent_keeps_default() {
        let config = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_zero_and_garbage_rejected() {
        assert!(PipelineConfig::from_lookup(|_| Some("0".into())).is_err());
        assert!(PipelineConfig::from_lookup(|_| Some("many".into())).is_err());
        assert!(PipelineConfig::sequential().with_workers(0).is_err());
    }

    #[test]
    fn test_with_workers() {
        let config = PipelineConfig::sequential().with_workers(4).unwrap();
        assert_eq!(config.workers, 4);
    }
}

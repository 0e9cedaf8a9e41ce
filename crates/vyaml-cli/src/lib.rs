//! # vyaml-cli — Command-Line Interface
//!
//! Provides the `vyaml` binary, the host surface of the batch pipeline:
//!
//! ```bash
//! vyaml validate 'metadata/**/*.yaml'
//! vyaml -v validate 'metadata/**/*.yaml' --format yaml --output values.yaml
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from business logic.
//! - Handlers delegate to `vyaml-pipeline`; no validation logic here.

pub mod validate;

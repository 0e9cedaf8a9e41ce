//! # Document Decoding
//!
//! Raw file bytes → [`DecodedValue`], via `serde_yaml`.
//!
//! Only the first document of a multi-document stream is decoded; later
//! documents are not parsed. Merge keys (`<<: *anchor`) are expanded into
//! the surrounding mapping before conversion.

use serde::Deserialize;
use thiserror::Error;
use vyaml_core::{DecodedValue, ValueError};

/// The bytes are not a decodable YAML document.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Decode one YAML document. Whitespace-only input decodes to
/// [`DecodedValue::Null`].
pub fn decode(bytes: &[u8]) -> Result<DecodedValue, DecodeError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(DecodedValue::Null);
    }
    let mut yaml = match serde_yaml::Deserializer::from_slice(bytes).next() {
        Some(document) => serde_yaml::Value::deserialize(document)?,
        None => serde_yaml::Value::Null,
    };
    yaml.apply_merge()?;
    Ok(DecodedValue::try_from(&yaml)?)
}

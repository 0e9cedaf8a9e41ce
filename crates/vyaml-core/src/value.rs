//! # Decoded Values
//!
//! [`DecodedValue`] is the generic tree a structured document decodes into,
//! independent of the source syntax. Maps are unordered (keys sorted for
//! determinism); arrays keep their order.
//!
//! YAML is richer than JSON (tags, non-string keys, anchors), but the
//! documents this workspace validates are consumed as JSON-compatible data.
//! Conversion therefore keeps the JSON subset: tags are dropped in favour of
//! the inner value, scalar keys are stringified, and anything else is
//! rejected with a [`ValueError`].

use std::collections::BTreeMap;

use serde_json::Number;

use crate::error::ValueError;

/// A decoded document value.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<DecodedValue>),
    Map(BTreeMap<String, DecodedValue>),
}

impl DecodedValue {
    /// JSON type name of this value, as used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "object",
        }
    }

    /// Look up a map entry. Returns `None` for non-map values.
    pub fn get(&self, key: &str) -> Option<&DecodedValue> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Convert into the engine-facing JSON representation.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self)
    }
}

impl TryFrom<&serde_yaml::Value> for DecodedValue {
    type Error = ValueError;

    fn try_from(yaml: &serde_yaml::Value) -> Result<Self, Self::Error> {
        match yaml {
            serde_yaml::Value::Null => Ok(Self::Null),
            serde_yaml::Value::Bool(b) => Ok(Self::Bool(*b)),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Number(Number::from(i)))
                } else if let Some(u) = n.as_u64() {
                    Ok(Self::Number(Number::from(u)))
                } else if let Some(f) = n.as_f64() {
                    Number::from_f64(f)
                        .map(Self::Number)
                        .ok_or(ValueError::NonFiniteNumber(f))
                } else {
                    Err(ValueError::UnsupportedNumber(n.to_string()))
                }
            }
            serde_yaml::Value::String(s) => Ok(Self::String(s.clone())),
            serde_yaml::Value::Sequence(seq) => seq
                .iter()
                .map(Self::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Array),
            serde_yaml::Value::Mapping(mapping) => {
                let mut map = BTreeMap::new();
                for (k, v) in mapping {
                    let key = match k {
                        serde_yaml::Value::String(s) => s.clone(),
                        serde_yaml::Value::Number(n) => n.to_string(),
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        other => return Err(ValueError::UnsupportedKey(format!("{other:?}"))),
                    };
                    map.insert(key, Self::try_from(v)?);
                }
                Ok(Self::Map(map))
            }
            // Tags carry no meaning for schema validation; keep the inner value.
            serde_yaml::Value::Tagged(tagged) => Self::try_from(&tagged.value),
        }
    }
}

impl From<&DecodedValue> for serde_json::Value {
    fn from(value: &DecodedValue) -> Self {
        match value {
            DecodedValue::Null => serde_json::Value::Null,
            DecodedValue::Bool(b) => serde_json::Value::Bool(*b),
            DecodedValue::Number(n) => serde_json::Value::Number(n.clone()),
            DecodedValue::String(s) => serde_json::Value::String(s.clone()),
            DecodedValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            DecodedValue::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

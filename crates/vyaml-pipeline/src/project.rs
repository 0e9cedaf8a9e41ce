//! # Result Projection
//!
//! The published payload of a file is everything after its marker line,
//! without the surrounding line breaks.

use crate::reference::SchemaReference;

/// Strip the marker (and anything before it) from `content`.
pub fn project(content: &str, reference: &SchemaReference) -> String {
    content[reference.marker_end()..]
        .trim_matches(|c| c == '\n' || c == '\r')
        .to_string()
}

//! # Schema Reference Extraction
//!
//! Content files name their schema with the yaml-language-server anchor
//! comment:
//!
//! ```text
//! # yaml-language-server: $schema=../schema.json
//! ```
//!
//! The first occurrence anywhere in the file wins; the marker does not have
//! to be on the first line. The locator is the rest of that line with
//! trailing whitespace removed, and is resolved against the directory of
//! the file that embeds it.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// The fixed anchor text preceding the schema locator.
pub const MARKER_PREFIX: &str = "# yaml-language-server: $schema=";

/// No usable marker was found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("no '# yaml-language-server: $schema=<path>' marker found")]
    Missing,
}

/// A schema reference found in a content file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReference {
    raw_marker: String,
    referenced_locator: String,
    resolved_locator: PathBuf,
    marker_end: usize,
}

impl SchemaReference {
    /// The full matched marker text, prefix included.
    pub fn raw_marker(&self) -> &str {
        &self.raw_marker
    }

    /// The locator exactly as written after `$schema=`.
    pub fn referenced_locator(&self) -> &str {
        &self.referenced_locator
    }

    /// The locator joined onto the referencing file's directory and
    /// lexically normalised.
    pub fn resolved_locator(&self) -> &Path {
        &self.resolved_locator
    }

    /// Byte offset just past the marker line's content (before its line
    /// break).
    pub fn marker_end(&self) -> usize {
        self.marker_end
    }
}

/// Find the schema reference in `content`, read from `source`.
///
/// # Errors
///
/// [`ReferenceError::Missing`] when no marker with a non-empty locator exists.
pub fn extract(source: &Path, content: &str) -> Result<SchemaReference, ReferenceError> {
    for (start, _) in content.match_indices(MARKER_PREFIX) {
        let value_start = start + MARKER_PREFIX.len();
        let line_end = content[value_start..]
            .find('\n')
            .map_or(content.len(), |i| value_start + i);

        let locator = content[value_start..line_end].trim_end();
        if locator.is_empty() {
            continue;
        }

        return Ok(SchemaReference {
            raw_marker: content[start..line_end].to_string(),
            referenced_locator: locator.to_string(),
            resolved_locator: resolve_locator(source, locator),
            marker_end: line_end,
        });
    }

    Err(ReferenceError::Missing)
}

/// Join `locator` onto the directory containing `source`.
///
/// Absolute locators are kept as they are. The result is normalised
/// without touching the filesystem.
pub fn resolve_locator(source: &Path, locator: &str) -> PathBuf {
    let dir = source.parent().unwrap_or_else(|| Path::new(""));
    normalize(&dir.join(locator))
}

/// Fold `.` and `..` segments. `..` never climbs above the root; leading
/// `..` segments of a relative path are kept.
fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_marker_on_first_line() {
        let content = "# yaml-language-server: $schema=schema.json\nid: a\n";
        let r = extract(Path::new("/data/file.yaml"), content).unwrap();
        assert_eq!(r.referenced_locator(), "schema.json");
        assert_eq!(r.resolved_locator(), Path::new("/data/schema.json"));
        assert_eq!(r.raw_marker(), "# yaml-language-server: $schema=schema.json");
        assert_eq!(&content[r.marker_end()..], "\nid: a\n");
    }

    #[test]
    fn test_marker_found_anywhere() {
        let content = "\nid: a\n# yaml-language-server: $schema=../schema.json\nname: b\n";
        let r = extract(Path::new("/meta/examples/example.yaml"), content).unwrap();
        assert_eq!(r.referenced_locator(), "../schema.json");
        assert_eq!(r.resolved_locator(), Path::new("/meta/schema.json"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let content = "# yaml-language-server: $schema=a.json\n# yaml-language-server: $schema=b.json\n";
        let r = extract(Path::new("f.yaml"), content).unwrap();
        assert_eq!(r.referenced_locator(), "a.json");
    }

    #[test]
    fn test_empty_locator_is_skipped() {
        let content = "# yaml-language-server: $schema=\n# yaml-language-server: $schema=real.json\n";
        let r = extract(Path::new("f.yaml"), content).unwrap();
        assert_eq!(r.referenced_locator(), "real.json");
    }

    #[test]
    fn test_crlf_is_trimmed() {
        let content = "# yaml-language-server: $schema=s.json\r\nid: a\r\n";
        let r = extract(Path::new("f.yaml"), content).unwrap();
        assert_eq!(r.referenced_locator(), "s.json");
    }

    #[test]
    fn test_marker_at_end_without_newline() {
        let content = "id: a\n# yaml-language-server: $schema=s.json";
        let r = extract(Path::new("f.yaml"), content).unwrap();
        assert_eq!(r.marker_end(), content.len());
    }

    #[test]
    fn test_missing_marker() {
        let content = "id: \"example-id\"\nname: \"Example Name\"\n";
        assert_eq!(extract(Path::new("f.yaml"), content), Err(ReferenceError::Missing));
    }

    #[test]
    fn test_similar_comment_is_not_a_marker() {
        let content = "# yaml-language-server: schema=s.json\n";
        assert_eq!(extract(Path::new("f.yaml"), content), Err(ReferenceError::Missing));
    }

    #[test]
    fn test_relative_source_without_directory() {
        assert_eq!(resolve_locator(Path::new("f.yaml"), "s.json"), PathBuf::from("s.json"));
        assert_eq!(resolve_locator(Path::new("f.yaml"), "../s.json"), PathBuf::from("../s.json"));
    }

    #[test]
    fn test_absolute_locator_kept() {
        assert_eq!(
            resolve_locator(Path::new("/a/b/f.yaml"), "/schemas/s.json"),
            PathBuf::from("/schemas/s.json")
        );
    }

    #[test]
    fn test_normalize_folds_segments() {
        assert_eq!(normalize(Path::new("/a/./b/../c.json")), PathBuf::from("/a/c.json"));
        assert_eq!(normalize(Path::new("/../x.json")), PathBuf::from("/x.json"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    proptest! {
        #[test]
        fn prop_extracts_locator_after_any_prefix(
            before in "[a-z: \n]{0,40}",
            locator in "[a-zA-Z0-9_./-]{1,30}",
            after in "[a-z: \n]{0,40}",
        ) {
            let content = format!("{before}{MARKER_PREFIX}{locator}\n{after}");
            let r = extract(Path::new("/root/file.yaml"), &content).unwrap();
            prop_assert_eq!(r.referenced_locator(), locator.as_str());
            prop_assert_eq!(&content[r.marker_end()..], format!("\n{after}"));
        }
    }
}

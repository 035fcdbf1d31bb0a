//! Parser for npm package.json files
//!
//! Unlike the other parsers this one needs a valid document: the JSON is
//! parsed with byte spans attached to every key and value, and positions
//! are derived from those spans.

use json_spanned_value::{self as jsv, spanned};
use thiserror::Error;

use super::{Dependency, PositionedValue};
use crate::utils::LineIndex;

/// Section consulted when no allow-list is configured
pub const DEFAULT_SECTION: &str = "dependencies";

#[derive(Debug, Error)]
pub enum PackageJsonError {
    /// Malformed JSON. Duplicate keys in any object are rejected here too,
    /// even though `JSON.parse` would keep the last one.
    #[error("invalid package.json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid package.json: top-level value is not an object")]
    NotAnObject,
}

/// Parser for npm package.json dependency files
#[derive(Debug, Clone)]
pub struct PackageJsonParser {
    sections: Vec<String>,
}

impl Default for PackageJsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageJsonParser {
    pub fn new() -> Self {
        Self::with_sections(vec![DEFAULT_SECTION.to_string()])
    }

    /// Only top-level keys named in `sections` are read
    pub fn with_sections(sections: Vec<String>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn parse(&self, content: &str) -> Result<Vec<Dependency>, PackageJsonError> {
        let document: spanned::Value = jsv::from_str(content)?;
        let jsv::Value::Object(root) = document.get_ref() else {
            return Err(PackageJsonError::NotAnObject);
        };

        let lines = LineIndex::new(content);
        let mut found = Vec::new();

        for (section, members) in root.iter() {
            if !self.sections.iter().any(|s| s == section.get_ref()) {
                continue;
            }
            let jsv::Value::Object(members) = members.get_ref() else {
                tracing::debug!("Skipping non-object section {}", section.get_ref());
                continue;
            };

            for (key, value) in members.iter() {
                let name = key.get_ref().trim();
                if name.is_empty() {
                    tracing::debug!("Skipping blank key in section {}", section.get_ref());
                    continue;
                }
                let (key_start, _) = key.span();
                let (value_start, value_end) = value.span();

                let name_start = skip_spaces(content, token_text_start(content, key_start));
                let value_text_start = token_text_start(content, value_start);

                let version = match value.get_ref() {
                    jsv::Value::String(s) => s.clone(),
                    _ => content
                        .get(value_text_start..value_end)
                        .unwrap_or_default()
                        .trim()
                        .to_string(),
                };

                found.push((
                    key_start,
                    Dependency::new(
                        PositionedValue::new(name, lines.position(name_start)),
                        PositionedValue::new(version, lines.position(value_text_start)),
                    ),
                ));
            }
        }

        // Keep document order regardless of how the map iterates
        found.sort_by_key(|(offset, _)| *offset);
        Ok(found.into_iter().map(|(_, dep)| dep).collect())
    }
}

/// Offset of the first character of a token's text.
///
/// Spans may begin at the separator or whitespace preceding the token;
/// those are skipped, and so is the opening quote of a string.
fn token_text_start(content: &str, offset: usize) -> usize {
    let bytes = content.as_bytes();
    let mut offset = offset;
    while bytes
        .get(offset)
        .is_some_and(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b',' | b':'))
    {
        offset += 1;
    }
    if bytes.get(offset) == Some(&b'"') {
        offset += 1;
    }
    offset
}

/// Offset of the first non-space byte at or after `offset`
fn skip_spaces(content: &str, offset: usize) -> usize {
    let padding = content
        .get(offset..)
        .map_or(0, |rest| rest.len() - rest.trim_start_matches(' ').len());
    offset + padding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::Position;

    #[test]
    fn test_single_dependency_positions() {
        let content = r#"{"dependencies": {"left-pad": "1.0.0"}}"#;
        let deps = PackageJsonParser::new().parse(content).unwrap();

        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name.value, "left-pad");
        assert_eq!(deps[0].name.position, Position::new(1, 20));
        assert_eq!(deps[0].version.value, "1.0.0");
        assert_eq!(deps[0].version.position, Position::new(1, 32));
    }

    #[test]
    fn test_multiline_document() {
        let content = r#"{
  "name": "my-app",
  "dependencies": {
    "react": "^18.2.0",
    "lodash": "4.17.21"
  },
  "devDependencies": {
    "typescript": "^5.0.0"
  }
}"#;
        let deps = PackageJsonParser::new().parse(content).unwrap();

        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name.value, "react");
        assert_eq!(deps[0].name.position, Position::new(4, 6));
        assert_eq!(deps[0].version.value, "^18.2.0");
        assert_eq!(deps[0].version.position, Position::new(4, 15));

        assert_eq!(deps[1].name.value, "lodash");
        assert_eq!(deps[1].name.position, Position::new(5, 6));
        assert_eq!(deps[1].version.position, Position::new(5, 16));
    }

    #[test]
    fn test_custom_sections() {
        let content = r#"{
  "dependencies": { "express": "^4.18.0" },
  "devDependencies": { "jest": "^29.0.0" },
  "peerDependencies": { "react": ">=16.8.0" }
}"#;
        let parser = PackageJsonParser::with_sections(vec![
            "devDependencies".to_string(),
            "dependencies".to_string(),
        ]);
        let deps = parser.parse(content).unwrap();
        let names: Vec<_> = deps.iter().map(|d| d.name.value.as_str()).collect();
        assert_eq!(names, vec!["express", "jest"]);
    }

    #[test]
    fn test_no_dependencies_section() {
        let content = r#"{"name": "empty", "version": "1.0.0"}"#;
        assert!(PackageJsonParser::new().parse(content).unwrap().is_empty());
    }

    #[test]
    fn test_non_object_section_is_skipped() {
        let content = r#"{"dependencies": "none"}"#;
        assert!(PackageJsonParser::new().parse(content).unwrap().is_empty());
    }

    #[test]
    fn test_non_string_version_uses_source_text() {
        let content = r#"{"dependencies": {"weird": 1}}"#;
        let deps = PackageJsonParser::new().parse(content).unwrap();
        assert_eq!(deps[0].version.value, "1");
        assert_eq!(deps[0].version.position, Position::new(1, 28));
    }

    #[test]
    fn test_blank_keys_are_skipped_and_names_trimmed() {
        let content = r#"{"dependencies": {"": "1.0.0", "  pad ": "2"}}"#;
        let deps = PackageJsonParser::new().parse(content).unwrap();

        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name.value, "pad");
        assert_eq!(deps[0].name.position, Position::new(1, 35));
        assert_eq!(deps[0].version.value, "2");
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let content = r#"{"dependencies": {"a": "1", "a": "2"}}"#;
        let result = PackageJsonParser::new().parse(content);
        assert!(matches!(result, Err(PackageJsonError::InvalidJson(_))));
    }

    #[test]
    fn test_invalid_json_fails() {
        let result = PackageJsonParser::new().parse(r#"{"dependencies": {"a": "1""#);
        assert!(matches!(result, Err(PackageJsonError::InvalidJson(_))));
    }

    #[test]
    fn test_top_level_array_fails() {
        let result = PackageJsonParser::new().parse(r#"[{"dependencies": {}}]"#);
        assert!(matches!(result, Err(PackageJsonError::NotAnObject)));
    }
}

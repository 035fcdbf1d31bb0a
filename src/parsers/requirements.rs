//! Parser for pip requirements files (requirements.txt)
//!
//! This is a line-oriented heuristic, not a PEP 508 grammar: each line is
//! cut at the first `#` and split on runs of `=`, `,`, `<` and `>`.

use super::{Dependency, Parser, Position, PositionedValue};
use crate::utils::char_index;

/// Parser for pip-style requirements files
#[derive(Debug, Default)]
pub struct RequirementsParser;

impl RequirementsParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for RequirementsParser {
    fn parse(&self, content: &str) -> Vec<Dependency> {
        let mut dependencies = Vec::new();

        for (line_idx, line) in content.split('\n').enumerate() {
            let stripped = strip_comment(line);
            let (name, version) = split_specifier(stripped);
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let version = version.trim();

            // An empty version is "found" at index 0, so its column is 1
            let column = stripped
                .find(version)
                .map_or(0, |idx| char_index(stripped, idx) + 1);

            dependencies.push(Dependency::new(
                // Name positions are not tracked for requirements files
                PositionedValue::new(name, Position::UNTRACKED),
                PositionedValue::new(version, Position::new(line_idx as u32 + 1, column)),
            ));
        }

        dependencies
    }
}

/// Drop everything from the first `#` on
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Split a requirement line into its name and first version segment.
///
/// Any run of `=`, `,`, `<`, `>` separates segments, so `a>=1.0,<2.0`
/// yields `("a", "1.0")` and the upper bound is lost. Operators such as
/// `~=` or `!=` are not recognised and their leading character stays on
/// the name. Neither segment is trimmed.
pub fn split_specifier(line: &str) -> (&str, &str) {
    let is_separator = |c: char| matches!(c, '=' | ',' | '<' | '>');

    let Some(first_sep) = line.find(is_separator) else {
        return (line, "");
    };

    let name = &line[..first_sep];
    let rest = line[first_sep..].trim_start_matches(is_separator);
    let version = match rest.find(is_separator) {
        Some(end) => &rest[..end],
        None => rest,
    };

    (name, version)
}

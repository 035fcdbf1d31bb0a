//! Parser for Go module files (go.mod)
//!
//! Parsing happens in two steps. The module file itself is scanned line by
//! line for anything carrying a semantic version, which yields every direct
//! and indirect module. Those modules are then reconciled against the import
//! paths the code actually uses, so that a package living inside a required
//! module is reported as `importPath@module`.

use std::sync::LazyLock;

use regex::Regex;

use super::{Dependency, Position, PositionedValue};
use crate::utils::char_index;

/// `MAJOR.MINOR.PATCH[-pre][+build]`, optionally prefixed with `v`, delimited
/// by the start/end of the line or whitespace. Only the part after the `v`
/// is captured.
static SEMVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(?:^|\s)v?(",
        r"(?:0|[1-9][0-9]*)\.(?:0|[1-9][0-9]*)\.(?:0|[1-9][0-9]*)",
        r"(?:-(?:0|[1-9][0-9]*|[0-9a-z-]*[a-z-][0-9a-z-]*)",
        r"(?:\.(?:0|[1-9][0-9]*|[0-9a-z-]*[a-z-][0-9a-z-]*))*)?",
        r"(?:\+[0-9a-z-]+(?:\.[0-9a-z-]+)*)?",
        r")(?:$|\s)"
    ))
    .expect("semantic version pattern must compile")
});

/// A version-shaped substring found on a go.mod line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionMatch<'a> {
    /// Byte offset of the first digit (after any `v`)
    pub start: usize,
    /// The version without its `v` prefix
    pub version: &'a str,
}

/// Find the first semantic version on a line.
///
/// This is a scan, not a go.mod grammar: any directive with a version
/// qualifies, including `go 1.21.0` and `exclude` lines.
pub fn find_version(line: &str) -> Option<VersionMatch<'_>> {
    let found = SEMVER.captures(line)?.get(1)?;
    Some(VersionMatch {
        start: found.start(),
        version: found.as_str(),
    })
}

/// Parser for Go go.mod dependency files
#[derive(Debug, Default)]
pub struct GoModParser;

impl GoModParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the module file and reconcile it with the given import paths.
    ///
    /// Direct module entries come first in file order, followed by one
    /// synthesized entry per import that lives inside a required module.
    pub fn parse(&self, content: &str, imports: &[String]) -> Vec<Dependency> {
        let mut dependencies = self.parse_modules(content);
        let packages = reconcile_imports(&dependencies, imports);
        dependencies.extend(packages);
        dependencies
    }

    /// Collect every module declared with a version in the file
    pub fn parse_modules(&self, content: &str) -> Vec<Dependency> {
        let mut dependencies = Vec::with_capacity(32);

        for (line_idx, line) in content.split('\n').enumerate() {
            // replace directives
            if line.contains("=>") {
                continue;
            }

            let line = strip_line_comment(line);
            let Some(found) = find_version(line) else {
                continue;
            };

            let cleaned = line
                .replacen("require", "", 1)
                .replacen('(', "", 1)
                .replacen(')', "", 1);
            let Some(module_path) = cleaned.split_whitespace().next() else {
                continue;
            };

            dependencies.push(Dependency::new(
                PositionedValue::new(module_path, Position::UNTRACKED),
                PositionedValue::new(
                    format!("v{}", found.version),
                    Position::new(line_idx as u32 + 1, char_index(line, found.start)),
                ),
            ));
        }

        dependencies
    }
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Map import paths onto the modules that provide them.
///
/// An import naming a module exactly is already covered. Otherwise the
/// longest module path that is a `/`-delimited prefix of the import is
/// chosen, a later module winning over an earlier one of the same length,
/// and an `import@module` entry carrying that module's version and
/// positions is produced. Imports outside every module (the standard
/// library, the main module) produce nothing.
pub fn reconcile_imports(modules: &[Dependency], imports: &[String]) -> Vec<Dependency> {
    let mut packages = Vec::new();

    for import in imports {
        if modules.iter().any(|m| m.name.value == *import) {
            continue;
        }

        let mut best: Option<&Dependency> = None;
        for module in modules {
            let name = module.name.value.as_str();
            let is_prefix = import
                .strip_prefix(name)
                .is_some_and(|rest| rest.starts_with('/'));
            if is_prefix && best.is_none_or(|b| name.len() >= b.name.value.len()) {
                best = Some(module);
            }
        }

        if let Some(module) = best {
            packages.push(Dependency::new(
                PositionedValue::new(
                    format!("{import}@{}", module.name.value),
                    module.name.position,
                ),
                module.version.clone(),
            ));
        }
    }

    packages
}

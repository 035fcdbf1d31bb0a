//! Parsers for dependency manifests (requirements.txt, go.mod, pom.xml, package.json)

use serde::{Deserialize, Serialize};

/// A line/column location in the manifest text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Sentinel for positions the parser does not track
    pub const UNTRACKED: Position = Position { line: 0, column: 0 };

    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A string value together with where it was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionedValue {
    pub value: String,
    pub position: Position,
}

impl PositionedValue {
    pub fn new(value: impl Into<String>, position: Position) -> Self {
        Self {
            value: value.into(),
            position,
        }
    }
}

/// Represents a dependency extracted from a manifest file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name (bare name, `group:artifact` or `importPath@module`)
    pub name: PositionedValue,
    /// Declared or inferred version, possibly empty
    pub version: PositionedValue,
}

impl Dependency {
    pub fn new(name: PositionedValue, version: PositionedValue) -> Self {
        Self { name, version }
    }
}

/// Trait for manifest parsers that tolerate malformed input
pub trait Parser: Send + Sync {
    /// Parse the given file content and extract dependencies
    fn parse(&self, content: &str) -> Vec<Dependency>;
}

pub mod gomod;
pub mod package_json;
pub mod pom;
pub mod requirements;

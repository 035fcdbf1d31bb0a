//! Configuration for manifest collection

use serde::Deserialize;

use crate::parsers::package_json::DEFAULT_SECTION;

/// Default Go toolchain executable
const DEFAULT_GO_EXECUTABLE: &str = "go";

/// Collector configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Go toolchain configuration
    pub go: GoConfig,
    /// package.json configuration
    pub npm: NpmConfig,
}

/// Go toolchain configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoConfig {
    /// Executable used to list imports (and named in error messages)
    pub executable: String,
}

impl Default for GoConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_GO_EXECUTABLE.to_string(),
        }
    }
}

/// package.json configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NpmConfig {
    /// Top-level sections whose entries are reported
    pub sections: Vec<String>,
}

impl Default for NpmConfig {
    fn default() -> Self {
        Self {
            sections: vec![DEFAULT_SECTION.to_string()],
        }
    }
}

impl Config {
    /// Parse configuration from initialization options
    pub fn from_init_options(options: Option<serde_json::Value>) -> Self {
        match options {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid configuration: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

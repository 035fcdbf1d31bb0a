//! Collectors: one async entry point per manifest kind
//!
//! A collector wraps a parser behind the [`DependencyCollector`] trait so
//! callers can pick one by [`ManifestKind`] and treat all formats alike.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::file_types::ManifestKind;
use crate::parsers::package_json::{PackageJsonError, PackageJsonParser};
use crate::parsers::pom::PomParser;
use crate::parsers::requirements::RequirementsParser;
use crate::parsers::{Dependency, Parser};

pub mod gomod;

pub use gomod::{GoListCommand, GoModCollector, ImportLister, KnownImports};

/// Reasons a collection can fail
#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    PackageJson(#[from] PackageJsonError),

    #[error("Unable to locate '{executable}'")]
    GoToolNotFound { executable: String },

    #[error(
        "Unable to execute '{executable} list' command, run '{executable} mod tidy' to know more"
    )]
    GoListFailed {
        executable: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("invalid manifest location '{0}'")]
    InvalidManifestUri(String),

    #[error("manifest directory '{}' is not accessible", .0.display())]
    ManifestDirectory(PathBuf),
}

/// Extracts positioned dependencies from a manifest's text
#[async_trait]
pub trait DependencyCollector: Send + Sync {
    /// The manifest kind this collector understands
    fn kind(&self) -> ManifestKind;

    /// Collect all dependencies declared in `contents`
    async fn collect(&self, contents: &str) -> Result<Vec<Dependency>, CollectError>;
}

/// Collector for requirements.txt
#[derive(Debug, Default)]
pub struct RequirementsCollector {
    parser: RequirementsParser,
}

impl RequirementsCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DependencyCollector for RequirementsCollector {
    fn kind(&self) -> ManifestKind {
        ManifestKind::Requirements
    }

    async fn collect(&self, contents: &str) -> Result<Vec<Dependency>, CollectError> {
        let dependencies = self.parser.parse(contents);
        tracing::debug!("Collected {} requirements", dependencies.len());
        Ok(dependencies)
    }
}

/// Collector for pom.xml; never fails
#[derive(Debug, Default)]
pub struct PomCollector {
    parser: PomParser,
}

impl PomCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DependencyCollector for PomCollector {
    fn kind(&self) -> ManifestKind {
        ManifestKind::Pom
    }

    async fn collect(&self, contents: &str) -> Result<Vec<Dependency>, CollectError> {
        let dependencies = self.parser.parse(contents);
        tracing::debug!("Collected {} Maven dependencies", dependencies.len());
        Ok(dependencies)
    }
}

/// Collector for package.json; fails on invalid JSON
#[derive(Debug, Default)]
pub struct PackageJsonCollector {
    parser: PackageJsonParser,
}

impl PackageJsonCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report only the given top-level sections
    pub fn with_sections(sections: Vec<String>) -> Self {
        Self {
            parser: PackageJsonParser::with_sections(sections),
        }
    }
}

#[async_trait]
impl DependencyCollector for PackageJsonCollector {
    fn kind(&self) -> ManifestKind {
        ManifestKind::PackageJson
    }

    async fn collect(&self, contents: &str) -> Result<Vec<Dependency>, CollectError> {
        let dependencies = self.parser.parse(contents)?;
        tracing::debug!(
            "Collected {} npm dependencies from {:?}",
            dependencies.len(),
            self.parser.sections()
        );
        Ok(dependencies)
    }
}

/// Build the collector for a manifest.
///
/// `manifest` is the manifest's `file://` URI or path; only the Go
/// collector uses it, to find the directory the toolchain runs in.
pub fn collector_for(
    kind: ManifestKind,
    manifest: &str,
    config: &Config,
) -> Result<Box<dyn DependencyCollector>, CollectError> {
    let collector: Box<dyn DependencyCollector> = match kind {
        ManifestKind::Requirements => Box::new(RequirementsCollector::new()),
        ManifestKind::GoMod => Box::new(GoModCollector::from_manifest(
            manifest,
            GoListCommand::new(&config.go.executable),
        )?),
        ManifestKind::Pom => Box::new(PomCollector::new()),
        ManifestKind::PackageJson => Box::new(PackageJsonCollector::with_sections(
            config.npm.sections.clone(),
        )),
    };
    Ok(collector)
}

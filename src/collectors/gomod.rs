//! go.mod collection and Go toolchain import listing

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use url::Url;

use super::{CollectError, DependencyCollector};
use crate::file_types::ManifestKind;
use crate::parsers::Dependency;
use crate::parsers::gomod::GoModParser;

/// `go list` template printing one import path per line
const IMPORTS_TEMPLATE: &str = r#"{{join .Imports "\n"}}"#;

/// Exit status a shell reports for a missing command
const COMMAND_NOT_FOUND: i32 = 127;

/// Lists the import paths used by the Go code in a directory
#[async_trait]
pub trait ImportLister: Send + Sync {
    async fn list_imports(&self, dir: &Path) -> Result<Vec<String>, CollectError>;
}

/// Runs `<go> list` in the module directory
#[derive(Debug, Clone)]
pub struct GoListCommand {
    executable: String,
}

impl GoListCommand {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    fn failed(&self, status: Option<i32>, stderr: String) -> CollectError {
        tracing::warn!(
            "'{} list' failed (status {:?}): {}",
            self.executable,
            status,
            stderr
        );
        CollectError::GoListFailed {
            executable: self.executable.clone(),
            status,
            stderr,
        }
    }
}

impl Default for GoListCommand {
    fn default() -> Self {
        Self::new("go")
    }
}

#[async_trait]
impl ImportLister for GoListCommand {
    async fn list_imports(&self, dir: &Path) -> Result<Vec<String>, CollectError> {
        // A missing directory would otherwise look like a missing executable
        if !tokio::fs::metadata(dir).await.is_ok_and(|m| m.is_dir()) {
            return Err(CollectError::ManifestDirectory(dir.to_path_buf()));
        }

        tracing::debug!("Running '{} list' in {}", self.executable, dir.display());
        let output = Command::new(&self.executable)
            .args(["list", "-f", IMPORTS_TEMPLATE, "./..."])
            .current_dir(dir)
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Go executable '{}' not found", self.executable);
                return Err(CollectError::GoToolNotFound {
                    executable: self.executable.clone(),
                });
            }
            Err(e) => return Err(self.failed(None, e.to_string())),
        };

        if !output.status.success() {
            let status = output.status.code();
            if status == Some(COMMAND_NOT_FOUND) {
                return Err(CollectError::GoToolNotFound {
                    executable: self.executable.clone(),
                });
            }
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(self.failed(status, stderr));
        }

        Ok(parse_import_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// An import set known up front, for callers that already have one
#[derive(Debug, Clone, Default)]
pub struct KnownImports(pub Vec<String>);

#[async_trait]
impl ImportLister for KnownImports {
    async fn list_imports(&self, _dir: &Path) -> Result<Vec<String>, CollectError> {
        Ok(self.0.clone())
    }
}

/// Split `go list` output into distinct import paths, first occurrence first
pub fn parse_import_list(stdout: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

/// Resolve the directory holding a go.mod from its URI or path
pub fn manifest_dir(manifest: &str) -> Result<PathBuf, CollectError> {
    let invalid = || CollectError::InvalidManifestUri(manifest.to_string());

    let path = if manifest.starts_with("file:") {
        Url::parse(manifest)
            .ok()
            .and_then(|uri| uri.to_file_path().ok())
            .ok_or_else(invalid)?
    } else if manifest.is_empty() {
        return Err(invalid());
    } else {
        PathBuf::from(manifest)
    };

    if path.file_name().is_some_and(|name| name == "go.mod") {
        let parent = path.parent().unwrap_or(Path::new("."));
        if parent.as_os_str().is_empty() {
            return Ok(PathBuf::from("."));
        }
        return Ok(parent.to_path_buf());
    }
    Ok(path)
}

/// Collector for go.mod; lists imports before parsing
#[derive(Debug)]
pub struct GoModCollector<L = GoListCommand> {
    working_dir: PathBuf,
    lister: L,
    parser: GoModParser,
}

impl<L: ImportLister> GoModCollector<L> {
    pub fn new(working_dir: impl Into<PathBuf>, lister: L) -> Self {
        Self {
            working_dir: working_dir.into(),
            lister,
            parser: GoModParser::new(),
        }
    }

    /// Build from the go.mod URI (`file:///.../go.mod`) or path
    pub fn from_manifest(manifest: &str, lister: L) -> Result<Self, CollectError> {
        Ok(Self::new(manifest_dir(manifest)?, lister))
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

#[async_trait]
impl<L: ImportLister> DependencyCollector for GoModCollector<L> {
    fn kind(&self) -> ManifestKind {
        ManifestKind::GoMod
    }

    async fn collect(&self, contents: &str) -> Result<Vec<Dependency>, CollectError> {
        let imports = self.lister.list_imports(&self.working_dir).await?;
        let dependencies = self.parser.parse(contents, &imports);
        tracing::debug!(
            "Collected {} Go dependencies ({} imports)",
            dependencies.len(),
            imports.len()
        );
        Ok(dependencies)
    }
}

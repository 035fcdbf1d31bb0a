//! Manifest kind detection
//!
//! Maps a manifest's file name to the collector that understands it.

use std::path::Path;

use url::Url;

/// Supported manifest kinds.
///
/// Each variant selects one parser/collector pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// pip requirements files (requirements.txt, requirements-dev.txt, ...)
    Requirements,
    /// Go modules (go.mod)
    GoMod,
    /// Maven projects (pom.xml)
    Pom,
    /// npm packages (package.json)
    PackageJson,
}

impl ManifestKind {
    /// Detect the manifest kind from a document URI.
    pub fn detect(uri: &Url) -> Option<Self> {
        let path = uri.path();
        let filename = path.rsplit('/').next().unwrap_or(path);
        Self::from_file_name(filename)
    }

    /// Detect the manifest kind from a file system path.
    pub fn detect_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(Self::from_file_name)
    }

    fn from_file_name(filename: &str) -> Option<Self> {
        if filename.ends_with(".txt") && filename.contains("requirements") {
            Some(ManifestKind::Requirements)
        } else if filename == "go.mod" {
            Some(ManifestKind::GoMod)
        } else if filename == "pom.xml" {
            Some(ManifestKind::Pom)
        } else if filename == "package.json" {
            Some(ManifestKind::PackageJson)
        } else {
            None
        }
    }

    /// Stable lowercase label for logs and reports
    pub fn as_str(self) -> &'static str {
        match self {
            ManifestKind::Requirements => "requirements",
            ManifestKind::GoMod => "gomod",
            ManifestKind::Pom => "pom",
            ManifestKind::PackageJson => "package-json",
        }
    }
}

impl std::fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

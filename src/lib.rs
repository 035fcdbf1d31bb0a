//! Manifest Collector - positioned dependency extraction
//!
//! This crate extracts the dependencies declared in project manifests
//! (requirements.txt, go.mod, pom.xml, package.json) together with the
//! line and column of each name and version, so that diagnostics can be
//! placed on the exact line that declared a package.

pub mod collectors;
pub mod config;
pub mod file_types;
pub mod parsers;
pub mod reports;
pub mod utils;

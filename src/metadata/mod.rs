//! package.json discovery and parsing.
//!
//! The nearest manifest is found by walking up from a start directory; the
//! directory that holds it becomes the project root for the whole run.

use crate::error::{ManifestError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Manifest file name
pub const MANIFEST_FILE: &str = "package.json";

/// Package metadata extracted from package.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Package name
    #[serde(default)]
    pub name: String,

    /// Package version (e.g., "0.1.0")
    pub version: String,

    /// Private packages are never published
    #[serde(default)]
    pub private: bool,

    /// Every other field, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A parsed manifest and where it was found
#[derive(Debug, Clone)]
pub struct PackageManifest {
    /// Full path to package.json
    pub path: PathBuf,
    /// Directory containing package.json
    pub root: PathBuf,
    /// Parsed contents
    pub package: PackageDescriptor,
}

/// Find the nearest package.json at or above `start`
pub fn find_manifest(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_FILE))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            ManifestError::NotFound {
                start: start.to_path_buf(),
            }
            .into()
        })
}

/// Read and parse a package.json file
pub async fn read_manifest(path: &Path) -> Result<PackageDescriptor> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_manifest(path, &content)
}

/// Parse package.json content; `path` is only used for error messages
pub fn parse_manifest(path: &Path, content: &str) -> Result<PackageDescriptor> {
    serde_json::from_str(content).map_err(|e| {
        ManifestError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Locate and read the nearest manifest
pub async fn load_nearest(start: &Path) -> Result<PackageManifest> {
    let path = find_manifest(start)?;
    let package = read_manifest(&path).await?;
    let root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| start.to_path_buf());

    log::debug!("Using manifest {} ({} {})", path.display(), package.name, package.version);

    Ok(PackageManifest {
        path,
        root,
        package,
    })
}

//! License file resolution
//!
//! Extracts the archived snapshot of every known provenance of a resolved
//! component, locates the root license files applicable to the component's
//! directory and pairs each with the license information found in exactly
//! that file.

use super::resolved::ResolvedLicenseInfo;
use crate::matching::PathLicenseMatcher;
use crate::model::{Identifier, Provenance};
use crate::provider::FileArchiver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use walkdir::WalkDir;

/// A license file inside an extracted snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLicenseFile {
    pub provenance: Provenance,
    /// Forward-slash path relative to the snapshot root
    pub path: String,
    /// The extracted file on disk
    pub file: PathBuf,
    /// License information evidenced in exactly this file
    pub licenses: ResolvedLicenseInfo,
}

/// All license files of one component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLicenseFileInfo {
    pub id: Identifier,
    pub files: Vec<ResolvedLicenseFile>,
    /// Keeps the extracted snapshots alive as long as the files are reachable
    #[serde(skip)]
    scopes: Vec<Arc<ExtractionScope>>,
}

impl ResolvedLicenseFileInfo {
    pub fn empty(id: Identifier) -> Self {
        Self {
            id,
            files: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// An exclusively owned temporary directory for one extraction.
///
/// Every entry discovered below the directory is recorded in discovery
/// order. On drop the entries are removed in reverse order, children before
/// their parents, and finally the directory itself.
#[derive(Debug)]
pub struct ExtractionScope {
    dir: Option<TempDir>,
    entries: Vec<(PathBuf, bool)>,
}

impl ExtractionScope {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("license-files-").tempdir()?;
        Ok(Self {
            dir: Some(dir),
            entries: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir
            .as_ref()
            .map(TempDir::path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// Record every extracted entry and return the forward-slash relative
    /// paths of the regular files
    pub fn enumerate_files(&mut self) -> BTreeSet<String> {
        let root = self.path().to_path_buf();
        let mut files = BTreeSet::new();

        for entry in WalkDir::new(&root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry below {}: {}", root.display(), e);
                    None
                }
            })
        {
            let is_dir = entry.file_type().is_dir();
            if entry.file_type().is_file() {
                if let Ok(relative) = entry.path().strip_prefix(&root) {
                    files.insert(to_forward_slashes(relative));
                }
            }
            self.entries.push((entry.into_path(), is_dir));
        }

        files
    }
}

impl Drop for ExtractionScope {
    fn drop(&mut self) {
        for (path, is_dir) in self.entries.drain(..).rev() {
            let result = if is_dir {
                std::fs::remove_dir(&path)
            } else {
                std::fs::remove_file(&path)
            };
            if let Err(e) = result {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!("Failed to remove {}: {}", path.display(), e);
                }
            }
        }
        if let Some(dir) = self.dir.take() {
            let path = dir.path().display().to_string();
            if let Err(e) = dir.close() {
                tracing::warn!("Failed to remove extraction directory {}: {}", path, e);
            }
        }
    }
}

fn to_forward_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve the license files of a resolved component.
///
/// Provenances that cannot be extracted are skipped; this never fails.
pub fn resolve_license_files(
    info: &ResolvedLicenseInfo,
    archiver: &dyn FileArchiver,
    matcher: &PathLicenseMatcher,
) -> ResolvedLicenseFileInfo {
    let provenances: BTreeSet<&Provenance> = info
        .licenses
        .iter()
        .flat_map(|license| license.locations.iter())
        .map(|location| &location.provenance)
        .filter(|provenance| provenance.is_known())
        .collect();

    let mut result = ResolvedLicenseFileInfo::empty(info.id.clone());

    for provenance in provenances {
        let mut scope = match ExtractionScope::new() {
            Ok(scope) => scope,
            Err(e) => {
                tracing::warn!("Cannot create extraction directory for {}: {}", info.id, e);
                continue;
            }
        };

        if !archiver.unarchive(scope.path(), provenance) {
            tracing::warn!(
                "No archive for {:?} of {}, skipping its license files",
                provenance,
                info.id
            );
            continue;
        }

        let directory = provenance.vcs_path().trim_matches('/').to_string();
        let relative_paths = scope.enumerate_files();
        let license_paths = matcher
            .applicable_license_files(
                relative_paths.iter().map(String::as_str),
                std::slice::from_ref(&directory),
            )
            .remove(&directory)
            .unwrap_or_default();

        tracing::debug!(
            "{}: {} license files in {} extracted files of {:?}",
            info.id,
            license_paths.len(),
            relative_paths.len(),
            provenance
        );

        for path in license_paths {
            result.files.push(ResolvedLicenseFile {
                provenance: provenance.clone(),
                file: scope.path().join(&path),
                licenses: info.filter(provenance, &path),
                path,
            });
        }
        result.scopes.push(Arc::new(scope));
    }

    result
}

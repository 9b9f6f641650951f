//! Source snapshot archives
//!
//! Snapshots are stored as `<root>/<sha256 of provenance key>/archive.tar.gz`
//! and extracted with the system `tar`.

use crate::model::Provenance;
use crate::{ResolverError, ResolverResult};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const ARCHIVE_FILE_NAME: &str = "archive.tar.gz";

/// Restores the stored source tree of a provenance
pub trait FileArchiver: Send + Sync {
    /// Extract the snapshot of `provenance` into `directory`.
    ///
    /// Returns false if there is no snapshot or extraction failed.
    fn unarchive(&self, directory: &Path, provenance: &Provenance) -> bool;
}

/// Archiver over a local directory of tarballs
#[derive(Debug, Clone)]
pub struct LocalFileArchiver {
    root: PathBuf,
}

impl LocalFileArchiver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where the snapshot of `provenance` is stored; `None` for unknown provenance
    pub fn archive_path(&self, provenance: &Provenance) -> Option<PathBuf> {
        let key = provenance.storage_key()?;
        let hash = hex::encode(Sha256::digest(key.as_bytes()));
        Some(self.root.join(hash).join(ARCHIVE_FILE_NAME))
    }

    /// Store `source_dir` as the snapshot of `provenance`
    pub fn archive(&self, source_dir: &Path, provenance: &Provenance) -> ResolverResult<PathBuf> {
        let archive = self.archive_path(provenance).ok_or_else(|| {
            ResolverError::Config("cannot archive a source tree of unknown provenance".into())
        })?;
        if let Some(parent) = archive.parent() {
            std::fs::create_dir_all(parent)?;
        }
        run_tar(&[
            "czf",
            &archive.to_string_lossy(),
            "-C",
            &source_dir.to_string_lossy(),
            ".",
        ])?;
        tracing::debug!("Archived {} to {}", source_dir.display(), archive.display());
        Ok(archive)
    }
}

impl FileArchiver for LocalFileArchiver {
    fn unarchive(&self, directory: &Path, provenance: &Provenance) -> bool {
        let Some(archive) = self.archive_path(provenance) else {
            return false;
        };
        if !archive.is_file() {
            tracing::debug!("No archive at {}", archive.display());
            return false;
        }

        match run_tar(&[
            "xzf",
            &archive.to_string_lossy(),
            "-C",
            &directory.to_string_lossy(),
        ]) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to extract {}: {}", archive.display(), e);
                false
            }
        }
    }
}

fn run_tar(args: &[&str]) -> ResolverResult<()> {
    let output = std::process::Command::new("tar").args(args).output()?;
    if output.status.success() {
        Ok(())
    } else {
        Err(ResolverError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("tar failed: {}", String::from_utf8_lossy(&output.stderr)),
        )))
    }
}

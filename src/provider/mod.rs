//! Capabilities the resolver consumes
//!
//! - [`LicenseInfoProvider`]: supplies the raw evidence bundle for a component
//! - [`FileArchiver`]: restores the stored source snapshot of a provenance

pub mod archive;

pub use archive::{FileArchiver, LocalFileArchiver};

use crate::model::{Identifier, LicenseInfo};
use crate::ResolverResult;
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

/// Supplies the raw evidence bundle for a component.
///
/// Implementations must be deterministic; the resolver asks at most once
/// per identifier.
pub trait LicenseInfoProvider: Send + Sync {
    fn get(&self, id: &Identifier) -> LicenseInfo;
}

/// Provider over a fixed set of bundles; unknown identifiers have no evidence
#[derive(Debug, Clone, Default)]
pub struct StaticLicenseInfoProvider {
    infos: HashMap<Identifier, LicenseInfo>,
}

impl StaticLicenseInfoProvider {
    pub fn new<I: IntoIterator<Item = LicenseInfo>>(infos: I) -> Self {
        Self {
            infos: infos.into_iter().map(|info| (info.id.clone(), info)).collect(),
        }
    }

    pub fn insert(&mut self, info: LicenseInfo) {
        self.infos.insert(info.id.clone(), info);
    }

    /// Load every `*.json` evidence bundle below `dir`
    pub fn from_dir(dir: &Path) -> ResolverResult<Self> {
        let mut provider = Self::default();
        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        {
            let info = LicenseInfo::from_file(entry.path())?;
            tracing::debug!("Loaded evidence for {} from {}", info.id, entry.path().display());
            provider.insert(info);
        }
        tracing::info!("Loaded {} evidence bundles from {}", provider.len(), dir.display());
        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

impl LicenseInfoProvider for StaticLicenseInfoProvider {
    fn get(&self, id: &Identifier) -> LicenseInfo {
        self.infos
            .get(id)
            .cloned()
            .unwrap_or_else(|| LicenseInfo::empty(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_id_yields_empty_bundle() {
        let provider = StaticLicenseInfoProvider::default();
        let id = Identifier::new("NPM", "", "missing", "0.0.1");
        assert_eq!(provider.get(&id), LicenseInfo::empty(id.clone()));
    }

    #[test]
    fn test_from_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{ "id": { "type": "NPM", "namespace": "", "name": "a", "version": "1" },
                 "concluded": { "concluded_license": "MIT" } }"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let provider = StaticLicenseInfoProvider::from_dir(dir.path()).unwrap();
        assert_eq!(provider.len(), 1);
        let info = provider.get(&Identifier::new("NPM", "", "a", "1"));
        assert!(info.concluded.concluded_license.is_some());
    }

    #[test]
    fn test_from_dir_rejects_malformed_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();
        assert!(StaticLicenseInfoProvider::from_dir(dir.path()).is_err());
    }
}

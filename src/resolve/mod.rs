//! Resolution: aggregation pipeline, resolved value types and the resolver cache
//!
//! [`LicenseInfoResolver`] memoizes both operations per [`Identifier`]. The
//! first caller for an identifier computes the result; concurrent callers for
//! the same identifier block until it is ready and share the same `Arc`.
//! Callers for other identifiers never wait on each other. A provider or
//! archiver that never returns therefore blocks every reader of that
//! identifier; there are no timeouts.

pub mod aggregation;
pub mod garbage;
pub mod license_files;
pub mod resolved;

pub use aggregation::{author_copyright_statement, Aggregator};
pub use garbage::CopyrightGarbage;
pub use license_files::{ExtractionScope, ResolvedLicenseFile, ResolvedLicenseFileInfo};
pub use resolved::{
    ResolvedCopyrightFinding, ResolvedLicense, ResolvedLicenseInfo, ResolvedLicenseLocation,
    ResolvedOriginalExpression,
};

use crate::config::ResolverConfig;
use crate::matching::{FindingsMatcher, PathLicenseMatcher};
use crate::model::{Identifier, LicenseInfo};
use crate::provider::{FileArchiver, LicenseInfoProvider};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use rayon::prelude::*;
use std::sync::Arc;

type Memo<T> = DashMap<Identifier, Arc<OnceCell<Arc<T>>>>;

/// Aggregate one evidence bundle without caching
pub fn aggregate(
    info: LicenseInfo,
    garbage: &CopyrightGarbage,
    matcher: &FindingsMatcher,
    add_authors_as_copyrights: bool,
) -> ResolvedLicenseInfo {
    Aggregator::new(garbage, matcher, add_authors_as_copyrights).aggregate(info)
}

pub struct LicenseInfoResolver {
    provider: Arc<dyn LicenseInfoProvider>,
    archiver: Option<Arc<dyn FileArchiver>>,
    garbage: CopyrightGarbage,
    findings_matcher: FindingsMatcher,
    path_license_matcher: PathLicenseMatcher,
    add_authors_as_copyrights: bool,
    license_infos: Memo<ResolvedLicenseInfo>,
    license_files: Memo<ResolvedLicenseFileInfo>,
}

impl LicenseInfoResolver {
    pub fn new(provider: Arc<dyn LicenseInfoProvider>, config: &ResolverConfig) -> Self {
        Self {
            provider,
            archiver: None,
            garbage: config.copyright_garbage(),
            findings_matcher: config.findings_matcher(),
            path_license_matcher: config.path_license_matcher(),
            add_authors_as_copyrights: config.add_authors_as_copyrights,
            license_infos: DashMap::new(),
            license_files: DashMap::new(),
        }
    }

    /// Enable license file resolution
    pub fn with_archiver(mut self, archiver: Arc<dyn FileArchiver>) -> Self {
        self.archiver = Some(archiver);
        self
    }

    /// Resolved licenses of `id`; computed once, shared afterwards
    pub fn resolve_license_info(&self, id: &Identifier) -> Arc<ResolvedLicenseInfo> {
        memoize(&self.license_infos, id, || {
            let info = self.provider.get(id);
            let resolved = aggregate(
                info,
                &self.garbage,
                &self.findings_matcher,
                self.add_authors_as_copyrights,
            );
            tracing::info!(
                "Resolved {}: {} licenses, {} copyright garbage groups",
                id,
                resolved.licenses.len(),
                resolved.copyright_garbage.len()
            );
            resolved
        })
    }

    /// Resolve many identifiers in parallel, preserving input order
    pub fn resolve_license_infos(&self, ids: &[Identifier]) -> Vec<Arc<ResolvedLicenseInfo>> {
        ids.par_iter()
            .map(|id| self.resolve_license_info(id))
            .collect()
    }

    /// License files of `id`, extracted from archived source trees.
    ///
    /// Empty without extraction if no archiver is configured.
    pub fn resolve_license_files(&self, id: &Identifier) -> Arc<ResolvedLicenseFileInfo> {
        memoize(&self.license_files, id, || {
            let Some(archiver) = &self.archiver else {
                tracing::debug!("No archiver configured, no license files for {}", id);
                return ResolvedLicenseFileInfo::empty(id.clone());
            };
            let info = self.resolve_license_info(id);
            let files = license_files::resolve_license_files(
                &info,
                archiver.as_ref(),
                &self.path_license_matcher,
            );
            tracing::info!("Resolved {} license files for {}", files.files.len(), id);
            files
        })
    }
}

fn memoize<T, F>(map: &Memo<T>, id: &Identifier, compute: F) -> Arc<T>
where
    F: FnOnce() -> T,
{
    // The shard lock is released before computing.
    let cell = map.entry(id.clone()).or_default().clone();
    cell.get_or_init(|| Arc::new(compute())).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticLicenseInfoProvider;
    use crate::SpdxExpression;

    fn component(license: &str) -> (Identifier, StaticLicenseInfoProvider) {
        let id = Identifier::new("Maven", "org.example", "lib", "1.0");
        let mut info = LicenseInfo::empty(id.clone());
        info.concluded.concluded_license = Some(license.parse().unwrap());
        (id, StaticLicenseInfoProvider::new([info]))
    }

    #[test]
    fn test_resolution_is_shared() {
        let (id, provider) = component("MIT OR Apache-2.0");
        let resolver = LicenseInfoResolver::new(Arc::new(provider), &ResolverConfig::default());

        let first = resolver.resolve_license_info(&id);
        let second = resolver.resolve_license_info(&id);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.get(&SpdxExpression::simple("MIT")).is_some());
    }

    #[test]
    fn test_no_archiver_no_files() {
        let (id, provider) = component("MIT");
        let resolver = LicenseInfoResolver::new(Arc::new(provider), &ResolverConfig::default());
        let files = resolver.resolve_license_files(&id);
        assert!(files.is_empty());
        assert_eq!(files.id, id);
    }

    #[test]
    fn test_bulk_resolution_keeps_order() {
        let (id, provider) = component("MIT");
        let other = Identifier::new("NPM", "", "other", "2.0");
        let resolver = LicenseInfoResolver::new(Arc::new(provider), &ResolverConfig::default());

        let resolved = resolver.resolve_license_infos(&[other.clone(), id.clone()]);
        assert_eq!(resolved[0].id, other);
        assert!(resolved[0].is_empty());
        assert_eq!(resolved[1].id, id);
    }
}

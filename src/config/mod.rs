//! Resolver configuration: `.license-resolver.toml`
//!
//! ```toml
//! add_authors_as_copyrights = true
//! copyright_garbage = ["Copyright (c) <year> <owner>"]
//!
//! [matcher]
//! tolerance_lines = 5
//!
//! [license_file_patterns]
//! license_filenames = ["license*", "copying*"]
//! ```

use crate::matching::{
    FileMatcher, FindingsMatcher, FindingsMatcherConfig, LicenseFilePatterns, PathLicenseMatcher,
};
use crate::resolve::CopyrightGarbage;
use crate::{ResolverError, ResolverResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = ".license-resolver.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Turn declared authors into copyright statements on concluded and declared licenses
    #[serde(default)]
    pub add_authors_as_copyrights: bool,

    /// Copyright statements removed from detected findings before matching
    #[serde(default)]
    pub copyright_garbage: BTreeSet<String>,

    #[serde(default)]
    pub matcher: FindingsMatcherConfig,

    #[serde(default)]
    pub license_file_patterns: LicenseFilePatterns,
}

impl ResolverConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> ResolverResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ResolverConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Try `.license-resolver.toml` in `root`, fall back to defaults
    pub fn from_project_root(root: &Path) -> Self {
        let path = root.join(CONFIG_FILE_NAME);
        if path.exists() {
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded resolver config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}, using defaults", path.display(), e);
                }
            }
        }
        Self::default()
    }

    pub fn validate(&self) -> ResolverResult<()> {
        if self.matcher.tolerance_lines < 0 {
            return Err(ResolverError::Config(format!(
                "matcher.tolerance_lines must not be negative, got {}",
                self.matcher.tolerance_lines
            )));
        }
        let patterns = &self.license_file_patterns;
        FileMatcher::try_new(&patterns.license_filenames, true)?;
        FileMatcher::try_new(&patterns.patent_filenames, true)?;
        FileMatcher::try_new(&patterns.other_license_filenames, true)?;
        Ok(())
    }

    pub fn copyright_garbage(&self) -> CopyrightGarbage {
        CopyrightGarbage::new(self.copyright_garbage.iter().cloned())
    }

    pub fn path_license_matcher(&self) -> PathLicenseMatcher {
        PathLicenseMatcher::new(&self.license_file_patterns)
    }

    pub fn findings_matcher(&self) -> FindingsMatcher {
        FindingsMatcher::new(self.matcher, self.path_license_matcher())
    }
}

//! Pairs license findings with the copyright findings that belong to them
//!
//! Copyrights are matched to licenses in the same file by line proximity.
//! Whatever is left over is attributed to the root license files governing
//! the copyright's directory; only copyrights without any applicable license
//! remain unmatched.

use super::PathLicenseMatcher;
use crate::model::{CopyrightFinding, LicenseFinding};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

fn default_tolerance_lines() -> i32 {
    5
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingsMatcherConfig {
    /// How many lines around a license finding a copyright may start
    #[serde(default = "default_tolerance_lines")]
    pub tolerance_lines: i32,
}

impl Default for FindingsMatcherConfig {
    fn default() -> Self {
        Self {
            tolerance_lines: default_tolerance_lines(),
        }
    }
}

/// Result of matching one provenance's findings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindingsMatcherResult {
    /// Every license finding, with the copyrights attributed to it
    pub matched_findings: BTreeMap<LicenseFinding, BTreeSet<CopyrightFinding>>,
    /// Copyrights that could not be attributed to any license
    pub unmatched_copyrights: BTreeSet<CopyrightFinding>,
}

#[derive(Debug, Clone, Default)]
pub struct FindingsMatcher {
    config: FindingsMatcherConfig,
    path_license_matcher: PathLicenseMatcher,
}

impl FindingsMatcher {
    pub fn new(config: FindingsMatcherConfig, path_license_matcher: PathLicenseMatcher) -> Self {
        Self {
            config,
            path_license_matcher,
        }
    }

    pub fn match_findings(
        &self,
        license_findings: &[LicenseFinding],
        copyright_findings: &[CopyrightFinding],
    ) -> FindingsMatcherResult {
        let mut licenses_by_path: BTreeMap<&str, Vec<&LicenseFinding>> = BTreeMap::new();
        for finding in license_findings {
            licenses_by_path
                .entry(finding.location.path.as_str())
                .or_default()
                .push(finding);
        }
        let mut copyrights_by_path: BTreeMap<&str, Vec<&CopyrightFinding>> = BTreeMap::new();
        for finding in copyright_findings {
            copyrights_by_path
                .entry(finding.location.path.as_str())
                .or_default()
                .push(finding);
        }

        let paths: BTreeSet<&str> = licenses_by_path
            .keys()
            .chain(copyrights_by_path.keys())
            .copied()
            .collect();

        let mut result = FindingsMatcherResult::default();
        for path in paths {
            let licenses = licenses_by_path.get(path).map(Vec::as_slice).unwrap_or(&[]);
            let copyrights = copyrights_by_path.get(path).map(Vec::as_slice).unwrap_or(&[]);
            self.match_file_findings(licenses, copyrights, &mut result);
        }

        self.match_root_licenses(license_findings, &mut result);

        tracing::debug!(
            "Matched {} license findings, {} copyrights unmatched",
            result.matched_findings.len(),
            result.unmatched_copyrights.len()
        );
        result
    }

    /// Match findings of a single file
    fn match_file_findings(
        &self,
        licenses: &[&LicenseFinding],
        copyrights: &[&CopyrightFinding],
        result: &mut FindingsMatcherResult,
    ) {
        if licenses.is_empty() {
            result
                .unmatched_copyrights
                .extend(copyrights.iter().map(|c| (*c).clone()));
            return;
        }

        // A single license owns every copyright of its file.
        if let [license] = licenses {
            result
                .matched_findings
                .entry((*license).clone())
                .or_default()
                .extend(copyrights.iter().map(|c| (*c).clone()));
            return;
        }

        let tolerance = self.config.tolerance_lines;
        let mut matched: BTreeSet<&CopyrightFinding> = BTreeSet::new();
        for license in licenses {
            let start = license.location.start_line.saturating_sub(tolerance);
            let end = license.location.end_line.saturating_add(tolerance);
            let nearby: Vec<&CopyrightFinding> = copyrights
                .iter()
                .copied()
                .filter(|c| (start..=end).contains(&c.location.start_line))
                .collect();
            matched.extend(nearby.iter().copied());
            result
                .matched_findings
                .entry((*license).clone())
                .or_default()
                .extend(nearby.into_iter().cloned());
        }

        result.unmatched_copyrights.extend(
            copyrights
                .iter()
                .filter(|c| !matched.contains(*c))
                .map(|c| (*c).clone()),
        );
    }

    /// Attribute unmatched copyrights to the root licenses of their directory
    fn match_root_licenses(
        &self,
        license_findings: &[LicenseFinding],
        result: &mut FindingsMatcherResult,
    ) {
        if result.unmatched_copyrights.is_empty() || license_findings.is_empty() {
            return;
        }

        let directories: Vec<String> = result
            .unmatched_copyrights
            .iter()
            .map(|c| c.location.directory().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let root_licenses = self
            .path_license_matcher
            .applicable_root_license_findings(license_findings, &directories);

        let unmatched = std::mem::take(&mut result.unmatched_copyrights);
        for copyright in unmatched {
            let licenses = root_licenses
                .get(copyright.location.directory())
                .filter(|licenses| !licenses.is_empty());
            match licenses {
                Some(licenses) => {
                    for license in licenses {
                        result
                            .matched_findings
                            .entry(license.clone())
                            .or_default()
                            .insert(copyright.clone());
                    }
                }
                None => {
                    result.unmatched_copyrights.insert(copyright);
                }
            }
        }
    }
}

//! License aggregation: merges one component's evidence into per-license results
//!
//! Concluded and declared expressions are decomposed directly. Detected
//! findings go through garbage filtering, curation, copyright matching and
//! path exclude annotation per provenance. Every atomic license accumulates
//! into a private builder that is frozen into a [`ResolvedLicense`] at the end.

use super::garbage::CopyrightGarbage;
use super::resolved::{
    ResolvedCopyrightFinding, ResolvedLicense, ResolvedLicenseInfo, ResolvedLicenseLocation,
    ResolvedOriginalExpression,
};
use crate::license::{LicenseSource, SpdxExpression};
use crate::matching::{FindingCurationMatcher, FindingsMatcher, LicenseFindingCurationResult};
use crate::model::curation::matching_excludes;
use crate::model::{CopyrightFinding, Findings, LicenseFinding, LicenseInfo, Provenance, TextLocation};
use std::collections::{BTreeMap, BTreeSet};

/// Accumulates evidence for one atomic license
#[derive(Debug, Default)]
struct ResolvedLicenseBuilder {
    original_declared_licenses: BTreeSet<String>,
    original_expressions: BTreeSet<ResolvedOriginalExpression>,
    locations: BTreeSet<ResolvedLicenseLocation>,
}

impl ResolvedLicenseBuilder {
    fn build(self, license: SpdxExpression) -> ResolvedLicense {
        ResolvedLicense {
            license,
            original_declared_licenses: self.original_declared_licenses,
            original_expressions: self.original_expressions,
            locations: self.locations,
        }
    }
}

/// Exclusion state of one detected (curated) expression across all its occurrences
#[derive(Debug)]
struct DetectedExpression {
    all_excluded: bool,
    licenses: BTreeSet<SpdxExpression>,
}

/// Stateless aggregation over a configured garbage list and findings matcher
pub struct Aggregator<'a> {
    garbage: &'a CopyrightGarbage,
    matcher: &'a FindingsMatcher,
    add_authors_as_copyrights: bool,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        garbage: &'a CopyrightGarbage,
        matcher: &'a FindingsMatcher,
        add_authors_as_copyrights: bool,
    ) -> Self {
        Self {
            garbage,
            matcher,
            add_authors_as_copyrights,
        }
    }

    pub fn aggregate(&self, info: LicenseInfo) -> ResolvedLicenseInfo {
        let mut builders: BTreeMap<SpdxExpression, ResolvedLicenseBuilder> = BTreeMap::new();

        let authors = &info.declared.authors;
        let author_location = (self.add_authors_as_copyrights && !authors.is_empty())
            .then(|| author_location(authors));

        if let Some(concluded) = &info.concluded.concluded_license {
            for license in concluded.decompose() {
                let builder = builders.entry(license).or_default();
                builder.original_expressions.insert(ResolvedOriginalExpression {
                    expression: concluded.clone(),
                    source: LicenseSource::Concluded,
                    is_detected_excluded: false,
                });
                builder.locations.extend(author_location.clone());
            }
        }

        let processed = &info.declared.processed;
        if let Some(declared) = &processed.spdx_expression {
            for license in declared.decompose() {
                let raw: Vec<String> = processed
                    .mapped
                    .iter()
                    .filter(|(_, mapped)| mapped.decompose().contains(&license))
                    .map(|(raw, _)| raw.clone())
                    .collect();
                let builder = builders.entry(license).or_default();
                builder.original_declared_licenses.extend(raw);
                builder.original_expressions.insert(ResolvedOriginalExpression {
                    expression: declared.clone(),
                    source: LicenseSource::Declared,
                    is_detected_excluded: false,
                });
                builder.locations.extend(author_location.clone());
            }
        }

        let mut copyright_garbage: BTreeMap<Provenance, BTreeSet<CopyrightFinding>> =
            BTreeMap::new();
        let mut unmatched_copyrights: BTreeMap<Provenance, BTreeSet<ResolvedCopyrightFinding>> =
            BTreeMap::new();
        let mut detected: BTreeMap<SpdxExpression, DetectedExpression> = BTreeMap::new();

        for findings in &info.detected.findings {
            let (copyrights, garbage) = self.garbage.partition(&findings.copyrights);
            if !garbage.is_empty() {
                copyright_garbage
                    .entry(findings.provenance.clone())
                    .or_default()
                    .extend(garbage);
            }

            let unmatched =
                self.resolve_detected(findings, &copyrights, &mut builders, &mut detected);
            unmatched_copyrights
                .entry(findings.provenance.clone())
                .or_default()
                .extend(unmatched);
        }

        for (expression, state) in detected {
            for license in state.licenses {
                builders
                    .entry(license)
                    .or_default()
                    .original_expressions
                    .insert(ResolvedOriginalExpression {
                        expression: expression.clone(),
                        source: LicenseSource::Detected,
                        is_detected_excluded: state.all_excluded,
                    });
            }
        }

        let licenses: Vec<ResolvedLicense> = builders
            .into_iter()
            .map(|(license, builder)| builder.build(license))
            .collect();

        tracing::debug!(
            "Aggregated {}: {} licenses from {} detected provenances",
            info.id,
            licenses.len(),
            info.detected.findings.len()
        );

        ResolvedLicenseInfo {
            id: info.id.clone(),
            license_info: info,
            licenses,
            copyright_garbage,
            unmatched_copyrights,
        }
    }

    /// Curate, match and annotate one provenance's findings.
    ///
    /// Returns the copyrights that could not be matched to any license.
    fn resolve_detected(
        &self,
        findings: &Findings,
        copyrights: &[CopyrightFinding],
        builders: &mut BTreeMap<SpdxExpression, ResolvedLicenseBuilder>,
        detected: &mut BTreeMap<SpdxExpression, DetectedExpression>,
    ) -> BTreeSet<ResolvedCopyrightFinding> {
        let base_path = findings.relative_findings_path.as_str();
        let curation_results = FindingCurationMatcher::apply_all(
            &findings.licenses,
            &findings.license_finding_curations,
            base_path,
        );

        // Suppressed findings drop out here; for identical curated findings
        // the first curation result is kept.
        let mut curated: BTreeMap<LicenseFinding, &LicenseFindingCurationResult> = BTreeMap::new();
        for result in &curation_results {
            if let Some(finding) = &result.curated_finding {
                curated.entry(finding.clone()).or_insert(result);
            }
        }
        let curated_findings: Vec<LicenseFinding> = curated.keys().cloned().collect();

        let match_result = self.matcher.match_findings(&curated_findings, copyrights);

        for (finding, matched_copyrights) in &match_result.matched_findings {
            let resolved_copyrights = resolve_copyrights(matched_copyrights, findings);
            let applied_curation = curated
                .get(finding)
                .and_then(|result| result.applied_curation())
                .cloned();
            let excludes = matching_excludes(
                &findings.path_excludes,
                &finding.location.prepended_path(base_path),
            );

            let state = detected
                .entry(finding.license.clone())
                .or_insert_with(|| DetectedExpression {
                    all_excluded: true,
                    licenses: BTreeSet::new(),
                });
            state.all_excluded &= !excludes.is_empty();

            for license in finding.license.decompose() {
                state.licenses.insert(license.clone());
                builders
                    .entry(license)
                    .or_default()
                    .locations
                    .insert(ResolvedLicenseLocation {
                        provenance: findings.provenance.clone(),
                        location: finding.location.clone(),
                        applied_curation: applied_curation.clone(),
                        matching_path_excludes: excludes.clone(),
                        copyrights: resolved_copyrights.clone(),
                    });
            }
        }

        tracing::debug!(
            "Provenance {:?}: {} license findings ({} curated away), {} copyrights unmatched",
            findings.provenance,
            findings.licenses.len(),
            curation_results.len() - curated_findings.len(),
            match_result.unmatched_copyrights.len()
        );

        resolve_copyrights(&match_result.unmatched_copyrights, findings)
    }
}

/// Annotate copyrights with the path excludes matching their location
fn resolve_copyrights<'c>(
    copyrights: impl IntoIterator<Item = &'c CopyrightFinding>,
    findings: &Findings,
) -> BTreeSet<ResolvedCopyrightFinding> {
    copyrights
        .into_iter()
        .map(|copyright| ResolvedCopyrightFinding {
            statement: copyright.statement.clone(),
            location: copyright.location.clone(),
            matching_path_excludes: matching_excludes(
                &findings.path_excludes,
                &copyright.location.prepended_path(&findings.relative_findings_path),
            ),
        })
        .collect()
}

/// The statement used for an author-derived copyright
pub fn author_copyright_statement(author: &str) -> String {
    if author.to_lowercase().contains("copyright") {
        author.to_string()
    } else {
        format!("Copyright (C) {}", author)
    }
}

/// Pseudo-location carrying one copyright per declared author
fn author_location(authors: &BTreeSet<String>) -> ResolvedLicenseLocation {
    ResolvedLicenseLocation {
        provenance: Provenance::Unknown,
        location: TextLocation::undefined(),
        applied_curation: None,
        matching_path_excludes: Vec::new(),
        copyrights: authors
            .iter()
            .map(|author| ResolvedCopyrightFinding {
                statement: author_copyright_statement(author),
                location: TextLocation::undefined(),
                matching_path_excludes: Vec::new(),
            })
            .collect(),
    }
}

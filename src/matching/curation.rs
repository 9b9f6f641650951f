//! Applies license finding curations to detected findings

use super::FileMatcher;
use crate::model::{LicenseFinding, LicenseFindingCuration};
use serde::{Deserialize, Serialize};

/// Outcome of curating one original finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseFindingCurationResult {
    /// The curated finding; `None` if a curation suppressed it
    pub curated_finding: Option<LicenseFinding>,
    /// Each curation that applied, in order, paired with the finding as it
    /// was right before that curation
    pub original_findings: Vec<(LicenseFinding, LicenseFindingCuration)>,
}

impl LicenseFindingCurationResult {
    /// The curation that produced the curated license, if any
    pub fn applied_curation(&self) -> Option<&LicenseFindingCuration> {
        self.original_findings.last().map(|(_, curation)| curation)
    }
}

/// Matches curations against findings and applies them
pub struct FindingCurationMatcher;

impl FindingCurationMatcher {
    /// Whether `curation` applies to `finding` located below `relative_findings_path`
    pub fn matches(
        finding: &LicenseFinding,
        curation: &LicenseFindingCuration,
        relative_findings_path: &str,
    ) -> bool {
        let location = &finding.location;
        let path = location.prepended_path(relative_findings_path);

        FileMatcher::matches(&curation.path, &path)
            && (curation.start_lines.is_empty()
                || curation.start_lines.contains(&location.start_line))
            && curation
                .line_count
                .map_or(true, |count| {
                    count == location.end_line.saturating_sub(location.start_line).saturating_add(1)
                })
            && curation
                .detected_license
                .as_ref()
                .map_or(true, |license| *license == finding.license)
    }

    /// Apply one curation; non-matching curations leave the finding unchanged
    pub fn apply(
        finding: &LicenseFinding,
        curation: &LicenseFindingCuration,
        relative_findings_path: &str,
    ) -> Option<LicenseFinding> {
        if !Self::matches(finding, curation, relative_findings_path) {
            return Some(finding.clone());
        }
        if curation.concluded_license.is_none() {
            return None;
        }
        Some(LicenseFinding {
            license: curation.concluded_license.clone(),
            ..finding.clone()
        })
    }

    /// Curate every finding, applying its matching curations in the order given.
    ///
    /// Each curation is matched against the finding as curated so far, so a
    /// rule constrained on the detected license no longer applies once an
    /// earlier rule changed it. A suppression ends the chain. Returns one
    /// result per input finding, in input order.
    pub fn apply_all(
        findings: &[LicenseFinding],
        curations: &[LicenseFindingCuration],
        relative_findings_path: &str,
    ) -> Vec<LicenseFindingCurationResult> {
        findings
            .iter()
            .map(|finding| {
                let mut current = Some(finding.clone());
                let mut applied = Vec::new();
                for curation in curations {
                    let Some(before) = current.take() else {
                        break;
                    };
                    if Self::matches(&before, curation, relative_findings_path) {
                        current = Self::apply(&before, curation, relative_findings_path);
                        applied.push((before, curation.clone()));
                    } else {
                        current = Some(before);
                    }
                }

                LicenseFindingCurationResult {
                    curated_finding: current,
                    original_findings: applied,
                }
            })
            .collect()
    }
}

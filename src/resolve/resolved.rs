//! Resolved license information: immutable output of resolution

use crate::license::{LicenseSource, SpdxExpression};
use crate::model::{
    CopyrightFinding, Identifier, LicenseFindingCuration, LicenseInfo, PathExclude, Provenance,
    TextLocation,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A copyright statement with the path excludes matching its location
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolvedCopyrightFinding {
    pub statement: String,
    pub location: TextLocation,
    pub matching_path_excludes: Vec<PathExclude>,
}

impl ResolvedCopyrightFinding {
    pub fn is_excluded(&self) -> bool {
        !self.matching_path_excludes.is_empty()
    }
}

/// One place where an atomic license was evidenced
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolvedLicenseLocation {
    pub provenance: Provenance,
    pub location: TextLocation,
    /// The curation that produced this location's license, if any
    pub applied_curation: Option<LicenseFindingCuration>,
    pub matching_path_excludes: Vec<PathExclude>,
    /// Copyrights attributed to this location
    pub copyrights: BTreeSet<ResolvedCopyrightFinding>,
}

impl ResolvedLicenseLocation {
    pub fn is_excluded(&self) -> bool {
        !self.matching_path_excludes.is_empty()
    }
}

/// An original (possibly compound) expression an atomic license came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolvedOriginalExpression {
    pub expression: SpdxExpression,
    pub source: LicenseSource,
    /// For detected expressions: every occurrence was path excluded
    pub is_detected_excluded: bool,
}

/// Everything known about one atomic license of a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLicense {
    pub license: SpdxExpression,
    /// Raw declared strings that were mapped onto this license
    pub original_declared_licenses: BTreeSet<String>,
    pub original_expressions: BTreeSet<ResolvedOriginalExpression>,
    pub locations: BTreeSet<ResolvedLicenseLocation>,
}

impl ResolvedLicense {
    /// The sources this license was found in
    pub fn sources(&self) -> BTreeSet<LicenseSource> {
        self.original_expressions.iter().map(|e| e.source).collect()
    }

    /// Detected at least once, and every detected expression is excluded
    pub fn is_detected_excluded(&self) -> bool {
        let mut detected = self
            .original_expressions
            .iter()
            .filter(|e| e.source == LicenseSource::Detected)
            .peekable();
        detected.peek().is_some() && detected.all(|e| e.is_detected_excluded)
    }

    /// Copyright statements of all locations
    pub fn copyrights(&self, omit_excluded: bool) -> BTreeSet<String> {
        self.locations
            .iter()
            .filter(|location| !(omit_excluded && location.is_excluded()))
            .flat_map(|location| location.copyrights.iter())
            .filter(|copyright| !(omit_excluded && copyright.is_excluded()))
            .map(|copyright| copyright.statement.clone())
            .collect()
    }
}

/// The resolved license view of one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLicenseInfo {
    pub id: Identifier,
    /// The raw evidence this was resolved from
    pub license_info: LicenseInfo,
    /// One entry per atomic license, ordered by license
    pub licenses: Vec<ResolvedLicense>,
    /// Copyright statements filtered as garbage, per provenance
    #[serde(with = "as_entries")]
    pub copyright_garbage: BTreeMap<Provenance, BTreeSet<CopyrightFinding>>,
    /// Copyrights not attributed to any license, per provenance
    #[serde(with = "as_entries")]
    pub unmatched_copyrights: BTreeMap<Provenance, BTreeSet<ResolvedCopyrightFinding>>,
}

impl ResolvedLicenseInfo {
    pub fn empty(license_info: LicenseInfo) -> Self {
        Self {
            id: license_info.id.clone(),
            license_info,
            licenses: Vec::new(),
            copyright_garbage: BTreeMap::new(),
            unmatched_copyrights: BTreeMap::new(),
        }
    }

    pub fn get(&self, license: &SpdxExpression) -> Option<&ResolvedLicense> {
        self.licenses.iter().find(|l| &l.license == license)
    }

    pub fn is_empty(&self) -> bool {
        self.licenses.is_empty()
    }

    /// Licenses with at least one original expression from `source`
    pub fn licenses_from(&self, source: LicenseSource) -> Vec<&ResolvedLicense> {
        self.licenses
            .iter()
            .filter(|l| l.sources().contains(&source))
            .collect()
    }

    /// Concluded licenses if there are any, declared ones otherwise
    pub fn main_license(&self) -> BTreeSet<SpdxExpression> {
        let concluded = self.licenses_from(LicenseSource::Concluded);
        let chosen = if concluded.is_empty() {
            self.licenses_from(LicenseSource::Declared)
        } else {
            concluded
        };
        chosen.into_iter().map(|l| l.license.clone()).collect()
    }

    /// All attributed and unmatched copyright statements
    pub fn copyright_statements(&self, omit_excluded: bool) -> BTreeSet<String> {
        let mut statements: BTreeSet<String> = self
            .licenses
            .iter()
            .flat_map(|l| l.copyrights(omit_excluded))
            .collect();
        statements.extend(
            self.unmatched_copyrights
                .values()
                .flatten()
                .filter(|c| !(omit_excluded && c.is_excluded()))
                .map(|c| c.statement.clone()),
        );
        statements
    }

    /// The subset evidenced at exactly `path` of `provenance`.
    ///
    /// Licenses without a remaining location are dropped; garbage and
    /// unmatched copyrights are narrowed to the same file.
    pub fn filter(&self, provenance: &Provenance, path: &str) -> ResolvedLicenseInfo {
        let at = |p: &Provenance, location: &TextLocation| p == provenance && location.path == path;

        let licenses = self
            .licenses
            .iter()
            .filter_map(|license| {
                let locations: BTreeSet<ResolvedLicenseLocation> = license
                    .locations
                    .iter()
                    .filter(|l| at(&l.provenance, &l.location))
                    .cloned()
                    .collect();
                (!locations.is_empty()).then(|| ResolvedLicense {
                    locations,
                    ..license.clone()
                })
            })
            .collect();

        let copyright_garbage = self
            .copyright_garbage
            .get(provenance)
            .map(|findings| {
                findings
                    .iter()
                    .filter(|c| c.location.path == path)
                    .cloned()
                    .collect::<BTreeSet<_>>()
            })
            .filter(|findings| !findings.is_empty())
            .map(|findings| BTreeMap::from([(provenance.clone(), findings)]))
            .unwrap_or_default();

        let unmatched_copyrights = self
            .unmatched_copyrights
            .get(provenance)
            .map(|findings| {
                findings
                    .iter()
                    .filter(|c| c.location.path == path)
                    .cloned()
                    .collect::<BTreeSet<_>>()
            })
            .filter(|findings| !findings.is_empty())
            .map(|findings| BTreeMap::from([(provenance.clone(), findings)]))
            .unwrap_or_default();

        ResolvedLicenseInfo {
            id: self.id.clone(),
            license_info: self.license_info.clone(),
            licenses,
            copyright_garbage,
            unmatched_copyrights,
        }
    }

    /// A reporting view without path-excluded evidence.
    ///
    /// Excluded locations and copyrights are removed, excluded detected
    /// expressions dropped, and licenses left without any original
    /// expression disappear. Nothing here decides whether a license is
    /// acceptable.
    pub fn filter_excluded(&self) -> ResolvedLicenseInfo {
        let licenses = self
            .licenses
            .iter()
            .filter_map(|license| {
                let original_expressions: BTreeSet<ResolvedOriginalExpression> = license
                    .original_expressions
                    .iter()
                    .filter(|e| !(e.source == LicenseSource::Detected && e.is_detected_excluded))
                    .cloned()
                    .collect();
                if original_expressions.is_empty() {
                    return None;
                }
                let locations = license
                    .locations
                    .iter()
                    .filter(|l| !l.is_excluded())
                    .map(|l| ResolvedLicenseLocation {
                        copyrights: l
                            .copyrights
                            .iter()
                            .filter(|c| !c.is_excluded())
                            .cloned()
                            .collect(),
                        ..l.clone()
                    })
                    .collect();
                Some(ResolvedLicense {
                    license: license.license.clone(),
                    original_declared_licenses: license.original_declared_licenses.clone(),
                    original_expressions,
                    locations,
                })
            })
            .collect();

        let unmatched_copyrights = self
            .unmatched_copyrights
            .iter()
            .map(|(provenance, findings)| {
                let kept = findings.iter().filter(|c| !c.is_excluded()).cloned().collect();
                (provenance.clone(), kept)
            })
            .collect();

        ResolvedLicenseInfo {
            id: self.id.clone(),
            license_info: self.license_info.clone(),
            licenses,
            copyright_garbage: self.copyright_garbage.clone(),
            unmatched_copyrights,
        }
    }
}

/// Serializes maps with non-string keys as a list of `[key, value]` pairs
mod as_entries {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let entries: Vec<(K, V)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

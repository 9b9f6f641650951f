//! The raw evidence bundle for one component

use super::{
    CopyrightFinding, Identifier, LicenseFinding, LicenseFindingCuration, PathExclude, Provenance,
};
use crate::license::SpdxExpression;
use crate::ResolverResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A license explicitly concluded by a reviewer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcludedLicenseInfo {
    #[serde(default)]
    pub concluded_license: Option<SpdxExpression>,
}

/// Declared licenses after mapping raw strings onto SPDX
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDeclaredLicense {
    /// Conjunction of all successfully mapped declared licenses
    #[serde(default)]
    pub spdx_expression: Option<SpdxExpression>,
    /// Raw declared string → expression it was mapped onto
    #[serde(default)]
    pub mapped: BTreeMap<String, SpdxExpression>,
    /// Raw declared strings that could not be mapped
    #[serde(default)]
    pub unmapped: BTreeSet<String>,
}

/// Licenses and authors from the component's packaging metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclaredLicenseInfo {
    #[serde(default)]
    pub authors: BTreeSet<String>,
    /// Raw declared license strings
    #[serde(default)]
    pub licenses: BTreeSet<String>,
    #[serde(default)]
    pub processed: ProcessedDeclaredLicense,
}

/// Scanner findings for one provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Findings {
    pub provenance: Provenance,
    #[serde(default)]
    pub licenses: Vec<LicenseFinding>,
    #[serde(default)]
    pub copyrights: Vec<CopyrightFinding>,
    #[serde(default)]
    pub license_finding_curations: Vec<LicenseFindingCuration>,
    #[serde(default)]
    pub path_excludes: Vec<PathExclude>,
    /// Offset of this tree inside the project, e.g. a submodule path
    #[serde(default)]
    pub relative_findings_path: String,
}

impl Findings {
    pub fn new(provenance: Provenance) -> Self {
        Self {
            provenance,
            licenses: Vec::new(),
            copyrights: Vec::new(),
            license_finding_curations: Vec::new(),
            path_excludes: Vec::new(),
            relative_findings_path: String::new(),
        }
    }
}

/// Detected evidence, one group per provenance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedLicenseInfo {
    #[serde(default)]
    pub findings: Vec<Findings>,
}

/// Everything known about one component's licensing before resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub id: Identifier,
    #[serde(default)]
    pub concluded: ConcludedLicenseInfo,
    #[serde(default)]
    pub declared: DeclaredLicenseInfo,
    #[serde(default)]
    pub detected: DetectedLicenseInfo,
}

impl LicenseInfo {
    /// A bundle with no evidence at all
    pub fn empty(id: Identifier) -> Self {
        Self {
            id,
            concluded: ConcludedLicenseInfo::default(),
            declared: DeclaredLicenseInfo::default(),
            detected: DetectedLicenseInfo::default(),
        }
    }

    pub fn from_json(json: &str) -> ResolverResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> ResolverResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

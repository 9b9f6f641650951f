//! Evidence model
//!
//! Value types describing what is known about a component before resolution:
//! who it is ([`Identifier`]), where evidence came from ([`Provenance`]),
//! where in a tree it was found ([`TextLocation`]) and the raw findings,
//! curations and path excludes attached to it.

pub mod curation;
pub mod file_list;
pub mod finding;
pub mod license_info;
pub mod provenance;

pub use curation::{
    matching_excludes, LicenseFindingCuration, LicenseFindingCurationReason, PathExclude,
    PathExcludeReason,
};
pub use file_list::{merge_sub_repository_files, FileList};
pub use finding::{CopyrightFinding, LicenseFinding, TextLocation, UNKNOWN_LINE};
pub use license_info::{
    ConcludedLicenseInfo, DeclaredLicenseInfo, DetectedLicenseInfo, Findings, LicenseInfo,
    ProcessedDeclaredLicense,
};
pub use provenance::{
    ArtifactProvenance, Provenance, RemoteArtifact, RepositoryProvenance, VcsInfo,
};

use crate::ResolverError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Identifier ────────────────────────────────────────────────────

/// Names one software component (package or project)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    /// Package manager or project type (e.g. "Maven", "NPM", "Cargo")
    #[serde(rename = "type")]
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub version: String,
}

impl Identifier {
    pub fn new(
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.kind, self.namespace, self.name, self.version
        )
    }
}

impl FromStr for Identifier {
    type Err = ResolverError;

    /// Parse the `type:namespace:name:version` form. The version keeps any
    /// further colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(4, ':').collect();
        match parts.as_slice() {
            [kind, namespace, name, version] => Ok(Self::new(*kind, *namespace, *name, *version)),
            _ => Err(ResolverError::Identifier(format!(
                "'{}' must have the form type:namespace:name:version",
                s
            ))),
        }
    }
}

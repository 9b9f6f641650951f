//! Provenance: where a piece of evidence came from

use serde::{Deserialize, Serialize};

/// Version control coordinates of a source tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VcsInfo {
    #[serde(rename = "type")]
    pub vcs_type: String,
    pub url: String,
    pub revision: String,
    /// Sub-path inside the repository the component lives in ("" for the root)
    #[serde(default)]
    pub path: String,
}

/// A downloadable source artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RemoteArtifact {
    pub url: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepositoryProvenance {
    pub vcs_info: VcsInfo,
    pub resolved_revision: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactProvenance {
    pub source_artifact: RemoteArtifact,
}

/// Origin of evidence: a repository checkout, a source artifact, or unknown
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    Repository(RepositoryProvenance),
    Artifact(ArtifactProvenance),
    Unknown,
}

impl Provenance {
    pub fn repository(vcs_info: VcsInfo, resolved_revision: impl Into<String>) -> Self {
        Provenance::Repository(RepositoryProvenance {
            vcs_info,
            resolved_revision: resolved_revision.into(),
        })
    }

    pub fn artifact(url: impl Into<String>, hash: impl Into<String>) -> Self {
        Provenance::Artifact(ArtifactProvenance {
            source_artifact: RemoteArtifact {
                url: url.into(),
                hash: hash.into(),
            },
        })
    }

    /// Whether the source tree behind this provenance can be retrieved
    pub fn is_known(&self) -> bool {
        !matches!(self, Provenance::Unknown)
    }

    /// Sub-path of the component inside its repository; empty otherwise
    pub fn vcs_path(&self) -> &str {
        match self {
            Provenance::Repository(repo) => repo.vcs_info.path.as_str(),
            _ => "",
        }
    }

    /// Stable key naming the stored snapshot of this provenance.
    ///
    /// The VCS path is not part of the key: all components of one repository
    /// revision share a snapshot.
    pub fn storage_key(&self) -> Option<String> {
        match self {
            Provenance::Repository(repo) => Some(format!(
                "{}|{}|{}",
                repo.vcs_info.vcs_type, repo.vcs_info.url, repo.resolved_revision
            )),
            Provenance::Artifact(artifact) => Some(format!(
                "{}|{}",
                artifact.source_artifact.url, artifact.source_artifact.hash
            )),
            Provenance::Unknown => None,
        }
    }
}

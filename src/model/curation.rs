//! Curations and path excludes attached to detected findings

use crate::license::SpdxExpression;
use crate::matching::FileMatcher;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseFindingCurationReason {
    /// The finding is in code, not a license statement
    Code,
    /// The finding is in data, e.g. a test fixture
    DataOf,
    /// The finding is in documentation describing a license
    DocumentationOf,
    /// The detected license is wrong
    Incorrect,
    /// The scanner missed the license
    NotDetected,
    /// The finding only refers to a license
    Reference,
}

/// Corrects a detected license finding
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LicenseFindingCuration {
    /// Glob matched against the finding path
    pub path: String,
    /// Finding start lines this applies to; empty means any
    #[serde(default)]
    pub start_lines: Vec<i32>,
    /// Number of lines the finding must span
    #[serde(default)]
    pub line_count: Option<i32>,
    /// License the finding must have
    #[serde(default)]
    pub detected_license: Option<SpdxExpression>,
    /// Replacement license; `NONE` suppresses the finding
    pub concluded_license: SpdxExpression,
    pub reason: LicenseFindingCurationReason,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PathExcludeReason {
    BuildToolOf,
    DataFileOf,
    DocumentationOf,
    ExampleOf,
    OptionalComponentOf,
    Other,
    ProvidedBy,
    TestOf,
    TestToolOf,
}

/// Marks paths as out of compliance concern without removing evidence
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathExclude {
    pub pattern: String,
    pub reason: PathExcludeReason,
    #[serde(default)]
    pub comment: String,
}

impl PathExclude {
    pub fn new(pattern: impl Into<String>, reason: PathExcludeReason) -> Self {
        Self {
            pattern: pattern.into(),
            reason,
            comment: String::new(),
        }
    }

    /// Whether `path` (relative to the provenance root) is excluded
    pub fn matches(&self, path: &str) -> bool {
        let pattern = self.pattern.strip_prefix("./").unwrap_or(&self.pattern);
        FileMatcher::matches(pattern, path)
    }
}

/// The subset of `excludes` matching `path`, in input order
pub fn matching_excludes(excludes: &[PathExclude], path: &str) -> Vec<PathExclude> {
    excludes
        .iter()
        .filter(|exclude| exclude.matches(path))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_exclude_globs() {
        let exclude = PathExclude::new("tests/**", PathExcludeReason::TestOf);
        assert!(exclude.matches("tests/data/file.txt"));
        assert!(!exclude.matches("src/tests.rs"));
    }

    #[test]
    fn test_path_exclude_strips_dot_slash() {
        let exclude = PathExclude::new("./docs/*.md", PathExcludeReason::DocumentationOf);
        assert!(exclude.matches("docs/index.md"));
        assert!(!exclude.matches("docs/sub/index.md"));
    }

    #[test]
    fn test_matching_excludes_keeps_order() {
        let excludes = vec![
            PathExclude::new("**/*.txt", PathExcludeReason::Other),
            PathExclude::new("src/**", PathExcludeReason::Other),
            PathExclude::new("test/**", PathExcludeReason::TestOf),
        ];
        let matched = matching_excludes(&excludes, "src/notes.txt");
        assert_eq!(matched, excludes[..2].to_vec());
    }

    #[test]
    fn test_curation_toml() {
        let curation: LicenseFindingCuration = toml::from_str(
            r#"
            path = "src/**"
            start_lines = [3]
            detected_license = "GPL-2.0-only"
            concluded_license = "NONE"
            reason = "INCORRECT"
            "#,
        )
        .unwrap();
        assert!(curation.concluded_license.is_none());
        assert_eq!(curation.line_count, None);
        assert_eq!(curation.reason, LicenseFindingCurationReason::Incorrect);
    }
}

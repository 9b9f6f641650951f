//! Root license file lookup
//!
//! A file without its own license statement is governed by the license files
//! of the nearest enclosing directory that has any. Three categories are
//! searched independently: license files, patent files and other root files
//! (READMEs), the latter only when no license or patent file applies.

use super::FileMatcher;
use crate::model::LicenseFinding;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// File name globs (case-insensitive) per category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseFilePatterns {
    #[serde(default = "default_license_filenames")]
    pub license_filenames: Vec<String>,
    #[serde(default = "default_patent_filenames")]
    pub patent_filenames: Vec<String>,
    #[serde(default = "default_other_filenames")]
    pub other_license_filenames: Vec<String>,
}

fn default_license_filenames() -> Vec<String> {
    [
        "copying*",
        "copyright",
        "licence*",
        "license*",
        "*.licence",
        "*.license",
        "unlicence",
        "unlicense",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_patent_filenames() -> Vec<String> {
    vec!["patents".to_string()]
}

fn default_other_filenames() -> Vec<String> {
    vec!["readme*".to_string()]
}

impl Default for LicenseFilePatterns {
    fn default() -> Self {
        Self {
            license_filenames: default_license_filenames(),
            patent_filenames: default_patent_filenames(),
            other_license_filenames: default_other_filenames(),
        }
    }
}

/// Finds the license files applicable to directories of a source tree
#[derive(Debug, Clone)]
pub struct PathLicenseMatcher {
    license: FileMatcher,
    patent: FileMatcher,
    other: FileMatcher,
}

impl PathLicenseMatcher {
    pub fn new(patterns: &LicenseFilePatterns) -> Self {
        Self {
            license: FileMatcher::new(&patterns.license_filenames, true),
            patent: FileMatcher::new(&patterns.patent_filenames, true),
            other: FileMatcher::new(&patterns.other_license_filenames, true),
        }
    }

    /// For each directory, the relative paths of its applicable license files.
    ///
    /// `relative_file_paths` are forward-slash paths relative to the tree root;
    /// the root directory itself is "".
    pub fn applicable_license_files<'a, I>(
        &self,
        relative_file_paths: I,
        directories: &[String],
    ) -> BTreeMap<String, BTreeSet<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut files_by_directory: HashMap<&str, Vec<&str>> = HashMap::new();
        for path in relative_file_paths {
            let (directory, _) = split_path(path);
            files_by_directory.entry(directory).or_default().push(path);
        }

        directories
            .iter()
            .map(|directory| {
                let directory_key = directory.trim_matches('/');
                let mut files = BTreeSet::new();
                files.extend(self.nearest(directory_key, &files_by_directory, &self.license));
                files.extend(self.nearest(directory_key, &files_by_directory, &self.patent));
                if files.is_empty() {
                    files.extend(self.nearest(directory_key, &files_by_directory, &self.other));
                }
                (directory.clone(), files)
            })
            .collect()
    }

    /// For each directory, the license findings located in its applicable
    /// root license files
    pub fn applicable_root_license_findings(
        &self,
        license_findings: &[LicenseFinding],
        directories: &[String],
    ) -> BTreeMap<String, BTreeSet<LicenseFinding>> {
        let mut findings_by_path: HashMap<&str, Vec<&LicenseFinding>> = HashMap::new();
        for finding in license_findings {
            findings_by_path
                .entry(finding.location.path.as_str())
                .or_default()
                .push(finding);
        }

        let files = self.applicable_license_files(findings_by_path.keys().copied(), directories);

        files
            .into_iter()
            .map(|(directory, paths)| {
                let findings = paths
                    .iter()
                    .flat_map(|path| findings_by_path.get(path.as_str()).into_iter().flatten())
                    .map(|finding| (*finding).clone())
                    .collect();
                (directory, findings)
            })
            .collect()
    }

    /// License files of the nearest ancestor (or `directory` itself) that has
    /// files matching `matcher`
    fn nearest(
        &self,
        directory: &str,
        files_by_directory: &HashMap<&str, Vec<&str>>,
        matcher: &FileMatcher,
    ) -> Vec<String> {
        let mut current = Some(directory);
        while let Some(dir) = current {
            let matches: Vec<String> = files_by_directory
                .get(dir)
                .into_iter()
                .flatten()
                .filter(|path| matcher.is_match(split_path(path).1))
                .map(|path| path.to_string())
                .collect();
            if !matches.is_empty() {
                return matches;
            }
            current = parent(dir);
        }
        Vec::new()
    }
}

impl Default for PathLicenseMatcher {
    fn default() -> Self {
        Self::new(&LicenseFilePatterns::default())
    }
}

/// Split a relative path into (directory, file name)
fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Parent of a relative directory; `None` above the root
fn parent(directory: &str) -> Option<&str> {
    if directory.is_empty() {
        return None;
    }
    Some(directory.rfind('/').map_or("", |idx| &directory[..idx]))
}

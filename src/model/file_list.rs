//! File lists of stored source trees and alignment of nested repositories

use super::Provenance;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The files contained in the source tree of one provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileList {
    pub provenance: Provenance,
    pub files: BTreeSet<String>,
}

impl FileList {
    pub fn new<I, S>(provenance: Provenance, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            provenance,
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// Files located at or below `vcs_path`
    pub fn filter_by_vcs_path(&self, vcs_path: &str) -> BTreeSet<String> {
        self.files
            .iter()
            .filter(|file| is_within(file, vcs_path))
            .cloned()
            .collect()
    }
}

/// Whether `path` equals `directory` or lies below it ("" contains everything)
pub fn is_within(path: &str, directory: &str) -> bool {
    let directory = directory.trim_end_matches('/');
    directory.is_empty()
        || path == directory
        || path
            .strip_prefix(directory)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Files of a component living at `vcs_path` of `root`, including the files of
/// sub-repositories mounted below it.
///
/// `sub_repositories` maps each mount path (relative to the root tree) to the
/// file list of the repository mounted there.
pub fn merge_sub_repository_files(
    root: &FileList,
    vcs_path: &str,
    sub_repositories: &BTreeMap<String, FileList>,
) -> BTreeSet<String> {
    let mut files = root.filter_by_vcs_path(vcs_path);

    for (mount_path, sub) in sub_repositories {
        let mount_path = mount_path.trim_end_matches('/');
        if !is_within(mount_path, vcs_path) {
            continue;
        }
        files.extend(sub.files.iter().map(|file| format!("{}/{}", mount_path, file)));
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_within() {
        assert!(is_within("vcs/path/file.txt", "vcs/path"));
        assert!(is_within("vcs/path", "vcs/path/"));
        assert!(!is_within("vcs/pathological.txt", "vcs/path"));
        assert!(is_within("anything", ""));
    }

    #[test]
    fn test_filter_and_merge_sub_repository() {
        let root = FileList::new(
            Provenance::artifact("https://example.com/root.zip", "aa"),
            ["vcs/path/file1.txt", "other/path/file2.txt", "file3.txt"],
        );
        let sub = FileList::new(
            Provenance::artifact("https://example.com/sub.zip", "bb"),
            ["some/dir/file4.txt"],
        );
        let subs = BTreeMap::from([("vcs/path/sub/repository".to_string(), sub)]);

        let merged = merge_sub_repository_files(&root, "vcs/path", &subs);

        let expected: BTreeSet<String> = [
            "vcs/path/file1.txt",
            "vcs/path/sub/repository/some/dir/file4.txt",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_sub_repository_outside_vcs_path_is_ignored() {
        let root = FileList::new(Provenance::Unknown, ["vcs/path/a.txt"]);
        let sub = FileList::new(Provenance::Unknown, ["b.txt"]);
        let subs = BTreeMap::from([("elsewhere/sub".to_string(), sub)]);

        let merged = merge_sub_repository_files(&root, "vcs/path", &subs);
        assert_eq!(merged.len(), 1);
    }
}

//! End-to-end resolution through `LicenseInfoResolver`

use license_resolver::model::{Findings, VcsInfo};
use license_resolver::provider::{LocalFileArchiver, StaticLicenseInfoProvider};
use license_resolver::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn expr(s: &str) -> SpdxExpression {
    s.parse().unwrap()
}

fn id(name: &str) -> Identifier {
    Identifier::new("Maven", "org.example", name, "1.0")
}

fn repo() -> Provenance {
    repo_at("")
}

fn repo_at(path: &str) -> Provenance {
    Provenance::repository(
        VcsInfo {
            vcs_type: "Git".into(),
            url: "https://example.com/project.git".into(),
            revision: "v1.0".into(),
            path: path.into(),
        },
        "0a1b2c3d",
    )
}

/// A component with MIT detected in LICENSE and Apache-2.0 in src/main.c
fn detected_component(name: &str) -> LicenseInfo {
    let mut findings = Findings::new(repo());
    findings.licenses = vec![
        LicenseFinding::new(expr("MIT"), TextLocation::new("LICENSE", 1, 20)),
        LicenseFinding::new(expr("Apache-2.0"), TextLocation::new("src/main.c", 1, 10)),
    ];
    findings.copyrights = vec![
        CopyrightFinding::new("Copyright (c) 2021 Example Corp", TextLocation::line("LICENSE", 3)),
        CopyrightFinding::new("Copyright 2019 Jane Doe", TextLocation::line("src/main.c", 2)),
    ];

    let mut info = LicenseInfo::empty(id(name));
    info.detected.findings.push(findings);
    info
}

struct CountingProvider {
    inner: StaticLicenseInfoProvider,
    calls: AtomicUsize,
}

impl LicenseInfoProvider for CountingProvider {
    fn get(&self, id: &Identifier) -> LicenseInfo {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        self.inner.get(id)
    }
}

/// Writes a fixed repository tree instead of reading an archive; has no
/// snapshots of source artifacts
struct TreeArchiver {
    calls: AtomicUsize,
}

impl TreeArchiver {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl FileArchiver for TreeArchiver {
    fn unarchive(&self, directory: &Path, provenance: &Provenance) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        if !matches!(provenance, Provenance::Repository(_)) {
            return false;
        }
        fs::write(directory.join("LICENSE"), "MIT License\n").unwrap();
        fs::create_dir_all(directory.join("src")).unwrap();
        fs::write(directory.join("src/main.c"), "int main() {}\n").unwrap();
        fs::create_dir_all(directory.join("sub")).unwrap();
        fs::write(directory.join("sub/COPYING"), "ISC License\n").unwrap();
        true
    }
}

struct FailingArchiver;

impl FileArchiver for FailingArchiver {
    fn unarchive(&self, _directory: &Path, _provenance: &Provenance) -> bool {
        false
    }
}

#[test]
fn concurrent_first_callers_share_one_resolution() {
    let provider = Arc::new(CountingProvider {
        inner: StaticLicenseInfoProvider::new([detected_component("lib")]),
        calls: AtomicUsize::new(0),
    });
    let resolver = LicenseInfoResolver::new(provider.clone(), &ResolverConfig::default());
    let target = id("lib");

    let results: Vec<Arc<ResolvedLicenseInfo>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| resolver.resolve_license_info(&target)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn bulk_resolution_queries_each_identifier_once() {
    let provider = Arc::new(CountingProvider {
        inner: StaticLicenseInfoProvider::new([detected_component("a"), detected_component("b")]),
        calls: AtomicUsize::new(0),
    });
    let resolver = LicenseInfoResolver::new(provider.clone(), &ResolverConfig::default());

    let ids = vec![id("a"), id("b"), id("a"), id("b"), id("a")];
    let resolved = resolver.resolve_license_infos(&ids);

    assert_eq!(resolved.len(), 5);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert!(Arc::ptr_eq(&resolved[0], &resolved[2]));
    assert!(Arc::ptr_eq(&resolved[1], &resolved[3]));
}

#[test]
fn detected_findings_resolve_with_copyrights() {
    let provider = StaticLicenseInfoProvider::new([detected_component("lib")]);
    let resolver = LicenseInfoResolver::new(Arc::new(provider), &ResolverConfig::default());

    let resolved = resolver.resolve_license_info(&id("lib"));
    let mit = resolved.get(&expr("MIT")).unwrap();
    assert_eq!(mit.sources(), BTreeSet::from([LicenseSource::Detected]));
    assert_eq!(
        mit.copyrights(false),
        BTreeSet::from(["Copyright (c) 2021 Example Corp".to_string()])
    );
    assert!(resolved.main_license().is_empty());
    assert_eq!(resolved.copyright_statements(false).len(), 2);
}

#[test]
fn author_copyrights_end_to_end() {
    let mut info = LicenseInfo::empty(id("lib"));
    info.concluded.concluded_license = Some(expr("MIT"));
    info.declared.authors = BTreeSet::from(["Jane Doe".to_string()]);
    let provider = StaticLicenseInfoProvider::new([info]);

    let config = ResolverConfig {
        add_authors_as_copyrights: true,
        ..ResolverConfig::default()
    };
    let resolver = LicenseInfoResolver::new(Arc::new(provider), &config);

    let resolved = resolver.resolve_license_info(&id("lib"));
    let mit = resolved.get(&expr("MIT")).unwrap();
    let location = mit.locations.iter().next().unwrap();
    assert_eq!(location.provenance, Provenance::Unknown);
    assert_eq!(location.location, TextLocation::undefined());
    assert_eq!(
        mit.copyrights(false),
        BTreeSet::from(["Copyright (C) Jane Doe".to_string()])
    );
}

#[test]
fn no_archiver_yields_no_license_files() {
    let provider = StaticLicenseInfoProvider::new([detected_component("lib")]);
    let resolver = LicenseInfoResolver::new(Arc::new(provider), &ResolverConfig::default());
    assert!(resolver.resolve_license_files(&id("lib")).is_empty());
}

#[test]
fn license_files_are_resolved_and_released() {
    let provider = StaticLicenseInfoProvider::new([detected_component("lib")]);
    let archiver = Arc::new(TreeArchiver::new());
    let resolver = LicenseInfoResolver::new(Arc::new(provider), &ResolverConfig::default())
        .with_archiver(archiver.clone());

    let files = resolver.resolve_license_files(&id("lib"));
    assert!(Arc::ptr_eq(&files, &resolver.resolve_license_files(&id("lib"))));
    assert_eq!(archiver.calls.load(Ordering::SeqCst), 1);

    assert_eq!(files.files.len(), 1);
    let license_file = &files.files[0];
    assert_eq!(license_file.path, "LICENSE");
    assert_eq!(license_file.provenance, repo());
    assert!(license_file.file.is_file());

    // Only the evidence located in LICENSE itself.
    let licenses: Vec<_> = license_file.licenses.licenses.iter().map(|l| &l.license).collect();
    assert_eq!(licenses, vec![&expr("MIT")]);

    let on_disk = license_file.file.clone();
    drop(files);
    assert!(on_disk.exists(), "results cached by the resolver stay on disk");
    drop(resolver);
    assert!(!on_disk.exists());
}

#[test]
fn license_files_honor_the_vcs_sub_path() {
    let mut findings = Findings::new(repo_at("sub"));
    findings.licenses = vec![
        LicenseFinding::new(expr("ISC"), TextLocation::new("sub/COPYING", 1, 1)),
        LicenseFinding::new(expr("MIT"), TextLocation::new("LICENSE", 1, 20)),
    ];
    let mut info = LicenseInfo::empty(id("sub"));
    info.detected.findings.push(findings);

    let resolver = LicenseInfoResolver::new(
        Arc::new(StaticLicenseInfoProvider::new([info])),
        &ResolverConfig::default(),
    )
    .with_archiver(Arc::new(TreeArchiver::new()));

    let files = resolver.resolve_license_files(&id("sub"));
    let resolved: Vec<_> = files
        .files
        .iter()
        .map(|f| (f.path.as_str(), f.licenses.licenses.len()))
        .collect();
    assert_eq!(resolved, vec![("sub/COPYING", 1)]);
    assert_eq!(files.files[0].licenses.licenses[0].license, expr("ISC"));
}

#[test]
fn provenances_failing_extraction_are_skipped_individually() {
    let mut info = detected_component("mixed");
    let artifact = Provenance::artifact("https://example.com/project-1.0.tar.gz", "ff00");
    let mut artifact_findings = Findings::new(artifact.clone());
    artifact_findings.licenses =
        vec![LicenseFinding::new(expr("BSD-3-Clause"), TextLocation::new("LICENSE", 1, 30))];
    info.detected.findings.push(artifact_findings);

    let archiver = Arc::new(TreeArchiver::new());
    let resolver = LicenseInfoResolver::new(
        Arc::new(StaticLicenseInfoProvider::new([info])),
        &ResolverConfig::default(),
    )
    .with_archiver(archiver.clone());

    let files = resolver.resolve_license_files(&id("mixed"));
    assert_eq!(archiver.calls.load(Ordering::SeqCst), 2);
    assert_eq!(files.files.len(), 1);
    assert_eq!(files.files[0].provenance, repo());
    let licenses: Vec<_> = files.files[0].licenses.licenses.iter().map(|l| &l.license).collect();
    assert_eq!(licenses, vec![&expr("MIT")]);
}

#[test]
fn concurrent_license_file_callers_extract_once() {
    let archiver = Arc::new(TreeArchiver::new());
    let resolver = LicenseInfoResolver::new(
        Arc::new(StaticLicenseInfoProvider::new([detected_component("lib")])),
        &ResolverConfig::default(),
    )
    .with_archiver(archiver.clone());
    let target = id("lib");

    let results: Vec<Arc<ResolvedLicenseFileInfo>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| resolver.resolve_license_files(&target)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(archiver.calls.load(Ordering::SeqCst), 1);
    assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(results[0].files.len(), 1);
}

#[test]
fn failed_extraction_skips_the_provenance() {
    let provider = StaticLicenseInfoProvider::new([detected_component("lib")]);
    let resolver = LicenseInfoResolver::new(Arc::new(provider), &ResolverConfig::default())
        .with_archiver(Arc::new(FailingArchiver));

    let files = resolver.resolve_license_files(&id("lib"));
    assert!(files.is_empty());
    assert_eq!(files.id, id("lib"));
}

#[test]
fn local_archiver_round_trip() {
    if std::process::Command::new("tar").arg("--version").output().is_err() {
        eprintln!("tar not available, skipping");
        return;
    }

    let source = tempfile::TempDir::new().unwrap();
    fs::write(source.path().join("LICENSE"), "MIT License\n").unwrap();
    fs::write(source.path().join("README.md"), "# project\n").unwrap();

    let storage = tempfile::TempDir::new().unwrap();
    let archiver = LocalFileArchiver::new(storage.path());
    archiver.archive(source.path(), &repo()).unwrap();

    let provider = StaticLicenseInfoProvider::new([detected_component("lib")]);
    let resolver = LicenseInfoResolver::new(Arc::new(provider), &ResolverConfig::default())
        .with_archiver(Arc::new(archiver));

    let files = resolver.resolve_license_files(&id("lib"));
    let paths: Vec<_> = files.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["LICENSE"]);
    assert_eq!(
        fs::read_to_string(&files.files[0].file).unwrap(),
        "MIT License\n"
    );
}

#[test]
fn resolved_output_serializes() {
    let provider = StaticLicenseInfoProvider::new([detected_component("lib")]);
    let resolver = LicenseInfoResolver::new(Arc::new(provider), &ResolverConfig::default());
    let resolved = resolver.resolve_license_info(&id("lib"));

    let json = serde_json::to_string(resolved.as_ref()).unwrap();
    let back: ResolvedLicenseInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, resolved.as_ref());
}

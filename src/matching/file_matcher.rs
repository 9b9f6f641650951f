//! Glob matching of forward-slash relative paths
//!
//! `*` never crosses a directory separator, `**` spans any number of
//! directories. Compiled globs are memoized process-wide since the same
//! curation and exclude patterns are evaluated for every finding.

use crate::{ResolverError, ResolverResult};
use dashmap::DashMap;
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;

/// Upper bound on memoized patterns; the memo is reset when it is reached
const MAX_COMPILED: usize = 4096;

static COMPILED: Lazy<DashMap<String, Option<GlobMatcher>>> = Lazy::new(DashMap::new);

/// A set of glob patterns matched as one
#[derive(Debug, Clone)]
pub struct FileMatcher {
    patterns: Vec<String>,
    set: GlobSet,
}

impl FileMatcher {
    /// Build a matcher, skipping (and logging) invalid patterns
    pub fn new<S: AsRef<str>>(patterns: &[S], case_insensitive: bool) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();
        for pattern in patterns {
            match build_glob(pattern.as_ref(), case_insensitive) {
                Ok(glob) => {
                    builder.add(glob);
                    kept.push(pattern.as_ref().to_string());
                }
                Err(e) => tracing::warn!("Ignoring invalid glob '{}': {}", pattern.as_ref(), e),
            }
        }
        let set = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Glob set build failed, matching nothing: {}", e);
            GlobSet::empty()
        });
        Self {
            patterns: kept,
            set,
        }
    }

    /// Build a matcher, failing on the first invalid pattern
    pub fn try_new<S: AsRef<str>>(patterns: &[S], case_insensitive: bool) -> ResolverResult<Self> {
        for pattern in patterns {
            build_glob(pattern.as_ref(), case_insensitive).map_err(|e| {
                ResolverError::Config(format!("invalid glob '{}': {}", pattern.as_ref(), e))
            })?;
        }
        Ok(Self::new(patterns, case_insensitive))
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Match a single pattern against a path; invalid patterns match nothing
    pub fn matches(pattern: &str, path: &str) -> bool {
        if let Some(entry) = COMPILED.get(pattern) {
            return entry.as_ref().is_some_and(|m| m.is_match(path));
        }

        let compiled = match build_glob(pattern, false) {
            Ok(glob) => Some(glob.compile_matcher()),
            Err(e) => {
                tracing::warn!("Invalid glob '{}' matches nothing: {}", pattern, e);
                None
            }
        };
        let is_match = compiled.as_ref().is_some_and(|m| m.is_match(path));
        if COMPILED.len() >= MAX_COMPILED {
            COMPILED.clear();
        }
        COMPILED.insert(pattern.to_string(), compiled);
        is_match
    }
}

fn build_glob(pattern: &str, case_insensitive: bool) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .case_insensitive(case_insensitive)
        .build()
}

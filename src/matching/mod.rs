//! Matching capabilities consumed by resolution
//!
//! - `file_matcher`: glob matching of relative paths
//! - `curation`: applies license finding curations
//! - `path_license`: locates root license files for directories
//! - `findings`: pairs license findings with nearby copyright findings

pub mod curation;
pub mod file_matcher;
pub mod findings;
pub mod path_license;

pub use curation::{FindingCurationMatcher, LicenseFindingCurationResult};
pub use file_matcher::FileMatcher;
pub use findings::{FindingsMatcher, FindingsMatcherConfig, FindingsMatcherResult};
pub use path_license::{LicenseFilePatterns, PathLicenseMatcher};

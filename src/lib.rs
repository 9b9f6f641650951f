//! # license-resolver: License Info Resolution Engine
//!
//! Reconciles the license and copyright evidence gathered for one software
//! component into a single canonical, de-duplicated view for compliance
//! reporting.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    LicenseInfoResolver                       │
//! │   DashMap<Identifier, OnceCell<ResolvedLicenseInfo>>         │
//! │        │                                   │                 │
//! │  ┌─────▼──────────────────────────┐  ┌─────▼──────────────┐  │
//! │  │ Aggregation                    │  │ License files      │  │
//! │  │ concluded → decompose          │  │ archiver → tempdir │  │
//! │  │ declared  → decompose + authors│  │ walk → root files  │  │
//! │  │ detected  → garbage → curate   │  │ filter(prov, path) │  │
//! │  │           → match → exclude    │  └────────────────────┘  │
//! │  └────────────────────────────────┘                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Evidence sources
//!
//! - **Concluded**: a license explicitly concluded by a reviewer
//! - **Declared**: licenses from the component's packaging metadata
//! - **Detected**: license and copyright findings from scanning source text,
//!   corrected by curations and annotated by path excludes
//!
//! Every resolved license is atomic: compound SPDX expressions are decomposed
//! and each part accumulates its own locations and original expressions.

pub mod config;
pub mod license;
pub mod matching;
pub mod model;
pub mod provider;
pub mod resolve;

// Re-exports for convenience
pub use config::ResolverConfig;
pub use license::{LicenseSource, SpdxExpression};
pub use model::{
    CopyrightFinding, Findings, Identifier, LicenseFinding, LicenseFindingCuration, LicenseInfo,
    PathExclude, Provenance, TextLocation,
};
pub use provider::{FileArchiver, LicenseInfoProvider};
pub use resolve::{
    LicenseInfoResolver, ResolvedCopyrightFinding, ResolvedLicense, ResolvedLicenseFile,
    ResolvedLicenseFileInfo, ResolvedLicenseInfo, ResolvedLicenseLocation,
    ResolvedOriginalExpression,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid license expression: {0}")]
    Expression(String),

    #[error("Invalid identifier: {0}")]
    Identifier(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ResolverResult<T> = Result<T, ResolverError>;

//! License expressions and the sources they originate from

pub mod spdx_expression;

pub use spdx_expression::SpdxExpression;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a license expression originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseSource {
    /// Concluded by a reviewer
    Concluded,
    /// Declared by the package metadata
    Declared,
    /// Detected by scanning source text
    Detected,
}

impl fmt::Display for LicenseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concluded => write!(f, "CONCLUDED"),
            Self::Declared => write!(f, "DECLARED"),
            Self::Detected => write!(f, "DETECTED"),
        }
    }
}

//! Raw scanner findings and their text locations

use crate::license::SpdxExpression;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Line marker for locations whose lines are not known
pub const UNKNOWN_LINE: i32 = -1;

/// A line range inside a file, relative to the provenance root
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextLocation {
    pub path: String,
    pub start_line: i32,
    pub end_line: i32,
}

impl TextLocation {
    pub fn new(path: impl Into<String>, start_line: i32, end_line: i32) -> Self {
        Self {
            path: path.into(),
            start_line,
            end_line,
        }
    }

    /// A location inside `path` covering a single line
    pub fn line(path: impl Into<String>, line: i32) -> Self {
        Self::new(path, line, line)
    }

    /// Sentinel for evidence that has no place in a source tree
    pub fn undefined() -> Self {
        Self::new(".", UNKNOWN_LINE, UNKNOWN_LINE)
    }

    /// Directory containing the file, "" for files at the root
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }

    /// The path with `prefix` prepended, used for findings of nested trees
    pub fn prepended_path(&self, prefix: &str) -> String {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            self.path.clone()
        } else {
            format!("{}/{}", prefix, self.path)
        }
    }
}

/// A license expression detected at a location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseFinding {
    pub license: SpdxExpression,
    pub location: TextLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl LicenseFinding {
    pub fn new(license: SpdxExpression, location: TextLocation) -> Self {
        Self {
            license,
            location,
            score: None,
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    fn key(&self) -> (&SpdxExpression, &TextLocation, Option<u32>) {
        (&self.license, &self.location, self.score.map(f32::to_bits))
    }
}

// Scores compare bitwise so findings can key hash maps and ordered sets.
impl PartialEq for LicenseFinding {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for LicenseFinding {}

impl Hash for LicenseFinding {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for LicenseFinding {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LicenseFinding {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// A copyright statement detected at a location
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CopyrightFinding {
    pub statement: String,
    pub location: TextLocation,
}

impl CopyrightFinding {
    pub fn new(statement: impl Into<String>, location: TextLocation) -> Self {
        Self {
            statement: statement.into(),
            location,
        }
    }
}

//! Copyright garbage: statements known to be scanner noise

use crate::model::CopyrightFinding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Denylist of copyright statements removed before matching
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyrightGarbage {
    #[serde(default)]
    pub items: BTreeSet<String>,
}

impl CopyrightGarbage {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact statement membership
    pub fn contains(&self, statement: &str) -> bool {
        self.items.contains(statement)
    }

    /// Split findings into (kept, garbage)
    pub fn partition(
        &self,
        findings: &[CopyrightFinding],
    ) -> (Vec<CopyrightFinding>, BTreeSet<CopyrightFinding>) {
        let (garbage, kept): (Vec<_>, Vec<_>) = findings
            .iter()
            .cloned()
            .partition(|finding| self.contains(&finding.statement));
        (kept, garbage.into_iter().collect())
    }
}

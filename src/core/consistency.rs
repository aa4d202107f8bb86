//! Cross-check per-tower fields inside each group.
//!
//! The aggregator trusts row 0 of a group for latitude, longitude, height and the
//! other per-tower fields. This pass reports every row that disagrees with row 0 so
//! callers can warn about it or reject the export.

use crate::core::grouper::TowerGroups;
use crate::error::ReportError;
use serde::Serialize;
use std::fmt;

/// One row whose per-tower field differs from its group's first row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inconsistency {
    pub key: String,
    pub column: String,
    pub expected: String,
    pub found: String,
    pub line: u64,
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tower '{}' line {}: {} is '{}', first row has '{}'",
            self.key, self.line, self.column, self.found, self.expected
        )
    }
}

impl From<Inconsistency> for ReportError {
    fn from(i: Inconsistency) -> Self {
        ReportError::InconsistentGroup {
            key: i.key,
            column: i.column,
            expected: i.expected,
            found: i.found,
            line: i.line,
        }
    }
}

/// Compare each row's `fields` against the group's first row (text equality).
/// Fields missing from a row are skipped here; the aggregator reports them.
pub fn check_group_consistency(groups: &TowerGroups, fields: &[String]) -> Vec<Inconsistency> {
    let mut found = Vec::new();

    for group in groups {
        let first = group.first();
        for row in group.rows.iter().skip(1) {
            for field in fields {
                let (Some(expected), Some(actual)) = (first.get(field), row.get(field)) else {
                    continue;
                };
                if expected != actual {
                    found.push(Inconsistency {
                        key: group.key.clone(),
                        column: field.clone(),
                        expected: expected.to_string(),
                        found: actual.to_string(),
                        line: row.line,
                    });
                }
            }
        }
    }

    found
}

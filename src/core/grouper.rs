//! Partition sector records by tower.
//!
//! ```text
//! Sector rows (file order)          Tower groups (first-seen order)
//! ┌──────────────────────────┐     ┌──────────────────────────────┐
//! │ E5015  LTE  10           │     │ E5015: [LTE 10, LTE 10, 5G]  │
//! │ E7001  LTE  15           │ →   ├──────────────────────────────┤
//! │ E5015  LTE  10           │     │ E7001: [LTE 15]              │
//! │ E5015  5G   100          │     └──────────────────────────────┘
//! └──────────────────────────┘
//! ```

use crate::error::ReportResult;
use crate::types::SectorRow;
use std::collections::HashMap;

/// All sector rows sharing one key value, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct TowerGroup {
    pub key: String,
    pub rows: Vec<SectorRow>,
}

impl TowerGroup {
    /// Row 0 is treated as authoritative for per-tower fields.
    pub fn first(&self) -> &SectorRow {
        &self.rows[0]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Ordered mapping from key value to its group.
#[derive(Debug, Clone, Default)]
pub struct TowerGroups {
    groups: Vec<TowerGroup>,
    index: HashMap<String, usize>,
}

impl TowerGroups {
    pub fn get(&self, key: &str) -> Option<&TowerGroup> {
        self.index.get(key).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TowerGroup> {
        self.groups.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Rows across all groups; always equals the grouped input length.
    pub fn total_rows(&self) -> usize {
        self.groups.iter().map(TowerGroup::len).sum()
    }
}

impl<'a> IntoIterator for &'a TowerGroups {
    type Item = &'a TowerGroup;
    type IntoIter = std::slice::Iter<'a, TowerGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Group `rows` by the value of `key`, enumerating groups by first appearance.
pub fn group_rows(rows: &[SectorRow], key: &str) -> ReportResult<TowerGroups> {
    let mut grouped = TowerGroups::default();

    for row in rows {
        let value = row.require(key, "group")?;
        match grouped.index.get(value) {
            Some(&i) => grouped.groups[i].rows.push(row.clone()),
            None => {
                grouped.index.insert(value.to_string(), grouped.groups.len());
                grouped.groups.push(TowerGroup {
                    key: value.to_string(),
                    rows: vec![row.clone()],
                });
            }
        }
    }

    Ok(grouped)
}

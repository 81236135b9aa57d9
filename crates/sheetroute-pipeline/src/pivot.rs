use serde::Serialize;
use sheetroute_common::{Table, cell};
use std::collections::BTreeMap;

/// Rows assigned to one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotEntry {
    pub name: String,
    pub count: usize,
}

/// Tally the owner cell (column 0) of every data row, sorted by name.
///
/// Sentinel owners are counted like any other name.
pub fn pivot(assigned: &Table) -> Vec<PivotEntry> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in assigned.data() {
        *counts.entry(cell(row, 0).to_string()).or_default() += 1;
    }
    tracing::debug!(owners = counts.len(), "built pivot");
    counts
        .into_iter()
        .map(|(name, count)| PivotEntry { name, count })
        .collect()
}

use sheetroute_common::{Key, Table, cell};
use std::collections::BTreeSet;

/// Sorted unique numbers coerced from the first cell of every row.
///
/// No header is assumed: row 0 takes part like any other row. Cells that do
/// not coerce are skipped.
pub fn extract_column_a(table: &Table) -> Vec<f64> {
    let _span = tracing::info_span!("extract_column_a", rows = table.rows().len()).entered();
    let keys: BTreeSet<Key> = table
        .rows()
        .iter()
        .filter_map(|row| cell(row, 0).as_key())
        .collect();
    tracing::debug!(unique = keys.len(), "extracted column A");
    keys.into_iter().map(Key::value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetroute_testkit::row;

    #[test]
    fn dedups_and_sorts() {
        let t = Table::new(vec![row![3], row![3], row!["x"], row![1]]);
        assert_eq!(extract_column_a(&t), vec![1.0, 3.0]);
    }

    #[test]
    fn first_row_counts_and_text_numbers_merge() {
        let t = Table::new(vec![row!["10"], row![-2.5], row![10], row![], row![""]]);
        assert_eq!(extract_column_a(&t), vec![-2.5, 10.0]);
    }

    #[test]
    fn empty_table_yields_nothing() {
        assert!(extract_column_a(&Table::default()).is_empty());
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::CellValue;

/// Ordered cells of one spreadsheet row; columns are addressed by index.
pub type Row = Vec<CellValue>;

static EMPTY: CellValue = CellValue::Empty;

/// Cell at `col`, or `Empty` when the row is too short to hold it.
pub fn cell(row: &[CellValue], col: usize) -> &CellValue {
    row.get(col).unwrap_or(&EMPTY)
}

/// A decoded worksheet: row 0 is the header, rows 1.. are data.
///
/// Tables are owned by the pipeline stage holding them; stages that need the
/// previous contents clone explicitly.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn from_parts(header: Row, data: Vec<Row>) -> Self {
        let mut rows = Vec::with_capacity(data.len() + 1);
        rows.push(header);
        rows.extend(data);
        Self { rows }
    }

    /// True when the table has no header and no data.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn header_mut(&mut self) -> Option<&mut Row> {
        self.rows.first_mut()
    }

    pub fn data(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn data_mut(&mut self) -> &mut [Row] {
        self.rows.get_mut(1..).unwrap_or(&mut [])
    }

    /// Every row including the header.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Split into header and data rows. `None` for an empty table.
    pub fn into_parts(self) -> Option<(Row, Vec<Row>)> {
        let mut rows = self.rows.into_iter();
        let header = rows.next()?;
        Some((header, rows.collect()))
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Widest row, header included.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Index of the first header cell whose text equals `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header()?
            .iter()
            .position(|c| c.as_text() == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| CellValue::from(*c)).collect()
    }

    #[test]
    fn header_and_data_split() {
        let t = Table::new(vec![row(&["id", "name"]), row(&["1", "a"]), row(&["2", "b"])]);
        assert_eq!(t.header(), Some(&row(&["id", "name"])));
        assert_eq!(t.len(), 2);
        assert_eq!(t.data()[1], row(&["2", "b"]));
        assert_eq!(t.column_index("name"), Some(1));
        assert_eq!(t.column_index("missing"), None);
    }

    #[test]
    fn empty_table_has_no_header_or_data() {
        let t = Table::default();
        assert!(t.is_empty());
        assert!(t.header().is_none());
        assert!(t.data().is_empty());
        assert_eq!(t.len(), 0);
        assert!(t.into_parts().is_none());
    }

    #[test]
    fn short_rows_read_as_empty() {
        let r = row(&["x"]);
        assert_eq!(cell(&r, 0), &CellValue::from("x"));
        assert_eq!(cell(&r, 5), &CellValue::Empty);
    }
}

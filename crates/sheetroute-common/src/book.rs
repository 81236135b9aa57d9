use crate::Table;

/// A worksheet decoded into a [`Table`], keyed by its sheet name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTable {
    pub name: String,
    pub table: Table,
}

/// All worksheets of one decoded workbook, in workbook order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetBook {
    sheets: Vec<NamedTable>,
}

impl SheetBook {
    pub fn new(sheets: Vec<NamedTable>) -> Self {
        Self { sheets }
    }

    pub fn single(name: impl Into<String>, table: Table) -> Self {
        Self {
            sheets: vec![NamedTable {
                name: name.into(),
                table,
            }],
        }
    }

    pub fn push(&mut self, name: impl Into<String>, table: Table) {
        self.sheets.push(NamedTable {
            name: name.into(),
            table,
        });
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheets(&self) -> &[NamedTable] {
        &self.sheets
    }

    pub fn first(&self) -> Option<&NamedTable> {
        self.sheets.first()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Pick the worksheet whose name contains `target` (case-insensitive),
    /// falling back to the first worksheet. `None` only when the book is empty.
    pub fn locate(&self, target: &str) -> Option<&NamedTable> {
        let needle = target.to_lowercase();
        let found = self
            .sheets
            .iter()
            .find(|s| s.name.to_lowercase().contains(&needle));
        if found.is_some() {
            return found;
        }
        let first = self.sheets.first()?;
        tracing::warn!(
            target_sheet = target,
            fallback = first.name.as_str(),
            "no worksheet name matched; using the first worksheet"
        );
        Some(first)
    }
}

impl FromIterator<NamedTable> for SheetBook {
    fn from_iter<I: IntoIterator<Item = NamedTable>>(iter: I) -> Self {
        Self {
            sheets: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(names: &[&str]) -> SheetBook {
        names
            .iter()
            .map(|n| NamedTable {
                name: n.to_string(),
                table: Table::default(),
            })
            .collect()
    }

    #[test]
    fn locate_matches_substring_ignoring_case() {
        let b = book(&["Summary", "Customer INFO 2024", "Notes"]);
        assert_eq!(b.locate("info").unwrap().name, "Customer INFO 2024");
    }

    #[test]
    fn locate_prefers_first_match() {
        let b = book(&["dup-old", "DUP-new"]);
        assert_eq!(b.locate("Dup").unwrap().name, "dup-old");
    }

    #[test]
    fn locate_falls_back_to_first_sheet() {
        let b = book(&["Sheet1", "Sheet2"]);
        assert_eq!(b.locate("info").unwrap().name, "Sheet1");
    }

    #[test]
    fn locate_on_empty_book_is_none() {
        assert!(SheetBook::default().locate("info").is_none());
    }
}

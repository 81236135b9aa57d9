use crate::error::{IoError, col_to_a1};
use crate::traits::{HeaderStyle, SaveDestination, SheetData, SpreadsheetReader, SpreadsheetWriter};
use sheetroute_common::{CellValue, NamedTable, Row, SheetBook, Table};
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Default, Clone)]
pub struct LoaderStats {
    pub sheets_loaded: usize,
    pub cells_loaded: usize,
    pub rows_emitted: usize,
    pub blank_rows_skipped: usize,
    pub load_time_ms: u64,
}

/// Turns backend sheets into dense positional tables anchored at A1.
pub struct WorkbookLoader<B: SpreadsheetReader> {
    backend: B,
    stats: LoaderStats,
}

impl<B: SpreadsheetReader> WorkbookLoader<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            stats: LoaderStats::default(),
        }
    }

    pub fn stats(&self) -> &LoaderStats {
        &self.stats
    }

    pub fn load_sheet(&mut self, sheet: &str) -> Result<Table, IoError> {
        let data = self
            .backend
            .read_sheet(sheet)
            .map_err(|e| IoError::from_backend("backend", e))?;
        self.stats.cells_loaded += data.cells.len();
        let (table, skipped) = sheet_to_table(&data);
        self.stats.rows_emitted += table.rows().len();
        self.stats.blank_rows_skipped += skipped;
        self.stats.sheets_loaded += 1;
        if let Some((rows, cols)) = data.dimensions {
            tracing::debug!(
                sheet,
                area = %format!("A1:{}{}", col_to_a1(cols), rows),
                rows = table.rows().len(),
                skipped,
                "loaded worksheet"
            );
        }
        Ok(table)
    }

    /// Load every worksheet in workbook order.
    pub fn load_book(&mut self) -> Result<SheetBook, IoError> {
        let start = Instant::now();
        let names = self
            .backend
            .sheet_names()
            .map_err(|e| IoError::from_backend("backend", e))?;
        let mut book = SheetBook::default();
        for name in names {
            let table = self.load_sheet(&name)?;
            book.push(name, table);
        }
        self.stats.load_time_ms = start.elapsed().as_millis() as u64;
        Ok(book)
    }
}

/// Dense rows for the area anchored at A1. Rows holding no value are skipped;
/// every emitted row is padded with `Empty` to the sheet width.
///
/// Returns the table and the number of blank rows skipped.
pub fn sheet_to_table(data: &SheetData) -> (Table, usize) {
    let Some((rows, cols)) = data.dimensions else {
        return (Table::default(), 0);
    };
    let mut out: Vec<Row> = Vec::new();
    let mut skipped = 0usize;
    for r in 1..=rows {
        let row: Row = (1..=cols)
            .map(|c| data.cells.get(&(r, c)).cloned().unwrap_or(CellValue::Empty))
            .collect();
        if row.iter().all(CellValue::is_empty) {
            skipped += 1;
            continue;
        }
        out.push(row);
    }
    (Table::new(out), skipped)
}

/// File formats understood by [`open_book`] and [`write_table`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    /// xlsx for writing; any calamine-readable workbook for reading.
    Workbook,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("tsv") => {
                FileFormat::Csv
            }
            _ => FileFormat::Workbook,
        }
    }
}

/// Tab for `.tsv`, comma for everything else. Shared by reading and writing so
/// a written file opens with the same layout.
pub fn csv_delimiter(path: &Path) -> u8 {
    if path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("tsv"))
    {
        b'\t'
    } else {
        b','
    }
}

fn load_logged<B: SpreadsheetReader>(backend: B, path: &Path) -> Result<SheetBook, IoError> {
    let mut loader = WorkbookLoader::new(backend);
    let book = loader.load_book()?;
    let stats = loader.stats();
    tracing::debug!(
        path = %path.display(),
        sheets = stats.sheets_loaded,
        cells = stats.cells_loaded,
        rows = stats.rows_emitted,
        blank_rows = stats.blank_rows_skipped,
        ms = stats.load_time_ms,
        "decoded workbook"
    );
    Ok(book)
}

/// Decode every worksheet of the file at `path`, choosing the backend from
/// the extension.
pub fn open_book(path: &Path) -> Result<SheetBook, IoError> {
    match FileFormat::from_path(path) {
        #[cfg(feature = "csv")]
        FileFormat::Csv => {
            let opts = crate::backends::csv::CsvReadOptions {
                delimiter: csv_delimiter(path),
                ..Default::default()
            };
            let adapter = crate::backends::CsvAdapter::open_path_with_options(path, opts)?;
            load_logged(adapter, path)
        }
        #[cfg(feature = "calamine")]
        FileFormat::Workbook => {
            let adapter = crate::backends::CalamineAdapter::open_path(path)
                .map_err(|e| IoError::from_backend("calamine", e))?;
            load_logged(adapter, path)
        }
        #[allow(unreachable_patterns)]
        other => Err(IoError::Unsupported {
            feature: format!("{other:?} input"),
            context: path.display().to_string(),
        }),
    }
}

/// First worksheet of the file at `path`, as used for single-table inputs.
pub fn open_first_table(path: &Path) -> Result<NamedTable, IoError> {
    let book = open_book(path)?;
    book.sheets()
        .first()
        .cloned()
        .ok_or_else(|| IoError::SheetNotFound {
            sheet: format!("<first sheet of {}>", path.display()),
        })
}

/// Encode `table` as the single sheet `sheet` of a new file at `path`.
pub fn write_table(
    path: &Path,
    sheet: &str,
    table: &Table,
    header_style: Option<&HeaderStyle>,
) -> Result<(), IoError> {
    match FileFormat::from_path(path) {
        #[cfg(feature = "csv")]
        FileFormat::Csv => {
            use crate::backends::csv::{CsvReadOptions, CsvWriteOptions};
            let opts = CsvWriteOptions {
                delimiter: csv_delimiter(path),
                ..Default::default()
            };
            let mut adapter =
                crate::backends::CsvAdapter::new_with_options(CsvReadOptions::default(), opts);
            adapter.write_table(sheet, table, header_style)?;
            adapter.save_to(SaveDestination::Path(path))?;
            Ok(())
        }
        #[cfg(feature = "umya")]
        FileFormat::Workbook => {
            let mut adapter = crate::backends::UmyaAdapter::new();
            adapter
                .write_table(sheet, table, header_style)
                .map_err(|e| IoError::from_backend("umya", e))?;
            adapter
                .save_to(SaveDestination::Path(path))
                .map_err(|e| IoError::from_backend("umya", e))?;
            Ok(())
        }
        #[allow(unreachable_patterns)]
        other => Err(IoError::Unsupported {
            feature: format!("{other:?} output"),
            context: path.display().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn dense_rows_anchor_at_a1_and_skip_blank_rows() {
        let mut cells = BTreeMap::new();
        cells.insert((1, 1), CellValue::from("id"));
        cells.insert((1, 3), CellValue::from("note"));
        cells.insert((3, 1), CellValue::Int(5));
        let data = SheetData::from_cells(cells);

        let (table, skipped) = sheet_to_table(&data);
        assert_eq!(skipped, 1);
        assert_eq!(
            table.rows(),
            &[
                vec![CellValue::from("id"), CellValue::Empty, CellValue::from("note")],
                vec![CellValue::Int(5), CellValue::Empty, CellValue::Empty],
            ]
        );
    }

    #[test]
    fn empty_sheet_gives_empty_table() {
        let (table, skipped) = sheet_to_table(&SheetData::default());
        assert!(table.is_empty());
        assert_eq!(skipped, 0);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a/b.CSV")), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("b.tsv")), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("b.xlsx")), FileFormat::Workbook);
        assert_eq!(FileFormat::from_path(Path::new("noext")), FileFormat::Workbook);
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        assert_eq!(csv_delimiter(Path::new("out.TSV")), b'\t');
        assert_eq!(csv_delimiter(Path::new("out.csv")), b',');
    }
}

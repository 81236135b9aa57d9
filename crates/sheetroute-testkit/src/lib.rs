//! xlsx and csv fixtures for integration tests.

use sheetroute_common::{CellValue, Row};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A file written into its own temporary directory; removed on drop.
pub struct Fixture {
    _dir: TempDir,
    path: PathBuf,
}

impl Fixture {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Build an xlsx workbook by mutating a fresh umya book (seeded with `Sheet1`).
pub fn build_workbook(f: impl FnOnce(&mut umya_spreadsheet::Spreadsheet)) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fixture.xlsx");
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, &path).expect("write fixture workbook");
    Fixture { _dir: dir, path }
}

/// Write each `(sheet name, rows)` pair as a worksheet, in order, from A1.
pub fn write_rows_xlsx(sheets: &[(&str, Vec<Row>)]) -> Fixture {
    build_workbook(|book| {
        for (i, (name, rows)) in sheets.iter().enumerate() {
            let ws = if i == 0 {
                let ws = book.get_sheet_by_name_mut("Sheet1").expect("seed sheet");
                ws.set_name(*name);
                ws
            } else {
                book.new_sheet(*name).expect("new sheet")
            };
            for (ri, row) in rows.iter().enumerate() {
                for (ci, value) in row.iter().enumerate() {
                    let cell = ws.get_cell_mut((ci as u32 + 1, ri as u32 + 1));
                    match value {
                        CellValue::Empty => {}
                        CellValue::Int(n) => {
                            cell.set_value_number(*n as f64);
                        }
                        CellValue::Number(n) => {
                            cell.set_value_number(*n);
                        }
                        CellValue::Boolean(b) => {
                            cell.set_value_bool(*b);
                        }
                        CellValue::Text(s) => {
                            cell.set_value_string(s.as_str());
                        }
                    }
                }
            }
        }
    })
}

/// Write `text` verbatim to `name` inside a fresh temporary directory.
pub fn write_text(name: &str, text: &str) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    std::fs::write(&path, text).expect("write fixture text");
    Fixture { _dir: dir, path }
}

pub use sheetroute_common::CellValue as Cell;

/// Build a row from anything convertible into a cell:
/// `row![5, "ZRAX", Cell::Empty]`.
#[macro_export]
macro_rules! row {
    ($($v:expr),* $(,)?) => {
        vec![$($crate::Cell::from($v)),*]
    };
}

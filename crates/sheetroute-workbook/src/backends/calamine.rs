#![cfg(feature = "calamine")]

use crate::traits::{SheetData, SpreadsheetReader};
use sheetroute_common::CellValue;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto_from_rs};

/// Read-only adapter over calamine; the workbook format (xlsx, xlsm, xlsb,
/// xls, ods) is detected from the payload.
pub struct CalamineAdapter {
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl CalamineAdapter {
    fn convert_value(data: &Data) -> CellValue {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Int(*i),
            Data::Bool(b) => CellValue::Boolean(*b),
            Data::Error(e) => CellValue::Text(e.to_string()),
            // Serial number; no calendar conversion here
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) => CellValue::Text(s.clone()),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }

    fn range_to_cells(range: &Range<Data>) -> BTreeMap<(u32, u32), CellValue> {
        let mut cells = BTreeMap::new();
        let (start_row, start_col) = range.start().unwrap_or_default();

        for (row, col, val) in range.used_cells() {
            let value = match val {
                Data::Empty => continue,
                Data::String(s) if s.is_empty() => continue,
                _ => Self::convert_value(val),
            };
            // calamine is 0-based relative to the range start
            let excel_row = row as u32 + start_row + 1;
            let excel_col = col as u32 + start_col + 1;
            cells.insert((excel_row, excel_col), value);
        }
        cells
    }
}

impl SpreadsheetReader for CalamineAdapter {
    type Error = calamine::Error;

    fn sheet_names(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.workbook.sheet_names())
    }

    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        let data = std::fs::read(path.as_ref())?;
        Self::open_bytes(data)
    }

    fn open_bytes(data: Vec<u8>) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        let workbook = open_workbook_auto_from_rs(Cursor::new(data))?;
        Ok(Self { workbook })
    }

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, Self::Error> {
        let range = self.workbook.worksheet_range(sheet)?;
        Ok(SheetData::from_cells(Self::range_to_cells(&range)))
    }
}

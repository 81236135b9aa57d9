#![cfg(feature = "umya")]

use crate::traits::{HeaderStyle, SaveDestination, SpreadsheetWriter};
use sheetroute_common::CellValue;
use std::io::Cursor;
use umya_spreadsheet::{Spreadsheet, XlsxError};

/// Default sheet created by `umya_spreadsheet::new_file`.
const SEED_SHEET: &str = "Sheet1";

/// xlsx writer backed by umya-spreadsheet.
pub struct UmyaAdapter {
    workbook: Spreadsheet,
    /// The seed sheet is renamed or dropped on first `create_sheet`.
    seeded: bool,
}

impl Default for UmyaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl UmyaAdapter {
    pub fn new() -> Self {
        Self {
            workbook: umya_spreadsheet::new_file(),
            seeded: true,
        }
    }

    fn sheet_mut(&mut self, sheet: &str) -> Result<&mut umya_spreadsheet::Worksheet, XlsxError> {
        self.workbook
            .get_sheet_by_name_mut(sheet)
            .ok_or_else(|| XlsxError::CellError(format!("sheet `{sheet}` not found")))
    }
}

impl SpreadsheetWriter for UmyaAdapter {
    type Error = XlsxError;

    fn create_sheet(&mut self, name: &str) -> Result<(), Self::Error> {
        if self.workbook.get_sheet_by_name(name).is_some() {
            return Ok(());
        }
        if self.seeded {
            self.seeded = false;
            self.sheet_mut(SEED_SHEET)?.set_name(name);
            return Ok(());
        }
        self.workbook
            .new_sheet(name)
            .map_err(|e| XlsxError::CellError(e.to_string()))?;
        Ok(())
    }

    fn write_cell(
        &mut self,
        sheet: &str,
        row: u32,
        col: u32,
        value: &CellValue,
    ) -> Result<(), Self::Error> {
        let ws = self.sheet_mut(sheet)?;
        // umya addresses cells as (col, row)
        let cell = ws.get_cell_mut((col, row));
        match value {
            CellValue::Int(i) => {
                cell.set_value_number(*i as f64);
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
            CellValue::Empty => {
                cell.set_blank();
            }
        }
        Ok(())
    }

    fn style_header(
        &mut self,
        sheet: &str,
        cols: u32,
        style: &HeaderStyle,
    ) -> Result<(), Self::Error> {
        let ws = self.sheet_mut(sheet)?;
        for col in 1..=cols {
            let st = ws.get_style_mut((col, 1));
            st.get_font_mut().set_bold(style.bold);
            st.get_font_mut()
                .get_color_mut()
                .set_argb(style.font_argb.as_str());
            st.set_background_color(style.fill_argb.as_str());
        }
        Ok(())
    }

    fn save_to(&mut self, dest: SaveDestination<'_>) -> Result<Option<Vec<u8>>, Self::Error> {
        match dest {
            SaveDestination::Path(p) => {
                umya_spreadsheet::writer::xlsx::write(&self.workbook, p)?;
                Ok(None)
            }
            SaveDestination::Writer(w) => {
                // The zip writer needs Seek; stage in memory first
                let mut cursor = Cursor::new(Vec::new());
                umya_spreadsheet::writer::xlsx::write_writer(&self.workbook, &mut cursor)?;
                w.write_all(cursor.get_ref()).map_err(XlsxError::Io)?;
                Ok(None)
            }
            SaveDestination::Bytes => {
                let mut cursor = Cursor::new(Vec::new());
                umya_spreadsheet::writer::xlsx::write_writer(&self.workbook, &mut cursor)?;
                Ok(Some(cursor.into_inner()))
            }
        }
    }
}

use sheetroute_common::{CellValue, Table};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Decoded cells of one worksheet.
///
/// Coordinates are 1-based `(row, col)` like spreadsheet addresses; only
/// non-empty cells are stored.
#[derive(Clone, Debug, Default)]
pub struct SheetData {
    pub cells: BTreeMap<(u32, u32), CellValue>,
    /// `(rows, cols)` of the area anchored at A1 that holds every stored cell.
    pub dimensions: Option<(u32, u32)>,
}

impl SheetData {
    pub fn from_cells(cells: BTreeMap<(u32, u32), CellValue>) -> Self {
        let dims = cells
            .keys()
            .fold((0u32, 0u32), |acc, (r, c)| (acc.0.max(*r), acc.1.max(*c)));
        Self {
            cells,
            dimensions: (dims.0 > 0).then_some(dims),
        }
    }
}

/// Where a writer sends its encoded payload.
pub enum SaveDestination<'a> {
    Path(&'a Path),
    Writer(&'a mut dyn Write),
    Bytes,
}

/// Header cell presentation. Backends without styling ignore it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderStyle {
    pub bold: bool,
    /// ARGB hex, e.g. `FFFFFFFF`.
    pub font_argb: String,
    pub fill_argb: String,
}

impl Default for HeaderStyle {
    /// Bold white text on a blue fill.
    fn default() -> Self {
        Self {
            bold: true,
            font_argb: "FFFFFFFF".to_string(),
            fill_argb: "FF4472C4".to_string(),
        }
    }
}

pub trait SpreadsheetReader: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn sheet_names(&self) -> Result<Vec<String>, Self::Error>;

    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>
    where
        Self: Sized;

    fn open_bytes(data: Vec<u8>) -> Result<Self, Self::Error>
    where
        Self: Sized;

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, Self::Error>;
}

pub trait SpreadsheetWriter: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn create_sheet(&mut self, name: &str) -> Result<(), Self::Error>;

    fn write_cell(
        &mut self,
        sheet: &str,
        row: u32,
        col: u32,
        value: &CellValue,
    ) -> Result<(), Self::Error>;

    /// Apply `style` to the first `cols` cells of row 1.
    fn style_header(
        &mut self,
        sheet: &str,
        cols: u32,
        style: &HeaderStyle,
    ) -> Result<(), Self::Error>;

    fn save_to(&mut self, dest: SaveDestination<'_>) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Write every row of `table` starting at A1, optionally styling the header.
    fn write_table(
        &mut self,
        sheet: &str,
        table: &Table,
        header_style: Option<&HeaderStyle>,
    ) -> Result<(), Self::Error> {
        self.create_sheet(sheet)?;
        for (ri, row) in table.rows().iter().enumerate() {
            for (ci, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                self.write_cell(sheet, ri as u32 + 1, ci as u32 + 1, value)?;
            }
        }
        if let (Some(style), Some(header)) = (header_style, table.header()) {
            self.style_header(sheet, header.len() as u32, style)?;
        }
        Ok(())
    }

    fn save_to_bytes(&mut self) -> Result<Vec<u8>, Self::Error> {
        Ok(self.save_to(SaveDestination::Bytes)?.unwrap_or_default())
    }
}

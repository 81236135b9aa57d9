use crate::error::IoError;
use crate::traits::{HeaderStyle, SaveDestination, SheetData, SpreadsheetReader, SpreadsheetWriter};
use sheetroute_common::CellValue;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CsvTypeInference {
    /// Do not infer: treat all non-empty fields as text.
    Off,
    /// Infer integers, decimals and TRUE/FALSE when unambiguous.
    #[default]
    Basic,
}

#[derive(Clone, Debug)]
pub struct CsvReadOptions {
    /// Field delimiter as a single byte. Use `b'\t'` for TSV.
    pub delimiter: u8,
    /// When true, the first record is loaded into row 1 without type inference.
    pub has_headers: bool,
    pub type_inference: CsvTypeInference,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            type_inference: CsvTypeInference::Basic,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CsvNewline {
    #[default]
    Lf,
    Crlf,
}

#[derive(Clone, Debug)]
pub struct CsvWriteOptions {
    pub delimiter: u8,
    pub newline: CsvNewline,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            newline: CsvNewline::Lf,
        }
    }
}

/// CSV backend adapter.
///
/// A CSV file is a single-sheet workbook. The sheet is named after the file
/// stem when opened from a path, `Sheet1` otherwise. UTF-8 only; styles are
/// ignored on write.
pub struct CsvAdapter {
    sheet_name: String,
    cells: BTreeMap<(u32, u32), CellValue>,
    read_options: CsvReadOptions,
    write_options: CsvWriteOptions,
}

impl Default for CsvAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvAdapter {
    pub fn new() -> Self {
        Self::new_with_options(CsvReadOptions::default(), CsvWriteOptions::default())
    }

    pub fn new_with_options(read_options: CsvReadOptions, write_options: CsvWriteOptions) -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            cells: BTreeMap::new(),
            read_options,
            write_options,
        }
    }

    pub fn set_write_options(&mut self, opts: CsvWriteOptions) {
        self.write_options = opts;
    }

    pub fn open_path_with_options<P: AsRef<Path>>(
        path: P,
        read_options: CsvReadOptions,
    ) -> Result<Self, IoError> {
        let path = path.as_ref();
        let mut adapter = Self::new_with_options(read_options, CsvWriteOptions::default());
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            adapter.sheet_name = stem.to_string();
        }
        let file = File::open(path)?;
        adapter.open_from_reader(Box::new(BufReader::new(file)))?;
        Ok(adapter)
    }

    pub fn open_bytes_with_options(
        bytes: Vec<u8>,
        read_options: CsvReadOptions,
    ) -> Result<Self, IoError> {
        let mut adapter = Self::new_with_options(read_options, CsvWriteOptions::default());
        adapter.open_from_reader(Box::new(std::io::Cursor::new(bytes)))?;
        Ok(adapter)
    }

    fn open_from_reader(&mut self, reader: Box<dyn Read + Send + Sync>) -> Result<(), IoError> {
        let mut rb = csv::ReaderBuilder::new();
        rb.delimiter(self.read_options.delimiter)
            .has_headers(self.read_options.has_headers)
            // Ragged rows are normal in exported sheets
            .flexible(true);

        let mut rdr = rb.from_reader(reader);
        self.cells.clear();

        let mut row: u32 = 1;

        if self.read_options.has_headers {
            let headers = rdr.headers().map_err(|e| IoError::from_backend("csv", e))?;
            for (ci, field) in headers.iter().enumerate() {
                if let Some(v) = infer_field(field, CsvTypeInference::Off) {
                    self.cells.insert((row, ci as u32 + 1), v);
                }
            }
            row += 1;
        }

        for rec in rdr.records() {
            let rec = rec.map_err(|e| IoError::from_backend("csv", e))?;
            for (ci, field) in rec.iter().enumerate() {
                if let Some(v) = infer_field(field, self.read_options.type_inference) {
                    self.cells.insert((row, ci as u32 + 1), v);
                }
            }
            row += 1;
        }

        Ok(())
    }

    fn write_rect_csv<W: Write>(&self, writer: W) -> Result<(), IoError> {
        let opts = &self.write_options;
        let mut wb = csv::WriterBuilder::new();
        wb.delimiter(opts.delimiter)
            .flexible(true)
            .terminator(match opts.newline {
                CsvNewline::Lf => csv::Terminator::Any(b'\n'),
                CsvNewline::Crlf => csv::Terminator::CRLF,
            });
        let mut w = wb.from_writer(writer);

        let Some((rows, cols)) = SheetData::from_cells(self.cells.clone()).dimensions else {
            return Ok(());
        };
        for r in 1..=rows {
            let record: Vec<String> = (1..=cols)
                .map(|c| {
                    self.cells
                        .get(&(r, c))
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                })
                .collect();
            w.write_record(&record)
                .map_err(|e| IoError::from_backend("csv", e))?;
        }
        w.flush()?;
        Ok(())
    }
}

fn infer_field(field: &str, mode: CsvTypeInference) -> Option<CellValue> {
    if field.is_empty() {
        return None;
    }
    if mode == CsvTypeInference::Off {
        return Some(CellValue::Text(field.to_string()));
    }
    let t = field.trim();
    if let Ok(i) = t.parse::<i64>() {
        return Some(CellValue::Int(i));
    }
    if let Ok(n) = t.parse::<f64>() {
        if n.is_finite() {
            return Some(CellValue::Number(n));
        }
    }
    if t.eq_ignore_ascii_case("TRUE") {
        return Some(CellValue::Boolean(true));
    }
    if t.eq_ignore_ascii_case("FALSE") {
        return Some(CellValue::Boolean(false));
    }
    Some(CellValue::Text(field.to_string()))
}

impl SpreadsheetReader for CsvAdapter {
    type Error = IoError;

    fn sheet_names(&self) -> Result<Vec<String>, Self::Error> {
        Ok(vec![self.sheet_name.clone()])
    }

    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        Self::open_path_with_options(path, CsvReadOptions::default())
    }

    fn open_bytes(data: Vec<u8>) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        Self::open_bytes_with_options(data, CsvReadOptions::default())
    }

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, Self::Error> {
        if sheet != self.sheet_name {
            return Err(IoError::SheetNotFound {
                sheet: sheet.to_string(),
            });
        }
        Ok(SheetData::from_cells(self.cells.clone()))
    }
}

impl SpreadsheetWriter for CsvAdapter {
    type Error = IoError;

    fn create_sheet(&mut self, name: &str) -> Result<(), Self::Error> {
        if name == self.sheet_name {
            return Ok(());
        }
        if !self.cells.is_empty() {
            return Err(IoError::Unsupported {
                feature: "multiple sheets".to_string(),
                context: format!("csv already holds sheet `{}`", self.sheet_name),
            });
        }
        self.sheet_name = name.to_string();
        Ok(())
    }

    fn write_cell(
        &mut self,
        sheet: &str,
        row: u32,
        col: u32,
        value: &CellValue,
    ) -> Result<(), Self::Error> {
        if sheet != self.sheet_name {
            return Err(IoError::SheetNotFound {
                sheet: sheet.to_string(),
            });
        }
        if row == 0 || col == 0 {
            return Err(IoError::Backend {
                backend: "csv".to_string(),
                message: "cell coordinates are 1-based".to_string(),
            });
        }
        if value.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value.clone());
        }
        Ok(())
    }

    fn style_header(
        &mut self,
        _sheet: &str,
        _cols: u32,
        _style: &HeaderStyle,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn save_to(&mut self, dest: SaveDestination<'_>) -> Result<Option<Vec<u8>>, Self::Error> {
        match dest {
            SaveDestination::Path(path) => {
                let file = File::create(path)?;
                self.write_rect_csv(file)?;
                Ok(None)
            }
            SaveDestination::Writer(writer) => {
                self.write_rect_csv(writer)?;
                Ok(None)
            }
            SaveDestination::Bytes => {
                let mut buf: Vec<u8> = Vec::new();
                self.write_rect_csv(&mut buf)?;
                Ok(Some(buf))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_basic() {
        assert_eq!(infer_field("12", CsvTypeInference::Basic), Some(CellValue::Int(12)));
        assert_eq!(
            infer_field("1.5", CsvTypeInference::Basic),
            Some(CellValue::Number(1.5))
        );
        assert_eq!(
            infer_field("true", CsvTypeInference::Basic),
            Some(CellValue::Boolean(true))
        );
        assert_eq!(
            infer_field("ZRAX", CsvTypeInference::Basic),
            Some(CellValue::from("ZRAX"))
        );
        assert_eq!(infer_field("", CsvTypeInference::Basic), None);
    }

    #[test]
    fn inference_off_keeps_text() {
        assert_eq!(infer_field("12", CsvTypeInference::Off), Some(CellValue::from("12")));
    }
}

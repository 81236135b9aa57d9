//! Spreadsheet I/O for sheetroute.
//!
//! Backends decode payloads into sparse [`SheetData`]; the [`loader`] turns
//! those into dense [`sheetroute_common::Table`]s anchored at A1. Writers
//! encode a table back, with an optional styled header row.

pub mod backends;
pub mod error;
pub mod loader;
pub mod traits;

#[cfg(feature = "calamine")]
pub use backends::CalamineAdapter;
#[cfg(feature = "csv")]
pub use backends::CsvAdapter;
#[cfg(feature = "umya")]
pub use backends::UmyaAdapter;
pub use error::IoError;
pub use loader::{
    FileFormat, LoaderStats, WorkbookLoader, open_book, open_first_table, sheet_to_table,
    write_table,
};
pub use traits::{HeaderStyle, SaveDestination, SheetData, SpreadsheetReader, SpreadsheetWriter};

// Re-export for convenience
pub use sheetroute_common::{CellValue, SheetBook, Table};

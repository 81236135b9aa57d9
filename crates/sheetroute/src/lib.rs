//! Meta crate re-exporting the sheetroute layers, plus the output helpers used
//! by the `sheetroute` binary.
//!
//! - [`common`]: cell values, keys, tables and sheet books
//! - [`workbook`]: calamine / csv / umya readers and writers
//! - [`pipeline`]: normalize, enrich, categorize, assign, pivot, extract

pub mod report;

pub use sheetroute_common as common;
pub use sheetroute_pipeline as pipeline;
pub use sheetroute_workbook as workbook;

pub use sheetroute_common::{CellValue, Key, NamedTable, SheetBook, Table};
pub use sheetroute_pipeline::{
    AssigneeList, Assignees, Assignment, Bucket, FilterMode, Pipeline, PipelineConfig,
    PipelineError, PivotEntry, extract_column_a,
};
pub use sheetroute_workbook::{HeaderStyle, IoError, open_book, open_first_table, write_table};

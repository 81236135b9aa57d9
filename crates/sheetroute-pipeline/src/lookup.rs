use crate::config::PipelineConfig;
use crate::error::{PipelineError, TableRole};
use rustc_hash::{FxHashMap, FxHashSet};
use sheetroute_common::{CellValue, Key, SheetBook, Table, cell};

/// Exact-match key to value index; the first row holding a key wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoIndex {
    values: FxHashMap<Key, CellValue>,
}

impl InfoIndex {
    pub fn build(table: &Table, key_column: usize, value_column: usize) -> Self {
        let mut values = FxHashMap::default();
        for row in table.data() {
            if let Some(key) = cell(row, key_column).as_key() {
                values
                    .entry(key)
                    .or_insert_with(|| cell(row, value_column).clone());
            }
        }
        Self { values }
    }

    pub fn get(&self, key: &Key) -> Option<&CellValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Membership set of keys already resolved elsewhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuplicateIndex {
    keys: FxHashSet<Key>,
}

impl DuplicateIndex {
    pub fn build(table: &Table, key_column: usize) -> Self {
        let keys = table
            .data()
            .iter()
            .filter_map(|row| cell(row, key_column).as_key())
            .collect();
        Self { keys }
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lookups {
    pub info: InfoIndex,
    pub duplicates: DuplicateIndex,
}

fn select<'a>(
    book: &'a SheetBook,
    target: &str,
    role: TableRole,
) -> Result<&'a Table, PipelineError> {
    let sheet = book
        .locate(target)
        .ok_or_else(|| PipelineError::MissingWorksheet {
            role,
            target: target.to_string(),
        })?;
    if sheet.table.is_empty() {
        return Err(PipelineError::EmptySheet { table: role });
    }
    tracing::debug!(
        %role,
        sheet = sheet.name.as_str(),
        rows = sheet.table.len(),
        "selected worksheet"
    );
    Ok(&sheet.table)
}

/// Select the info and duplicate worksheets and index them.
pub fn build_lookups(
    info: &SheetBook,
    duplicates: &SheetBook,
    config: &PipelineConfig,
) -> Result<Lookups, PipelineError> {
    let _span = tracing::info_span!("build_lookups").entered();
    let info_table = select(info, &config.info_sheet, TableRole::Info)?;
    let dup_table = select(duplicates, &config.duplicate_sheet, TableRole::Duplicate)?;
    let lookups = Lookups {
        info: InfoIndex::build(info_table, config.info_key_column, config.info_value_column),
        duplicates: DuplicateIndex::build(dup_table, config.duplicate_key_column),
    };
    tracing::debug!(
        info_keys = lookups.info.len(),
        duplicate_keys = lookups.duplicates.len(),
        "built lookup indexes"
    );
    Ok(lookups)
}

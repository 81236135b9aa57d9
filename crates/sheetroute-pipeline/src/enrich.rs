use crate::error::{PipelineError, TableRole};
use crate::lookup::Lookups;
use sheetroute_common::{CellValue, Table, cell};

/// Header label of the appended info lookup column.
pub const INFO_HEADER: &str = "Info_VLOOKUP";
/// Header label of the appended duplicate lookup column.
pub const DUP_HEADER: &str = "Dup_VLOOKUP";

/// Left-join the normalized table against both indexes.
///
/// Rows are first padded to the table width so the two appended columns line
/// up under their headers. A miss writes `#N/A`; a duplicate hit writes the
/// key itself. A table with no header row is rejected; [`crate::Pipeline`]
/// never passes one since the normalizer rejects it first.
pub fn enrich(normalized: Table, lookups: &Lookups) -> Result<Table, PipelineError> {
    let width = normalized.width();
    let Some((mut header, mut data)) = normalized.into_parts() else {
        return Err(PipelineError::EmptySheet {
            table: TableRole::Normalized,
        });
    };
    let _span = tracing::info_span!("enrich", rows = data.len()).entered();

    header.resize(width, CellValue::Empty);
    header.push(CellValue::from(INFO_HEADER));
    header.push(CellValue::from(DUP_HEADER));

    let mut info_hits = 0usize;
    let mut dup_hits = 0usize;
    for row in &mut data {
        let key = cell(row, 0).as_key();
        let info = key
            .and_then(|k| lookups.info.get(&k))
            .cloned()
            .inspect(|_| info_hits += 1)
            .unwrap_or_else(CellValue::not_available);
        let dup = key
            .filter(|k| lookups.duplicates.contains(k))
            .map(|k| {
                dup_hits += 1;
                k.to_cell()
            })
            .unwrap_or_else(CellValue::not_available);
        row.resize(width, CellValue::Empty);
        row.push(info);
        row.push(dup);
    }
    tracing::debug!(info_hits, dup_hits, "joined lookups");
    Ok(Table::from_parts(header, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{DuplicateIndex, InfoIndex};
    use sheetroute_testkit::row;

    fn lookups() -> Lookups {
        let info = Table::new(vec![
            row!["", "key", "", "", "", "", "value"],
            row!["", 7, "", "", "", "", "JP desk"],
        ]);
        let dup = Table::new(vec![
            row!["", "", "", "", "", "", "key"],
            row!["", "", "", "", "", "", 7],
        ]);
        Lookups {
            info: InfoIndex::build(&info, 1, 6),
            duplicates: DuplicateIndex::build(&dup, 6),
        }
    }

    #[test]
    fn misses_write_not_available() {
        let t = Table::new(vec![row!["id", "CTR"], row![5, "a"], row![7, "b"]]);
        let out = enrich(t, &lookups()).unwrap();
        assert_eq!(out.header().unwrap(), &row!["id", "CTR", INFO_HEADER, DUP_HEADER]);
        assert_eq!(out.data()[0], row![5, "a", "#N/A", "#N/A"]);
        assert_eq!(out.data()[1], row![7, "b", "JP desk", 7]);
    }

    #[test]
    fn ragged_rows_are_aligned() {
        let t = Table::new(vec![row!["id", "CTR", "x"], row![5]]);
        let out = enrich(t, &lookups()).unwrap();
        let info_col = out.column_index(INFO_HEADER).unwrap();
        assert_eq!(info_col, 3);
        assert_eq!(out.data()[0].len(), 5);
        assert!(out.data()[0][info_col].is_not_available());
    }

    #[test]
    fn header_only_table_gains_labels() {
        let out = enrich(Table::new(vec![row!["id"]]), &lookups()).unwrap();
        assert_eq!(out.header().unwrap(), &row!["id", INFO_HEADER, DUP_HEADER]);
        assert_eq!(out.len(), 0);
    }

    #[test]
    fn empty_input_names_the_normalized_table() {
        let err = enrich(Table::default(), &lookups()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::EmptySheet {
                table: TableRole::Normalized
            }
        );
        assert_eq!(err.to_string(), "normalized table has no rows");
    }
}

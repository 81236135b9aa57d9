use crate::config::{FilterMode, FlagRule, PipelineConfig};
use crate::error::{PipelineError, TableRole};
use rustc_hash::FxHashSet;
use sheetroute_common::{CellValue, Row, Table, cell};

/// Row counts dropped by each normalization step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub unflagged: usize,
    pub non_numeric: usize,
    pub duplicates: usize,
}

/// Keep the header plus the data rows matching `rule`.
pub fn retain_flagged(table: &mut Table, rule: &FlagRule<'_>) -> usize {
    let Some((header, data)) = std::mem::take(table).into_parts() else {
        return 0;
    };
    let before = data.len();
    let kept: Vec<Row> = data.into_iter().filter(|r| rule.matches(r)).collect();
    let dropped = before - kept.len();
    *table = Table::from_parts(header, kept);
    dropped
}

/// Drop data rows whose first cell is not numeric, then every repeat of an
/// already seen key. Surviving rows carry the coerced key in cell 0.
///
/// Returns `(non_numeric, duplicates)`.
pub fn dedup_by_key(table: &mut Table) -> (usize, usize) {
    let Some((header, data)) = std::mem::take(table).into_parts() else {
        return (0, 0);
    };
    let mut seen = FxHashSet::default();
    let mut non_numeric = 0;
    let mut duplicates = 0;
    let mut kept = Vec::with_capacity(data.len());
    for mut row in data {
        let Some(key) = cell(&row, 0).as_key() else {
            non_numeric += 1;
            continue;
        };
        if !seen.insert(key) {
            duplicates += 1;
            continue;
        }
        row[0] = key.to_cell();
        kept.push(row);
    }
    *table = Table::from_parts(header, kept);
    (non_numeric, duplicates)
}

/// Delete the configured column block from every row and relabel the header
/// column that moved into its place.
pub fn prune_columns(table: &mut Table, config: &PipelineConfig) {
    if let Some(header) = table.header_mut() {
        config.prune(header);
        if header.len() <= config.prune_start {
            header.resize(config.prune_start + 1, CellValue::Empty);
        }
        header[config.prune_start] = CellValue::from(config.renamed_header.as_str());
    }
    for row in table.data_mut() {
        config.prune(row);
    }
}

/// Clean the primary table: optional flag filter, key coercion with
/// first-occurrence dedup, then column pruning and header relabel.
pub fn normalize(
    raw: Table,
    config: &PipelineConfig,
    mode: FilterMode,
) -> Result<(Table, NormalizeStats), PipelineError> {
    if raw.is_empty() {
        return Err(PipelineError::EmptySheet {
            table: TableRole::Raw,
        });
    }
    let _span = tracing::info_span!("normalize", rows = raw.len(), %mode).entered();
    let mut table = raw;
    let mut stats = NormalizeStats::default();
    if mode == FilterMode::OnlyFlagged {
        stats.unflagged = retain_flagged(&mut table, &config.raw_flag_rule());
    }
    (stats.non_numeric, stats.duplicates) = dedup_by_key(&mut table);
    prune_columns(&mut table, config);
    tracing::debug!(
        kept = table.len(),
        unflagged = stats.unflagged,
        non_numeric = stats.non_numeric,
        duplicates = stats.duplicates,
        "normalized primary table"
    );
    Ok((table, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetroute_testkit::row;

    fn raw_row(key: impl Into<CellValue>, flag: &str) -> Row {
        let mut r: Row = vec![key.into()];
        r.extend((1..=9).map(|i| CellValue::from(format!("c{i}"))));
        r.push(CellValue::from(flag));
        r
    }

    fn header() -> Row {
        (0..=10).map(|i| CellValue::from(format!("h{i}"))).collect()
    }

    #[test]
    fn keeps_first_numeric_key_only() {
        let raw = Table::from_parts(
            header(),
            vec![
                raw_row(5, "a"),
                raw_row("5", "b"),
                raw_row("abc", "c"),
                raw_row(7, "d"),
            ],
        );
        let (out, stats) = normalize(raw, &PipelineConfig::default(), FilterMode::None).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.data()[0][0], CellValue::Int(5));
        assert_eq!(out.data()[1][0], CellValue::Int(7));
        assert_eq!(cell(&out.data()[0], 4), &CellValue::from("a"));
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.non_numeric, 1);
    }

    #[test]
    fn prunes_block_and_renames_header() {
        let raw = Table::from_parts(header(), vec![raw_row(1, "x")]);
        let (out, _) = normalize(raw, &PipelineConfig::default(), FilterMode::None).unwrap();
        assert_eq!(
            out.header().unwrap(),
            &row!["h0", "CTR", "h8", "h9", "h10"]
        );
        assert_eq!(out.data()[0], row![1, "c7", "c8", "c9", "x"]);
    }

    #[test]
    fn numeric_text_keys_become_numbers() {
        let raw = Table::from_parts(header(), vec![raw_row(" 12 ", "x"), raw_row(2.5, "y")]);
        let (out, _) = normalize(raw, &PipelineConfig::default(), FilterMode::None).unwrap();
        assert_eq!(out.data()[0][0], CellValue::Int(12));
        assert_eq!(out.data()[1][0], CellValue::Number(2.5));
    }

    #[test]
    fn only_flagged_filters_before_dedup() {
        let raw = Table::from_parts(
            header(),
            vec![raw_row(5, "other"), raw_row(5, "ZRAX"), raw_row(6, "ZRAX")],
        );
        let (out, stats) =
            normalize(raw, &PipelineConfig::default(), FilterMode::OnlyFlagged).unwrap();
        assert_eq!(stats.unflagged, 1);
        assert_eq!(stats.duplicates, 0);
        assert_eq!(out.len(), 2);
        assert!(out.data().iter().all(|r| r[4] == CellValue::from("ZRAX")));
    }

    #[test]
    fn short_rows_are_never_flagged() {
        let raw = Table::from_parts(header(), vec![row![1, "b"], raw_row(2, "ZRAX")]);
        let (out, _) = normalize(raw, &PipelineConfig::default(), FilterMode::OnlyFlagged).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.data()[0][0], CellValue::Int(2));
    }

    #[test]
    fn prioritize_mode_keeps_every_row() {
        let raw = Table::from_parts(header(), vec![raw_row(1, "x"), raw_row(2, "ZRAX")]);
        let (out, _) =
            normalize(raw, &PipelineConfig::default(), FilterMode::PrioritizeFlagged).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn header_only_table_survives() {
        let raw = Table::new(vec![header()]);
        let (out, _) = normalize(raw, &PipelineConfig::default(), FilterMode::None).unwrap();
        assert_eq!(out.len(), 0);
        assert_eq!(out.header().unwrap()[1], CellValue::from("CTR"));
    }

    #[test]
    fn short_header_is_padded_for_relabel() {
        let raw = Table::new(vec![row!["id"], row![1]]);
        let (out, _) = normalize(raw, &PipelineConfig::default(), FilterMode::None).unwrap();
        assert_eq!(out.header().unwrap(), &row!["id", "CTR"]);
        assert_eq!(out.data()[0], row![1]);
    }

    #[test]
    fn empty_table_is_an_error() {
        let err = normalize(Table::default(), &PipelineConfig::default(), FilterMode::None)
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::EmptySheet {
                table: TableRole::Raw
            }
        );
    }
}

use crate::assign::Assignees;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use sheetroute_common::{CellValue, Row, cell};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_FLAG_VALUE: &str = "ZRAX";
pub const DEFAULT_RENAMED_HEADER: &str = "CTR";
pub const DEFAULT_OWNER_HEADER: &str = "Assignee";

/// Codes routed to the special bucket unless configured otherwise.
pub const DEFAULT_SPECIAL_CODES: [&str; 9] = ["RU", "UA", "NI", "VE", "BY", "CU", "IR", "KP", "SY"];

/// How the flag column steers filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    #[default]
    None,
    /// Flagged rows are categorized and assigned ahead of the rest.
    PrioritizeFlagged,
    /// Only flagged rows survive normalization.
    OnlyFlagged,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterMode::None => "none",
            FilterMode::PrioritizeFlagged => "prioritize-flagged",
            FilterMode::OnlyFlagged => "only-flagged",
        })
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "none" => Ok(FilterMode::None),
            "prioritize-flagged" | "prioritize" => Ok(FilterMode::PrioritizeFlagged),
            "only-flagged" | "only" => Ok(FilterMode::OnlyFlagged),
            other => Err(format!(
                "unknown filter mode `{other}` (expected none, prioritize-flagged or only-flagged)"
            )),
        }
    }
}

/// Matches rows whose flag cell reads exactly as the flag text. Numeric cells
/// compare through their display form, so `1` matches an `Int(1)` cell.
///
/// A missing column, or a row too short to reach it, never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagRule<'a> {
    pub column: Option<usize>,
    pub value: &'a str,
}

impl FlagRule<'_> {
    pub fn matches(&self, row: &[CellValue]) -> bool {
        let Some(col) = self.column else {
            return false;
        };
        match cell(row, col) {
            CellValue::Empty => false,
            CellValue::Text(s) => s == self.value,
            other => other.to_string() == self.value,
        }
    }
}

/// Positional constants and lookup targets for one pipeline run.
///
/// Column indexes are 0-based. `flag_column` and the lookup columns refer to
/// the tables as read; the categorizer derives the post-pruning flag position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// First column of the block the normalizer deletes.
    pub prune_start: usize,
    /// Last column (inclusive) of the deleted block.
    pub prune_end: usize,
    /// Header label written at `prune_start` after pruning.
    pub renamed_header: String,
    pub flag_column: usize,
    pub flag_value: String,
    pub info_key_column: usize,
    pub info_value_column: usize,
    pub duplicate_key_column: usize,
    /// Worksheet name fragment selecting the info table.
    pub info_sheet: String,
    /// Worksheet name fragment selecting the duplicate table.
    pub duplicate_sheet: String,
    pub special_codes: Vec<String>,
    pub owner_header: String,
    pub assignees: Assignees,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            prune_start: 1,
            prune_end: 6,
            renamed_header: DEFAULT_RENAMED_HEADER.to_string(),
            flag_column: 10,
            flag_value: DEFAULT_FLAG_VALUE.to_string(),
            info_key_column: 1,
            info_value_column: 6,
            duplicate_key_column: 6,
            info_sheet: "info".to_string(),
            duplicate_sheet: "dup".to_string(),
            special_codes: DEFAULT_SPECIAL_CODES.iter().map(|c| c.to_string()).collect(),
            owner_header: DEFAULT_OWNER_HEADER.to_string(),
            assignees: Assignees::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prune_start == 0 {
            return Err(ConfigError::PruneKeyColumn);
        }
        if self.prune_start > self.prune_end {
            return Err(ConfigError::InvertedPrune {
                start: self.prune_start,
                end: self.prune_end,
            });
        }
        if self.flag_value.is_empty() {
            return Err(ConfigError::EmptyFlagValue);
        }
        Ok(())
    }

    fn pruned_width(&self) -> usize {
        self.prune_end - self.prune_start + 1
    }

    /// Delete the prune block from `row`; rows ending inside it are cut short.
    pub fn prune(&self, row: &mut Row) {
        if row.len() <= self.prune_start {
            return;
        }
        let end = (self.prune_end + 1).min(row.len());
        row.drain(self.prune_start..end);
    }

    /// Where column `col` lands after pruning; `None` if it is deleted.
    pub fn column_after_prune(&self, col: usize) -> Option<usize> {
        if col < self.prune_start {
            Some(col)
        } else if col > self.prune_end {
            Some(col - self.pruned_width())
        } else {
            None
        }
    }

    pub fn flag_column_after_prune(&self) -> Option<usize> {
        self.column_after_prune(self.flag_column)
    }

    /// Flag rule over raw (unpruned) rows.
    pub fn raw_flag_rule(&self) -> FlagRule<'_> {
        FlagRule {
            column: Some(self.flag_column),
            value: &self.flag_value,
        }
    }

    /// Flag rule over normalized and enriched rows.
    pub fn pruned_flag_rule(&self) -> FlagRule<'_> {
        FlagRule {
            column: self.flag_column_after_prune(),
            value: &self.flag_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetroute_testkit::row;

    #[test]
    fn prune_removes_inclusive_block() {
        let cfg = PipelineConfig::default();
        let mut r = row![0, 1, 2, 3, 4, 5, 6, 7, 8];
        cfg.prune(&mut r);
        assert_eq!(r, row![0, 7, 8]);
    }

    #[test]
    fn prune_handles_short_rows() {
        let cfg = PipelineConfig::default();
        let mut r = row![0, 1, 2];
        cfg.prune(&mut r);
        assert_eq!(r, row![0]);

        let mut only_key = row![0];
        cfg.prune(&mut only_key);
        assert_eq!(only_key, row![0]);
    }

    #[test]
    fn columns_shift_left_past_the_block() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.column_after_prune(0), Some(0));
        assert_eq!(cfg.column_after_prune(3), None);
        assert_eq!(cfg.column_after_prune(7), Some(1));
        assert_eq!(cfg.flag_column_after_prune(), Some(4));
    }

    #[test]
    fn flag_rule_requires_exact_text() {
        let rule = FlagRule {
            column: Some(1),
            value: "ZRAX",
        };
        assert!(rule.matches(&row![1, "ZRAX"]));
        assert!(!rule.matches(&row![1, "zrax"]));
        assert!(!rule.matches(&row![1, " ZRAX"]));
        assert!(!rule.matches(&row![1]));
        let unreachable = FlagRule {
            column: None,
            value: "ZRAX",
        };
        assert!(!unreachable.matches(&row![1, "ZRAX"]));
    }

    #[test]
    fn numeric_flag_value_matches_decoded_numbers() {
        let rule = FlagRule {
            column: Some(1),
            value: "1",
        };
        assert!(rule.matches(&row![7, 1]));
        assert!(rule.matches(&row![7, 1.0]));
        assert!(rule.matches(&row![7, "1"]));
        assert!(!rule.matches(&row![7, 2]));
        assert!(!rule.matches(&row![7, CellValue::Empty]));
    }

    #[test]
    fn filter_mode_parses_cli_spellings() {
        assert_eq!("none".parse::<FilterMode>(), Ok(FilterMode::None));
        assert_eq!(
            "Prioritize_Flagged".parse::<FilterMode>(),
            Ok(FilterMode::PrioritizeFlagged)
        );
        assert_eq!("only".parse::<FilterMode>(), Ok(FilterMode::OnlyFlagged));
        assert!("sometimes".parse::<FilterMode>().is_err());
        assert_eq!(FilterMode::OnlyFlagged.to_string(), "only-flagged");
    }

    #[test]
    fn validate_rejects_inverted_block_and_blank_flag() {
        let cfg = PipelineConfig {
            prune_start: 4,
            prune_end: 2,
            ..PipelineConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvertedPrune { start: 4, end: 2 })
        );
        let cfg = PipelineConfig {
            flag_value: String::new(),
            ..PipelineConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyFlagValue));
    }

    #[test]
    fn validate_rejects_pruning_the_key_column() {
        let cfg = PipelineConfig {
            prune_start: 0,
            prune_end: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::PruneKeyColumn));
    }

    #[test]
    fn yaml_overrides_merge_with_defaults() {
        let cfg: PipelineConfig = serde_yaml::from_str(
            "special_codes: [RU, UA, IR, KP, SY]\nflag_column: 12\nassignees:\n  cn: [Alice, Bob]\n",
        )
        .unwrap();
        assert_eq!(cfg.special_codes.len(), 5);
        assert_eq!(cfg.flag_column, 12);
        assert_eq!(cfg.prune_end, 6);
        assert_eq!(cfg.assignees.cn.names(), ["Alice", "Bob"]);
        assert!(cfg.assignees.general.is_empty());
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        assert!(serde_yaml::from_str::<PipelineConfig>("flag_col: 3\n").is_err());
    }
}

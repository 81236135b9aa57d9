//! Spreadsheet row routing.
//!
//! `process` normalizes a raw export, joins it against an info table and a
//! duplicate table, and appends the two lookup columns. `assign` drops rows the
//! duplicate lookup already resolved, buckets the rest by their info value and
//! hands each bucket round-robin to its assignees. `extract_column_a` is the
//! standalone unique-number extractor.
//!
//! Every stage is a pure, sequential transform of owned [`Table`]s; row order
//! decides both bucket order and owner rotation.

pub mod assign;
pub mod categorize;
pub mod config;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod lookup;
pub mod normalize;
pub mod pivot;

pub use assign::{AssigneeList, Assignees, assign_owners, owner_for};
pub use categorize::{Bucket, Categorized, Categorizer, categorize};
pub use config::{FilterMode, PipelineConfig};
pub use enrich::{DUP_HEADER, INFO_HEADER, enrich};
pub use error::{ConfigError, PipelineError, TableRole};
pub use extract::extract_column_a;
pub use lookup::{DuplicateIndex, InfoIndex, Lookups, build_lookups};
pub use normalize::{NormalizeStats, normalize};
pub use pivot::{PivotEntry, pivot};

use sheetroute_common::{SheetBook, Table};

/// Final table and owner counts produced by [`Pipeline::assign`].
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub table: Table,
    pub pivot: Vec<PivotEntry>,
}

/// A validated configuration bound to the pipeline entry points.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Normalize `raw` and enrich it from the info and duplicate workbooks.
    pub fn process(
        &self,
        raw: Table,
        info: &SheetBook,
        duplicates: &SheetBook,
        mode: FilterMode,
    ) -> Result<Table, PipelineError> {
        let _span = tracing::info_span!("process", %mode).entered();
        let (normalized, _) = normalize(raw, &self.config, mode)?;
        let lookups = build_lookups(info, duplicates, &self.config)?;
        enrich(normalized, &lookups)
    }

    /// Filter, bucket and assign an enriched table, then tally owners.
    pub fn assign(
        &self,
        enriched: Table,
        assignees: &Assignees,
        mode: FilterMode,
    ) -> Result<Assignment, PipelineError> {
        let categorized = categorize(enriched, &self.config, mode)?;
        tracing::debug!(
            open = categorized.len(),
            resolved = categorized.resolved,
            "filtered resolved rows"
        );
        let table = assign_owners(categorized, assignees, &self.config.owner_header);
        let pivot = pivot(&table);
        Ok(Assignment { table, pivot })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }
}

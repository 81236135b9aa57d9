//! Resolved-row filtering and bucket partitioning.
//!
//! Rows whose duplicate lookup hit are dropped. The rest are classified by
//! their info lookup value through an ordered rule list: the first rule that
//! matches decides the bucket, so a value naming both `CN` and `JP` lands in
//! CN.

use crate::config::{FilterMode, PipelineConfig};
use crate::enrich::{DUP_HEADER, INFO_HEADER};
use crate::error::{PipelineError, TableRole};
use serde::{Deserialize, Serialize};
use sheetroute_common::{CellValue, Row, Table, cell};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Cn,
    Jp,
    Special,
    General,
}

impl Bucket {
    /// Output order within a partition.
    pub const ALL: [Bucket; 4] = [Bucket::Cn, Bucket::Jp, Bucket::Special, Bucket::General];

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Cn => "CN",
            Bucket::Jp => "JP",
            Bucket::Special => "SPECIAL",
            Bucket::General => "GENERAL",
        }
    }

    /// Owner written when the bucket has no assignees.
    pub fn sentinel(self) -> &'static str {
        match self {
            Bucket::Cn => "UNASSIGNED_CN",
            Bucket::Jp => "UNASSIGNED_JP",
            Bucket::Special => "UNASSIGNED_SPECIAL",
            Bucket::General => "UNASSIGNED_GENERAL",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Predicate over the upper-cased info lookup text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryTest {
    Contains(String),
    ContainsAny(Vec<String>),
    Always,
}

impl CategoryTest {
    fn matches(&self, haystack: &str) -> bool {
        match self {
            CategoryTest::Contains(code) => haystack.contains(code.as_str()),
            CategoryTest::ContainsAny(codes) => {
                codes.iter().any(|c| haystack.contains(c.as_str()))
            }
            CategoryTest::Always => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub test: CategoryTest,
    pub bucket: Bucket,
}

/// Ordered first-match-wins rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

impl Categorizer {
    /// CN, then JP, then any special code, then GENERAL.
    pub fn new<S: AsRef<str>>(special_codes: &[S]) -> Self {
        let special = special_codes
            .iter()
            .map(|c| c.as_ref().trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect();
        Self::from_rules(vec![
            CategoryRule {
                test: CategoryTest::Contains("CN".to_string()),
                bucket: Bucket::Cn,
            },
            CategoryRule {
                test: CategoryTest::Contains("JP".to_string()),
                bucket: Bucket::Jp,
            },
            CategoryRule {
                test: CategoryTest::ContainsAny(special),
                bucket: Bucket::Special,
            },
        ])
    }

    /// Rules are evaluated in order; GENERAL catches whatever none of them match.
    pub fn from_rules(mut rules: Vec<CategoryRule>) -> Self {
        rules.push(CategoryRule {
            test: CategoryTest::Always,
            bucket: Bucket::General,
        });
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn classify(&self, value: &CellValue) -> Bucket {
        let text = value.to_string().to_uppercase();
        self.rules
            .iter()
            .find(|r| r.test.matches(&text))
            .map_or(Bucket::General, |r| r.bucket)
    }
}

/// Rows of one partition split by bucket, each in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    rows: [Vec<Row>; 4],
}

impl Buckets {
    pub fn push(&mut self, bucket: Bucket, row: Row) {
        self.rows[bucket.slot()].push(row);
    }

    pub fn get(&self, bucket: Bucket) -> &[Row] {
        &self.rows[bucket.slot()]
    }

    /// Total rows across all buckets.
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buckets in output order.
    pub fn into_buckets(self) -> impl Iterator<Item = (Bucket, Vec<Row>)> {
        Bucket::ALL.into_iter().zip(self.rows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    All,
    Flagged,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub kind: PartitionKind,
    pub buckets: Buckets,
}

/// Unresolved rows grouped for assignment, plus the enriched header.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorized {
    pub header: Row,
    /// Flagged before other under PRIORITIZE-FLAGGED; a single `All` partition otherwise.
    pub partitions: Vec<Partition>,
    /// Rows dropped because the duplicate lookup matched.
    pub resolved: usize,
}

impl Categorized {
    pub fn len(&self) -> usize {
        self.partitions.iter().map(|p| p.buckets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows in final output order.
    pub fn into_rows(self) -> Vec<Row> {
        self.partitions
            .into_iter()
            .flat_map(|p| p.buckets.into_buckets().flat_map(|(_, rows)| rows))
            .collect()
    }
}

fn bucketize(rows: Vec<Row>, categorizer: &Categorizer, info_col: usize) -> Buckets {
    let mut buckets = Buckets::default();
    for row in rows {
        let bucket = categorizer.classify(cell(&row, info_col));
        buckets.push(bucket, row);
    }
    buckets
}

/// Drop resolved rows and partition the rest into buckets.
pub fn categorize(
    enriched: Table,
    config: &PipelineConfig,
    mode: FilterMode,
) -> Result<Categorized, PipelineError> {
    let missing = |column: &str| PipelineError::MissingColumn {
        column: column.to_string(),
    };
    if enriched.is_empty() {
        return Err(PipelineError::EmptySheet {
            table: TableRole::Enriched,
        });
    }
    let info_col = enriched
        .column_index(INFO_HEADER)
        .ok_or_else(|| missing(INFO_HEADER))?;
    let dup_col = enriched
        .column_index(DUP_HEADER)
        .ok_or_else(|| missing(DUP_HEADER))?;
    let Some((header, data)) = enriched.into_parts() else {
        return Err(PipelineError::EmptySheet {
            table: TableRole::Enriched,
        });
    };
    let _span = tracing::info_span!("categorize", rows = data.len(), %mode).entered();

    let total = data.len();
    let open: Vec<Row> = data
        .into_iter()
        .filter(|r| cell(r, dup_col).is_not_available())
        .collect();
    let resolved = total - open.len();

    let categorizer = Categorizer::new(&config.special_codes);
    let partitions = if mode == FilterMode::PrioritizeFlagged {
        let rule = config.pruned_flag_rule();
        let (flagged, other): (Vec<Row>, Vec<Row>) =
            open.into_iter().partition(|r| rule.matches(r));
        vec![
            Partition {
                kind: PartitionKind::Flagged,
                buckets: bucketize(flagged, &categorizer, info_col),
            },
            Partition {
                kind: PartitionKind::Other,
                buckets: bucketize(other, &categorizer, info_col),
            },
        ]
    } else {
        vec![Partition {
            kind: PartitionKind::All,
            buckets: bucketize(open, &categorizer, info_col),
        }]
    };

    for p in &partitions {
        tracing::debug!(
            partition = ?p.kind,
            cn = p.buckets.get(Bucket::Cn).len(),
            jp = p.buckets.get(Bucket::Jp).len(),
            special = p.buckets.get(Bucket::Special).len(),
            general = p.buckets.get(Bucket::General).len(),
            "bucket sizes"
        );
    }
    Ok(Categorized {
        header,
        partitions,
        resolved,
    })
}

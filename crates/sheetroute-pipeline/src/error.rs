use std::fmt;
use thiserror::Error;

/// Which input a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    Raw,
    Info,
    Duplicate,
    Normalized,
    Enriched,
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableRole::Raw => "raw",
            TableRole::Info => "info",
            TableRole::Duplicate => "duplicate",
            TableRole::Normalized => "normalized",
            TableRole::Enriched => "enriched",
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("prune block is inverted: start {start} > end {end}")]
    InvertedPrune { start: usize, end: usize },
    #[error("prune block must not start at column 0, which holds the key")]
    PruneKeyColumn,
    #[error("flag value must not be empty")]
    EmptyFlagValue,
}

/// Terminal failures of one pipeline invocation. Numeric coercion misses are
/// never errors; they only exclude the affected value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("{table} table has no rows")]
    EmptySheet { table: TableRole },

    #[error("no usable worksheet for the {role} table (wanted a name containing `{target}`)")]
    MissingWorksheet { role: TableRole, target: String },

    #[error("column `{column}` is missing from the header")]
    MissingColumn { column: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

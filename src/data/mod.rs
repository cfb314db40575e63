/// Data layer: core types, loading, filtering, statistics and export.
///
/// Architecture:
/// ```text
///   .xlsx workbook
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  year sheet → RawSheet → Table (fixed 16-field schema)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  project columns → trim trailing rows → equality filter
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  stats    │   │  export   │  summary, month series, histogram / CSV
///   └──────────┘   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;

use thiserror::Error;

use model::Field;

/// Typed failures of the loading and filtering pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    #[error("sheet has {found} columns after the header rows, expected at least {expected}")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("column {0} is not part of the table")]
    UnknownColumn(Field),

    #[error("'{0}' is not a known column name")]
    UnknownField(String),

    #[error("workbook has no year sheet named '{0}'")]
    UnknownSheet(String),
}

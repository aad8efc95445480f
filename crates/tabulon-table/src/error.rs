//! Error types for the table engine.

use thiserror::Error;

/// Errors raised while loading records or configuring a table.
///
/// Filtering, sorting and paging never fail; only input and configuration
/// mistakes are reported.
#[derive(Debug, Error)]
pub enum TableError {
    /// Record input was not valid JSON.
    #[error("invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A record was not a JSON object.
    #[error("expected a record object, found {found}")]
    NotAnObject { found: &'static str },

    /// The record list was not a JSON array.
    #[error("expected an array of records, found {found}")]
    NotAnArray { found: &'static str },

    /// Page size must be at least one row.
    #[error("page size must be greater than zero")]
    ZeroPageSize,

    /// Two columns share an id.
    #[error("duplicate column id '{0}'")]
    DuplicateColumn(String),

    /// A column id referenced by name does not exist.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

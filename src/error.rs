//! Error types for minisql-core.
//!
//! Every failure is terminal: a query either executes or is rejected with
//! one of these classified errors. Hosts are expected to show the display
//! string verbatim.

use thiserror::Error;

/// Query engine error type
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Unsupported query type: {0}")]
    UnsupportedQueryKind(String),

    #[error("FROM clause is required")]
    MissingFromClause,

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

impl serde::Serialize for QueryError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

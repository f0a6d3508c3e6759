//! MiniSQL Core - embedded query engine over fixed in-memory tables.
//!
//! This crate parses a constrained SQL-like language and evaluates it
//! against named in-memory tables, producing a result table (ordered rows
//! of named columns). It has no storage engine, no persistence and no
//! presentation concerns: hosts supply the catalog and render the result.
//!
//! # Main Components
//!
//! - **Lexer/Parser**: tokenize a query string and build a typed statement
//! - **Catalog**: the fixed read-only set of named tables
//! - **Executor**: runs the clause pipeline (FROM, WHERE, GROUP BY,
//!   HAVING, ORDER BY, projection) and the UNION/INTERSECT/EXCEPT
//!   set operations
//!
//! # Example
//!
//! ```rust
//! use minisql_core::{Catalog, Executor};
//!
//! let executor = Executor::new(Catalog::sample());
//!
//! let rows = executor
//!     .execute("SELECT name, department FROM employees WHERE department = 'Engineering'")
//!     .unwrap();
//! assert_eq!(rows.len(), 3);
//! assert_eq!(rows[0]["name"], "Jane Smith");
//! ```

pub mod catalog;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod parser;

// Re-export main types for convenience
pub use catalog::{Catalog, Row, Table};
pub use error::{QueryError, QueryResult};
pub use executor::{Executor, ExecutorConfig};
pub use lexer::{Lexer, Token};
pub use parser::{
    AggregateFunc, CompareOp, Condition, ConditionExpr, OrderByItem, Parser, SelectColumn,
    SelectStatement, SetOp, Statement,
};

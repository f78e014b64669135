//! SQL parsing module.
//!
//! Turns raw SQL text plus a dialect tag into a structured query model:
//!
//! - [`dialect`] - dialect enumeration mapped onto sqlparser grammars
//! - [`query`] - the parsed query value model and complexity metrics
//! - [`parser`] - the never-raising structural parser

pub mod dialect;
pub mod parser;
pub mod query;

pub use dialect::Dialect;
pub use parser::{parse_query, parse_statements, QueryParser};
pub use query::{
    AggregateKind, ColumnType, Complexity, JoinKind, ParsedColumn, ParsedJoin, ParsedQuery,
    ParsedTable, QueryMetrics, QueryType,
};

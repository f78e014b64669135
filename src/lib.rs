//! # Strata
//!
//! Discovers business hierarchies hidden in SQL CASE statements.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SQL Source + Dialect                    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::parser]
//! ┌─────────────────────────────────────────────────────────┐
//! │       ParsedQuery (tables, columns, joins, metrics)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [case::extractor]
//! ┌─────────────────────────────────────────────────────────┐
//! │     CaseStatement (conditions, entity type, pattern)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [hierarchy::converter]
//! ┌─────────────────────────────────────────────────────────┐
//! │    ConvertedHierarchy (nodes, edges, mapping) + rows     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage degrades instead of failing: malformed SQL yields a
//! [`sql::query::ParsedQuery`] with `parse_errors` populated and zero
//! extracted statements, never a panic or a hard error.

pub mod case;
pub mod discover;
pub mod hash;
pub mod hierarchy;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::case::{
        CaseExtractor, CaseStatement, ConditionPattern, EntityType, ResultType,
    };
    pub use crate::discover::{discover, Discovery};
    pub use crate::hierarchy::{
        to_hierarchy_rows, to_mapping_rows, ConvertedHierarchy, HierarchyConverter,
        HierarchyNode, SourceColumns,
    };
    pub use crate::sql::dialect::Dialect;
    pub use crate::sql::parser::{parse_query, parse_statements, QueryParser};
    pub use crate::sql::query::{ParsedQuery, QueryType};
}

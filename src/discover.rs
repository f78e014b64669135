//! End-to-end discovery from SQL text to hierarchies.
//!
//! This module provides the high-level API tying the pipeline together:
//!
//! ```text
//! SQL Source → Parse → CASE Extraction → Classification → Hierarchies
//! ```
//!
//! # Example
//!
//! ```ignore
//! use strata::discover::discover;
//! use strata::sql::Dialect;
//!
//! let sql = r#"
//!     SELECT
//!         CASE
//!             WHEN account_code LIKE '4%' THEN 'Revenue'
//!             WHEN account_code LIKE '5%' THEN 'COGS'
//!             ELSE 'Other'
//!         END AS category,
//!         SUM(amount) AS total
//!     FROM gl_entries
//!     GROUP BY 1
//! "#;
//!
//! let discovery = discover(sql, Dialect::Snowflake);
//! for hierarchy in &discovery.hierarchies {
//!     println!("{} ({} nodes)", hierarchy.name, hierarchy.total_nodes);
//! }
//! ```
//!
//! Discovery never fails: parse problems surface as `parse_errors` on the
//! returned query and simply yield fewer (or zero) hierarchies.

use tracing::info;

use crate::case::{CaseExtractor, CaseStatement};
use crate::hierarchy::{ConvertedHierarchy, HierarchyConverter};
use crate::sql::parser::QueryParser;
use crate::sql::query::ParsedQuery;
use crate::sql::Dialect;

/// Everything one discovery pass produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    /// Structural parse of the input (first statement when given a batch).
    pub parsed: ParsedQuery,
    /// Extracted CASE statements, in query order.
    pub statements: Vec<CaseStatement>,
    /// Converted hierarchies: nested chains first, then standalones.
    pub hierarchies: Vec<ConvertedHierarchy>,
}

/// Run the full pipeline over one SQL string.
pub fn discover(sql: &str, dialect: Dialect) -> Discovery {
    let parsed = QueryParser::new(dialect).parse(sql);
    let statements = CaseExtractor::new(dialect).extract_from_sql(sql);
    let hierarchies = HierarchyConverter::new().convert_multiple(&statements);
    info!(
        dialect = %dialect,
        cases = statements.len(),
        hierarchies = hierarchies.len(),
        degraded = parsed.is_degraded(),
        "discovery pass complete"
    );
    Discovery {
        parsed,
        statements,
        hierarchies,
    }
}

/// Run the pipeline over a multi-statement batch; each statement parses
/// independently, and CASE statements from all of them convert together so
/// cross-statement chains are still detected.
pub fn discover_batch(sql: &str, dialect: Dialect) -> (Vec<ParsedQuery>, Discovery) {
    let parser = QueryParser::new(dialect);
    let queries = parser.parse_multiple(sql);
    let discovery = discover(sql, dialect);
    (queries, discovery)
}

//! Structured query model produced by the query parser.
//!
//! These are pure value types: one [`ParsedQuery`] per SQL statement, holding
//! the tables, columns, joins, and CTEs the parser could extract, plus
//! [`QueryMetrics`] summarizing structural complexity. Parsing never fails
//! outright - a statement that cannot be parsed yields a `ParsedQuery` with
//! [`QueryType::Unknown`] and the failure message in `parse_errors`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::dialect::Dialect;

// =============================================================================
// Query Type
// =============================================================================

/// Kind of SQL statement, determined from the root AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    CreateTable,
    CreateView,
    #[default]
    Unknown,
}

// =============================================================================
// Tables
// =============================================================================

/// A table referenced by a query.
///
/// Subqueries in the FROM clause are captured as tables too, with a synthetic
/// `subquery_N` alias and their SQL preserved verbatim in `subquery_sql`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedTable {
    pub name: String,
    pub schema: Option<String>,
    pub database: Option<String>,
    pub alias: Option<String>,
    pub is_subquery: bool,
    pub subquery_sql: Option<String>,
}

impl ParsedTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Deduplication key: two references to the same table with the same
    /// alias collapse into one entry.
    pub fn dedup_key(&self) -> (Option<&str>, Option<&str>, &str, Option<&str>) {
        (
            self.database.as_deref(),
            self.schema.as_deref(),
            &self.name,
            self.alias.as_deref(),
        )
    }
}

// =============================================================================
// Columns
// =============================================================================

/// Aggregation function kinds recognized by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Sum,
    Avg,
    Count,
    CountDistinct,
    Min,
    Max,
    ListAgg,
    ArrayAgg,
}

/// Coarse data type inferred for a SELECT-list column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    Timestamp,
    #[default]
    Unknown,
}

/// A SELECT-list column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedColumn {
    /// Output name: the alias if present, otherwise the column's own name,
    /// otherwise a truncated SQL fragment.
    pub name: String,
    /// Underlying column name when the output is a plain (possibly aliased)
    /// column reference.
    pub source_name: Option<String>,
    /// Table or alias qualifying the source column, when qualified.
    pub table_ref: Option<String>,
    /// True when the column is computed: aggregation, CASE, operator, or any
    /// non-column function call.
    pub is_derived: bool,
    /// Raw SQL of the expression, captured only for derived columns.
    pub expression: Option<String>,
    pub aggregation: Option<AggregateKind>,
    pub data_type: ColumnType,
    /// True when the expression contains a CASE node.
    pub is_case_statement: bool,
    /// Content-hash id linking this column to the case extractor's output.
    pub case_statement_id: Option<String>,
    /// 0-based index in the SELECT list.
    pub position: usize,
}

// =============================================================================
// Joins
// =============================================================================

/// Join kind. sqlparser folds `LEFT JOIN` and `LEFT OUTER JOIN` into one
/// node, so the outer-ness distinction is not preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// A JOIN with its first equality condition decomposed into table/column
/// operands where possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedJoin {
    pub kind: JoinKind,
    pub table: String,
    pub left_table: Option<String>,
    pub left_column: Option<String>,
    pub right_table: Option<String>,
    pub right_column: Option<String>,
    /// Equality conditions beyond the first, rendered as SQL.
    pub additional_conditions: Vec<String>,
    /// The full ON expression, rendered as SQL.
    pub raw_condition: Option<String>,
}

// =============================================================================
// Metrics
// =============================================================================

/// Structural complexity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    #[default]
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    /// Bucket a weighted complexity score: <=5 simple, <=15 moderate,
    /// otherwise complex.
    pub fn from_score(score: usize) -> Self {
        match score {
            0..=5 => Complexity::Simple,
            6..=15 => Complexity::Moderate,
            _ => Complexity::Complex,
        }
    }
}

/// Counts and flags summarizing one parsed statement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryMetrics {
    pub table_count: usize,
    pub join_count: usize,
    pub column_count: usize,
    pub case_count: usize,
    pub subquery_count: usize,
    pub cte_count: usize,
    pub aggregation_count: usize,
    pub has_group_by: bool,
    pub has_having: bool,
    pub has_order_by: bool,
    pub has_limit: bool,
    pub has_union: bool,
    pub has_window: bool,
    /// Maximum subquery containment depth.
    pub nesting_depth: usize,
    pub estimated_complexity: Complexity,
}

impl QueryMetrics {
    /// Weighted complexity score:
    /// `tables*1 + joins*2 + cases*2 + subqueries*3 + ctes*2 + nesting_depth*3`.
    pub fn score(&self) -> usize {
        self.table_count
            + self.join_count * 2
            + self.case_count * 2
            + self.subquery_count * 3
            + self.cte_count * 2
            + self.nesting_depth * 3
    }

    /// Recompute `estimated_complexity` from the current counts.
    pub fn finalize(&mut self) {
        self.estimated_complexity = Complexity::from_score(self.score());
    }
}

// =============================================================================
// Parsed Query
// =============================================================================

/// One parsed SQL statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// The original SQL text.
    pub sql: String,
    pub dialect: Dialect,
    pub query_type: QueryType,
    pub tables: Vec<ParsedTable>,
    pub columns: Vec<ParsedColumn>,
    pub joins: Vec<ParsedJoin>,
    /// CTE name -> CTE body SQL.
    pub ctes: HashMap<String, String>,
    pub where_clause: Option<String>,
    pub having_clause: Option<String>,
    pub group_by: Vec<String>,
    pub order_by: Vec<String>,
    pub metrics: QueryMetrics,
    /// Non-empty when parsing degraded; `query_type` is then `Unknown`.
    pub parse_errors: Vec<String>,
}

impl ParsedQuery {
    /// An empty result for a statement we are about to fill in.
    pub fn empty(sql: &str, dialect: Dialect) -> Self {
        Self {
            sql: sql.into(),
            dialect,
            query_type: QueryType::Unknown,
            tables: Vec::new(),
            columns: Vec::new(),
            joins: Vec::new(),
            ctes: HashMap::new(),
            where_clause: None,
            having_clause: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
            metrics: QueryMetrics::default(),
            parse_errors: Vec::new(),
        }
    }

    /// A degraded result carrying the parse failure message.
    pub fn failed(sql: &str, dialect: Dialect, message: String) -> Self {
        let mut query = Self::empty(sql, dialect);
        query.parse_errors.push(message);
        query
    }

    /// Whether parsing degraded instead of completing.
    pub fn is_degraded(&self) -> bool {
        !self.parse_errors.is_empty()
    }
}

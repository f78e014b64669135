//! Integration tests for the structural SQL parser.
//!
//! These exercise the parser the way the pipeline uses it: raw SQL in,
//! structured query model out, never an error for malformed input.

use strata::sql::query::{Complexity, JoinKind, QueryType};
use strata::sql::{parse_query, parse_statements, Dialect, QueryParser};

// ============================================================================
// Basic Parsing
// ============================================================================

#[test]
fn test_simple_select() {
    let parsed = parse_query("SELECT id, name FROM customers", Dialect::Generic);

    assert_eq!(parsed.query_type, QueryType::Select);
    assert!(!parsed.is_degraded());
    assert_eq!(parsed.tables.len(), 1);
    assert_eq!(parsed.tables[0].name, "customers");
    assert_eq!(parsed.columns.len(), 2);
    assert_eq!(parsed.columns[0].name, "id");
    assert_eq!(parsed.columns[1].name, "name");
}

#[test]
fn test_qualified_table_names() {
    let parsed = parse_query(
        "SELECT * FROM analytics.finance.gl_entries ge",
        Dialect::Snowflake,
    );

    assert_eq!(parsed.tables.len(), 1);
    let table = &parsed.tables[0];
    assert_eq!(table.name, "gl_entries");
    assert_eq!(table.schema.as_deref(), Some("finance"));
    assert_eq!(table.database.as_deref(), Some("analytics"));
    assert_eq!(table.alias.as_deref(), Some("ge"));
}

#[test]
fn test_statement_kinds() {
    let cases = [
        ("SELECT 1", QueryType::Select),
        ("INSERT INTO t (a) VALUES (1)", QueryType::Insert),
        ("UPDATE t SET a = 1", QueryType::Update),
        ("DELETE FROM t WHERE a = 1", QueryType::Delete),
        ("CREATE TABLE t (a INT)", QueryType::CreateTable),
        ("CREATE VIEW v AS SELECT 1", QueryType::CreateView),
    ];
    for (sql, expected) in cases {
        let parsed = parse_query(sql, Dialect::Generic);
        assert_eq!(parsed.query_type, expected, "for {sql}");
    }
}

// ============================================================================
// Joins
// ============================================================================

#[test]
fn test_join_extraction() {
    let parsed = parse_query(
        "SELECT o.id, c.name \
         FROM orders o \
         JOIN customers c ON o.customer_id = c.id AND o.region = c.region \
         LEFT JOIN payments p ON p.order_id = o.id",
        Dialect::Postgres,
    );

    assert_eq!(parsed.tables.len(), 3);
    assert_eq!(parsed.joins.len(), 2);

    let first = &parsed.joins[0];
    assert_eq!(first.kind, JoinKind::Inner);
    assert_eq!(first.table, "customers");
    assert_eq!(first.left_table.as_deref(), Some("o"));
    assert_eq!(first.left_column.as_deref(), Some("customer_id"));
    assert_eq!(first.right_table.as_deref(), Some("c"));
    assert_eq!(first.right_column.as_deref(), Some("id"));
    assert_eq!(first.additional_conditions.len(), 1);
    assert!(first.raw_condition.is_some());

    assert_eq!(parsed.joins[1].kind, JoinKind::Left);
}

// ============================================================================
// Derived Columns, Aggregates, CASE Detection
// ============================================================================

#[test]
fn test_aggregate_and_case_columns() {
    let parsed = parse_query(
        "SELECT \
             SUM(amount) AS total, \
             COUNT(DISTINCT customer_id) AS customers, \
             CASE WHEN amount > 0 THEN 'credit' ELSE 'debit' END AS side \
         FROM gl \
         GROUP BY 3",
        Dialect::Generic,
    );

    assert_eq!(parsed.columns.len(), 3);
    assert!(parsed.columns[0].aggregation.is_some());
    assert!(parsed.columns[1].aggregation.is_some());
    assert!(parsed.columns[2].is_case_statement);
    assert!(parsed.columns[2].is_derived);
    assert_eq!(parsed.metrics.case_count, 1);
    assert!(parsed.metrics.aggregation_count >= 2);
    assert!(parsed.metrics.has_group_by);
}

// ============================================================================
// CTEs, Subqueries, Set Operations
// ============================================================================

#[test]
fn test_cte_registration() {
    let parsed = parse_query(
        "WITH recent AS (SELECT * FROM orders WHERE placed_at > '2026-01-01') \
         SELECT * FROM recent",
        Dialect::Generic,
    );

    assert_eq!(parsed.metrics.cte_count, 1);
    assert!(parsed.ctes.contains_key("recent"));
    assert!(parsed.ctes["recent"].to_uppercase().contains("SELECT"));
}

#[test]
fn test_subquery_in_from() {
    let parsed = parse_query(
        "SELECT t.total FROM (SELECT SUM(amount) AS total FROM gl) t",
        Dialect::Generic,
    );

    let sub = parsed.tables.iter().find(|t| t.is_subquery).unwrap();
    assert!(sub.subquery_sql.is_some());
    assert!(parsed.metrics.subquery_count >= 1);
}

#[test]
fn test_union_flag() {
    let parsed = parse_query(
        "SELECT id FROM a UNION ALL SELECT id FROM b",
        Dialect::Generic,
    );
    assert!(parsed.metrics.has_union);
    assert_eq!(parsed.tables.len(), 2);
}

// ============================================================================
// Complexity Metrics
// ============================================================================

#[test]
fn test_simple_query_complexity() {
    let parsed = parse_query("SELECT id FROM t", Dialect::Generic);
    assert_eq!(parsed.metrics.estimated_complexity, Complexity::Simple);
}

#[test]
fn test_complex_query_scores_higher() {
    let parsed = parse_query(
        "WITH a AS (SELECT * FROM x), b AS (SELECT * FROM y) \
         SELECT a.id, \
                CASE WHEN a.v > 1 THEN 'hi' ELSE 'lo' END AS bucket, \
                (SELECT MAX(v) FROM z WHERE z.id = a.id) AS peak \
         FROM a \
         JOIN b ON a.id = b.id \
         JOIN c ON c.id = b.id",
        Dialect::Generic,
    );
    assert_ne!(parsed.metrics.estimated_complexity, Complexity::Simple);
    assert!(parsed.metrics.score() > 5);
}

// ============================================================================
// Degradation (never raises)
// ============================================================================

#[test]
fn test_malformed_sql_degrades() {
    let parsed = parse_query("SELEC id FRM table (((", Dialect::Generic);
    assert_eq!(parsed.query_type, QueryType::Unknown);
    assert!(parsed.is_degraded());
    assert!(!parsed.parse_errors.is_empty());
}

#[test]
fn test_empty_input_degrades() {
    for sql in ["", "   ", "\n\t"] {
        let parsed = parse_query(sql, Dialect::Generic);
        assert_eq!(parsed.query_type, QueryType::Unknown);
        assert!(parsed.is_degraded(), "for {sql:?}");
    }
}

// ============================================================================
// Multi-Statement Batches
// ============================================================================

#[test]
fn test_parse_multiple_independent_statements() {
    let queries = parse_statements(
        "SELECT 1; SELECT id FROM customers; UPDATE t SET a = 1;",
        Dialect::Generic,
    );

    assert_eq!(queries.len(), 3);
    assert_eq!(queries[0].query_type, QueryType::Select);
    assert_eq!(queries[1].query_type, QueryType::Select);
    assert_eq!(queries[2].query_type, QueryType::Update);
}

#[test]
fn test_parse_multiple_survives_one_bad_statement() {
    let queries = parse_statements(
        "SELECT id FROM customers; NOT EVEN SQL ((; SELECT 2",
        Dialect::Generic,
    );

    assert_eq!(queries.len(), 3);
    assert!(!queries[0].is_degraded());
    assert!(queries[1].is_degraded());
    assert!(!queries[2].is_degraded());
}

// ============================================================================
// Dialect Handling
// ============================================================================

#[test]
fn test_dialect_from_name_aliases() {
    assert_eq!(Dialect::from_name("postgresql"), Dialect::Postgres);
    assert_eq!(Dialect::from_name("SNOWFLAKE"), Dialect::Snowflake);
    assert_eq!(Dialect::from_name("mssql"), Dialect::TSql);
    assert_eq!(Dialect::from_name("made-up-engine"), Dialect::Generic);
}

#[test]
fn test_snowflake_ilike_parses() {
    let parser = QueryParser::new(Dialect::Snowflake);
    let parsed = parser.parse("SELECT * FROM t WHERE name ILIKE 'rev%'");
    assert!(!parsed.is_degraded());
    assert!(parsed.where_clause.is_some());
}

#[test]
fn test_dialect_recorded_on_result() {
    let parsed = parse_query("SELECT 1", Dialect::BigQuery);
    assert_eq!(parsed.dialect, Dialect::BigQuery);
}

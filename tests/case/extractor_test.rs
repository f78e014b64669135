//! Integration tests for CASE extraction and classification.
//!
//! These drive the extractor through full SQL strings the way discovery
//! does, covering the classification heuristics, confidence scoring, and
//! nested-chain detection end to end.

use strata::case::{
    find_nested_hierarchies, CaseExtractor, ConditionPattern, EntityType, ResultType,
};
use strata::sql::Dialect;

fn extractor() -> CaseExtractor {
    CaseExtractor::new(Dialect::Generic)
}

// ============================================================================
// Scenario A: flat prefix-pattern account hierarchy
// ============================================================================

#[test]
fn test_flat_prefix_account_case() {
    let statements = extractor().extract_from_sql(
        "SELECT CASE \
         WHEN account_code LIKE '4%' THEN 'Revenue' \
         WHEN account_code LIKE '5%' THEN 'COGS' \
         WHEN account_code LIKE '6%' THEN 'Operating Expenses' \
         END AS category FROM gl",
    );

    assert_eq!(statements.len(), 1);
    let case = &statements[0];
    assert_eq!(case.source_column, "category");
    assert_eq!(case.input_column, "account_code");
    assert_eq!(case.detected_entity_type, EntityType::Account);
    assert_eq!(case.detected_pattern, Some(ConditionPattern::Prefix));
    assert_eq!(case.when_clauses.len(), 3);
    assert_eq!(
        case.unique_result_values,
        vec!["Revenue", "COGS", "Operating Expenses"]
    );
    assert_eq!(case.condition_count, 3);
    assert!(case.else_value.is_none());
    assert!((0.0..=1.0).contains(&case.confidence));
    assert!(case.id.starts_with("case_"));
}

// ============================================================================
// Scenario B: IN-list rollup with high condition count
// ============================================================================

#[test]
fn test_in_list_rollup_confidence() {
    let statements = extractor().extract_from_sql(
        "SELECT CASE \
         WHEN dept_code IN ('100', '110', '120', '130') THEN 'Sales' \
         WHEN dept_code IN ('200', '210', '220', '230') THEN 'Engineering' \
         WHEN dept_code IN ('300', '310', '320', '330') THEN 'Admin' \
         END AS division FROM employees",
    );

    assert_eq!(statements.len(), 1);
    let case = &statements[0];
    // IN members count individually
    assert_eq!(case.condition_count, 12);
    assert_eq!(case.unique_result_values.len(), 3);
    assert!(case.rollup_ratio() < 0.5);
    assert_eq!(case.detected_pattern, Some(ConditionPattern::ExactList));
    assert_eq!(case.detected_entity_type, EntityType::Department);
    // base 0.5 + 0.2 (>=10 conditions) + 0.1 (rollup) before entity/pattern bonuses
    assert!(case.confidence >= 0.8);
}

// ============================================================================
// Scenario C: no CASE statements
// ============================================================================

#[test]
fn test_no_case_returns_empty() {
    assert!(extractor()
        .extract_from_sql("SELECT * FROM customers")
        .is_empty());
}

#[test]
fn test_unparsable_sql_returns_empty() {
    assert!(extractor().extract_from_sql("NOT SQL ((").is_empty());
    assert!(extractor().extract_from_sql("").is_empty());
}

// ============================================================================
// Scenario D: nested chain detection
// ============================================================================

#[test]
fn test_nested_chain_detected() {
    let statements = extractor().extract_from_sql(
        "SELECT \
         CASE WHEN code LIKE '4%' THEN 'A' WHEN code LIKE '5%' THEN 'B' END AS l1, \
         CASE WHEN category IN ('A', 'B') THEN 'Rollup' ELSE 'Other' END AS l2 \
         FROM gl",
    );

    assert_eq!(statements.len(), 2);
    let pairs = find_nested_hierarchies(&statements);
    assert_eq!(pairs, vec![(0, 1)]);
}

#[test]
fn test_unrelated_cases_are_not_chained() {
    let statements = extractor().extract_from_sql(
        "SELECT \
         CASE WHEN code LIKE '4%' THEN 'Revenue' END AS l1, \
         CASE WHEN region = 'US' THEN 'Domestic' END AS l2 \
         FROM gl",
    );

    assert_eq!(statements.len(), 2);
    assert!(find_nested_hierarchies(&statements).is_empty());
}

// ============================================================================
// Condition Decomposition
// ============================================================================

#[test]
fn test_compound_and_or_conditions() {
    let statements = extractor().extract_from_sql(
        "SELECT CASE \
         WHEN account_code LIKE '4%' AND region = 'US' THEN 'US Revenue' \
         WHEN account_code LIKE '4%' OR account_code LIKE '5%' THEN 'Trading' \
         END AS c FROM gl",
    );

    assert_eq!(statements.len(), 1);
    let case = &statements[0];
    // two leaves per compound condition
    assert_eq!(case.condition_count, 4);
    let first = &case.when_clauses[0].condition;
    assert_eq!(first.leaves().len(), 2);
    assert_eq!(first.columns(), vec!["account_code", "region"]);
}

#[test]
fn test_between_and_null_conditions() {
    let statements = extractor().extract_from_sql(
        "SELECT CASE \
         WHEN code BETWEEN '4000' AND '4999' THEN 'Revenue' \
         WHEN code IS NULL THEN 'Unclassified' \
         WHEN code IS NOT NULL THEN 'Classified' \
         END AS c FROM gl",
    );

    assert_eq!(statements.len(), 1);
    let case = &statements[0];
    assert_eq!(case.when_clauses.len(), 3);
    assert_eq!(case.when_clauses[0].condition.leaf_values(), vec!["4000", "4999"]);
}

#[test]
fn test_simple_case_operand_form() {
    let statements = extractor().extract_from_sql(
        "SELECT CASE status \
         WHEN 'A' THEN 'Active' \
         WHEN 'I' THEN 'Inactive' \
         END AS status_name FROM accounts",
    );

    assert_eq!(statements.len(), 1);
    let case = &statements[0];
    assert_eq!(case.input_column, "status");
    assert_eq!(case.detected_pattern, Some(ConditionPattern::Exact));
    assert_eq!(case.when_clauses[0].condition.leaf_values(), vec!["A"]);
}

#[test]
fn test_snowflake_ilike_any() {
    let statements = CaseExtractor::new(Dialect::Snowflake).extract_from_sql(
        "SELECT CASE \
         WHEN vendor_name ILIKE ANY ('%oil%', '%gas%') THEN 'Energy' \
         ELSE 'Other' END AS sector FROM vendors",
    );

    assert_eq!(statements.len(), 1);
    let case = &statements[0];
    assert_eq!(case.detected_entity_type, EntityType::Vendor);
    assert_eq!(case.detected_pattern, Some(ConditionPattern::Contains));
    assert_eq!(case.condition_count, 2);
}

// ============================================================================
// Degradation and Metadata
// ============================================================================

#[test]
fn test_unsupported_condition_drops_only_that_case() {
    let statements = extractor().extract_from_sql(
        "SELECT \
         CASE WHEN EXISTS (SELECT 1 FROM audit a WHERE a.id = gl.id) THEN 'odd' END AS weird, \
         CASE WHEN code LIKE '4%' THEN 'Revenue' END AS fine \
         FROM gl",
    );

    // the EXISTS-subquery CASE is dropped, the LIKE one survives
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].source_column, "fine");
}

#[test]
fn test_unaliased_case_uses_sql_fragment_name() {
    let statements = extractor()
        .extract_from_sql("SELECT CASE WHEN a = 1 THEN 'x' END FROM t");
    assert_eq!(statements.len(), 1);
    assert!(statements[0].source_column.starts_with("CASE"));
    assert!(statements[0].source_column.len() <= 50);
}

#[test]
fn test_result_types_inferred() {
    let statements = extractor().extract_from_sql(
        "SELECT CASE \
         WHEN a = 1 THEN 'text' \
         WHEN a = 2 THEN 42 \
         WHEN a = 3 THEN 1.5 \
         ELSE NULL END AS c FROM t",
    );

    let case = &statements[0];
    assert_eq!(case.when_clauses[0].result_type, ResultType::String);
    assert_eq!(case.when_clauses[1].result_type, ResultType::Integer);
    assert_eq!(case.when_clauses[2].result_type, ResultType::Decimal);
    // ELSE NULL carries through as the literal string "NULL"
    assert_eq!(case.else_value.as_deref(), Some("NULL"));
}

#[test]
fn test_extraction_determinism() {
    let sql = "SELECT CASE WHEN account_code LIKE '4%' THEN 'Revenue' END AS c FROM gl";
    let a = extractor().extract_from_sql(sql);
    let b = extractor().extract_from_sql(sql);
    assert_eq!(a, b);
    assert_eq!(a[0].id, b[0].id);
}

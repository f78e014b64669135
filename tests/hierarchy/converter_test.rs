//! Integration tests for hierarchy conversion.
//!
//! Full SQL in, converted hierarchy out, checking the structural invariants
//! the rest of the system leans on: node counts, mapping totality, root
//! closure, and deterministic ordering.

use strata::case::CaseExtractor;
use strata::hierarchy::{validate, HierarchyConverter, SortMethod};
use strata::sql::Dialect;

fn extract(sql: &str) -> Vec<strata::case::CaseStatement> {
    CaseExtractor::new(Dialect::Generic).extract_from_sql(sql)
}

// ============================================================================
// Node Count Invariant
// ============================================================================

#[test]
fn test_node_count_equals_distinct_results_plus_else() {
    let statements = extract(
        "SELECT CASE \
         WHEN c LIKE '1%' THEN 'A' \
         WHEN c LIKE '2%' THEN 'B' \
         WHEN c LIKE '3%' THEN 'A' \
         ELSE 'Rest' END AS x FROM t",
    );
    let hierarchy = HierarchyConverter::new().convert(&statements[0]);

    // 2 distinct results + 1 else
    assert_eq!(hierarchy.total_nodes, 3);
    assert_eq!(
        hierarchy
            .nodes
            .values()
            .filter(|n| n.metadata.is_else)
            .count(),
        1
    );
}

#[test]
fn test_node_count_without_else() {
    let statements =
        extract("SELECT CASE WHEN c LIKE '1%' THEN 'A' WHEN c LIKE '2%' THEN 'B' END AS x FROM t");
    let hierarchy = HierarchyConverter::new().convert(&statements[0]);
    assert_eq!(hierarchy.total_nodes, 2);
}

// ============================================================================
// Mapping Totality
// ============================================================================

#[test]
fn test_every_when_value_appears_in_mapping() {
    let statements = extract(
        "SELECT CASE \
         WHEN code IN ('100', '110') THEN 'Sales' \
         WHEN code LIKE '2%' THEN 'Ops' \
         WHEN code BETWEEN '300' AND '399' THEN 'Admin' \
         END AS division FROM emp",
    );
    let case = &statements[0];
    let hierarchy = HierarchyConverter::new().convert(case);

    for when in &case.when_clauses {
        for value in when.condition.leaf_values() {
            let node_id = hierarchy
                .mapping
                .get(value)
                .unwrap_or_else(|| panic!("value {value} missing from mapping"));
            assert!(hierarchy.nodes.contains_key(node_id));
        }
    }
}

// ============================================================================
// Parent Inference
// ============================================================================

#[test]
fn test_prefix_containment_builds_levels() {
    let statements = extract(
        "SELECT CASE \
         WHEN account_code LIKE '5%' THEN 'Expenses' \
         WHEN account_code LIKE '50%' THEN 'Payroll' \
         WHEN account_code LIKE '51%' THEN 'Facilities' \
         WHEN account_code LIKE '6%' THEN 'Other Expenses' \
         END AS category FROM gl",
    );
    let hierarchy = HierarchyConverter::new().convert(&statements[0]);

    let expenses = hierarchy
        .nodes
        .values()
        .find(|n| n.value == "Expenses")
        .unwrap();
    let payroll = hierarchy
        .nodes
        .values()
        .find(|n| n.value == "Payroll")
        .unwrap();
    let other = hierarchy
        .nodes
        .values()
        .find(|n| n.value == "Other Expenses")
        .unwrap();

    assert_eq!(payroll.parent_id.as_deref(), Some(expenses.id.as_str()));
    assert_eq!(payroll.level, 2);
    assert!(other.parent_id.is_none());
    assert_eq!(hierarchy.level_count, 2);
    // '6%' and '5%' stay roots
    assert_eq!(hierarchy.root_nodes.len(), 2);
    // parent inference adds the +0.1 edge bonus over the statement's own score
    assert!(hierarchy.confidence >= statements[0].confidence);
    assert!(validate(&hierarchy).is_ok());
}

// ============================================================================
// Sort Inference
// ============================================================================

#[test]
fn test_mixed_levels_sort_independently() {
    let statements = extract(
        "SELECT CASE \
         WHEN c LIKE '2%' THEN '200 Ops' \
         WHEN c LIKE '20%' THEN 'Field Ops' \
         WHEN c LIKE '21%' THEN 'Back Office' \
         WHEN c LIKE '1%' THEN '100 Sales' \
         END AS x FROM t",
    );
    let hierarchy = HierarchyConverter::new().convert(&statements[0]);

    let level1: Vec<_> = hierarchy
        .ordered_nodes()
        .into_iter()
        .filter(|n| n.level == 1)
        .collect();
    let level2: Vec<_> = hierarchy
        .ordered_nodes()
        .into_iter()
        .filter(|n| n.level == 2)
        .collect();

    // level 1 values all carry leading codes: numeric sort
    assert_eq!(level1[0].value, "100 Sales");
    assert_eq!(level1[1].value, "200 Ops");
    assert_eq!(level1[0].metadata.sort_method, Some(SortMethod::Numeric));

    // level 2 values don't: lexical sort
    assert_eq!(level2[0].value, "Back Office");
    assert_eq!(level2[1].value, "Field Ops");
    assert_eq!(level2[0].metadata.sort_method, Some(SortMethod::Lexical));
}

// ============================================================================
// Nested Conversion
// ============================================================================

#[test]
fn test_nested_chain_end_to_end() {
    let statements = extract(
        "SELECT \
         CASE WHEN account_code LIKE '4%' THEN 'Revenue' \
              WHEN account_code LIKE '5%' THEN 'COGS' \
              ELSE 'Other' END AS l1, \
         CASE WHEN category IN ('Revenue', 'COGS') THEN 'Gross Margin' \
              WHEN category = 'Other' THEN 'Below the Line' END AS l2 \
         FROM gl",
    );
    let hierarchies = HierarchyConverter::new().convert_multiple(&statements);

    assert_eq!(hierarchies.len(), 1);
    let h = &hierarchies[0];
    assert_eq!(h.confidence, 0.8);
    assert_eq!(h.level_count, 2);
    // 3 parent nodes (incl. else) + 2 child nodes
    assert_eq!(h.total_nodes, 5);

    // every level-2 node with a parent points at a level-1 node whose value
    // is among its source values
    for node in h.nodes.values().filter(|n| n.level == 2) {
        if let Some(parent_id) = &node.parent_id {
            let parent = &h.nodes[parent_id];
            assert_eq!(parent.level, 1);
            assert!(node.source_values.contains(&parent.value));
        }
    }

    // 'Below the Line' tests 'Other', produced by the ELSE node
    let below = h.nodes.values().find(|n| n.value == "Below the Line").unwrap();
    let other = h.nodes.values().find(|n| n.value == "Other").unwrap();
    assert!(other.metadata.is_else);
    assert_eq!(below.parent_id.as_deref(), Some(other.id.as_str()));

    assert!(validate(h).is_ok());
}

#[test]
fn test_standalone_statements_convert_in_order() {
    let statements = extract(
        "SELECT \
         CASE WHEN a LIKE '1%' THEN 'X' END AS c1, \
         CASE WHEN b LIKE '2%' THEN 'Y' END AS c2 \
         FROM t",
    );
    let hierarchies = HierarchyConverter::new().convert_multiple(&statements);
    assert_eq!(hierarchies.len(), 2);
    assert_eq!(hierarchies[0].source_case_id, statements[0].id);
    assert_eq!(hierarchies[1].source_case_id, statements[1].id);
}

// ============================================================================
// Determinism and Validity
// ============================================================================

#[test]
fn test_conversion_is_deterministic() {
    let sql = "SELECT CASE \
               WHEN account_code LIKE '4%' THEN 'Revenue' \
               WHEN account_code LIKE '40%' THEN 'Product' \
               ELSE 'Other' END AS c FROM gl";
    let first = HierarchyConverter::new().convert(&extract(sql)[0]);
    let second = HierarchyConverter::new().convert(&extract(sql)[0]);
    assert_eq!(first, second);
    assert_eq!(first.id, second.id);
}

#[test]
fn test_all_conversions_validate_clean() {
    let sqls = [
        "SELECT CASE WHEN a LIKE '1%' THEN 'X' END AS c FROM t",
        "SELECT CASE WHEN a IN ('1','2','3') THEN 'X' ELSE 'Y' END AS c FROM t",
        "SELECT CASE \
         WHEN a LIKE '1%' THEN 'A' WHEN a LIKE '12%' THEN 'B' \
         WHEN a LIKE '123%' THEN 'C' END AS c FROM t",
    ];
    for sql in sqls {
        let hierarchy = HierarchyConverter::new().convert(&extract(sql)[0]);
        assert_eq!(validate(&hierarchy), Ok(()), "for {sql}");
        assert!((0.0..=1.0).contains(&hierarchy.confidence));
    }
}

//! CASE expression extractor.
//!
//! Locates `CASE WHEN` expressions in the SELECT list of each statement,
//! decomposes their conditions into [`CaseCondition`] trees, classifies the
//! entity family and condition pattern, and scores confidence.
//!
//! Failure handling follows the pipeline's degrade-don't-raise rule: a SQL
//! text that fails to parse yields no statements; a single CASE whose shape
//! the decomposer does not understand is dropped (with a warning) while the
//! rest of the query is still extracted.

use sqlparser::ast::{Expr, Query, Select, SelectItem, SetExpr, Statement, Value};
use sqlparser::parser::Parser;
use thiserror::Error;
use tracing::{debug, warn};

use super::classify::{classify_entity, classify_pattern, confidence_score};
use super::condition::{CaseCondition, ConditionOperator, LogicalOperator};
use super::types::{CaseStatement, CaseWhen, ExtractedHierarchy, ResultType};
use crate::hash::stable_id;
use crate::sql::dialect::Dialect;

/// Maximum length of a source-column name synthesized from CASE SQL.
const FRAGMENT_NAME_LEN: usize = 50;

/// Internal decomposition failures. Never escape `extract_from_sql`; they
/// mark the one CASE statement that gets dropped.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported condition shape: {0}")]
    UnsupportedCondition(String),

    #[error("CASE has {conditions} WHEN conditions but {results} results")]
    MismatchedArms { conditions: usize, results: usize },
}

/// Extracts CASE statements from SQL text.
#[derive(Debug, Clone, Copy)]
pub struct CaseExtractor {
    dialect: Dialect,
}

impl Default for CaseExtractor {
    fn default() -> Self {
        Self::new(Dialect::Generic)
    }
}

impl CaseExtractor {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Extract every CASE expression from the SELECT lists of `sql`.
    ///
    /// Total parse failure returns an empty vec; a per-CASE decomposition
    /// failure drops only that statement.
    pub fn extract_from_sql(&self, sql: &str) -> Vec<CaseStatement> {
        let statements = match Parser::parse_sql(self.dialect.grammar(), sql) {
            Ok(statements) => statements,
            Err(e) => {
                warn!(dialect = %self.dialect, "cannot parse SQL for CASE extraction: {e}");
                return Vec::new();
            }
        };

        let mut out = Vec::new();
        for statement in &statements {
            if let Some(query) = statement_query(statement) {
                self.extract_from_query(query, &mut out);
            }
        }
        debug!(count = out.len(), "extracted CASE statements");
        out
    }

    fn extract_from_query(&self, query: &Query, out: &mut Vec<CaseStatement>) {
        match query.body.as_ref() {
            SetExpr::Select(select) => self.extract_from_select(select, out),
            SetExpr::Query(inner) => self.extract_from_query(inner, out),
            SetExpr::SetOperation { left, right, .. } => {
                self.walk_set_expr(left, out);
                self.walk_set_expr(right, out);
            }
            _ => {}
        }
    }

    fn walk_set_expr(&self, body: &SetExpr, out: &mut Vec<CaseStatement>) {
        match body {
            SetExpr::Select(select) => self.extract_from_select(select, out),
            SetExpr::Query(query) => self.extract_from_query(query, out),
            _ => {}
        }
    }

    fn extract_from_select(&self, select: &Select, out: &mut Vec<CaseStatement>) {
        for (position, item) in select.projection.iter().enumerate() {
            let (expr, alias) = match item {
                SelectItem::UnnamedExpr(expr) => (expr, None),
                SelectItem::ExprWithAlias { expr, alias } => (expr, Some(alias.value.clone())),
                _ => continue,
            };
            let Some(case_expr) = crate::sql::parser::find_case(expr) else {
                continue;
            };
            let source_column = alias.unwrap_or_else(|| fragment_name(case_expr));
            match extract_case(case_expr, &source_column, position) {
                Ok(statement) => out.push(statement),
                Err(e) => {
                    warn!(column = %source_column, "dropping CASE statement: {e}");
                }
            }
        }
    }

    /// Summarize the hierarchy implied by one CASE statement.
    ///
    /// Returns `None` when the statement has no WHEN clauses (an ELSE-only
    /// CASE encodes no classification).
    pub fn extract_hierarchy(&self, case: &CaseStatement) -> Option<ExtractedHierarchy> {
        if case.when_clauses.is_empty() {
            return None;
        }
        Some(ExtractedHierarchy {
            source_case_id: case.id.clone(),
            entity_type: case.detected_entity_type,
            detected_pattern: case.detected_pattern,
            levels: vec![case.unique_result_values.clone()],
        })
    }
}

/// Detect chains between CASE statements: `(parent, child)` index pairs where
/// the child's WHEN-condition values intersect the parent's result values,
/// meaning the child classifies the parent's output.
///
/// O(n^2 * k) over statements x condition values; fine for the single-digit
/// CASE counts real queries carry.
pub fn find_nested_hierarchies(statements: &[CaseStatement]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (parent_idx, parent) in statements.iter().enumerate() {
        for (child_idx, child) in statements.iter().enumerate() {
            if parent_idx == child_idx {
                continue;
            }
            let feeds = child.when_clauses.iter().any(|when| {
                when.condition
                    .leaf_values()
                    .iter()
                    .any(|value| parent.unique_result_values.iter().any(|r| r == value))
            });
            if feeds {
                pairs.push((parent_idx, child_idx));
            }
        }
    }
    pairs
}

fn statement_query(statement: &Statement) -> Option<&Query> {
    match statement {
        Statement::Query(query) => Some(query),
        Statement::Insert(insert) => insert.source.as_deref(),
        Statement::CreateTable(create) => create.query.as_deref(),
        Statement::CreateView { query, .. } => Some(query),
        _ => None,
    }
}

// =============================================================================
// CASE decomposition
// =============================================================================

/// Decompose one `Expr::Case` node into a [`CaseStatement`].
fn extract_case(
    case_expr: &Expr,
    source_column: &str,
    position_in_query: usize,
) -> Result<CaseStatement, ExtractError> {
    let Expr::Case {
        operand,
        conditions,
        results,
        else_result,
    } = case_expr
    else {
        return Err(ExtractError::UnsupportedCondition(case_expr.to_string()));
    };

    if conditions.len() != results.len() {
        return Err(ExtractError::MismatchedArms {
            conditions: conditions.len(),
            results: results.len(),
        });
    }

    let mut when_clauses = Vec::with_capacity(conditions.len());
    for (position, (condition, result)) in conditions.iter().zip(results).enumerate() {
        // Simple CASE (`CASE x WHEN 'a' THEN ...`) is sugar for equality
        // against the operand.
        let condition = match operand {
            Some(operand) => CaseCondition::leaf(
                &operand_name(operand),
                ConditionOperator::Equals,
                vec![literal_text(condition)],
            ),
            None => decompose_condition(condition)?,
        };
        let result_value = literal_text(result);
        when_clauses.push(CaseWhen {
            condition,
            result_type: ResultType::infer(&result_value),
            result_value,
            position,
        });
    }

    let (input_table, input_column) = infer_input(&when_clauses);

    let mut unique_result_values: Vec<String> = Vec::new();
    for when in &when_clauses {
        if !unique_result_values.contains(&when.result_value) {
            unique_result_values.push(when.result_value.clone());
        }
    }

    let condition_count: usize = when_clauses
        .iter()
        .map(|w| w.condition.comparison_count())
        .sum();

    let detected_entity_type = classify_entity(&input_column, &unique_result_values);
    let detected_pattern = classify_pattern(&when_clauses);

    let (confidence, notes) = confidence_score(
        condition_count,
        detected_entity_type,
        detected_pattern,
        unique_result_values.len(),
        false,
    );

    let raw_case_sql = case_expr.to_string();
    Ok(CaseStatement {
        id: stable_id("case", &raw_case_sql),
        source_column: source_column.to_string(),
        input_column,
        input_table,
        when_clauses,
        else_value: else_result.as_deref().map(literal_text),
        detected_entity_type,
        detected_pattern,
        unique_result_values,
        condition_count,
        raw_case_sql,
        position_in_query,
        confidence,
        notes,
    })
}

/// Best-effort input column: the first column tested by any WHEN clause,
/// split into `(table, column)` when qualified.
fn infer_input(when_clauses: &[CaseWhen]) -> (Option<String>, String) {
    for when in when_clauses {
        if let Some(column) = when.condition.columns().first() {
            return match column.rsplit_once('.') {
                Some((table, name)) => (Some(table.to_string()), name.to_string()),
                None => (None, column.to_string()),
            };
        }
    }
    (None, String::new())
}

/// Recursively decompose a WHEN condition expression.
fn decompose_condition(expr: &Expr) -> Result<CaseCondition, ExtractError> {
    use sqlparser::ast::BinaryOperator;

    match expr {
        Expr::BinaryOp { left, op, right } => {
            let scalar = match op {
                BinaryOperator::And => {
                    return Ok(CaseCondition::compound(
                        LogicalOperator::And,
                        decompose_condition(left)?,
                        decompose_condition(right)?,
                    ));
                }
                BinaryOperator::Or => {
                    return Ok(CaseCondition::compound(
                        LogicalOperator::Or,
                        decompose_condition(left)?,
                        decompose_condition(right)?,
                    ));
                }
                BinaryOperator::Eq => ConditionOperator::Equals,
                BinaryOperator::NotEq => ConditionOperator::NotEquals,
                BinaryOperator::Gt => ConditionOperator::Gt,
                BinaryOperator::GtEq => ConditionOperator::Gte,
                BinaryOperator::Lt => ConditionOperator::Lt,
                BinaryOperator::LtEq => ConditionOperator::Lte,
                _ => return Err(ExtractError::UnsupportedCondition(expr.to_string())),
            };
            Ok(CaseCondition::leaf(
                &operand_name(left),
                scalar,
                vec![literal_text(right)],
            ))
        }
        Expr::Like {
            negated,
            expr: tested,
            pattern,
            ..
        } => Ok(like_condition(
            tested,
            pattern,
            ConditionOperator::Like,
            *negated,
        )),
        Expr::ILike {
            negated,
            expr: tested,
            pattern,
            ..
        } => Ok(like_condition(
            tested,
            pattern,
            ConditionOperator::ILike,
            *negated,
        )),
        Expr::InList {
            expr: tested,
            list,
            negated,
        } => {
            let values = list.iter().map(literal_text).collect();
            let mut leaf =
                CaseCondition::leaf(&operand_name(tested), ConditionOperator::In, values);
            set_negated(&mut leaf, *negated);
            Ok(leaf)
        }
        Expr::Between {
            expr: tested,
            negated,
            low,
            high,
        } => {
            let mut leaf = CaseCondition::leaf(
                &operand_name(tested),
                ConditionOperator::Between,
                vec![literal_text(low), literal_text(high)],
            );
            set_negated(&mut leaf, *negated);
            Ok(leaf)
        }
        Expr::IsNull(tested) => Ok(CaseCondition::leaf(
            &operand_name(tested),
            ConditionOperator::IsNull,
            vec![],
        )),
        Expr::IsNotNull(tested) => {
            let mut leaf =
                CaseCondition::leaf(&operand_name(tested), ConditionOperator::IsNull, vec![]);
            set_negated(&mut leaf, true);
            Ok(leaf)
        }
        Expr::Nested(inner) => decompose_condition(inner),
        Expr::UnaryOp {
            op: sqlparser::ast::UnaryOperator::Not,
            expr: inner,
        } => {
            // Negation flags a leaf without changing its base operator.
            // NOT over a compound keeps the subtree as-is.
            let mut condition = decompose_condition(inner)?;
            if let CaseCondition::Leaf { negated, .. } = &mut condition {
                *negated = !*negated;
            }
            Ok(condition)
        }
        _ => Err(ExtractError::UnsupportedCondition(expr.to_string())),
    }
}

/// Build a LIKE/ILIKE leaf. Snowflake's `ILIKE ANY ('a%', 'b%')` parses with
/// a tuple pattern; the tuple expands into multiple values under the same
/// operator.
fn like_condition(
    tested: &Expr,
    pattern: &Expr,
    operator: ConditionOperator,
    negated: bool,
) -> CaseCondition {
    let values = match pattern {
        Expr::Tuple(items) => items.iter().map(literal_text).collect(),
        single => vec![literal_text(single)],
    };
    let mut leaf = CaseCondition::leaf(&operand_name(tested), operator, values);
    set_negated(&mut leaf, negated);
    leaf
}

fn set_negated(condition: &mut CaseCondition, value: bool) {
    if let CaseCondition::Leaf { negated, .. } = condition {
        *negated = value;
    }
}

/// Render the tested side of a comparison as a column name: identifiers keep
/// their (dotted) form, anything else falls back to its SQL text.
fn operand_name(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(ident) => ident.value.clone(),
        Expr::CompoundIdentifier(parts) => parts
            .iter()
            .map(|p| p.value.clone())
            .collect::<Vec<_>>()
            .join("."),
        Expr::Nested(inner) | Expr::Cast { expr: inner, .. } => operand_name(inner),
        other => other.to_string(),
    }
}

/// Literal text of a value expression: string/number text verbatim, `NULL`
/// as the string `"NULL"`, anything else as its rendered SQL.
fn literal_text(expr: &Expr) -> String {
    match expr {
        Expr::Value(Value::SingleQuotedString(s)) | Expr::Value(Value::DoubleQuotedString(s)) => {
            s.clone()
        }
        Expr::Value(Value::Number(n, _)) => n.clone(),
        Expr::Value(Value::Null) => "NULL".to_string(),
        Expr::Value(Value::Boolean(b)) => b.to_string(),
        Expr::Nested(inner) => literal_text(inner),
        other => other.to_string(),
    }
}

fn fragment_name(expr: &Expr) -> String {
    expr.to_string().chars().take(FRAGMENT_NAME_LEN).collect()
}

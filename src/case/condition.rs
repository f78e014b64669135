//! Recursive WHEN-condition tree.
//!
//! A condition is either a leaf comparison (`column op values`) or an AND/OR
//! composition of two subtrees. Consumers pattern-match exhaustively over the
//! two variants instead of sniffing shapes at runtime.

use serde::{Deserialize, Serialize};

/// Comparison and composition operators appearing in WHEN conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Like,
    ILike,
    In,
    Between,
    IsNull,
    Gt,
    Gte,
    Lt,
    Lte,
    And,
    Or,
}

impl ConditionOperator {
    /// Render as SQL-ish text for notes and display.
    pub fn symbol(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "=",
            ConditionOperator::NotEquals => "<>",
            ConditionOperator::Like => "LIKE",
            ConditionOperator::ILike => "ILIKE",
            ConditionOperator::In => "IN",
            ConditionOperator::Between => "BETWEEN",
            ConditionOperator::IsNull => "IS NULL",
            ConditionOperator::Gt => ">",
            ConditionOperator::Gte => ">=",
            ConditionOperator::Lt => "<",
            ConditionOperator::Lte => "<=",
            ConditionOperator::And => "AND",
            ConditionOperator::Or => "OR",
        }
    }
}

/// Logical composition operator for compound conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalOperator {
    And,
    Or,
}

/// One decomposed WHEN condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseCondition {
    /// A single comparison: `column op values`. `values` is empty for
    /// IS NULL, holds one entry for scalar comparisons, two for BETWEEN,
    /// and all list members for IN.
    Leaf {
        column: String,
        operator: ConditionOperator,
        values: Vec<String>,
        negated: bool,
    },
    /// Two subtrees joined by AND/OR.
    Compound {
        op: LogicalOperator,
        left: Box<CaseCondition>,
        right: Box<CaseCondition>,
    },
}

impl CaseCondition {
    pub fn leaf(column: &str, operator: ConditionOperator, values: Vec<String>) -> Self {
        CaseCondition::Leaf {
            column: column.into(),
            operator,
            values,
            negated: false,
        }
    }

    pub fn compound(op: LogicalOperator, left: CaseCondition, right: CaseCondition) -> Self {
        CaseCondition::Compound {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// All literal values carried by leaves of this subtree, left to right.
    pub fn leaf_values(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_values(&mut out);
        out
    }

    fn collect_values<'c>(&'c self, out: &mut Vec<&'c str>) {
        match self {
            CaseCondition::Leaf { values, .. } => {
                out.extend(values.iter().map(String::as_str));
            }
            CaseCondition::Compound { left, right, .. } => {
                left.collect_values(out);
                right.collect_values(out);
            }
        }
    }

    /// All distinct column names tested in this subtree, first-seen order.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'c>(&'c self, out: &mut Vec<&'c str>) {
        match self {
            CaseCondition::Leaf { column, .. } => {
                if !column.is_empty() && !out.contains(&column.as_str()) {
                    out.push(column);
                }
            }
            CaseCondition::Compound { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
        }
    }

    /// Number of individual comparisons in this subtree, where an IN list
    /// contributes one per member. This is what `condition_count` tallies:
    /// `x IN ('a','b','c')` carries the same classification evidence as
    /// three equality clauses.
    pub fn comparison_count(&self) -> usize {
        match self {
            CaseCondition::Leaf { values, .. } => values.len().max(1),
            CaseCondition::Compound { left, right, .. } => {
                left.comparison_count() + right.comparison_count()
            }
        }
    }

    /// Leaves of this subtree, left to right.
    pub fn leaves(&self) -> Vec<&CaseCondition> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'c>(&'c self, out: &mut Vec<&'c CaseCondition>) {
        match self {
            leaf @ CaseCondition::Leaf { .. } => out.push(leaf),
            CaseCondition::Compound { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }
}

impl std::fmt::Display for CaseCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseCondition::Leaf {
                column,
                operator,
                values,
                negated,
            } => {
                if *negated {
                    write!(f, "NOT ")?;
                }
                match operator {
                    ConditionOperator::IsNull => write!(f, "{column} IS NULL"),
                    ConditionOperator::In => {
                        write!(f, "{column} IN ({})", values.join(", "))
                    }
                    ConditionOperator::Between if values.len() == 2 => {
                        write!(f, "{column} BETWEEN {} AND {}", values[0], values[1])
                    }
                    _ => write!(
                        f,
                        "{column} {} {}",
                        operator.symbol(),
                        values.first().map(String::as_str).unwrap_or("")
                    ),
                }
            }
            CaseCondition::Compound { op, left, right } => {
                let symbol = match op {
                    LogicalOperator::And => "AND",
                    LogicalOperator::Or => "OR",
                };
                write!(f, "({left} {symbol} {right})")
            }
        }
    }
}

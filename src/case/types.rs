//! Value types produced by the case extractor.

use serde::{Deserialize, Serialize};

use super::condition::CaseCondition;

// =============================================================================
// Result typing
// =============================================================================

/// Coarse type of a THEN/ELSE result value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    Null,
    Integer,
    Decimal,
    String,
}

impl ResultType {
    /// Infer from the literal text: `"NULL"` is null, numeric parses are
    /// integer/decimal, everything else is a string.
    pub fn infer(value: &str) -> Self {
        if value == "NULL" {
            return ResultType::Null;
        }
        if value.contains('.') && value.parse::<f64>().is_ok() {
            return ResultType::Decimal;
        }
        if value.parse::<i64>().is_ok() {
            return ResultType::Integer;
        }
        ResultType::String
    }
}

// =============================================================================
// Entity & pattern classification
// =============================================================================

/// Semantic entity family a CASE's tested column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Account,
    CostCenter,
    Department,
    Entity,
    Project,
    Product,
    Customer,
    Vendor,
    Employee,
    Location,
    TimePeriod,
    Currency,
    #[default]
    Unknown,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityType::Account => "account",
            EntityType::CostCenter => "cost_center",
            EntityType::Department => "department",
            EntityType::Entity => "entity",
            EntityType::Project => "project",
            EntityType::Product => "product",
            EntityType::Customer => "customer",
            EntityType::Vendor => "vendor",
            EntityType::Employee => "employee",
            EntityType::Location => "location",
            EntityType::TimePeriod => "time_period",
            EntityType::Currency => "currency",
            EntityType::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// Condition-matching style used across a CASE's WHEN clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionPattern {
    /// `LIKE 'x%'` - leading code space match.
    Prefix,
    /// `LIKE '%x'`.
    Suffix,
    /// `LIKE '%x%'`.
    Contains,
    /// Plain equality.
    Exact,
    /// `IN (...)` membership.
    ExactList,
    /// `BETWEEN a AND b`.
    Range,
}

impl std::fmt::Display for ConditionPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConditionPattern::Prefix => "prefix",
            ConditionPattern::Suffix => "suffix",
            ConditionPattern::Contains => "contains",
            ConditionPattern::Exact => "exact",
            ConditionPattern::ExactList => "exact_list",
            ConditionPattern::Range => "range",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// CASE statement
// =============================================================================

/// One WHEN/THEN arm of a CASE expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseWhen {
    pub condition: CaseCondition,
    pub result_value: String,
    pub result_type: ResultType,
    /// Order within the CASE, 0-based.
    pub position: usize,
}

/// One extracted CASE expression with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStatement {
    /// Content hash of the raw CASE SQL; stable across reruns.
    pub id: String,
    /// The alias the CASE produces (output column name).
    pub source_column: String,
    /// Column being tested by the WHEN conditions, best-effort.
    pub input_column: String,
    /// Table or alias qualifying `input_column`, when known.
    pub input_table: Option<String>,
    pub when_clauses: Vec<CaseWhen>,
    pub else_value: Option<String>,
    pub detected_entity_type: EntityType,
    pub detected_pattern: Option<ConditionPattern>,
    /// Distinct THEN values, first-occurrence order.
    pub unique_result_values: Vec<String>,
    /// Total individual comparisons across all WHEN clauses (IN lists count
    /// one per member).
    pub condition_count: usize,
    pub raw_case_sql: String,
    /// 0-based SELECT-list index of the column carrying this CASE.
    pub position_in_query: usize,
    /// Heuristic trust estimate in `[0, 1]`.
    pub confidence: f64,
    /// Human-readable justification of each scoring factor and inference.
    pub notes: Vec<String>,
}

impl CaseStatement {
    /// Ratio of distinct outputs to individual input comparisons. A low
    /// ratio means many inputs collapse to few outputs - evidence of a real
    /// classification rather than a pass-through.
    pub fn rollup_ratio(&self) -> f64 {
        if self.condition_count == 0 {
            return 1.0;
        }
        self.unique_result_values.len() as f64 / self.condition_count as f64
    }
}

// =============================================================================
// Extracted hierarchy summary
// =============================================================================

/// Level-by-level summary of the hierarchy implied by one CASE statement.
///
/// Produced by `extract_hierarchy`; the full node graph comes from the
/// hierarchy converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedHierarchy {
    pub source_case_id: String,
    pub entity_type: EntityType,
    pub detected_pattern: Option<ConditionPattern>,
    /// Values per level, outermost first. A single CASE yields one level of
    /// distinct result values; chained statements add deeper levels via the
    /// converter.
    pub levels: Vec<Vec<String>>,
}

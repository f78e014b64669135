//! CASE statement extraction and classification.
//!
//! - [`condition`] - the recursive WHEN-condition tree
//! - [`types`] - extracted value types ([`CaseStatement`] and friends)
//! - [`classify`] - entity/pattern heuristics and confidence scoring
//! - [`extractor`] - AST-level extraction and nested-chain detection

pub mod classify;
pub mod condition;
pub mod extractor;
pub mod types;

pub use classify::{classify_entity, classify_pattern, confidence_score};
pub use condition::{CaseCondition, ConditionOperator, LogicalOperator};
pub use extractor::{find_nested_hierarchies, CaseExtractor, ExtractError};
pub use types::{
    CaseStatement, CaseWhen, ConditionPattern, EntityType, ExtractedHierarchy, ResultType,
};

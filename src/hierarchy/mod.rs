//! Hierarchy construction from extracted CASE statements.
//!
//! - [`types`] - node and hierarchy value types
//! - [`converter`] - node synthesis, parent/sort inference, batch conversion
//! - [`export`] - canonical hierarchy/mapping row shapes
//! - [`validate`] - structural invariant checks

pub mod converter;
pub mod export;
pub mod types;
pub mod validate;

pub use converter::HierarchyConverter;
pub use export::{
    to_hierarchy_rows, to_mapping_rows, HierarchyRow, MappingRow, SourceColumns,
};
pub use types::{ConvertedHierarchy, HierarchyNode, NodeMetadata, SortMethod};
pub use validate::{validate, ValidationError};

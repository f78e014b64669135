//! Canonical export row shapes.
//!
//! Pure row construction: the structs here serialize with the exact column
//! names the downstream loader expects, but writing them to a file (CSV or
//! otherwise) is the caller's concern.

use serde::{Deserialize, Serialize};

use crate::hierarchy::types::ConvertedHierarchy;

/// Deepest level representable in the fixed-width row layout.
pub const MAX_EXPORT_LEVEL: usize = 10;

/// One hierarchy row per node. Exactly one `LEVEL_i` / `LEVEL_i_SORT` pair
/// is populated: the one matching the node's own level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HierarchyRow {
    #[serde(rename = "HIERARCHY_ID")]
    pub hierarchy_id: String,
    #[serde(rename = "HIERARCHY_NAME")]
    pub hierarchy_name: String,
    #[serde(rename = "PARENT_ID")]
    pub parent_id: Option<String>,
    #[serde(rename = "DESCRIPTION")]
    pub description: Option<String>,
    #[serde(rename = "INCLUDE_FLAG")]
    pub include_flag: bool,
    #[serde(rename = "EXCLUDE_FLAG")]
    pub exclude_flag: bool,
    #[serde(rename = "FORMULA_GROUP")]
    pub formula_group: Option<String>,
    #[serde(rename = "SORT_ORDER")]
    pub sort_order: usize,
    #[serde(rename = "LEVEL_1")]
    pub level_1: Option<String>,
    #[serde(rename = "LEVEL_1_SORT")]
    pub level_1_sort: Option<usize>,
    #[serde(rename = "LEVEL_2")]
    pub level_2: Option<String>,
    #[serde(rename = "LEVEL_2_SORT")]
    pub level_2_sort: Option<usize>,
    #[serde(rename = "LEVEL_3")]
    pub level_3: Option<String>,
    #[serde(rename = "LEVEL_3_SORT")]
    pub level_3_sort: Option<usize>,
    #[serde(rename = "LEVEL_4")]
    pub level_4: Option<String>,
    #[serde(rename = "LEVEL_4_SORT")]
    pub level_4_sort: Option<usize>,
    #[serde(rename = "LEVEL_5")]
    pub level_5: Option<String>,
    #[serde(rename = "LEVEL_5_SORT")]
    pub level_5_sort: Option<usize>,
    #[serde(rename = "LEVEL_6")]
    pub level_6: Option<String>,
    #[serde(rename = "LEVEL_6_SORT")]
    pub level_6_sort: Option<usize>,
    #[serde(rename = "LEVEL_7")]
    pub level_7: Option<String>,
    #[serde(rename = "LEVEL_7_SORT")]
    pub level_7_sort: Option<usize>,
    #[serde(rename = "LEVEL_8")]
    pub level_8: Option<String>,
    #[serde(rename = "LEVEL_8_SORT")]
    pub level_8_sort: Option<usize>,
    #[serde(rename = "LEVEL_9")]
    pub level_9: Option<String>,
    #[serde(rename = "LEVEL_9_SORT")]
    pub level_9_sort: Option<usize>,
    #[serde(rename = "LEVEL_10")]
    pub level_10: Option<String>,
    #[serde(rename = "LEVEL_10_SORT")]
    pub level_10_sort: Option<usize>,
}

impl HierarchyRow {
    fn set_level(&mut self, level: usize, value: String, sort: usize) {
        let slot: Option<(&mut Option<String>, &mut Option<usize>)> = match level {
            1 => Some((&mut self.level_1, &mut self.level_1_sort)),
            2 => Some((&mut self.level_2, &mut self.level_2_sort)),
            3 => Some((&mut self.level_3, &mut self.level_3_sort)),
            4 => Some((&mut self.level_4, &mut self.level_4_sort)),
            5 => Some((&mut self.level_5, &mut self.level_5_sort)),
            6 => Some((&mut self.level_6, &mut self.level_6_sort)),
            7 => Some((&mut self.level_7, &mut self.level_7_sort)),
            8 => Some((&mut self.level_8, &mut self.level_8_sort)),
            9 => Some((&mut self.level_9, &mut self.level_9_sort)),
            10 => Some((&mut self.level_10, &mut self.level_10_sort)),
            _ => None,
        };
        if let Some((name_slot, sort_slot)) = slot {
            *name_slot = Some(value);
            *sort_slot = Some(sort);
        }
    }

    /// The populated level column, if any (levels beyond
    /// [`MAX_EXPORT_LEVEL`] leave all columns null).
    pub fn populated_level(&self) -> Option<usize> {
        [
            &self.level_1,
            &self.level_2,
            &self.level_3,
            &self.level_4,
            &self.level_5,
            &self.level_6,
            &self.level_7,
            &self.level_8,
            &self.level_9,
            &self.level_10,
        ]
        .iter()
        .position(|slot| slot.is_some())
        .map(|idx| idx + 1)
    }
}

/// Source table coordinates supplied by the caller and embedded verbatim in
/// mapping rows. Never validated against a live schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceColumns {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub column: String,
}

/// One mapping row per `(source_value, node_id)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRow {
    #[serde(rename = "MAPPING_INDEX")]
    pub mapping_index: usize,
    #[serde(rename = "SOURCE_DATABASE")]
    pub source_database: String,
    #[serde(rename = "SOURCE_SCHEMA")]
    pub source_schema: String,
    #[serde(rename = "SOURCE_TABLE")]
    pub source_table: String,
    #[serde(rename = "SOURCE_COLUMN")]
    pub source_column: String,
    #[serde(rename = "SOURCE_VALUE")]
    pub source_value: String,
    #[serde(rename = "HIERARCHY_ID")]
    pub hierarchy_id: String,
    #[serde(rename = "PRECEDENCE_GROUP")]
    pub precedence_group: u32,
}

/// One row per node, sorted by `(level, sort_order)`.
pub fn to_hierarchy_rows(hierarchy: &ConvertedHierarchy) -> Vec<HierarchyRow> {
    hierarchy
        .ordered_nodes()
        .into_iter()
        .map(|node| {
            let mut row = HierarchyRow {
                hierarchy_id: node.id.clone(),
                hierarchy_name: node.name.clone(),
                parent_id: node.parent_id.clone(),
                description: Some(node.value.clone()),
                include_flag: true,
                exclude_flag: false,
                formula_group: None,
                sort_order: node.sort_order,
                ..HierarchyRow::default()
            };
            row.set_level(node.level, node.value.clone(), node.sort_order);
            row
        })
        .collect()
}

/// One row per mapping entry, with a zero-based running index.
pub fn to_mapping_rows(hierarchy: &ConvertedHierarchy, source: &SourceColumns) -> Vec<MappingRow> {
    hierarchy
        .mapping
        .iter()
        .enumerate()
        .map(|(idx, (value, node_id))| MappingRow {
            mapping_index: idx,
            source_database: source.database.clone(),
            source_schema: source.schema.clone(),
            source_table: source.table.clone(),
            source_column: source.column.clone(),
            source_value: value.clone(),
            hierarchy_id: node_id.clone(),
            precedence_group: 1,
        })
        .collect()
}

//! Hierarchy value types produced by the converter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::case::EntityType;

/// How sort orders were assigned within one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMethod {
    /// Every value in the level starts with an integer; sorted by it.
    Numeric,
    /// Case-insensitive sort by value string.
    Lexical,
}

/// Extra facts about a node that don't warrant first-class fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// True for the node synthesized from an ELSE value.
    pub is_else: bool,
    /// Sort method applied to this node's level, set by sort inference.
    pub sort_method: Option<SortMethod>,
}

/// One classification output value with its inferred place in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: String,
    pub name: String,
    pub value: String,
    /// 1-based depth; roots are level 1.
    pub level: usize,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    pub sort_order: usize,
    /// Raw input values (LIKE patterns, IN members, ...) that map to this node.
    pub source_values: Vec<String>,
    pub metadata: NodeMetadata,
}

impl HierarchyNode {
    pub fn new(id: String, value: String, level: usize, sort_order: usize) -> Self {
        Self {
            id,
            name: value.clone(),
            value,
            level,
            parent_id: None,
            children: Vec::new(),
            sort_order,
            source_values: Vec::new(),
            metadata: NodeMetadata::default(),
        }
    }
}

/// A complete converted hierarchy: nodes, edges, mapping, and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedHierarchy {
    pub id: String,
    pub name: String,
    pub entity_type: EntityType,
    pub nodes: BTreeMap<String, HierarchyNode>,
    /// Ids of nodes with no parent.
    pub root_nodes: Vec<String>,
    /// Number of distinct levels among nodes.
    pub level_count: usize,
    pub total_nodes: usize,
    pub source_case_id: String,
    /// `source_value -> node_id`; every source value maps to exactly one node.
    pub mapping: BTreeMap<String, String>,
    /// Heuristic trust estimate in `[0, 1]`.
    pub confidence: f64,
    /// Human-readable justification of each inference made.
    pub notes: Vec<String>,
}

impl ConvertedHierarchy {
    /// Nodes in deterministic `(level, sort_order)` order.
    pub fn ordered_nodes(&self) -> Vec<&HierarchyNode> {
        let mut nodes: Vec<&HierarchyNode> = self.nodes.values().collect();
        nodes.sort_by_key(|n| (n.level, n.sort_order, n.id.clone()));
        nodes
    }
}

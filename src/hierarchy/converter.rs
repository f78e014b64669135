//! Converts extracted CASE statements into hierarchies.
//!
//! Node synthesis groups WHEN clauses by result value (first-occurrence
//! order), parent inference applies only to prefix-pattern statements and is
//! deliberately first-match-wins (downstream systems depend on which parents
//! this picks, so it is not "improved" to prefer the longest prefix), and
//! sort orders are reassigned per level: numerically when every value in the
//! level carries a leading code, case-insensitively otherwise.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::case::extractor::find_nested_hierarchies;
use crate::case::{classify, CaseStatement};
use crate::hash::stable_id;
use crate::hierarchy::types::{ConvertedHierarchy, HierarchyNode, SortMethod};

/// Confidence assigned by nested two-statement conversion: explicit chaining
/// is higher-trust evidence than pattern inference.
const NESTED_CONFIDENCE: f64 = 0.8;

/// Converts [`CaseStatement`]s into [`ConvertedHierarchy`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyConverter;

impl HierarchyConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert one CASE statement into a single-level (or, with prefix
    /// parent inference, multi-level) hierarchy.
    pub fn convert(&self, case: &CaseStatement) -> ConvertedHierarchy {
        let mut notes = Vec::new();
        let mut nodes = synthesize_nodes(case, 1);
        let mapping = build_mapping(&nodes, BTreeMap::new());

        let edges_inferred = if case.detected_pattern == Some(crate::case::ConditionPattern::Prefix)
        {
            infer_parents(&mut nodes, &mut notes)
        } else {
            false
        };

        infer_sort_orders(&mut nodes, &mut notes);

        let (confidence, score_notes) = classify::confidence_score(
            case.condition_count,
            case.detected_entity_type,
            case.detected_pattern,
            case.unique_result_values.len(),
            edges_inferred,
        );
        let mut all_notes = score_notes;
        all_notes.extend(notes);

        finish(
            stable_id("hier", &case.id),
            hierarchy_name(case),
            case.detected_entity_type,
            case.id.clone(),
            nodes,
            mapping,
            confidence,
            all_notes,
        )
    }

    /// Convert a detected parent/child chain into a two-level hierarchy.
    ///
    /// Level-1 nodes come from the parent CASE; each level-2 node attaches to
    /// the first level-1 node whose value appears among its source values.
    /// Unmatched child nodes stay parentless at level 2 and count as roots.
    pub fn convert_nested(
        &self,
        parent_case: &CaseStatement,
        child_case: &CaseStatement,
    ) -> ConvertedHierarchy {
        let mut notes = Vec::new();

        let mut nodes = synthesize_nodes(parent_case, 1);
        let parent_count = nodes.len();
        nodes.extend(synthesize_nodes(child_case, 2));

        // Parent output value -> index of the level-1 node carrying it.
        let mut by_value: BTreeMap<&str, usize> = BTreeMap::new();
        for (idx, node) in nodes[..parent_count].iter().enumerate() {
            by_value.entry(&node.value).or_insert(idx);
        }
        let attach: Vec<Option<usize>> = nodes[parent_count..]
            .iter()
            .map(|child| {
                child
                    .source_values
                    .iter()
                    .find_map(|value| by_value.get(value.as_str()).copied())
            })
            .collect();

        for (offset, parent_idx) in attach.into_iter().enumerate() {
            let child_idx = parent_count + offset;
            if let Some(parent_idx) = parent_idx {
                let parent_id = nodes[parent_idx].id.clone();
                let child_id = nodes[child_idx].id.clone();
                notes.push(format!(
                    "attached '{}' under '{}' via chained output value",
                    nodes[child_idx].value, nodes[parent_idx].value
                ));
                nodes[child_idx].parent_id = Some(parent_id);
                nodes[parent_idx].children.push(child_id);
            }
        }

        let mapping = build_mapping(&nodes, BTreeMap::new());
        infer_sort_orders(&mut nodes, &mut notes);
        notes.push(format!(
            "nested conversion assigns fixed confidence {NESTED_CONFIDENCE:.2}"
        ));

        finish(
            stable_id("hier", &format!("{}:{}", parent_case.id, child_case.id)),
            hierarchy_name(parent_case),
            parent_case.detected_entity_type,
            parent_case.id.clone(),
            nodes,
            mapping,
            NESTED_CONFIDENCE,
            notes,
        )
    }

    /// Convert a batch: chain pairs become nested hierarchies, the remainder
    /// converts standalone. A statement participating in any chain never also
    /// appears as a standalone conversion.
    pub fn convert_multiple(&self, statements: &[CaseStatement]) -> Vec<ConvertedHierarchy> {
        let pairs = find_nested_hierarchies(statements);
        let chained: HashSet<usize> = pairs.iter().flat_map(|&(p, c)| [p, c]).collect();
        debug!(
            statements = statements.len(),
            chains = pairs.len(),
            "converting statement batch"
        );

        let mut out = Vec::new();
        for (parent_idx, child_idx) in pairs {
            out.push(self.convert_nested(&statements[parent_idx], &statements[child_idx]));
        }
        for (idx, statement) in statements.iter().enumerate() {
            if !chained.contains(&idx) {
                out.push(self.convert(statement));
            }
        }
        out
    }
}

fn hierarchy_name(case: &CaseStatement) -> String {
    if case.source_column.is_empty() {
        format!("{} hierarchy", case.detected_entity_type)
    } else {
        format!("{} hierarchy", case.source_column)
    }
}

// =============================================================================
// Node synthesis
// =============================================================================

/// One node per distinct result value, in first-occurrence order, plus an
/// ELSE node appended last when the CASE has one.
fn synthesize_nodes(case: &CaseStatement, level: usize) -> Vec<HierarchyNode> {
    let mut nodes: Vec<HierarchyNode> = Vec::new();

    for when in &case.when_clauses {
        let idx = match nodes.iter().position(|n| n.value == when.result_value) {
            Some(idx) => idx,
            None => {
                let sort_order = nodes.len();
                let id = stable_id("node", &format!("{}:{}", case.id, when.result_value));
                nodes.push(HierarchyNode::new(
                    id,
                    when.result_value.clone(),
                    level,
                    sort_order,
                ));
                nodes.len() - 1
            }
        };
        for value in when.condition.leaf_values() {
            if !nodes[idx].source_values.iter().any(|v| v == value) {
                nodes[idx].source_values.push(value.to_string());
            }
        }
    }

    if let Some(else_value) = &case.else_value {
        let sort_order = nodes.len();
        let id = stable_id("node", &format!("{}:else:{}", case.id, else_value));
        let mut node = HierarchyNode::new(id, else_value.clone(), level, sort_order);
        node.metadata.is_else = true;
        nodes.push(node);
    }

    nodes
}

/// `source_value -> node_id`, first mapping wins.
fn build_mapping(
    nodes: &[HierarchyNode],
    mut mapping: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    for node in nodes {
        for value in &node.source_values {
            mapping
                .entry(value.clone())
                .or_insert_with(|| node.id.clone());
        }
    }
    mapping
}

// =============================================================================
// Parent inference (prefix pattern only)
// =============================================================================

/// A node's code-space prefix: its shortest source value with trailing
/// wildcard characters trimmed. Empty when the node has no usable values.
fn node_prefix(node: &HierarchyNode) -> Option<String> {
    node.source_values
        .iter()
        .map(|v| v.trim_end_matches(['%', '_']).to_string())
        .filter(|p| !p.is_empty())
        .min_by_key(|p| p.len())
}

/// First-match-wins parent assignment: a node whose prefix is strictly
/// contained in another node's code space becomes that node's child.
fn infer_parents(nodes: &mut [HierarchyNode], notes: &mut Vec<String>) -> bool {
    let prefixes: Vec<Option<String>> = nodes.iter().map(node_prefix).collect();
    let mut any = false;

    for idx in 0..nodes.len() {
        let Some(prefix) = &prefixes[idx] else {
            continue;
        };
        for candidate in 0..nodes.len() {
            if candidate == idx {
                continue;
            }
            let Some(candidate_prefix) = &prefixes[candidate] else {
                continue;
            };
            if candidate_prefix != prefix && prefix.starts_with(candidate_prefix.as_str()) {
                let parent_id = nodes[candidate].id.clone();
                let child_id = nodes[idx].id.clone();
                nodes[idx].parent_id = Some(parent_id);
                nodes[idx].level = nodes[candidate].level + 1;
                nodes[candidate].children.push(child_id);
                notes.push(format!(
                    "inferred '{}' as parent of '{}' (code prefix '{}' contains '{}')",
                    nodes[candidate].value, nodes[idx].value, candidate_prefix, prefix
                ));
                any = true;
                break;
            }
        }
    }
    any
}

// =============================================================================
// Sort-order inference
// =============================================================================

fn leading_int(value: &str) -> Option<i64> {
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Reassign sort orders within each level: ascending by leading integer when
/// every node in the level has one, case-insensitive by value otherwise.
fn infer_sort_orders(nodes: &mut [HierarchyNode], notes: &mut Vec<String>) {
    let mut levels: Vec<usize> = nodes.iter().map(|n| n.level).collect();
    levels.sort_unstable();
    levels.dedup();

    for level in levels {
        let mut members: Vec<usize> = (0..nodes.len())
            .filter(|&i| nodes[i].level == level)
            .collect();

        let numeric = members
            .iter()
            .all(|&i| leading_int(&nodes[i].value).is_some());
        let method = if numeric {
            members.sort_by_key(|&i| (leading_int(&nodes[i].value), nodes[i].value.clone()));
            SortMethod::Numeric
        } else {
            members.sort_by_key(|&i| nodes[i].value.to_lowercase());
            SortMethod::Lexical
        };

        for (order, &i) in members.iter().enumerate() {
            nodes[i].sort_order = order;
            nodes[i].metadata.sort_method = Some(method);
        }
        notes.push(match method {
            SortMethod::Numeric => format!("level {level} ordered by leading code number"),
            SortMethod::Lexical => format!("level {level} ordered alphabetically"),
        });
    }
}

// =============================================================================
// Assembly
// =============================================================================

#[allow(clippy::too_many_arguments)]
fn finish(
    id: String,
    name: String,
    entity_type: crate::case::EntityType,
    source_case_id: String,
    nodes: Vec<HierarchyNode>,
    mapping: BTreeMap<String, String>,
    confidence: f64,
    notes: Vec<String>,
) -> ConvertedHierarchy {
    let root_nodes: Vec<String> = nodes
        .iter()
        .filter(|n| n.parent_id.is_none())
        .map(|n| n.id.clone())
        .collect();
    let mut levels: Vec<usize> = nodes.iter().map(|n| n.level).collect();
    levels.sort_unstable();
    levels.dedup();
    let total_nodes = nodes.len();

    ConvertedHierarchy {
        id,
        name,
        entity_type,
        nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
        root_nodes,
        level_count: levels.len(),
        total_nodes,
        source_case_id,
        mapping,
        confidence,
        notes,
    }
}

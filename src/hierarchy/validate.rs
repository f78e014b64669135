//! Structural validation of converted hierarchies.

use std::collections::HashSet;

use crate::hierarchy::types::ConvertedHierarchy;

/// Validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A node's `parent_id` points at a node that does not exist.
    OrphanedParent { node_id: String, parent_id: String },
    /// Following parent links from a node revisits it.
    Cycle { cycle: Vec<String> },
    /// A parentless node is missing from `root_nodes`, or `root_nodes`
    /// lists a node that has a parent or does not exist.
    RootMismatch { node_id: String, issue: String },
    /// A `children` entry does not point back via `parent_id`.
    BrokenChildLink { node_id: String, child_id: String },
    /// A mapping entry targets a node id that does not exist.
    DanglingMapping { source_value: String, node_id: String },
    /// A stored count disagrees with the node set.
    CountMismatch {
        field: String,
        stored: usize,
        actual: usize,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::OrphanedParent { node_id, parent_id } => {
                write!(f, "Node '{}' references missing parent '{}'", node_id, parent_id)
            }
            ValidationError::Cycle { cycle } => {
                write!(f, "Parent cycle: {}", cycle.join(" -> "))
            }
            ValidationError::RootMismatch { node_id, issue } => {
                write!(f, "Root list inconsistency for '{}': {}", node_id, issue)
            }
            ValidationError::BrokenChildLink { node_id, child_id } => {
                write!(
                    f,
                    "Node '{}' lists child '{}' which does not link back",
                    node_id, child_id
                )
            }
            ValidationError::DanglingMapping { source_value, node_id } => {
                write!(
                    f,
                    "Mapping for '{}' targets missing node '{}'",
                    source_value, node_id
                )
            }
            ValidationError::CountMismatch { field, stored, actual } => {
                write!(f, "{} is {} but nodes imply {}", field, stored, actual)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a converted hierarchy's structural invariants.
pub fn validate(hierarchy: &ConvertedHierarchy) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_parents(hierarchy, &mut errors);
    validate_cycles(hierarchy, &mut errors);
    validate_roots(hierarchy, &mut errors);
    validate_children(hierarchy, &mut errors);
    validate_mapping(hierarchy, &mut errors);
    validate_counts(hierarchy, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_parents(hierarchy: &ConvertedHierarchy, errors: &mut Vec<ValidationError>) {
    for node in hierarchy.nodes.values() {
        if let Some(parent_id) = &node.parent_id {
            if !hierarchy.nodes.contains_key(parent_id) {
                errors.push(ValidationError::OrphanedParent {
                    node_id: node.id.clone(),
                    parent_id: parent_id.clone(),
                });
            }
        }
    }
}

fn validate_cycles(hierarchy: &ConvertedHierarchy, errors: &mut Vec<ValidationError>) {
    for start in hierarchy.nodes.keys() {
        let mut seen = HashSet::new();
        let mut trail = Vec::new();
        let mut current = Some(start.clone());
        while let Some(id) = current {
            if !seen.insert(id.clone()) {
                if id == *start {
                    trail.push(id);
                    errors.push(ValidationError::Cycle { cycle: trail });
                }
                break;
            }
            trail.push(id.clone());
            current = hierarchy
                .nodes
                .get(&id)
                .and_then(|n| n.parent_id.clone());
        }
    }
}

fn validate_roots(hierarchy: &ConvertedHierarchy, errors: &mut Vec<ValidationError>) {
    let roots: HashSet<&String> = hierarchy.root_nodes.iter().collect();
    for node in hierarchy.nodes.values() {
        if node.parent_id.is_none() && !roots.contains(&node.id) {
            errors.push(ValidationError::RootMismatch {
                node_id: node.id.clone(),
                issue: "parentless node missing from root_nodes".to_string(),
            });
        }
    }
    for root_id in &hierarchy.root_nodes {
        match hierarchy.nodes.get(root_id) {
            None => errors.push(ValidationError::RootMismatch {
                node_id: root_id.clone(),
                issue: "root_nodes entry does not exist".to_string(),
            }),
            Some(node) if node.parent_id.is_some() => {
                errors.push(ValidationError::RootMismatch {
                    node_id: root_id.clone(),
                    issue: "root_nodes entry has a parent".to_string(),
                });
            }
            Some(_) => {}
        }
    }
}

fn validate_children(hierarchy: &ConvertedHierarchy, errors: &mut Vec<ValidationError>) {
    for node in hierarchy.nodes.values() {
        for child_id in &node.children {
            let links_back = hierarchy
                .nodes
                .get(child_id)
                .is_some_and(|child| child.parent_id.as_deref() == Some(node.id.as_str()));
            if !links_back {
                errors.push(ValidationError::BrokenChildLink {
                    node_id: node.id.clone(),
                    child_id: child_id.clone(),
                });
            }
        }
    }
}

fn validate_mapping(hierarchy: &ConvertedHierarchy, errors: &mut Vec<ValidationError>) {
    for (source_value, node_id) in &hierarchy.mapping {
        if !hierarchy.nodes.contains_key(node_id) {
            errors.push(ValidationError::DanglingMapping {
                source_value: source_value.clone(),
                node_id: node_id.clone(),
            });
        }
    }
}

fn validate_counts(hierarchy: &ConvertedHierarchy, errors: &mut Vec<ValidationError>) {
    if hierarchy.total_nodes != hierarchy.nodes.len() {
        errors.push(ValidationError::CountMismatch {
            field: "total_nodes".to_string(),
            stored: hierarchy.total_nodes,
            actual: hierarchy.nodes.len(),
        });
    }
    let mut levels: Vec<usize> = hierarchy.nodes.values().map(|n| n.level).collect();
    levels.sort_unstable();
    levels.dedup();
    if hierarchy.level_count != levels.len() {
        errors.push(ValidationError::CountMismatch {
            field: "level_count".to_string(),
            stored: hierarchy.level_count,
            actual: levels.len(),
        });
    }
}

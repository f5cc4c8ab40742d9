//! Iteration tree — a rooted tree of actions, states, and decisions with
//! one active pointer marking the current position.
//!
//! Nodes are never deleted; pruning marks a subtree abandoned so history
//! survives. The whole tree round-trips losslessly through JSON.

use crate::error::SovereignError;
use crate::types::{IterationNode, NodeKind, NodeStatus};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Id given to the root node of every tree.
pub const ROOT_NODE_ID: &str = "root";

/// A named collection of nodes plus the active pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationTree {
    pub tree_id: String,
    pub root_id: Option<String>,
    pub active_node_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    #[serde(default)]
    pub nodes: BTreeMap<String, IterationNode>,
}

impl IterationTree {
    pub fn new(tree_id: &str) -> Self {
        let now = Utc::now();
        Self {
            tree_id: tree_id.to_string(),
            root_id: None,
            active_node_id: None,
            created_at: now,
            updated_at: now,
            metadata: BTreeMap::new(),
            nodes: BTreeMap::new(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Create the root node. Fails if the tree already has one.
    /// The root starts `active` and becomes the active node.
    pub fn create_root(
        &mut self,
        name: &str,
        description: &str,
        kind: NodeKind,
    ) -> Result<&IterationNode, SovereignError> {
        if self.root_id.is_some() {
            return Err(SovereignError::RootExists);
        }

        let mut root = IterationNode::new(ROOT_NODE_ID, kind, name, description);
        root.status = NodeStatus::Active;

        self.nodes.insert(ROOT_NODE_ID.to_string(), root);
        self.root_id = Some(ROOT_NODE_ID.to_string());
        self.active_node_id = Some(ROOT_NODE_ID.to_string());
        self.touch();

        Ok(&self.nodes[ROOT_NODE_ID])
    }

    /// Add a new pending node under an existing parent. Fails on duplicate
    /// node id or unknown parent; neither failure mutates the tree.
    pub fn add_node(
        &mut self,
        parent_id: &str,
        node_id: &str,
        name: &str,
        description: &str,
        kind: NodeKind,
        metadata: BTreeMap<String, Value>,
    ) -> Result<&IterationNode, SovereignError> {
        if self.nodes.contains_key(node_id) {
            return Err(SovereignError::DuplicateNode(node_id.to_string()));
        }
        if !self.nodes.contains_key(parent_id) {
            return Err(SovereignError::ParentNotFound(parent_id.to_string()));
        }

        let mut node = IterationNode::new(node_id, kind, name, description);
        node.parent_id = Some(parent_id.to_string());
        node.metadata = metadata;

        self.nodes.insert(node_id.to_string(), node);
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.add_child(node_id);
        }
        self.touch();

        Ok(&self.nodes[node_id])
    }

    pub fn get_node(&self, node_id: &str) -> Option<&IterationNode> {
        self.nodes.get(node_id)
    }

    pub fn get_node_mut(&mut self, node_id: &str) -> Option<&mut IterationNode> {
        self.nodes.get_mut(node_id)
    }

    /// Children of a node in insertion order. Unknown ids yield an empty
    /// list, not an error.
    pub fn get_children(&self, node_id: &str) -> Vec<&IterationNode> {
        match self.nodes.get(node_id) {
            Some(node) => node
                .children_ids
                .iter()
                .filter_map(|cid| self.nodes.get(cid))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Path from the root down to the given node, inclusive. Empty when the
    /// id is unknown or a parent link points at a missing node.
    pub fn get_path_to_root(&self, node_id: &str) -> Vec<&IterationNode> {
        let mut path = Vec::new();
        let mut current_id = Some(node_id.to_string());

        while let Some(cid) = current_id {
            match self.nodes.get(&cid) {
                Some(node) => {
                    path.push(node);
                    current_id = node.parent_id.clone();
                }
                None => return Vec::new(),
            }
        }

        path.reverse();
        path
    }

    /// Every complete node-id path from the given node to a reachable leaf,
    /// depth-first in child insertion order. A childless node is itself a
    /// one-element branch.
    pub fn get_branches(&self, node_id: &str) -> Vec<Vec<String>> {
        let mut branches = Vec::new();
        if !self.nodes.contains_key(node_id) {
            return branches;
        }

        // Explicit stack; children pushed in reverse so the first child's
        // branches come out first.
        let mut stack: Vec<(String, Vec<String>)> = vec![(node_id.to_string(), Vec::new())];

        while let Some((current, mut path)) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            path.push(current);

            if node.children_ids.is_empty() {
                branches.push(path);
            } else {
                for child_id in node.children_ids.iter().rev() {
                    stack.push((child_id.clone(), path.clone()));
                }
            }
        }

        branches
    }

    /// Make the given node the active one. The previously active node, if
    /// it was still `active`, transitions to `completed`. Returns `false`
    /// for unknown ids.
    pub fn set_active_node(&mut self, node_id: &str) -> bool {
        if !self.nodes.contains_key(node_id) {
            return false;
        }

        if let Some(prev_id) = self.active_node_id.clone() {
            if let Some(prev) = self.nodes.get_mut(&prev_id) {
                if prev.status == NodeStatus::Active {
                    prev.update_status(NodeStatus::Completed);
                }
            }
        }

        self.active_node_id = Some(node_id.to_string());
        if let Some(node) = self.nodes.get_mut(node_id) {
            node.update_status(NodeStatus::Active);
        }
        self.touch();
        true
    }

    /// Path from the root to the currently active node; empty when no node
    /// is active.
    pub fn get_active_path(&self) -> Vec<&IterationNode> {
        match &self.active_node_id {
            Some(id) => self.get_path_to_root(id),
            None => Vec::new(),
        }
    }

    /// Mark a node and all its descendants `abandoned`, preserving them in
    /// the tree. Returns `false` for unknown ids.
    pub fn prune_branch(&mut self, node_id: &str) -> bool {
        if !self.nodes.contains_key(node_id) {
            return false;
        }

        let mut stack = vec![node_id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&current) {
                node.update_status(NodeStatus::Abandoned);
                stack.extend(node.children_ids.iter().cloned());
            }
        }

        self.touch();
        true
    }

    /// Summary counts for the whole tree.
    pub fn get_statistics(&self) -> TreeStatistics {
        let mut by_kind: BTreeMap<NodeKind, usize> = BTreeMap::new();
        let mut by_status: BTreeMap<NodeStatus, usize> = BTreeMap::new();

        for node in self.nodes.values() {
            *by_kind.entry(node.kind).or_insert(0) += 1;
            *by_status.entry(node.status).or_insert(0) += 1;
        }

        TreeStatistics {
            tree_id: self.tree_id.clone(),
            total_nodes: self.nodes.len(),
            nodes_by_kind: by_kind,
            nodes_by_status: by_status,
            root_id: self.root_id.clone(),
            active_node_id: self.active_node_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Write the tree as a pretty-printed JSON document.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize tree")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write tree file {}", path.display()))?;
        debug!("Saved tree '{}' to {}", self.tree_id, path.display());
        Ok(())
    }

    /// Load a tree from a JSON document written by [`IterationTree::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tree file {}", path.display()))?;
        let tree: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse tree file {}", path.display()))?;
        Ok(tree)
    }
}

/// Node counts grouped by kind and status, plus tree-level pointers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeStatistics {
    pub tree_id: String,
    pub total_nodes: usize,
    pub nodes_by_kind: BTreeMap<NodeKind, usize>,
    pub nodes_by_status: BTreeMap<NodeStatus, usize>,
    pub root_id: Option<String>,
    pub active_node_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> IterationTree {
        let mut tree = IterationTree::new("test_tree");
        tree.create_root("Root", "Starting point", NodeKind::State)
            .unwrap();
        tree
    }

    fn add(tree: &mut IterationTree, parent: &str, id: &str) {
        tree.add_node(parent, id, id, &format!("node {id}"), NodeKind::Action, BTreeMap::new())
            .unwrap();
    }

    #[test]
    fn create_root_initializes_pointers() {
        let tree = sample_tree();
        assert_eq!(tree.root_id.as_deref(), Some("root"));
        assert_eq!(tree.active_node_id.as_deref(), Some("root"));
        assert_eq!(tree.get_node("root").unwrap().status, NodeStatus::Active);
    }

    #[test]
    fn second_root_fails_and_leaves_tree_unchanged() {
        let mut tree = sample_tree();
        let before = tree.nodes.len();
        let err = tree.create_root("Again", "nope", NodeKind::State);
        assert!(matches!(err, Err(SovereignError::RootExists)));
        assert_eq!(tree.nodes.len(), before);
        assert_eq!(tree.root_id.as_deref(), Some("root"));
    }

    #[test]
    fn add_node_rejects_duplicates_and_unknown_parents() {
        let mut tree = sample_tree();
        add(&mut tree, "root", "a");

        let dup = tree.add_node("root", "a", "a", "dup", NodeKind::Action, BTreeMap::new());
        assert!(matches!(dup, Err(SovereignError::DuplicateNode(_))));

        let orphan = tree.add_node("ghost", "b", "b", "orphan", NodeKind::Action, BTreeMap::new());
        assert!(matches!(orphan, Err(SovereignError::ParentNotFound(_))));
        assert!(tree.get_node("b").is_none());
    }

    #[test]
    fn children_preserve_insertion_order() {
        let mut tree = sample_tree();
        add(&mut tree, "root", "c");
        add(&mut tree, "root", "a");
        add(&mut tree, "root", "b");

        let order: Vec<_> = tree
            .get_children("root")
            .iter()
            .map(|n| n.node_id.clone())
            .collect();
        assert_eq!(order, ["c", "a", "b"]);
        assert!(tree.get_children("missing").is_empty());
    }

    #[test]
    fn path_to_root_has_depth_plus_one_nodes() {
        let mut tree = sample_tree();
        add(&mut tree, "root", "a");
        add(&mut tree, "a", "b");
        add(&mut tree, "b", "c");

        let path = tree.get_path_to_root("c");
        let ids: Vec<_> = path.iter().map(|n| n.node_id.clone()).collect();
        assert_eq!(ids, ["root", "a", "b", "c"]);
        assert!(tree.get_path_to_root("missing").is_empty());
    }

    #[test]
    fn branches_partition_all_leaves() {
        let mut tree = sample_tree();
        add(&mut tree, "root", "a");
        add(&mut tree, "root", "b");
        add(&mut tree, "a", "a1");
        add(&mut tree, "a", "a2");

        let branches = tree.get_branches("root");
        assert_eq!(
            branches,
            vec![
                vec!["root".to_string(), "a".to_string(), "a1".to_string()],
                vec!["root".to_string(), "a".to_string(), "a2".to_string()],
                vec!["root".to_string(), "b".to_string()],
            ]
        );

        // Leaf count equals branch count.
        let leaves = tree.nodes.values().filter(|n| n.is_leaf()).count();
        assert_eq!(branches.len(), leaves);

        // A leaf is its own one-element branch.
        assert_eq!(tree.get_branches("b"), vec![vec!["b".to_string()]]);
        assert!(tree.get_branches("missing").is_empty());
    }

    #[test]
    fn set_active_node_completes_previous_active() {
        let mut tree = sample_tree();
        add(&mut tree, "root", "a");

        assert!(tree.set_active_node("a"));
        assert_eq!(tree.get_node("root").unwrap().status, NodeStatus::Completed);
        assert_eq!(tree.get_node("a").unwrap().status, NodeStatus::Active);

        // Repeating the call keeps exactly one node active and does not
        // double-transition anything.
        assert!(tree.set_active_node("a"));
        let active = tree
            .nodes
            .values()
            .filter(|n| n.status == NodeStatus::Active)
            .count();
        assert_eq!(active, 1);
        assert_eq!(tree.get_node("root").unwrap().status, NodeStatus::Completed);

        assert!(!tree.set_active_node("missing"));
        assert_eq!(tree.active_node_id.as_deref(), Some("a"));
    }

    #[test]
    fn prune_branch_abandons_subtree_only() {
        let mut tree = sample_tree();
        add(&mut tree, "root", "a");
        add(&mut tree, "root", "b");
        add(&mut tree, "a", "a1");

        assert!(tree.prune_branch("a"));
        assert_eq!(tree.get_node("a").unwrap().status, NodeStatus::Abandoned);
        assert_eq!(tree.get_node("a1").unwrap().status, NodeStatus::Abandoned);
        // Sibling and ancestor untouched.
        assert_eq!(tree.get_node("b").unwrap().status, NodeStatus::Pending);
        assert_eq!(tree.get_node("root").unwrap().status, NodeStatus::Active);

        assert!(!tree.prune_branch("missing"));
    }

    #[test]
    fn resonance_is_clamped() {
        let mut tree = sample_tree();
        let node = tree.get_node_mut("root").unwrap();
        node.set_resonance(1.5);
        assert_eq!(node.resonance_score, 1.0);
        node.set_resonance(-0.5);
        assert_eq!(node.resonance_score, 0.0);
        node.set_resonance(0.42);
        assert_eq!(node.resonance_score, 0.42);
    }

    #[test]
    fn statistics_count_by_kind_and_status() {
        let mut tree = sample_tree();
        add(&mut tree, "root", "a");
        add(&mut tree, "root", "b");
        tree.prune_branch("b");

        let stats = tree.get_statistics();
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.nodes_by_kind[&NodeKind::State], 1);
        assert_eq!(stats.nodes_by_kind[&NodeKind::Action], 2);
        assert_eq!(stats.nodes_by_status[&NodeStatus::Active], 1);
        assert_eq!(stats.nodes_by_status[&NodeStatus::Pending], 1);
        assert_eq!(stats.nodes_by_status[&NodeStatus::Abandoned], 1);
        assert_eq!(stats.active_node_id.as_deref(), Some("root"));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");

        let mut tree = sample_tree();
        add(&mut tree, "root", "a");
        tree.get_node_mut("a").unwrap().set_resonance(0.7);
        tree.metadata
            .insert("purpose".into(), serde_json::json!("testing"));
        tree.set_active_node("a");
        tree.save(&path).unwrap();

        let loaded = IterationTree::load(&path).unwrap();
        assert_eq!(loaded.tree_id, tree.tree_id);
        assert_eq!(loaded.root_id, tree.root_id);
        assert_eq!(loaded.active_node_id, tree.active_node_id);
        assert_eq!(loaded.metadata, tree.metadata);
        assert_eq!(loaded.nodes.len(), tree.nodes.len());

        let a = loaded.get_node("a").unwrap();
        assert_eq!(a.resonance_score, 0.7);
        assert_eq!(a.status, NodeStatus::Active);
        assert_eq!(a.parent_id.as_deref(), Some("root"));
        assert_eq!(loaded.get_node("root").unwrap().children_ids, vec!["a"]);
    }
}

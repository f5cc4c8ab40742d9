//! Shared types used across the sovereign iteration framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Node kind and status
// ---------------------------------------------------------------------------

/// What a node in an iteration tree represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A concrete action taken or to be taken.
    Action,
    /// A state the system passes through.
    State,
    /// A decision point between alternatives.
    Decision,
    /// A milestone worth marking.
    Milestone,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action => write!(f, "action"),
            Self::State => write!(f, "state"),
            Self::Decision => write!(f, "decision"),
            Self::Milestone => write!(f, "milestone"),
        }
    }
}

/// Lifecycle status of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Created but not yet navigated to.
    Pending,
    /// The current position in the tree.
    Active,
    /// Navigated through or executed successfully.
    Completed,
    /// Pruned — kept for history, excluded from suggestions.
    Abandoned,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Abandoned => write!(f, "abandoned"),
        }
    }
}

impl Default for NodeStatus {
    fn default() -> Self {
        Self::Pending
    }
}

// ---------------------------------------------------------------------------
// Iteration node
// ---------------------------------------------------------------------------

/// A single node in an iteration tree: one action, state, decision, or
/// milestone, linked to its parent and children by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationNode {
    pub node_id: String,
    pub kind: NodeKind,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    /// Alignment with the configured truths, clamped to [0, 1].
    #[serde(default)]
    pub resonance_score: f64,
}

impl IterationNode {
    /// Create a fresh pending node with no links.
    pub fn new(node_id: &str, kind: NodeKind, name: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            node_id: node_id.to_string(),
            kind,
            name: name.to_string(),
            description: description.to_string(),
            status: NodeStatus::Pending,
            parent_id: None,
            children_ids: Vec::new(),
            created_at: now,
            updated_at: now,
            metadata: BTreeMap::new(),
            resonance_score: 0.0,
        }
    }

    /// Append a child id, ignoring duplicates. Child order is the
    /// authoritative traversal order for the whole tree.
    pub fn add_child(&mut self, child_id: &str) {
        if !self.children_ids.iter().any(|c| c == child_id) {
            self.children_ids.push(child_id.to_string());
            self.updated_at = Utc::now();
        }
    }

    /// Transition to a new status.
    pub fn update_status(&mut self, status: NodeStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Set the resonance score, clamped to [0, 1].
    pub fn set_resonance(&mut self, score: f64) {
        self.resonance_score = score.clamp(0.0, 1.0);
        self.updated_at = Utc::now();
    }

    pub fn is_leaf(&self) -> bool {
        self.children_ids.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Sovereign choice log
// ---------------------------------------------------------------------------

/// An immutable record of a deliberate transition between two nodes.
/// Appended to the workflow memory; never mutated or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SovereignChoice {
    pub choice_id: String,
    pub tree_id: String,
    pub from_node_id: String,
    pub to_node_id: String,
    pub rationale: String,
    /// Destination node's resonance at the time the choice was made.
    pub resonance_score: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

// ---------------------------------------------------------------------------
// Workflow records
// ---------------------------------------------------------------------------

/// Registered metadata for one workflow (one iteration tree).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub workflow_id: String,
    pub name: String,
    pub description: String,
    pub tree_id: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

/// An external task descriptor that can be attached to a workflow as a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowTask {
    pub task_id: String,
    pub name: String,
    pub description: String,
    #[serde(default = "default_task_status")]
    pub status: String,
    #[serde(default = "default_task_priority")]
    pub priority: i64,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
}

fn default_task_status() -> String {
    "pending".into()
}

fn default_task_priority() -> i64 {
    1
}

impl WorkflowTask {
    pub fn new(task_id: &str, name: &str, description: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            status: default_task_status(),
            priority: default_task_priority(),
            dependencies: Vec::new(),
            metadata: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }
}

//! Workflow manager — wraps iteration trees with step execution,
//! branching, and sovereign-choice recording.
//!
//! Every workflow owns one tree. Choices between branches are appended
//! to an immutable log and the whole state persists as JSON documents
//! under the storage directory.

pub mod memory;

use crate::collab::{EventSink, NullEventSink};
use crate::error::SovereignError;
use crate::optimizer::PathOptimizer;
use crate::tree::model::IterationTree;
use crate::tree::store::TreeStore;
use crate::tree::TreeStatistics;
use crate::types::{IterationNode, NodeKind, NodeStatus, SovereignChoice, WorkflowRecord, WorkflowTask};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const MEMORY_FILE_NAME: &str = "sovereign_memory.json";
const TREES_DIR_NAME: &str = "iterations";

/// Handler invoked when a step with a registered handler executes.
/// Receives a snapshot of the node and the caller's context.
pub type StepHandler = Box<dyn Fn(&IterationNode, &Value) -> Result<Value>>;

// ---------------------------------------------------------------------------
// Projection records
// ---------------------------------------------------------------------------

/// Outcome of executing one step. A handler failure abandons the step and
/// is reported here instead of propagating.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step_id: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler_result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One entry a branch request asks to create under the branching step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSpec {
    pub step_id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

/// A suggested next step with its (possibly bonus-boosted) score.
#[derive(Debug, Clone, Serialize)]
pub struct StepSuggestion {
    pub step_id: String,
    pub name: String,
    pub description: String,
    pub resonance_score: f64,
    pub status: NodeStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathStep {
    pub step_id: String,
    pub name: String,
}

/// Combined view of a workflow: registration, tree statistics, the active
/// path, and current suggestions.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStatus {
    pub workflow_id: String,
    pub name: String,
    pub status: String,
    pub statistics: TreeStatistics,
    pub active_path: Vec<PathStep>,
    pub next_suggestions: Vec<StepSuggestion>,
}

/// Full exported history of one workflow.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowHistory {
    pub workflow: Option<WorkflowRecord>,
    pub tree: IterationTree,
    pub choices: Vec<SovereignChoice>,
    pub statistics: TreeStatistics,
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Orchestrates workflows over iteration trees and records sovereign
/// choices in the shared memory file.
pub struct SovereignWorkflowManager {
    memory_file: PathBuf,
    trees: TreeStore,
    optimizer: PathOptimizer,
    workflows: BTreeMap<String, WorkflowRecord>,
    tasks: BTreeMap<String, WorkflowTask>,
    choices: Vec<SovereignChoice>,
    handlers: BTreeMap<String, StepHandler>,
    events: Box<dyn EventSink>,
}

impl SovereignWorkflowManager {
    /// Open a manager over the given storage directory and load any
    /// persisted state. Missing or corrupt state starts empty.
    pub fn new(storage_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(storage_dir).with_context(|| {
            format!("Failed to create storage directory {}", storage_dir.display())
        })?;

        let trees = TreeStore::new(&storage_dir.join(TREES_DIR_NAME))?;

        let mut manager = Self {
            memory_file: storage_dir.join(MEMORY_FILE_NAME),
            trees,
            optimizer: PathOptimizer::new(),
            workflows: BTreeMap::new(),
            tasks: BTreeMap::new(),
            choices: Vec::new(),
            handlers: BTreeMap::new(),
            events: Box::new(NullEventSink),
        };
        manager.load_memory();
        Ok(manager)
    }

    /// Replace the event sink notified on workflow activity.
    pub fn with_event_sink(mut self, events: Box<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn optimizer(&self) -> &PathOptimizer {
        &self.optimizer
    }

    pub fn optimizer_mut(&mut self) -> &mut PathOptimizer {
        &mut self.optimizer
    }

    pub fn get_tree(&self, workflow_id: &str) -> Option<&IterationTree> {
        self.trees.get_tree(workflow_id)
    }

    pub fn workflows(&self) -> &BTreeMap<String, WorkflowRecord> {
        &self.workflows
    }

    pub fn choices(&self) -> &[SovereignChoice] {
        &self.choices
    }

    /// Create a workflow and its tree with a root named as given.
    pub fn create_workflow(&mut self, workflow_id: &str, name: &str, description: &str) -> Result<()> {
        self.trees.create_tree(workflow_id, name, description)?;

        self.workflows.insert(
            workflow_id.to_string(),
            WorkflowRecord {
                workflow_id: workflow_id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                tree_id: workflow_id.to_string(),
                created_at: Utc::now(),
                status: "active".to_string(),
            },
        );

        self.events.notify(
            "workflow_created",
            "workflow_manager",
            &json!({ "workflow_id": workflow_id, "name": name }),
        );
        info!("Created workflow '{}'", workflow_id);
        Ok(())
    }

    /// Add a step under a parent and immediately score its resonance.
    pub fn add_workflow_step(
        &mut self,
        workflow_id: &str,
        parent_id: &str,
        step_id: &str,
        name: &str,
        description: &str,
        kind: NodeKind,
        metadata: BTreeMap<String, Value>,
    ) -> Result<IterationNode> {
        let tree = self
            .trees
            .get_tree_mut(workflow_id)
            .ok_or_else(|| SovereignError::WorkflowNotFound(workflow_id.to_string()))?;

        tree.add_node(parent_id, step_id, name, description, kind, metadata)?;

        let resonance = match tree.get_node(step_id) {
            Some(node) => self.optimizer.evaluate_node(node),
            None => 0.0,
        };

        let node = tree
            .get_node_mut(step_id)
            .ok_or_else(|| SovereignError::NodeNotFound(step_id.to_string()))?;
        node.set_resonance(resonance);
        Ok(node.clone())
    }

    /// Execute a step: make it the active node, run any registered handler,
    /// and mark the step completed — or abandoned if the handler fails.
    /// Handler failures are reported in the outcome, never propagated.
    pub fn execute_step(
        &mut self,
        workflow_id: &str,
        step_id: &str,
        context: &Value,
    ) -> Result<StepOutcome> {
        let tree = self
            .trees
            .get_tree_mut(workflow_id)
            .ok_or_else(|| SovereignError::WorkflowNotFound(workflow_id.to_string()))?;

        if tree.get_node(step_id).is_none() {
            return Err(SovereignError::NodeNotFound(step_id.to_string()).into());
        }

        tree.set_active_node(step_id);
        let node = tree
            .get_node(step_id)
            .ok_or_else(|| SovereignError::NodeNotFound(step_id.to_string()))?
            .clone();

        let mut outcome = StepOutcome {
            step_id: step_id.to_string(),
            completed: true,
            handler_result: None,
            error: None,
        };

        let handler_key = handler_key(workflow_id, step_id);
        if let Some(handler) = self.handlers.get(&handler_key) {
            match handler(&node, context) {
                Ok(value) => outcome.handler_result = Some(value),
                Err(e) => {
                    outcome.completed = false;
                    outcome.error = Some(e.to_string());
                    if let Some(n) = tree.get_node_mut(step_id) {
                        n.update_status(NodeStatus::Abandoned);
                    }
                    warn!("Step '{}' handler failed: {}", step_id, e);
                    self.events.notify(
                        "step_failed",
                        "workflow_manager",
                        &json!({ "workflow_id": workflow_id, "step_id": step_id }),
                    );
                    return Ok(outcome);
                }
            }
        }

        if let Some(n) = tree.get_node_mut(step_id) {
            n.update_status(NodeStatus::Completed);
        }
        self.events.notify(
            "step_executed",
            "workflow_manager",
            &json!({ "workflow_id": workflow_id, "step_id": step_id }),
        );
        Ok(outcome)
    }

    /// Create one decision node per branch spec under `from_step_id`,
    /// returned in input order.
    pub fn branch_workflow(
        &mut self,
        workflow_id: &str,
        from_step_id: &str,
        branches: &[BranchSpec],
    ) -> Result<Vec<IterationNode>> {
        if self.trees.get_tree(workflow_id).is_none() {
            return Err(SovereignError::WorkflowNotFound(workflow_id.to_string()).into());
        }

        let mut created = Vec::with_capacity(branches.len());
        for spec in branches {
            let node = self.add_workflow_step(
                workflow_id,
                from_step_id,
                &spec.step_id,
                &spec.name,
                &spec.description,
                NodeKind::Decision,
                spec.metadata.clone(),
            )?;
            created.push(node);
        }
        Ok(created)
    }

    /// Record a sovereign choice between two nodes and navigate to the
    /// destination. The choice captures the destination's resonance at the
    /// time it was made; the full state is persisted before returning.
    pub fn choose_path(
        &mut self,
        workflow_id: &str,
        from_step_id: &str,
        to_step_id: &str,
        rationale: &str,
    ) -> Result<SovereignChoice> {
        let tree = self
            .trees
            .get_tree_mut(workflow_id)
            .ok_or_else(|| SovereignError::WorkflowNotFound(workflow_id.to_string()))?;

        if tree.get_node(from_step_id).is_none() {
            return Err(SovereignError::NodeNotFound(from_step_id.to_string()).into());
        }
        let resonance = tree
            .get_node(to_step_id)
            .ok_or_else(|| SovereignError::NodeNotFound(to_step_id.to_string()))?
            .resonance_score;

        let choice = SovereignChoice {
            choice_id: ulid::Ulid::new().to_string(),
            tree_id: workflow_id.to_string(),
            from_node_id: from_step_id.to_string(),
            to_node_id: to_step_id.to_string(),
            rationale: rationale.to_string(),
            resonance_score: resonance,
            timestamp: Utc::now(),
            metadata: BTreeMap::new(),
        };

        tree.set_active_node(to_step_id);
        self.choices.push(choice.clone());

        info!(
            "Sovereign choice in '{}': {} -> {}",
            workflow_id, from_step_id, to_step_id
        );
        self.events.notify(
            "sovereign_choice",
            "workflow_manager",
            &json!({
                "workflow_id": workflow_id,
                "from": from_step_id,
                "to": to_step_id,
                "rationale": rationale,
            }),
        );

        self.save_memory()?;
        Ok(choice)
    }

    /// Suggested next steps for a workflow from its active node. Unknown
    /// workflows yield an empty list.
    pub fn get_next_steps(&self, workflow_id: &str, max_suggestions: usize) -> Vec<StepSuggestion> {
        let Some(tree) = self.trees.get_tree(workflow_id) else {
            return Vec::new();
        };

        self.optimizer
            .suggest_next_paths(tree, None, max_suggestions)
            .into_iter()
            .map(|(node, score)| StepSuggestion {
                step_id: node.node_id,
                name: node.name,
                description: node.description,
                resonance_score: score,
                status: node.status,
            })
            .collect()
    }

    /// Combined status projection for one workflow.
    pub fn get_workflow_status(&self, workflow_id: &str) -> Result<WorkflowStatus> {
        let tree = self
            .trees
            .get_tree(workflow_id)
            .ok_or_else(|| SovereignError::WorkflowNotFound(workflow_id.to_string()))?;

        let record = self.workflows.get(workflow_id);

        Ok(WorkflowStatus {
            workflow_id: workflow_id.to_string(),
            name: record.map(|r| r.name.clone()).unwrap_or_else(|| "Unknown".into()),
            status: record.map(|r| r.status.clone()).unwrap_or_else(|| "unknown".into()),
            statistics: tree.get_statistics(),
            active_path: tree
                .get_active_path()
                .iter()
                .map(|n| PathStep {
                    step_id: n.node_id.clone(),
                    name: n.name.clone(),
                })
                .collect(),
            next_suggestions: self.get_next_steps(workflow_id, 3),
        })
    }

    /// Export the complete history of one workflow: registration, tree,
    /// and the choice log filtered to this workflow.
    pub fn export_workflow_history(&self, workflow_id: &str) -> Result<WorkflowHistory> {
        let tree = self
            .trees
            .get_tree(workflow_id)
            .ok_or_else(|| SovereignError::WorkflowNotFound(workflow_id.to_string()))?;

        Ok(WorkflowHistory {
            workflow: self.workflows.get(workflow_id).cloned(),
            tree: tree.clone(),
            choices: self
                .choices
                .iter()
                .filter(|c| c.tree_id == workflow_id)
                .cloned()
                .collect(),
            statistics: tree.get_statistics(),
        })
    }

    /// Register a handler to run when the given step executes.
    pub fn register_step_handler<F>(&mut self, workflow_id: &str, step_id: &str, handler: F)
    where
        F: Fn(&IterationNode, &Value) -> Result<Value> + 'static,
    {
        self.handlers
            .insert(handler_key(workflow_id, step_id), Box::new(handler));
    }

    /// Attach an external task as a node under the workflow's current
    /// position (active node, falling back to the root).
    pub fn integrate_with_task(
        &mut self,
        task: WorkflowTask,
        workflow_id: &str,
    ) -> Result<IterationNode> {
        let parent_id = {
            let tree = self
                .trees
                .get_tree(workflow_id)
                .ok_or_else(|| SovereignError::WorkflowNotFound(workflow_id.to_string()))?;
            tree.active_node_id
                .clone()
                .or_else(|| tree.root_id.clone())
                .ok_or_else(|| SovereignError::NodeNotFound("root".to_string()))?
        };

        let mut metadata = BTreeMap::new();
        metadata.insert("priority".to_string(), json!(task.priority));
        metadata.insert("dependencies".to_string(), json!(task.dependencies));

        let node = self.add_workflow_step(
            workflow_id,
            &parent_id,
            &task.task_id,
            &task.name,
            &task.description,
            NodeKind::Action,
            metadata,
        )?;

        self.tasks.insert(task.task_id.clone(), task);
        Ok(node)
    }

    /// Persist the memory file and every loaded tree.
    pub fn save_memory(&self) -> Result<()> {
        memory::save(&self.memory_file, &self.workflows, &self.choices)?;
        for tree_id in self.trees.list_trees() {
            self.trees.save_tree(&tree_id)?;
        }
        Ok(())
    }

    /// Load persisted state. Missing or corrupt files leave the manager
    /// empty; individual unreadable trees are skipped.
    pub fn load_memory(&mut self) {
        if let Some(mem) = memory::load(&self.memory_file) {
            self.workflows = mem.workflows;
            self.choices = mem.choices;
        }

        for tree_id in self.trees.list_saved_trees() {
            if let Err(e) = self.trees.load_tree(&tree_id) {
                warn!("Skipping unreadable tree '{}': {}", tree_id, e);
            }
        }
    }
}

fn handler_key(workflow_id: &str, step_id: &str) -> String {
    format!("{workflow_id}:{step_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn manager(dir: &Path) -> SovereignWorkflowManager {
        SovereignWorkflowManager::new(dir).unwrap()
    }

    fn seeded(dir: &Path) -> SovereignWorkflowManager {
        let mut mgr = manager(dir);
        mgr.create_workflow("wf", "Workflow", "test workflow").unwrap();
        mgr.add_workflow_step(
            "wf",
            "root",
            "a",
            "Option A",
            "sovereign autonomous progress",
            NodeKind::Action,
            BTreeMap::new(),
        )
        .unwrap();
        mgr.add_workflow_step("wf", "root", "b", "Option B", "unrelated text", NodeKind::Action, BTreeMap::new())
            .unwrap();
        mgr
    }

    #[test]
    fn create_workflow_registers_tree_and_record() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = seeded(dir.path());

        let tree = mgr.get_tree("wf").unwrap();
        assert_eq!(tree.root_id.as_deref(), Some("root"));
        assert_eq!(mgr.workflows()["wf"].status, "active");

        let mut mgr = mgr;
        assert!(mgr.create_workflow("wf", "Again", "duplicate").is_err());
    }

    #[test]
    fn new_steps_are_scored_on_creation() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = seeded(dir.path());

        let a = mgr.get_tree("wf").unwrap().get_node("a").unwrap();
        let b = mgr.get_tree("wf").unwrap().get_node("b").unwrap();
        assert!(a.resonance_score > b.resonance_score);
        assert!(a.resonance_score <= 1.0);
    }

    #[test]
    fn add_step_rejects_unknown_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = manager(dir.path());
        let err = mgr.add_workflow_step(
            "ghost",
            "root",
            "s",
            "S",
            "step",
            NodeKind::Action,
            BTreeMap::new(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn execute_step_without_handler_completes() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = seeded(dir.path());

        let outcome = mgr.execute_step("wf", "a", &json!({})).unwrap();
        assert!(outcome.completed);
        assert!(outcome.error.is_none());

        let tree = mgr.get_tree("wf").unwrap();
        assert_eq!(tree.get_node("a").unwrap().status, NodeStatus::Completed);
        assert_eq!(tree.active_node_id.as_deref(), Some("a"));
    }

    #[test]
    fn execute_step_runs_registered_handler() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = seeded(dir.path());

        mgr.register_step_handler("wf", "a", |node, context| {
            Ok(json!({ "node": node.node_id, "ctx": context }))
        });

        let outcome = mgr.execute_step("wf", "a", &json!({ "input": 42 })).unwrap();
        assert!(outcome.completed);
        let result = outcome.handler_result.unwrap();
        assert_eq!(result["node"], "a");
        assert_eq!(result["ctx"]["input"], 42);
    }

    #[test]
    fn handler_failure_abandons_step_without_propagating() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = seeded(dir.path());

        mgr.register_step_handler("wf", "a", |_, _| bail!("handler exploded"));

        let outcome = mgr.execute_step("wf", "a", &json!({})).unwrap();
        assert!(!outcome.completed);
        assert!(outcome.error.unwrap().contains("handler exploded"));
        assert_eq!(
            mgr.get_tree("wf").unwrap().get_node("a").unwrap().status,
            NodeStatus::Abandoned
        );
    }

    #[test]
    fn execute_step_rejects_unknown_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = seeded(dir.path());
        assert!(mgr.execute_step("wf", "ghost", &json!({})).is_err());
        assert!(mgr.execute_step("ghost", "a", &json!({})).is_err());
    }

    #[test]
    fn branch_workflow_creates_decision_nodes_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = seeded(dir.path());

        let branches = vec![
            BranchSpec {
                step_id: "left".into(),
                name: "Left".into(),
                description: "go left".into(),
                metadata: BTreeMap::new(),
            },
            BranchSpec {
                step_id: "right".into(),
                name: "Right".into(),
                description: "go right".into(),
                metadata: BTreeMap::new(),
            },
        ];

        let created = mgr.branch_workflow("wf", "a", &branches).unwrap();
        let ids: Vec<_> = created.iter().map(|n| n.node_id.clone()).collect();
        assert_eq!(ids, ["left", "right"]);
        assert!(created.iter().all(|n| n.kind == NodeKind::Decision));

        let children: Vec<_> = mgr
            .get_tree("wf")
            .unwrap()
            .get_children("a")
            .iter()
            .map(|n| n.node_id.clone())
            .collect();
        assert_eq!(children, ["left", "right"]);
    }

    #[test]
    fn choose_path_records_choice_and_navigates() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = seeded(dir.path());

        let before = mgr.choices().len();
        let choice = mgr.choose_path("wf", "root", "a", "because").unwrap();

        assert_eq!(mgr.choices().len(), before + 1);
        assert_eq!(choice.from_node_id, "root");
        assert_eq!(choice.to_node_id, "a");
        assert_eq!(choice.rationale, "because");

        let tree = mgr.get_tree("wf").unwrap();
        let expected = tree.get_node("a").unwrap().resonance_score;
        assert_eq!(choice.resonance_score, expected);
        assert_eq!(tree.active_node_id.as_deref(), Some("a"));

        let status = mgr.get_workflow_status("wf").unwrap();
        let path: Vec<_> = status.active_path.iter().map(|s| s.step_id.clone()).collect();
        assert_eq!(path, ["root", "a"]);
    }

    #[test]
    fn choose_path_rejects_invalid_ids_without_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = seeded(dir.path());

        assert!(mgr.choose_path("wf", "ghost", "a", "r").is_err());
        assert!(mgr.choose_path("wf", "root", "ghost", "r").is_err());
        assert!(mgr.choose_path("ghost", "root", "a", "r").is_err());
        assert!(mgr.choices().is_empty());
    }

    #[test]
    fn next_steps_rank_aligned_step_first() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = seeded(dir.path());

        let steps = mgr.get_next_steps("wf", 5);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].step_id, "a");
        assert!(steps[0].resonance_score > steps[1].resonance_score);

        assert!(mgr.get_next_steps("ghost", 5).is_empty());
    }

    #[test]
    fn history_filters_choices_by_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = seeded(dir.path());
        mgr.create_workflow("other", "Other", "second workflow").unwrap();
        mgr.add_workflow_step("other", "root", "x", "X", "step", NodeKind::Action, BTreeMap::new())
            .unwrap();

        mgr.choose_path("wf", "root", "a", "first").unwrap();
        mgr.choose_path("other", "root", "x", "second").unwrap();

        let history = mgr.export_workflow_history("wf").unwrap();
        assert_eq!(history.choices.len(), 1);
        assert_eq!(history.choices[0].tree_id, "wf");
        assert_eq!(history.workflow.as_ref().unwrap().name, "Workflow");
        assert!(mgr.export_workflow_history("ghost").is_err());
    }

    #[test]
    fn memory_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut mgr = seeded(dir.path());
            mgr.choose_path("wf", "root", "a", "persisted").unwrap();
            mgr.save_memory().unwrap();
        }

        let restored = manager(dir.path());
        assert!(restored.workflows().contains_key("wf"));
        assert_eq!(restored.choices().len(), 1);
        assert_eq!(restored.choices()[0].rationale, "persisted");

        let tree = restored.get_tree("wf").unwrap();
        assert_eq!(tree.active_node_id.as_deref(), Some("a"));
        assert_eq!(tree.nodes.len(), 3);
    }

    #[test]
    fn corrupt_memory_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MEMORY_FILE_NAME), "{broken").unwrap();

        let mgr = manager(dir.path());
        assert!(mgr.workflows().is_empty());
        assert!(mgr.choices().is_empty());
    }

    #[test]
    fn integrate_task_attaches_under_active_node() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = seeded(dir.path());
        mgr.choose_path("wf", "root", "a", "move").unwrap();

        let mut task = WorkflowTask::new("task-1", "Deploy", "ship the release");
        task.priority = 3;
        task.dependencies = vec!["a".to_string()];

        let node = mgr.integrate_with_task(task, "wf").unwrap();
        assert_eq!(node.parent_id.as_deref(), Some("a"));
        assert_eq!(node.metadata["priority"], json!(3));
        assert_eq!(node.metadata["dependencies"], json!(["a"]));
    }
}

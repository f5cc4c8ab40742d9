//! Path optimizer — scores nodes and complete paths against the
//! registered truths and recommends the next move.
//!
//! Node scores are weighted averages over every truth (and any custom
//! evaluator, at weight 1.0). Path scores blend resonance, completeness,
//! and consistency into one total.

use crate::tree::model::IterationTree;
use crate::truth::{default_truths, SovereignTruth};
use crate::types::{IterationNode, NodeStatus};
use serde::Serialize;
use std::collections::BTreeMap;

/// Weight of the mean per-node resonance in a path's total score.
const PATH_RESONANCE_WEIGHT: f64 = 0.5;
/// Weight of the completed-node fraction in a path's total score.
const PATH_COMPLETENESS_WEIGHT: f64 = 0.3;
/// Weight of the resonance-consistency term in a path's total score.
const PATH_ALIGNMENT_WEIGHT: f64 = 0.2;

/// Score multiplier for pending nodes in suggestions. Applied without
/// reclamping, so a pending node can legitimately outrank a 1.0 score.
const PENDING_BONUS: f64 = 1.1;

/// A custom node-scoring function, contributing at weight 1.0.
pub type NodeEvaluator = Box<dyn Fn(&IterationNode) -> f64>;

// ---------------------------------------------------------------------------
// Score and recommendation records
// ---------------------------------------------------------------------------

/// Computed scoring of one root-to-leaf (or sub-)path. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PathScore {
    pub path_nodes: Vec<String>,
    pub total_score: f64,
    pub resonance_score: f64,
    pub completeness_score: f64,
    pub alignment_score: f64,
    pub details: PathScoreDetails,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PathScoreDetails {
    pub node_count: usize,
    pub completed_count: usize,
    pub resonance_scores: Vec<f64>,
}

impl PathScore {
    fn zero(path_nodes: Vec<String>) -> Self {
        Self {
            path_nodes,
            total_score: 0.0,
            resonance_score: 0.0,
            completeness_score: 0.0,
            alignment_score: 0.0,
            details: PathScoreDetails::default(),
        }
    }
}

/// What the optimizer thinks the caller should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    /// Tree has no active node yet.
    CreateRoot,
    /// Active node is a leaf; branch out from it.
    Branch,
    /// Active node has children but none are viable.
    Complete,
    /// Navigate to the best-scoring child.
    Navigate,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alternative {
    pub node_id: String,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub action: RecommendedAction,
    pub node_id: Option<String>,
    pub reason: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Alternative>,
}

// ---------------------------------------------------------------------------
// Optimizer
// ---------------------------------------------------------------------------

/// Evaluates nodes and paths and recommends next steps.
pub struct PathOptimizer {
    truths: BTreeMap<String, SovereignTruth>,
    evaluators: BTreeMap<String, NodeEvaluator>,
}

impl Default for PathOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PathOptimizer {
    /// Optimizer with the built-in truth set.
    pub fn new() -> Self {
        let mut optimizer = Self::empty();
        for truth in default_truths() {
            optimizer.register_truth(truth);
        }
        optimizer
    }

    /// Optimizer with no truths registered.
    pub fn empty() -> Self {
        Self {
            truths: BTreeMap::new(),
            evaluators: BTreeMap::new(),
        }
    }

    /// Register a truth, replacing any existing one with the same id.
    pub fn register_truth(&mut self, truth: SovereignTruth) {
        self.truths.insert(truth.truth_id.clone(), truth);
    }

    /// Register a custom scoring function under a name.
    pub fn register_evaluator(&mut self, name: &str, evaluator: NodeEvaluator) {
        self.evaluators.insert(name.to_string(), evaluator);
    }

    pub fn truths(&self) -> impl Iterator<Item = &SovereignTruth> {
        self.truths.values()
    }

    /// Weighted average of every truth's alignment with the node's name and
    /// description, plus custom evaluators at weight 1.0. Neutral 0.5 when
    /// the total weight is zero.
    pub fn evaluate_node(&self, node: &IterationNode) -> f64 {
        let text = format!("{} {}", node.name, node.description);

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for truth in self.truths.values() {
            weighted_sum += truth.evaluate_alignment(&text) * truth.weight;
            total_weight += truth.weight;
        }

        for evaluator in self.evaluators.values() {
            weighted_sum += evaluator(node);
            total_weight += 1.0;
        }

        if total_weight == 0.0 {
            return 0.5;
        }

        weighted_sum / total_weight
    }

    /// Score a complete path. Ids missing from the tree are dropped before
    /// scoring; an empty or fully-unresolvable path scores all-zero.
    pub fn evaluate_path(&self, tree: &IterationTree, node_ids: &[String]) -> PathScore {
        if node_ids.is_empty() {
            return PathScore::zero(Vec::new());
        }

        let nodes: Vec<&IterationNode> = node_ids
            .iter()
            .filter_map(|nid| tree.get_node(nid))
            .collect();

        if nodes.is_empty() {
            return PathScore::zero(node_ids.to_vec());
        }

        let resonance_scores: Vec<f64> = nodes.iter().map(|n| self.evaluate_node(n)).collect();
        let avg_resonance = resonance_scores.iter().sum::<f64>() / resonance_scores.len() as f64;

        let completed = nodes
            .iter()
            .filter(|n| n.status == NodeStatus::Completed)
            .count();
        let completeness = completed as f64 / nodes.len() as f64;

        // Consistency of resonance along the path; a single node is
        // trivially consistent.
        let alignment = if resonance_scores.len() > 1 {
            let variance = resonance_scores
                .iter()
                .map(|s| (s - avg_resonance).powi(2))
                .sum::<f64>()
                / resonance_scores.len() as f64;
            1.0 - variance.sqrt().min(1.0)
        } else {
            1.0
        };

        let total = avg_resonance * PATH_RESONANCE_WEIGHT
            + completeness * PATH_COMPLETENESS_WEIGHT
            + alignment * PATH_ALIGNMENT_WEIGHT;

        PathScore {
            path_nodes: node_ids.to_vec(),
            total_score: total,
            resonance_score: avg_resonance,
            completeness_score: completeness,
            alignment_score: alignment,
            details: PathScoreDetails {
                node_count: nodes.len(),
                completed_count: completed,
                resonance_scores,
            },
        }
    }

    /// Rank the direct children of a node (the active node by default) as
    /// navigation candidates. Abandoned children are excluded; pending
    /// children get an exploration bonus. Descending by score, ties in
    /// child insertion order.
    pub fn suggest_next_paths(
        &self,
        tree: &IterationTree,
        from_node_id: Option<&str>,
        max_suggestions: usize,
    ) -> Vec<(IterationNode, f64)> {
        let from_id = match from_node_id.or(tree.active_node_id.as_deref()) {
            Some(id) => id,
            None => return Vec::new(),
        };

        let mut suggestions: Vec<(IterationNode, f64)> = Vec::new();
        for child in tree.get_children(from_id) {
            if child.status == NodeStatus::Abandoned {
                continue;
            }

            let mut score = self.evaluate_node(child);
            if child.status == NodeStatus::Pending {
                score *= PENDING_BONUS;
            }

            suggestions.push((child.clone(), score));
        }

        suggestions.sort_by(|a, b| b.1.total_cmp(&a.1));
        suggestions.truncate(max_suggestions);
        suggestions
    }

    /// Score every complete branch from a node (the root by default) and
    /// return the best ones, descending by total score.
    pub fn find_optimal_paths(
        &self,
        tree: &IterationTree,
        from_node_id: Option<&str>,
        max_paths: usize,
    ) -> Vec<PathScore> {
        let from_id = match from_node_id.or(tree.root_id.as_deref()) {
            Some(id) => id,
            None => return Vec::new(),
        };

        let mut path_scores: Vec<PathScore> = tree
            .get_branches(from_id)
            .iter()
            .map(|branch| self.evaluate_path(tree, branch))
            .collect();

        path_scores.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
        path_scores.truncate(max_paths);
        path_scores
    }

    /// Decide the next move for a tree. `None` only when the tree's active
    /// pointer references a missing node.
    pub fn recommend_action(&self, tree: &IterationTree) -> Option<Recommendation> {
        let current_id = match &tree.active_node_id {
            Some(id) => id.clone(),
            None => {
                return Some(Recommendation {
                    action: RecommendedAction::CreateRoot,
                    node_id: None,
                    reason: "No active node found. Start by creating a root node.".into(),
                    confidence: 1.0,
                    alternatives: Vec::new(),
                });
            }
        };

        let current = tree.get_node(&current_id)?;

        if tree.get_children(&current_id).is_empty() {
            return Some(Recommendation {
                action: RecommendedAction::Branch,
                node_id: Some(current_id),
                reason: format!(
                    "'{}' is a leaf. Consider branching to explore new possibilities.",
                    current.name
                ),
                confidence: 0.8,
                alternatives: Vec::new(),
            });
        }

        let suggestions = self.suggest_next_paths(tree, Some(&current_id), 3);

        let Some((best, best_score)) = suggestions.first() else {
            return Some(Recommendation {
                action: RecommendedAction::Complete,
                node_id: Some(current_id),
                reason: "No viable next paths. Consider completing the current branch.".into(),
                confidence: 0.6,
                alternatives: Vec::new(),
            });
        };

        Some(Recommendation {
            action: RecommendedAction::Navigate,
            node_id: Some(best.node_id.clone()),
            reason: format!("Navigate to '{}' with highest resonance score.", best.name),
            confidence: *best_score,
            alternatives: suggestions[1..]
                .iter()
                .map(|(node, score)| Alternative {
                    node_id: node.node_id.clone(),
                    name: node.name.clone(),
                    score: *score,
                })
                .collect(),
        })
    }
}

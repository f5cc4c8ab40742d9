//! Read-only tree renderers: indented text, GraphViz DOT, and Mermaid,
//! all driven by the same traversal, plus a cursor-style navigator.

use crate::tree::model::IterationTree;
use crate::types::{IterationNode, NodeKind, NodeStatus};
use serde::Serialize;

fn status_glyph(status: NodeStatus) -> char {
    match status {
        NodeStatus::Pending => '○',
        NodeStatus::Active => '●',
        NodeStatus::Completed => '✓',
        NodeStatus::Abandoned => '✗',
    }
}

fn kind_letter(kind: NodeKind) -> char {
    match kind {
        NodeKind::Action => 'A',
        NodeKind::State => 'S',
        NodeKind::Decision => 'D',
        NodeKind::Milestone => 'M',
    }
}

fn status_color(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::Pending => "lightgray",
        NodeStatus::Active => "lightblue",
        NodeStatus::Completed => "lightgreen",
        NodeStatus::Abandoned => "lightcoral",
    }
}

fn kind_shape(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Action => "box",
        NodeKind::State => "ellipse",
        NodeKind::Decision => "diamond",
        NodeKind::Milestone => "doubleoctagon",
    }
}

/// Renders one iteration tree in text and diagram formats.
pub struct TreeVisualizer<'a> {
    tree: &'a IterationTree,
}

impl<'a> TreeVisualizer<'a> {
    pub fn new(tree: &'a IterationTree) -> Self {
        Self { tree }
    }

    fn active_path_ids(&self) -> Vec<String> {
        self.tree
            .get_active_path()
            .iter()
            .map(|n| n.node_id.clone())
            .collect()
    }

    /// Indented text rendering with status/kind glyphs. Nodes on the
    /// root-to-active path carry a trailing `*`.
    pub fn to_ascii(&self, max_depth: Option<usize>) -> String {
        let Some(root_id) = &self.tree.root_id else {
            return "Empty tree".to_string();
        };

        let active_path = self.active_path_ids();
        let mut lines = Vec::new();
        self.render_ascii(root_id, "", true, 0, max_depth, &active_path, &mut lines);
        lines.join("\n")
    }

    #[allow(clippy::too_many_arguments)]
    fn render_ascii(
        &self,
        node_id: &str,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        active_path: &[String],
        lines: &mut Vec<String>,
    ) {
        if let Some(max) = max_depth {
            if depth > max {
                return;
            }
        }

        let Some(node) = self.tree.get_node(node_id) else {
            return;
        };

        let connector = if is_last { "└── " } else { "├── " };
        let mut line = format!(
            "{}{}[{}][{}] {}",
            prefix,
            connector,
            status_glyph(node.status),
            kind_letter(node.kind),
            node.name
        );
        if node.resonance_score > 0.0 {
            line.push_str(&format!(" (R:{:.2})", node.resonance_score));
        }
        if active_path.iter().any(|id| id == node_id) {
            line.push_str(" *");
        }
        lines.push(line);

        let extension = if is_last { "    " } else { "│   " };
        let child_prefix = format!("{prefix}{extension}");
        let count = node.children_ids.len();
        for (i, child_id) in node.children_ids.iter().enumerate() {
            self.render_ascii(
                child_id,
                &child_prefix,
                i == count - 1,
                depth + 1,
                max_depth,
                active_path,
                lines,
            );
        }
    }

    /// GraphViz DOT export: fill color by status, shape by kind, bold blue
    /// edges along the active path.
    pub fn to_dot(&self) -> String {
        let active_path = self.active_path_ids();
        let on_active =
            |id: &str| -> bool { active_path.iter().any(|a| a == id) };

        let mut lines = vec![
            "digraph SovereignIterationTree {".to_string(),
            "    rankdir=TB;".to_string(),
            "    node [shape=box, style=rounded];".to_string(),
            String::new(),
        ];

        for (node_id, node) in &self.tree.nodes {
            let mut label = format!(
                "{}\\nType: {}\\nStatus: {}",
                node.name, node.kind, node.status
            );
            if node.resonance_score > 0.0 {
                label.push_str(&format!("\\nResonance: {:.2}", node.resonance_score));
            }

            lines.push(format!(
                "    \"{}\" [label=\"{}\", fillcolor=\"{}\", style=filled, shape={}];",
                node_id,
                label,
                status_color(node.status),
                kind_shape(node.kind)
            ));
        }

        lines.push(String::new());

        for (node_id, node) in &self.tree.nodes {
            for child_id in &node.children_ids {
                let (style, width, color) = if on_active(node_id) && on_active(child_id) {
                    ("bold", "2.0", "blue")
                } else {
                    ("solid", "1.0", "black")
                };
                lines.push(format!(
                    "    \"{node_id}\" -> \"{child_id}\" [style={style}, penwidth={width}, color={color}];"
                ));
            }
        }

        lines.push("}".to_string());
        lines.join("\n")
    }

    /// Mermaid export: bracket shape by kind, status glyph in the label,
    /// active-path nodes styled.
    pub fn to_mermaid(&self) -> String {
        let mut lines = vec!["graph TD".to_string()];

        for (node_id, node) in &self.tree.nodes {
            let (open, close) = match node.kind {
                NodeKind::Decision => ("{", "}"),
                NodeKind::Milestone => ("([", "])"),
                NodeKind::State => ("(", ")"),
                NodeKind::Action => ("[", "]"),
            };
            let label = format!("{} {}", status_glyph(node.status), node.name);
            lines.push(format!("    {node_id}{open}\"{label}\"{close}"));
        }

        for (node_id, node) in &self.tree.nodes {
            for child_id in &node.children_ids {
                lines.push(format!("    {node_id} --> {child_id}"));
            }
        }

        for id in self.active_path_ids() {
            lines.push(format!("    style {id} fill:#90caf9"));
        }

        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// Which node field `find_nodes` searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Description,
    Metadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeRef {
    pub node_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChildRef {
    pub node_id: String,
    pub name: String,
    pub status: NodeStatus,
}

/// Structured view of the navigator's current position.
#[derive(Debug, Clone, Serialize)]
pub struct NavigatorContext {
    pub node_id: String,
    pub name: String,
    pub description: String,
    pub kind: NodeKind,
    pub status: NodeStatus,
    pub resonance_score: f64,
    pub parent_id: Option<String>,
    pub children: Vec<ChildRef>,
    pub path_from_root: Vec<NodeRef>,
    pub depth: usize,
}

/// Cursor over a tree for step-by-step inspection. Starts at the active
/// node, falling back to the root.
pub struct TreeNavigator<'a> {
    tree: &'a IterationTree,
    current_node_id: Option<String>,
}

impl<'a> TreeNavigator<'a> {
    pub fn new(tree: &'a IterationTree) -> Self {
        let current_node_id = tree.active_node_id.clone().or_else(|| tree.root_id.clone());
        Self { tree, current_node_id }
    }

    pub fn current(&self) -> Option<&IterationNode> {
        self.current_node_id.as_ref().and_then(|id| self.tree.get_node(id))
    }

    /// Move to a specific node; unknown ids leave the cursor in place.
    pub fn move_to_node(&mut self, node_id: &str) -> Option<&IterationNode> {
        if self.tree.get_node(node_id).is_some() {
            self.current_node_id = Some(node_id.to_string());
        }
        self.tree.get_node(node_id)
    }

    pub fn move_to_parent(&mut self) -> Option<&IterationNode> {
        let parent_id = self.current()?.parent_id.clone()?;
        self.move_to_node(&parent_id)
    }

    /// Move to the nth child (zero-based) of the current node.
    pub fn move_to_child(&mut self, index: usize) -> Option<&IterationNode> {
        let child_id = {
            let children = self.tree.get_children(self.current_node_id.as_deref()?);
            children.get(index)?.node_id.clone()
        };
        self.move_to_node(&child_id)
    }

    pub fn move_to_root(&mut self) -> Option<&IterationNode> {
        let root_id = self.tree.root_id.clone()?;
        self.move_to_node(&root_id)
    }

    /// Context for the current position; `None` when the cursor is unset
    /// or dangling.
    pub fn current_context(&self) -> Option<NavigatorContext> {
        let node = self.current()?;
        let path = self.tree.get_path_to_root(&node.node_id);

        Some(NavigatorContext {
            node_id: node.node_id.clone(),
            name: node.name.clone(),
            description: node.description.clone(),
            kind: node.kind,
            status: node.status,
            resonance_score: node.resonance_score,
            parent_id: node.parent_id.clone(),
            children: self
                .tree
                .get_children(&node.node_id)
                .iter()
                .map(|c| ChildRef {
                    node_id: c.node_id.clone(),
                    name: c.name.clone(),
                    status: c.status,
                })
                .collect(),
            path_from_root: path
                .iter()
                .map(|n| NodeRef {
                    node_id: n.node_id.clone(),
                    name: n.name.clone(),
                })
                .collect(),
            depth: path.len().saturating_sub(1),
        })
    }

    /// Case-insensitive substring search over the chosen field.
    pub fn find_nodes(&self, query: &str, field: SearchField) -> Vec<&IterationNode> {
        let query_lower = query.to_lowercase();

        self.tree
            .nodes
            .values()
            .filter(|node| match field {
                SearchField::Name => node.name.to_lowercase().contains(&query_lower),
                SearchField::Description => {
                    node.description.to_lowercase().contains(&query_lower)
                }
                SearchField::Metadata => {
                    serde_json::to_string(&node.metadata)
                        .map(|s| s.to_lowercase().contains(&query_lower))
                        .unwrap_or(false)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample_tree() -> IterationTree {
        let mut tree = IterationTree::new("viz");
        tree.create_root("Root", "start", crate::types::NodeKind::State)
            .unwrap();
        tree.add_node("root", "a", "Alpha", "first", NodeKind::Action, BTreeMap::new())
            .unwrap();
        tree.add_node("root", "b", "Beta", "second", NodeKind::Decision, BTreeMap::new())
            .unwrap();
        tree.add_node("a", "a1", "Deep", "third", NodeKind::Milestone, BTreeMap::new())
            .unwrap();
        tree
    }

    #[test]
    fn ascii_renders_structure_and_glyphs() {
        let mut tree = sample_tree();
        tree.set_active_node("a");
        let viz = TreeVisualizer::new(&tree);

        let text = viz.to_ascii(None);
        let expected = "\
└── [✓][S] Root *
    ├── [●][A] Alpha *
    │   └── [○][M] Deep
    └── [○][D] Beta";
        assert_eq!(text, expected);
    }

    #[test]
    fn ascii_respects_max_depth() {
        let tree = sample_tree();
        let viz = TreeVisualizer::new(&tree);

        let text = viz.to_ascii(Some(1));
        assert!(text.contains("Alpha"));
        assert!(!text.contains("Deep"));
    }

    #[test]
    fn ascii_of_empty_tree() {
        let tree = IterationTree::new("empty");
        assert_eq!(TreeVisualizer::new(&tree).to_ascii(None), "Empty tree");
    }

    #[test]
    fn dot_highlights_active_path() {
        let mut tree = sample_tree();
        tree.set_active_node("a");
        let dot = TreeVisualizer::new(&tree).to_dot();

        assert!(dot.starts_with("digraph SovereignIterationTree {"));
        assert!(dot.contains("\"a\" [label=\"Alpha"));
        assert!(dot.contains("shape=diamond"));
        assert!(dot.contains("\"root\" -> \"a\" [style=bold, penwidth=2.0, color=blue];"));
        assert!(dot.contains("\"root\" -> \"b\" [style=solid, penwidth=1.0, color=black];"));
    }

    #[test]
    fn mermaid_shapes_follow_kind() {
        let mut tree = sample_tree();
        tree.set_active_node("a");
        let mermaid = TreeVisualizer::new(&tree).to_mermaid();

        assert!(mermaid.starts_with("graph TD"));
        assert!(mermaid.contains("root(\"✓ Root\")"));
        assert!(mermaid.contains("b{\"○ Beta\"}"));
        assert!(mermaid.contains("a1([\"○ Deep\"])"));
        assert!(mermaid.contains("root --> a"));
        assert!(mermaid.contains("style a fill:#90caf9"));
        assert!(!mermaid.contains("style b fill"));
    }

    #[test]
    fn navigator_moves_and_reports_context() {
        let tree = sample_tree();
        let mut nav = TreeNavigator::new(&tree);

        // Starts at the active node (root).
        assert_eq!(nav.current().unwrap().node_id, "root");

        nav.move_to_child(0).unwrap();
        assert_eq!(nav.current().unwrap().node_id, "a");

        let ctx = nav.current_context().unwrap();
        assert_eq!(ctx.depth, 1);
        assert_eq!(ctx.parent_id.as_deref(), Some("root"));
        assert_eq!(ctx.children.len(), 1);
        assert_eq!(ctx.path_from_root.len(), 2);

        nav.move_to_parent().unwrap();
        assert_eq!(nav.current().unwrap().node_id, "root");

        // Unknown moves leave the cursor in place.
        assert!(nav.move_to_node("ghost").is_none());
        assert_eq!(nav.current().unwrap().node_id, "root");
        assert!(nav.move_to_child(9).is_none());

        nav.move_to_child(1).unwrap();
        nav.move_to_root().unwrap();
        assert_eq!(nav.current().unwrap().node_id, "root");
    }

    #[test]
    fn navigator_search_by_field() {
        let mut tree = sample_tree();
        tree.get_node_mut("a1")
            .unwrap()
            .metadata
            .insert("tag".into(), serde_json::json!("needle"));

        let nav = TreeNavigator::new(&tree);
        assert_eq!(nav.find_nodes("alp", SearchField::Name).len(), 1);
        assert_eq!(nav.find_nodes("SECOND", SearchField::Description).len(), 1);
        assert_eq!(nav.find_nodes("needle", SearchField::Metadata).len(), 1);
        assert!(nav.find_nodes("absent", SearchField::Name).is_empty());
    }
}

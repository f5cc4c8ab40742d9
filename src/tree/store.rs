//! Tree store — owns a storage directory and the set of loaded trees.
//!
//! Each tree persists as `<storage>/<tree_id>.json`, one whole-file JSON
//! document per tree.

use crate::error::SovereignError;
use crate::tree::model::IterationTree;
use crate::types::NodeKind;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// In-memory collection of trees backed by a directory of JSON files.
pub struct TreeStore {
    storage_dir: PathBuf,
    trees: BTreeMap<String, IterationTree>,
    active_tree_id: Option<String>,
}

impl TreeStore {
    /// Open a store over the given directory, creating it if needed.
    pub fn new(storage_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(storage_dir).with_context(|| {
            format!("Failed to create tree storage directory {}", storage_dir.display())
        })?;

        Ok(Self {
            storage_dir: storage_dir.to_path_buf(),
            trees: BTreeMap::new(),
            active_tree_id: None,
        })
    }

    fn tree_path(&self, tree_id: &str) -> PathBuf {
        self.storage_dir.join(format!("{tree_id}.json"))
    }

    /// Create a new tree with a root node. The first tree created becomes
    /// the active tree.
    pub fn create_tree(
        &mut self,
        tree_id: &str,
        root_name: &str,
        root_description: &str,
    ) -> Result<&mut IterationTree, SovereignError> {
        if self.trees.contains_key(tree_id) {
            return Err(SovereignError::DuplicateTree(tree_id.to_string()));
        }

        let mut tree = IterationTree::new(tree_id);
        tree.create_root(root_name, root_description, NodeKind::State)?;

        if self.active_tree_id.is_none() {
            self.active_tree_id = Some(tree_id.to_string());
        }

        info!("Created tree '{}'", tree_id);
        Ok(self.trees.entry(tree_id.to_string()).or_insert(tree))
    }

    pub fn get_tree(&self, tree_id: &str) -> Option<&IterationTree> {
        self.trees.get(tree_id)
    }

    pub fn get_tree_mut(&mut self, tree_id: &str) -> Option<&mut IterationTree> {
        self.trees.get_mut(tree_id)
    }

    pub fn get_active_tree(&self) -> Option<&IterationTree> {
        self.active_tree_id.as_ref().and_then(|id| self.trees.get(id))
    }

    /// Switch the active tree. Returns `false` for unknown ids.
    pub fn set_active_tree(&mut self, tree_id: &str) -> bool {
        if !self.trees.contains_key(tree_id) {
            return false;
        }
        self.active_tree_id = Some(tree_id.to_string());
        true
    }

    /// Persist one tree to its JSON file.
    pub fn save_tree(&self, tree_id: &str) -> Result<()> {
        let tree = self
            .trees
            .get(tree_id)
            .ok_or_else(|| SovereignError::TreeNotFound(tree_id.to_string()))?;
        tree.save(&self.tree_path(tree_id))
    }

    /// Load a tree from storage, replacing any loaded copy.
    pub fn load_tree(&mut self, tree_id: &str) -> Result<&IterationTree> {
        let tree = IterationTree::load(&self.tree_path(tree_id))?;
        self.trees.insert(tree_id.to_string(), tree);
        Ok(&self.trees[tree_id])
    }

    /// Ids of all trees currently loaded in memory.
    pub fn list_trees(&self) -> Vec<String> {
        self.trees.keys().cloned().collect()
    }

    /// Ids of all trees saved in the storage directory.
    pub fn list_saved_trees(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.storage_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read tree storage directory: {}", e);
                return Vec::new();
            }
        };

        let mut ids: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_tree_sets_first_as_active() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TreeStore::new(dir.path()).unwrap();

        store.create_tree("first", "First", "first tree").unwrap();
        store.create_tree("second", "Second", "second tree").unwrap();

        assert_eq!(store.get_active_tree().unwrap().tree_id, "first");
        assert!(store.set_active_tree("second"));
        assert_eq!(store.get_active_tree().unwrap().tree_id, "second");
        assert!(!store.set_active_tree("missing"));
    }

    #[test]
    fn duplicate_tree_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TreeStore::new(dir.path()).unwrap();

        store.create_tree("t", "T", "tree").unwrap();
        let dup = store.create_tree("t", "T", "tree");
        assert!(matches!(dup, Err(SovereignError::DuplicateTree(_))));
    }

    #[test]
    fn save_load_and_list_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TreeStore::new(dir.path()).unwrap();

        store.create_tree("alpha", "Alpha", "first").unwrap();
        store.create_tree("beta", "Beta", "second").unwrap();
        store.save_tree("alpha").unwrap();
        store.save_tree("beta").unwrap();

        assert_eq!(store.list_saved_trees(), ["alpha", "beta"]);

        let mut fresh = TreeStore::new(dir.path()).unwrap();
        assert!(fresh.list_trees().is_empty());
        let tree = fresh.load_tree("alpha").unwrap();
        assert_eq!(tree.tree_id, "alpha");
        assert_eq!(tree.root_id.as_deref(), Some("root"));

        assert!(fresh.load_tree("missing").is_err());
        assert!(fresh.save_tree("missing").is_err());
    }
}

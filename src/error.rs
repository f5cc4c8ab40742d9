//! Caller-error taxonomy for tree and workflow operations.
//!
//! Read-only queries on unknown ids soft-fail (empty / `false` / `None`);
//! these variants cover the mutating calls that must reject bad input
//! without touching state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SovereignError {
    #[error("root node already exists")]
    RootExists,

    #[error("node {0} already exists")]
    DuplicateNode(String),

    #[error("parent node {0} not found")]
    ParentNotFound(String),

    #[error("node {0} not found")]
    NodeNotFound(String),

    #[error("tree {0} already exists")]
    DuplicateTree(String),

    #[error("tree {0} not found")]
    TreeNotFound(String),

    #[error("workflow {0} not found")]
    WorkflowNotFound(String),
}

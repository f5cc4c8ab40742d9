//! On-disk schema for the workflow memory file: registered workflows,
//! the append-only choice log, and a derived summary.

use crate::types::{SovereignChoice, WorkflowRecord};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

pub const MEMORY_VERSION: &str = "1.0";

/// The whole memory document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowMemory {
    pub version: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub workflows: BTreeMap<String, WorkflowRecord>,
    #[serde(default)]
    pub choices: Vec<SovereignChoice>,
    #[serde(default)]
    pub statistics: MemorySummary,
}

/// Derived counts written alongside the data for quick inspection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorySummary {
    pub total_workflows: usize,
    pub total_choices: usize,
    pub active_workflows: usize,
}

/// Write the memory document as pretty-printed JSON.
pub fn save(
    path: &Path,
    workflows: &BTreeMap<String, WorkflowRecord>,
    choices: &[SovereignChoice],
) -> Result<()> {
    let memory = WorkflowMemory {
        version: MEMORY_VERSION.to_string(),
        updated_at: Utc::now(),
        workflows: workflows.clone(),
        choices: choices.to_vec(),
        statistics: MemorySummary {
            total_workflows: workflows.len(),
            total_choices: choices.len(),
            active_workflows: workflows.values().filter(|w| w.status == "active").count(),
        },
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&memory).context("Failed to serialize memory")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write memory file {}", path.display()))?;
    debug!("Saved workflow memory to {}", path.display());
    Ok(())
}

/// Read the memory document back. Missing or corrupt files yield `None`
/// so callers start from empty state; nothing is raised.
pub fn load(path: &Path) -> Option<WorkflowMemory> {
    if !path.exists() {
        return None;
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read memory file {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(memory) => Some(memory),
        Err(e) => {
            warn!(
                "Corrupt memory file {} — starting from empty state: {}",
                path.display(),
                e
            );
            None
        }
    }
}

//! Configuration schema for sovereign.toml.

use crate::truth::SovereignTruth;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SovereignConfig {
    /// Directory holding the memory file and tree storage.
    pub storage_dir: String,

    /// Log level (debug, info, warn, error).
    pub log_level: String,

    /// Default number of suggestions returned by next-step queries.
    pub max_suggestions: usize,

    /// Extra truths registered on top of the built-in set. An entry with a
    /// built-in id replaces that truth.
    pub truths: Vec<SovereignTruth>,
}

impl Default for SovereignConfig {
    fn default() -> Self {
        Self {
            storage_dir: "~/.sovereign".into(),
            log_level: "info".into(),
            max_suggestions: 5,
            truths: Vec::new(),
        }
    }
}

impl SovereignConfig {
    /// Resolve a path that may contain `~` to an absolute path.
    pub fn resolve_path(&self, path: &str) -> String {
        shellexpand::tilde(path).into_owned()
    }

    /// Resolved storage directory.
    pub fn resolved_storage_dir(&self) -> String {
        self.resolve_path(&self.storage_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: SovereignConfig = toml::from_str("").unwrap();
        assert_eq!(config.storage_dir, "~/.sovereign");
        assert_eq!(config.max_suggestions, 5);
        assert!(config.truths.is_empty());
    }

    #[test]
    fn truths_parse_from_toml() {
        let config: SovereignConfig = toml::from_str(
            r#"
            log_level = "debug"

            [[truths]]
            truth_id = "resilience"
            name = "Resilience"
            description = "Bounce back from setbacks"
            weight = 0.6
            keywords = ["recover", "retry", "resilient"]
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.truths.len(), 1);
        assert_eq!(config.truths[0].truth_id, "resilience");
        assert_eq!(config.truths[0].weight, 0.6);
        assert_eq!(config.truths[0].keywords.len(), 3);
    }
}

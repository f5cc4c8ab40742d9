//! Sovereign truths — named, weighted, keyword-based scoring rules.
//!
//! A truth scores free text by the fraction of its keywords present
//! (case-insensitive substring match). The built-in set covers
//! sovereignty, intentionality, alignment, and growth; callers may
//! replace or extend it.

use serde::{Deserialize, Serialize};

/// A named weighted rule for scoring text alignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SovereignTruth {
    pub truth_id: String,
    pub name: String,
    pub description: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_weight() -> f64 {
    1.0
}

impl SovereignTruth {
    pub fn new(truth_id: &str, name: &str, description: &str, weight: f64) -> Self {
        Self {
            truth_id: truth_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            weight,
            keywords: Vec::new(),
        }
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Score how well `text` aligns with this truth: matched keywords over
    /// total keywords, in [0, 1]. A truth with no keywords is neutral (0.5).
    pub fn evaluate_alignment(&self, text: &str) -> f64 {
        if self.keywords.is_empty() {
            return 0.5;
        }

        let text_lower = text.to_lowercase();
        let matches = self
            .keywords
            .iter()
            .filter(|kw| text_lower.contains(&kw.to_lowercase()))
            .count();

        (matches as f64 / self.keywords.len() as f64).min(1.0)
    }
}

/// The built-in truth set, in descending weight order.
pub fn default_truths() -> Vec<SovereignTruth> {
    vec![
        SovereignTruth::new(
            "sovereignty",
            "Sovereignty",
            "Actions that enhance autonomy and self-determination",
            1.0,
        )
        .with_keywords(&["sovereign", "autonomous", "independent", "freedom", "self-directed"]),
        SovereignTruth::new(
            "intentionality",
            "Intentional Forward Movement",
            "Clear, purposeful progression toward goals",
            0.9,
        )
        .with_keywords(&["intentional", "purposeful", "goal", "progress", "forward"]),
        SovereignTruth::new(
            "alignment",
            "Truth Alignment",
            "Consistency with core principles and values",
            0.8,
        )
        .with_keywords(&["aligned", "consistent", "principled", "true", "authentic"]),
        SovereignTruth::new(
            "growth",
            "Continuous Growth",
            "Learning, expansion, and evolution",
            0.7,
        )
        .with_keywords(&["growth", "learning", "expand", "evolve", "improve"]),
    ]
}

//! Data types consumed and produced by the aggregator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw scores keyed by rubric item label, then by sub-item name.
///
/// Scores are expected in `[0, 5]` but are not clamped here; whatever the
/// caller stores flows through the arithmetic unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreEntry {
    scores: HashMap<String, HashMap<String, f64>>,
}

impl ScoreEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, item: &str, sub_item: &str, score: f64) {
        self.scores
            .entry(item.to_string())
            .or_default()
            .insert(sub_item.to_string(), score);
    }

    /// Builder-style [`ScoreEntry::set`].
    pub fn with(mut self, item: &str, sub_item: &str, score: f64) -> Self {
        self.set(item, sub_item, score);
        self
    }

    /// Returns the stored score, or `0.0` when the pair was never entered.
    ///
    /// An unanswered sub-item counts as zero points.
    pub fn score(&self, item: &str, sub_item: &str) -> f64 {
        self.scores
            .get(item)
            .and_then(|subs| subs.get(sub_item))
            .copied()
            .unwrap_or(0.0)
    }

    /// Every stored `(item, sub_item, score)` triple, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.scores.iter().flat_map(|(item, subs)| {
            subs.iter()
                .map(move |(sub, score)| (item.as_str(), sub.as_str(), *score))
        })
    }

    pub fn clear(&mut self) {
        self.scores.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.scores.values().all(HashMap::is_empty)
    }
}

/// Aggregated view of one rubric item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub label: String,
    pub weight: f64,
    /// Mean of the sub-item scores, 0 for an item without sub-items.
    pub average: f64,
    /// `(sub_item, score)` pairs in rubric order, missing scores as 0.
    pub sub_scores: Vec<(String, f64)>,
}

/// Output of [`crate::scoring::compute_grade`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeResult {
    pub items: Vec<ItemSummary>,
    pub weighted_sum: f64,
    pub total_weight: f64,
    pub final_grade: f64,
}

impl GradeResult {
    /// Average of the item labelled `label`, if the rubric had one.
    pub fn average(&self, label: &str) -> Option<f64> {
        self.items
            .iter()
            .find(|i| i.label == label)
            .map(|i| i.average)
    }

    /// Mapping from item label to average.
    pub fn per_item_average(&self) -> HashMap<&str, f64> {
        self.items
            .iter()
            .map(|i| (i.label.as_str(), i.average))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_score_defaults_to_zero() {
        let entry = ScoreEntry::new().with("P1", "a", 4.0);
        assert_eq!(entry.score("P1", "a"), 4.0);
        assert_eq!(entry.score("P1", "b"), 0.0);
        assert_eq!(entry.score("P2", "a"), 0.0);
    }

    #[test]
    fn test_deserialize_nested_mapping() {
        let entry: ScoreEntry =
            serde_json::from_str(r#"{"P1": {"a": 3.5, "b": 5}}"#).unwrap();
        assert_eq!(entry.score("P1", "a"), 3.5);
        assert_eq!(entry.score("P1", "b"), 5.0);
    }

    #[test]
    fn test_clear() {
        let mut entry = ScoreEntry::new().with("P1", "a", 1.0);
        assert!(!entry.is_empty());
        entry.clear();
        assert!(entry.is_empty());
    }
}

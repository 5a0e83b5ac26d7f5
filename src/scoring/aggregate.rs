use crate::rubric::Rubric;
use crate::scoring::types::{GradeResult, ItemSummary, ScoreEntry};
use crate::scoring::utility::mean;

/// Computes per-item averages and the weighted final grade.
///
/// Each item's average is the arithmetic mean of its sub-item scores (0 for
/// an item with no sub-items, missing scores read as 0). The final grade is
/// `Σ(average × weight) / Σ(weight)`, or exactly 0 when the total weight is 0.
///
/// Scores are not clamped: values outside `[0, 5]` propagate into the
/// averages and the final grade as-is.
pub fn compute_grade(rubric: &Rubric, entry: &ScoreEntry) -> GradeResult {
    let mut items = Vec::with_capacity(rubric.items().len());
    let mut weighted_sum = 0.0;

    for item in rubric.items() {
        let sub_scores: Vec<(String, f64)> = item
            .sub_items
            .iter()
            .map(|sub| (sub.clone(), entry.score(&item.label, sub)))
            .collect();
        let values: Vec<f64> = sub_scores.iter().map(|(_, score)| *score).collect();
        let average = mean(&values);

        weighted_sum += average * item.weight;

        items.push(ItemSummary {
            label: item.label.clone(),
            weight: item.weight,
            average,
            sub_scores,
        });
    }

    let total_weight = rubric.total_weight();
    let final_grade = if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    };

    GradeResult {
        items,
        weighted_sum,
        total_weight,
        final_grade,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::RubricItem;

    fn rubric(items: &[(&str, &[&str], f64)]) -> Rubric {
        Rubric::new(
            items
                .iter()
                .map(|(label, subs, weight)| {
                    RubricItem::new(
                        *label,
                        subs.iter().map(|s| s.to_string()).collect(),
                        5.0,
                        *weight,
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_weighted_average() {
        let r = rubric(&[("P1", &["a", "b"], 2.0), ("P2", &["c"], 1.0)]);
        let entry = ScoreEntry::new()
            .with("P1", "a", 4.0)
            .with("P1", "b", 5.0)
            .with("P2", "c", 3.0);

        let result = compute_grade(&r, &entry);

        assert_eq!(result.average("P1"), Some(4.5));
        assert_eq!(result.average("P2"), Some(3.0));
        assert_eq!(result.weighted_sum, 12.0);
        assert_eq!(result.total_weight, 3.0);
        assert_eq!(result.final_grade, 4.0);
    }

    #[test]
    fn test_zero_total_weight_yields_zero() {
        let r = rubric(&[("P1", &["a"], 0.0), ("P2", &["b"], 0.0)]);
        let entry = ScoreEntry::new().with("P1", "a", 5.0).with("P2", "b", 5.0);

        let result = compute_grade(&r, &entry);

        assert_eq!(result.final_grade, 0.0);
        assert!(!result.final_grade.is_nan());
        assert_eq!(result.average("P1"), Some(5.0));
    }

    #[test]
    fn test_item_without_sub_items_averages_zero() {
        let r = rubric(&[("P1", &[], 1.0), ("P2", &["a"], 1.0)]);
        let entry = ScoreEntry::new().with("P2", "a", 5.0);

        let result = compute_grade(&r, &entry);

        assert_eq!(result.average("P1"), Some(0.0));
        assert_eq!(result.final_grade, 2.5);
    }

    #[test]
    fn test_missing_scores_count_as_zero() {
        let r = rubric(&[("P1", &["a", "b"], 1.0)]);
        let entry = ScoreEntry::new().with("P1", "a", 4.0);

        let result = compute_grade(&r, &entry);

        assert_eq!(result.items[0].sub_scores, vec![("a".to_string(), 4.0), ("b".to_string(), 0.0)]);
        assert_eq!(result.final_grade, 2.0);
    }

    #[test]
    fn test_scores_outside_rubric_are_ignored() {
        let r = rubric(&[("P1", &["a"], 1.0)]);
        let entry = ScoreEntry::new().with("P1", "a", 3.0).with("P1", "zz", 5.0);
        assert_eq!(compute_grade(&r, &entry).final_grade, 3.0);
    }

    #[test]
    fn test_out_of_range_scores_pass_through() {
        let r = rubric(&[("P1", &["a"], 1.0)]);
        let entry = ScoreEntry::new().with("P1", "a", 7.0);
        assert_eq!(compute_grade(&r, &entry).final_grade, 7.0);
    }

    #[test]
    fn test_in_range_scores_stay_in_range() {
        let r = rubric(&[
            ("P1", &["a", "b", "c"], 0.3),
            ("P2", &["d"], 2.7),
            ("P3", &[], 1.0),
        ]);
        for step in 0..=10 {
            let s = step as f64 * 0.5;
            let entry = ScoreEntry::new()
                .with("P1", "a", s)
                .with("P1", "b", 5.0 - s)
                .with("P1", "c", s)
                .with("P2", "d", s);
            let grade = compute_grade(&r, &entry).final_grade;
            assert!((0.0..=5.0).contains(&grade), "grade {grade} out of range");
        }
    }

    #[test]
    fn test_items_keep_rubric_order() {
        let r = rubric(&[("Z", &[], 1.0), ("A", &[], 1.0), ("M", &[], 1.0)]);
        let labels: Vec<_> = compute_grade(&r, &ScoreEntry::new())
            .items
            .into_iter()
            .map(|i| i.label)
            .collect();
        assert_eq!(labels, vec!["Z", "A", "M"]);
    }
}

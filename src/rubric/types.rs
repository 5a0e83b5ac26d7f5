use crate::error::{GradingError, Result};
use crate::rubric::{DELIMITER, EXCLUDED, INCLUDED, LABEL_COLUMN, REFERENCE_COLUMN, WEIGHT_COLUMN};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One graded point of a rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricItem {
    pub label: String,
    /// Sub-criteria scored individually on a 0–5 scale, in display order.
    pub sub_items: Vec<String>,
    /// Informational "out of" value. Not used when computing grades.
    pub max_reference_score: f64,
    /// Relative contribution of this item's average to the final grade.
    pub weight: f64,
}

impl RubricItem {
    pub fn new(label: impl Into<String>, sub_items: Vec<String>, max_reference_score: f64, weight: f64) -> Self {
        Self {
            label: label.into(),
            sub_items,
            max_reference_score,
            weight,
        }
    }
}

/// An ordered, non-empty list of [`RubricItem`]s with unique labels and
/// non-negative weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rubric {
    items: Vec<RubricItem>,
}

impl Rubric {
    /// Validates `items` and wraps them in a rubric.
    ///
    /// # Errors
    ///
    /// - [`GradingError::EmptyRubric`] if `items` is empty
    /// - [`GradingError::Validation`] for a blank label
    /// - [`GradingError::DuplicateItem`] if two items share a label
    /// - [`GradingError::DuplicateSubItem`] if an item lists a sub-item twice
    /// - [`GradingError::NegativeWeight`] for a negative or non-finite weight
    pub fn new(items: Vec<RubricItem>) -> Result<Self> {
        if items.is_empty() {
            return Err(GradingError::EmptyRubric);
        }

        let mut seen = HashSet::new();
        for item in &items {
            if item.label.trim().is_empty() {
                return Err(GradingError::Validation(
                    "rubric item labels must not be blank".into(),
                ));
            }
            if !seen.insert(item.label.as_str()) {
                return Err(GradingError::DuplicateItem {
                    label: item.label.clone(),
                });
            }
            let mut subs = HashSet::new();
            if let Some(repeated) = item.sub_items.iter().find(|s| !subs.insert(s.as_str())) {
                return Err(GradingError::DuplicateSubItem {
                    label: item.label.clone(),
                    sub_item: repeated.clone(),
                });
            }
            if !item.weight.is_finite() || item.weight < 0.0 {
                return Err(GradingError::NegativeWeight {
                    label: item.label.clone(),
                    weight: item.weight,
                });
            }
        }

        Ok(Self { items })
    }

    pub fn items(&self) -> &[RubricItem] {
        &self.items
    }

    pub fn item(&self, label: &str) -> Option<&RubricItem> {
        self.items.iter().find(|i| i.label == label)
    }

    /// Sum of all item weights.
    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(|i| i.weight).sum()
    }

    /// Every distinct sub-item name, in order of first appearance.
    pub fn sub_item_catalog(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .flat_map(|i| i.sub_items.iter())
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect()
    }

    /// Writes the rubric as a semicolon-delimited table.
    ///
    /// One column per entry of `catalog` holds `si` or `no`; sub-items of an
    /// item that are missing from `catalog` are not written, so pass a
    /// superset of [`Rubric::sub_item_catalog`] for a lossless export.
    pub fn to_delimited(&self, catalog: &[String]) -> Result<String> {
        let mut writer = WriterBuilder::new()
            .delimiter(DELIMITER)
            .from_writer(Vec::new());

        let mut header = Vec::with_capacity(catalog.len() + 3);
        header.push(LABEL_COLUMN.to_string());
        header.extend(catalog.iter().cloned());
        header.push(REFERENCE_COLUMN.to_string());
        header.push(WEIGHT_COLUMN.to_string());
        writer
            .write_record(&header)
            .map_err(|e| GradingError::parse("rubric export", e))?;

        for item in &self.items {
            let mut record = Vec::with_capacity(header.len());
            record.push(item.label.clone());
            for sub_item in catalog {
                let mark = if item.sub_items.contains(sub_item) {
                    INCLUDED
                } else {
                    EXCLUDED
                };
                record.push(mark.to_string());
            }
            record.push(item.max_reference_score.to_string());
            record.push(item.weight.to_string());
            writer
                .write_record(&record)
                .map_err(|e| GradingError::parse("rubric export", e))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| GradingError::Io(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| GradingError::Validation(format!("rubric export is not UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn item(label: &str, subs: &[&str], weight: f64) -> RubricItem {
        RubricItem::new(
            label,
            subs.iter().map(|s| s.to_string()).collect(),
            5.0,
            weight,
        )
    }

    #[test]
    fn test_total_weight() {
        let rubric = Rubric::new(vec![item("P1", &["a"], 2.0), item("P2", &[], 0.5)]).unwrap();
        assert_eq!(rubric.total_weight(), 2.5);
    }

    #[test]
    fn test_rejects_empty() {
        let err = Rubric::new(vec![]).unwrap_err();
        assert!(matches!(err, GradingError::EmptyRubric));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_rejects_duplicate_label() {
        let err = Rubric::new(vec![item("P1", &[], 1.0), item("P1", &[], 1.0)]).unwrap_err();
        assert!(matches!(err, GradingError::DuplicateItem { label } if label == "P1"));
    }

    #[test]
    fn test_rejects_repeated_sub_item() {
        let err = Rubric::new(vec![item("P1", &["A", "A", "B"], 1.0)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(
            err,
            GradingError::DuplicateSubItem { label, sub_item } if label == "P1" && sub_item == "A"
        ));
    }

    #[test]
    fn test_rejects_negative_and_nan_weight() {
        assert!(matches!(
            Rubric::new(vec![item("P1", &[], -1.0)]),
            Err(GradingError::NegativeWeight { .. })
        ));
        assert!(matches!(
            Rubric::new(vec![item("P1", &[], f64::NAN)]),
            Err(GradingError::NegativeWeight { .. })
        ));
    }

    #[test]
    fn test_catalog_keeps_first_appearance_order() {
        let rubric = Rubric::new(vec![
            item("P1", &["b", "a"], 1.0),
            item("P2", &["a", "c"], 1.0),
        ])
        .unwrap();
        assert_eq!(rubric.sub_item_catalog(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_to_delimited_layout() {
        let rubric = Rubric::new(vec![item("P1", &["Dibuja DCL"], 2.0)]).unwrap();
        let catalog = vec!["Dibuja DCL".to_string(), "Otro".to_string()];
        let text = rubric.to_delimited(&catalog).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Enunciado;Dibuja DCL;Otro;sobre;peso");
        assert_eq!(lines[1], "P1;si;no;5;2");
    }
}

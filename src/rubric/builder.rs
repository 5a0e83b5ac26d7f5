//! Step-by-step rubric construction.
//!
//! The builder first receives a catalog of candidate sub-items, then items
//! are added and configured one at a time. [`RubricBuilder::finalize`] turns
//! the draft into a [`Rubric`] and [`RubricBuilder::export`] writes it as a
//! rubric table that [`crate::rubric::parse_rubric`] reads back.

use crate::error::{GradingError, Result};
use crate::rubric::{Rubric, RubricItem};

const DEFAULT_REFERENCE_SCORE: f64 = 5.0;
const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Default, Clone)]
pub struct RubricBuilder {
    catalog: Vec<String>,
    items: Vec<RubricItem>,
}

impl RubricBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the sub-item catalog with the comma-separated names in `input`.
    ///
    /// Names are trimmed and blanks are dropped. Sub-items already selected
    /// on an item that are no longer in the catalog are removed from it.
    pub fn set_sub_items(&mut self, input: &str) -> &[String] {
        let mut catalog: Vec<String> = Vec::new();
        for name in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !catalog.iter().any(|c| c == name) {
                catalog.push(name.to_string());
            }
        }
        self.catalog = catalog;

        for item in &mut self.items {
            item.sub_items.retain(|s| self.catalog.contains(s));
        }
        &self.catalog
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn items(&self) -> &[RubricItem] {
        &self.items
    }

    /// Adds a new item with no sub-items, reference score 5 and weight 1.
    pub fn add_item(&mut self, label: &str) -> Result<&mut RubricItem> {
        let label = label.trim();
        if label.is_empty() {
            return Err(GradingError::Validation(
                "rubric item labels must not be blank".into(),
            ));
        }
        if self.items.iter().any(|i| i.label == label) {
            return Err(GradingError::DuplicateItem {
                label: label.to_string(),
            });
        }

        self.items.push(RubricItem::new(
            label,
            Vec::new(),
            DEFAULT_REFERENCE_SCORE,
            DEFAULT_WEIGHT,
        ));
        let index = self.items.len() - 1;
        Ok(&mut self.items[index])
    }

    /// Sets which catalog sub-items apply to `label`, stored in catalog order.
    pub fn select_sub_items<S: AsRef<str>>(&mut self, label: &str, selected: &[S]) -> Result<()> {
        if let Some(unknown) = selected
            .iter()
            .map(AsRef::as_ref)
            .find(|s| !self.catalog.iter().any(|c| c == s))
        {
            return Err(GradingError::UnknownSubItem {
                sub_item: unknown.to_string(),
            });
        }

        let sub_items = self
            .catalog
            .iter()
            .filter(|c| selected.iter().any(|s| s.as_ref() == c.as_str()))
            .cloned()
            .collect();
        self.item_mut(label)?.sub_items = sub_items;
        Ok(())
    }

    pub fn set_reference_score(&mut self, label: &str, score: f64) -> Result<()> {
        if !score.is_finite() || score < 0.0 {
            return Err(GradingError::Validation(format!(
                "reference score for '{label}' must be non-negative, got {score}"
            )));
        }
        self.item_mut(label)?.max_reference_score = score;
        Ok(())
    }

    pub fn set_weight(&mut self, label: &str, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(GradingError::NegativeWeight {
                label: label.to_string(),
                weight,
            });
        }
        self.item_mut(label)?.weight = weight;
        Ok(())
    }

    /// Produces the rubric used for grading.
    ///
    /// # Errors
    ///
    /// [`GradingError::EmptyRubric`] when no item has been added.
    pub fn finalize(&self) -> Result<Rubric> {
        Rubric::new(self.items.clone())
    }

    /// Writes the draft as a rubric table with one column per catalog entry.
    pub fn export(&self) -> Result<String> {
        self.finalize()?.to_delimited(&self.catalog)
    }

    fn item_mut(&mut self, label: &str) -> Result<&mut RubricItem> {
        self.items
            .iter_mut()
            .find(|i| i.label == label)
            .ok_or_else(|| GradingError::UnknownItem {
                label: label.to_string(),
            })
    }
}

//! Grading session: the transient state of grading one group of students.
//!
//! A session owns the rubric in use, the students being graded together,
//! their scores and comments. [`GradingSession::submit`] validates the
//! session, computes the grade, appends one gradebook row per student and
//! builds the report. [`GradingSession::reset`] clears everything except the
//! rubric so the next group can be graded.

use crate::error::{GradingError, Result};
use crate::gradebook::{GradebookRow, GradebookSchema, GradebookStore};
use crate::report::{Report, ReportContext};
use crate::rubric::Rubric;
use crate::scoring::grid::beam_workshop_rubric;
use crate::scoring::{GradeResult, ScoreEntry, compute_grade};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Which grading form a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingMode {
    /// A user-defined weighted rubric.
    Rubric,
    /// The fixed beam workshop grid.
    Grid,
}

impl GradingMode {
    /// Gradebook layout written by this mode.
    pub fn schema(self) -> GradebookSchema {
        match self {
            GradingMode::Rubric => GradebookSchema::Final,
            GradingMode::Grid => GradebookSchema::Dual,
        }
    }
}

/// Result of a successful [`GradingSession::submit`].
#[derive(Debug, Clone)]
pub struct Submission {
    pub result: GradeResult,
    pub rows: Vec<GradebookRow>,
    pub report: Report,
}

/// Grading input captured outside the session, read from a JSON file:
///
/// ```json
/// {
///   "scores": { "Punto 1": { "Dibuja DCL": 4, "Identifica Fuerzas": 3.5 } },
///   "comments": { "Punto 1": "Revisar el DCL" },
///   "cell_comments": { "Punto 1": { "Dibuja DCL": "Falta una reacción" } },
///   "final_comment": "Buen trabajo en general",
///   "subjective_grade": 4.0,
///   "sign": true
/// }
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoreSheet {
    pub scores: ScoreEntry,
    pub comments: HashMap<String, String>,
    /// Comments on single cells, keyed by item then sub-item.
    pub cell_comments: HashMap<String, HashMap<String, String>>,
    pub final_comment: String,
    pub subjective_grade: Option<f64>,
    pub sign: bool,
}

impl ScoreSheet {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Loads the sheet into `session`, replacing its scores.
    ///
    /// # Errors
    ///
    /// [`GradingError::UnknownItem`] or [`GradingError::UnknownSubItem`] for
    /// a score or comment on a pair the rubric lacks. Scores are checked
    /// before any of them replace the session's.
    pub fn apply_to(self, session: &mut GradingSession) -> Result<()> {
        session.set_scores(self.scores)?;
        for (item, comment) in &self.comments {
            session.set_comment(item, comment)?;
        }
        for (item, cells) in &self.cell_comments {
            for (sub_item, comment) in cells {
                session.set_cell_comment(item, sub_item, comment)?;
            }
        }
        session.set_final_comment(&self.final_comment);
        session.set_subjective_grade(self.subjective_grade);
        session.set_signature(self.sign);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GradingSession {
    mode: GradingMode,
    rubric: Rubric,
    group: Vec<String>,
    scores: ScoreEntry,
    comments: HashMap<String, String>,
    cell_comments: HashMap<(String, String), String>,
    final_comment: String,
    subjective_grade: Option<f64>,
    signature: bool,
}

impl GradingSession {
    pub fn new(rubric: Rubric) -> Self {
        Self::with_mode(GradingMode::Rubric, rubric)
    }

    /// Session over the beam workshop grid.
    pub fn grid() -> Result<Self> {
        Ok(Self::with_mode(GradingMode::Grid, beam_workshop_rubric()?))
    }

    fn with_mode(mode: GradingMode, rubric: Rubric) -> Self {
        Self {
            mode,
            rubric,
            group: Vec::new(),
            scores: ScoreEntry::new(),
            comments: HashMap::new(),
            cell_comments: HashMap::new(),
            final_comment: String::new(),
            subjective_grade: None,
            signature: false,
        }
    }

    pub fn mode(&self) -> GradingMode {
        self.mode
    }

    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    pub fn group(&self) -> &[String] {
        &self.group
    }

    /// Adds a student to the group. Returns `false` if already present or blank.
    pub fn add_student(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.group.iter().any(|s| s == name) {
            return false;
        }
        self.group.push(name.to_string());
        true
    }

    /// Records a raw score. The value is stored as given, without clamping.
    ///
    /// # Errors
    ///
    /// [`GradingError::UnknownItem`] or [`GradingError::UnknownSubItem`] if
    /// the pair is not part of the rubric.
    pub fn set_score(&mut self, item: &str, sub_item: &str, score: f64) -> Result<()> {
        self.check_pair(item, sub_item)?;
        self.scores.set(item, sub_item, score);
        Ok(())
    }

    /// Replaces all scores at once. On error the current scores are kept.
    ///
    /// # Errors
    ///
    /// Same as [`GradingSession::set_score`], for the first pair of `scores`
    /// that is not part of the rubric.
    pub fn set_scores(&mut self, scores: ScoreEntry) -> Result<()> {
        for (item, sub_item, _) in scores.iter() {
            self.check_pair(item, sub_item)?;
        }
        self.scores = scores;
        Ok(())
    }

    fn check_pair(&self, item: &str, sub_item: &str) -> Result<()> {
        let rubric_item = self
            .rubric
            .item(item)
            .ok_or_else(|| GradingError::UnknownItem {
                label: item.to_string(),
            })?;
        if !rubric_item.sub_items.iter().any(|s| s == sub_item) {
            return Err(GradingError::UnknownSubItem {
                sub_item: sub_item.to_string(),
            });
        }
        Ok(())
    }

    pub fn set_comment(&mut self, item: &str, comment: &str) -> Result<()> {
        if self.rubric.item(item).is_none() {
            return Err(GradingError::UnknownItem {
                label: item.to_string(),
            });
        }
        self.comments.insert(item.to_string(), comment.to_string());
        Ok(())
    }

    /// Comment on one cell, shown in the report as `<sub_item> -> <item>`.
    pub fn set_cell_comment(&mut self, item: &str, sub_item: &str, comment: &str) -> Result<()> {
        self.check_pair(item, sub_item)?;
        self.cell_comments
            .insert((item.to_string(), sub_item.to_string()), comment.to_string());
        Ok(())
    }

    pub fn set_final_comment(&mut self, comment: &str) {
        self.final_comment = comment.to_string();
    }

    pub fn set_subjective_grade(&mut self, grade: Option<f64>) {
        self.subjective_grade = grade;
    }

    pub fn set_signature(&mut self, signature: bool) {
        self.signature = signature;
    }

    /// Grade for the current scores, without validating or saving anything.
    pub fn preview(&self) -> GradeResult {
        compute_grade(&self.rubric, &self.scores)
    }

    /// Clears group, scores, comments and flags. The rubric is kept.
    pub fn reset(&mut self) {
        *self = Self::with_mode(self.mode, self.rubric.clone());
        debug!("Grading session reset");
    }

    fn validate(&self) -> Result<()> {
        if self.group.is_empty() {
            return Err(GradingError::Validation(
                "select at least one student before saving".into(),
            ));
        }
        if self.final_comment.trim().is_empty() {
            return Err(GradingError::Validation("the final comment is required".into()));
        }
        if let Some(grade) = self.subjective_grade {
            if !(0.0..=5.0).contains(&grade) {
                return Err(GradingError::Validation(format!(
                    "subjective grade must be between 0 and 5, got {grade}"
                )));
            }
        }
        Ok(())
    }

    /// Validates, grades, saves one row per student and builds the report.
    ///
    /// Nothing is written when validation fails.
    #[tracing::instrument(skip(self, store), fields(mode = ?self.mode, students = self.group.len()))]
    pub fn submit(&self, store: &GradebookStore, date: NaiveDate) -> Result<Submission> {
        self.validate()?;

        let result = self.preview();
        let rows: Vec<GradebookRow> = self
            .group
            .iter()
            .map(|student| {
                GradebookRow::new(student, result.final_grade, date)
                    .with_subjective(self.subjective_grade)
            })
            .collect();
        store.append(&rows)?;
        info!(final_grade = result.final_grade, "Grade saved");

        let mut comments = Vec::new();
        for item in self.rubric.items() {
            if let Some(comment) = self.comments.get(&item.label) {
                comments.push((item.label.clone(), comment.clone()));
            }
            for sub_item in &item.sub_items {
                let key = (item.label.clone(), sub_item.clone());
                if let Some(comment) = self.cell_comments.get(&key) {
                    comments.push((format!("{sub_item} -> {}", item.label), comment.clone()));
                }
            }
        }
        let ctx = ReportContext {
            students: &self.group,
            date,
            comments,
            final_comment: &self.final_comment,
            subjective_grade: self.subjective_grade,
            signature: self.signature,
        };
        let report = match self.mode {
            GradingMode::Rubric => Report::for_rubric(ctx, &result),
            GradingMode::Grid => Report::for_grid(ctx, &result, &self.scores),
        };

        Ok(Submission {
            result,
            rows,
            report,
        })
    }
}

//! Persistent gradebook file.
//!
//! Every save is a whole-file cycle: read the table, append the new rows,
//! write the table back. There is no locking, so two processes saving to the
//! same file at once can lose one side's rows. Callers are expected to be the
//! only writer.

use crate::error::{GradingError, Result};
use crate::gradebook::schema::{
    self, DATE_COLUMN, GradebookSchema, STUDENT_COLUMN, SUBJECTIVE_COLUMN,
};
use crate::gradebook::table::Table;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Field delimiter of gradebook files.
pub const DELIMITER: u8 = b',';
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One saved grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradebookRow {
    pub student: String,
    pub grade: f64,
    /// Instructor's own grade, stored only by the `Dual` layout.
    pub subjective: Option<f64>,
    pub date: NaiveDate,
}

impl GradebookRow {
    pub fn new(student: impl Into<String>, grade: f64, date: NaiveDate) -> Self {
        Self {
            student: student.into(),
            grade,
            subjective: None,
            date,
        }
    }

    pub fn with_subjective(mut self, subjective: Option<f64>) -> Self {
        self.subjective = subjective;
        self
    }

    /// Lays the row out under `table`'s headers. Unknown columns stay blank.
    fn to_record(&self, table: &Table, schema: GradebookSchema) -> Vec<String> {
        table
            .headers()
            .iter()
            .map(|header| match header.as_str() {
                STUDENT_COLUMN => self.student.clone(),
                DATE_COLUMN => self.date.format(DATE_FORMAT).to_string(),
                SUBJECTIVE_COLUMN => self.subjective.map(format_grade).unwrap_or_default(),
                h if h == schema.grade_column() => format_grade(self.grade),
                _ => String::new(),
            })
            .collect()
    }
}

/// Grades are stored with two decimals.
pub fn format_grade(grade: f64) -> String {
    format!("{grade:.2}")
}

#[derive(Debug, Clone)]
pub struct GradebookStore {
    path: PathBuf,
    schema: GradebookSchema,
}

impl GradebookStore {
    /// A store writing `schema` rows to `path`. The file is created on the
    /// first append.
    pub fn new(path: impl Into<PathBuf>, schema: GradebookSchema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> GradebookSchema {
        self.schema
    }

    /// Appends `rows` in order and rewrites the whole file.
    ///
    /// A missing file is first created with the store's header. A legacy
    /// header is migrated when the store needs the newer layout.
    #[tracing::instrument(skip(self, rows), fields(path = %self.path.display(), rows = rows.len()))]
    pub fn append(&self, rows: &[GradebookRow]) -> Result<()> {
        if !self.path.exists() {
            debug!("Creating gradebook with canonical header");
            self.schema.empty_table().write_path(&self.path, DELIMITER)?;
        }

        let mut table = Table::from_path(&self.path, DELIMITER, "gradebook")?;
        let layout = schema::migrate(&mut table, self.schema)?;

        for row in rows {
            let record = row.to_record(&table, layout);
            table.push_row(record);
        }

        table.write_path(&self.path, DELIMITER)?;
        info!(total = table.len(), "Gradebook saved");
        Ok(())
    }

    /// Reads every row. A missing file is an empty gradebook.
    pub fn load(&self) -> Result<Vec<GradebookRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut table = Table::from_path(&self.path, DELIMITER, "gradebook")?;
        let layout = schema::migrate(&mut table, self.schema)?;
        let grade_column = layout.grade_column();

        (0..table.len())
            .map(|i| -> Result<GradebookRow> {
                let row = i + 1;
                let cell = |name: &str| table.cell(i, name).unwrap_or_default();

                let grade = parse_grade(row, grade_column, cell(grade_column))?
                    .unwrap_or_default();
                let subjective = parse_grade(row, SUBJECTIVE_COLUMN, cell(SUBJECTIVE_COLUMN))?;
                let date_text = cell(DATE_COLUMN);
                let date = NaiveDate::parse_from_str(date_text, DATE_FORMAT).map_err(|_| {
                    GradingError::InvalidDate {
                        row,
                        value: date_text.to_string(),
                    }
                })?;

                Ok(GradebookRow {
                    student: cell(STUDENT_COLUMN).to_string(),
                    grade,
                    subjective,
                    date,
                })
            })
            .collect()
    }
}

/// Blank cells are `None`; `,` is accepted as the decimal separator.
fn parse_grade(row: usize, column: &str, cell: &str) -> Result<Option<f64>> {
    if cell.trim().is_empty() {
        return Ok(None);
    }
    cell.trim()
        .replace(',', ".")
        .parse()
        .map(Some)
        .map_err(|_| GradingError::InvalidNumber {
            row,
            column: column.to_string(),
            value: cell.to_string(),
        })
}

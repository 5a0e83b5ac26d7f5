//! Error types for rubric parsing, grading and gradebook persistence.
//!
//! Errors fall into four kinds:
//! - validation: the input is well formed but not acceptable (empty comment,
//!   duplicate item, negative weight)
//! - parse: a table could not be read, or a cell could not be converted
//! - structural: the table parsed but does not have the expected shape
//!   (missing or repeated column, unusable rubric weight)
//! - io: the underlying file operation failed

use thiserror::Error;

/// Coarse classification of a [`GradingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Parse,
    Structural,
    Io,
}

#[derive(Error, Debug)]
pub enum GradingError {
    #[error("{0}")]
    Validation(String),

    #[error("duplicate rubric item: {label}")]
    DuplicateItem { label: String },

    #[error("rubric item not found: {label}")]
    UnknownItem { label: String },

    #[error("sub-item '{sub_item}' is not in the sub-item catalog")]
    UnknownSubItem { sub_item: String },

    #[error("sub-item '{sub_item}' is listed twice on '{label}'")]
    DuplicateSubItem { label: String, sub_item: String },

    #[error("weight for '{label}' must be non-negative, got {weight}")]
    NegativeWeight { label: String, weight: f64 },

    #[error("a rubric needs at least one item before it can be used for grading")]
    EmptyRubric,

    #[error("could not parse {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}: column '{column}' holds '{value}', expected a non-negative number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: '{value}' is not a YYYY-MM-DD date")]
    InvalidDate { row: usize, value: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{table} is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("{table} has column '{column}' more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("rubric row {row}: '{column}' holds '{value}', expected a non-negative number")]
    InvalidRubricNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GradingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GradingError::Validation(_)
            | GradingError::DuplicateItem { .. }
            | GradingError::UnknownItem { .. }
            | GradingError::UnknownSubItem { .. }
            | GradingError::DuplicateSubItem { .. }
            | GradingError::NegativeWeight { .. }
            | GradingError::EmptyRubric => ErrorKind::Validation,
            GradingError::Parse { .. }
            | GradingError::InvalidNumber { .. }
            | GradingError::InvalidDate { .. }
            | GradingError::Json(_) => ErrorKind::Parse,
            GradingError::MissingColumn { .. }
            | GradingError::DuplicateColumn { .. }
            | GradingError::InvalidRubricNumber { .. } => ErrorKind::Structural,
            GradingError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn parse(what: impl Into<String>, source: csv::Error) -> Self {
        GradingError::Parse {
            what: what.into(),
            source,
        }
    }

    pub(crate) fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        GradingError::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GradingError>;

//! Gradebook column layouts and the migration between them.
//!
//! Two layouts exist:
//!
//! | Schema  | Header                                                               |
//! |---------|----------------------------------------------------------------------|
//! | `Final` | `Estudiante,Calificacion Final,Fecha`                                |
//! | `Dual`  | `Estudiante,Calificacion Calculada,Calificacion Subjetiva,Fecha`     |
//!
//! `Final` is the older layout. Opening a `Final` file for a `Dual` writer
//! renames `Calificacion Final` to `Calificacion Calculada` and inserts a
//! blank `Calificacion Subjetiva` column; a `Dual` file is never downgraded.

use crate::error::{GradingError, Result};
use crate::gradebook::table::Table;
use serde::Serialize;
use tracing::warn;

pub const STUDENT_COLUMN: &str = "Estudiante";
pub const FINAL_COLUMN: &str = "Calificacion Final";
pub const CALCULATED_COLUMN: &str = "Calificacion Calculada";
pub const SUBJECTIVE_COLUMN: &str = "Calificacion Subjetiva";
pub const DATE_COLUMN: &str = "Fecha";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum GradebookSchema {
    /// Single computed grade.
    Final,
    /// Computed grade plus an optional subjective grade.
    Dual,
}

impl GradebookSchema {
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            GradebookSchema::Final => &[STUDENT_COLUMN, FINAL_COLUMN, DATE_COLUMN],
            GradebookSchema::Dual => &[
                STUDENT_COLUMN,
                CALCULATED_COLUMN,
                SUBJECTIVE_COLUMN,
                DATE_COLUMN,
            ],
        }
    }

    /// Name of the column holding the computed grade.
    pub fn grade_column(self) -> &'static str {
        match self {
            GradebookSchema::Final => FINAL_COLUMN,
            GradebookSchema::Dual => CALCULATED_COLUMN,
        }
    }

    /// Identifies the layout of `table` from its grade column.
    pub fn detect(table: &Table) -> Option<Self> {
        if table.column(CALCULATED_COLUMN).is_some() {
            Some(GradebookSchema::Dual)
        } else if table.column(FINAL_COLUMN).is_some() {
            Some(GradebookSchema::Final)
        } else {
            None
        }
    }

    pub fn empty_table(self) -> Table {
        Table::new(self.headers().iter().copied())
    }
}

/// Brings `table` up to at least `wanted` and returns the layout it ends in.
///
/// # Errors
///
/// [`GradingError::MissingColumn`] if the student column or every known
/// grade column is absent.
pub fn migrate(table: &mut Table, wanted: GradebookSchema) -> Result<GradebookSchema> {
    table.require_column(STUDENT_COLUMN, "gradebook")?;
    let found = GradebookSchema::detect(table)
        .ok_or_else(|| GradingError::missing_column("gradebook", wanted.grade_column()))?;

    if found >= wanted {
        return Ok(found);
    }

    warn!(
        from = ?found,
        to = ?wanted,
        "Migrating legacy gradebook header"
    );
    table.rename_column(FINAL_COLUMN, CALCULATED_COLUMN);
    if table.column(SUBJECTIVE_COLUMN).is_none() {
        let after = table.column(CALCULATED_COLUMN).map_or(0, |c| c + 1);
        table.insert_column(after, SUBJECTIVE_COLUMN);
    }
    Ok(GradebookSchema::Dual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn legacy() -> Table {
        Table::from_reader(
            "Estudiante,Calificacion Final,Fecha\nAna,4.50,2024-05-01\n".as_bytes(),
            b',',
            "gradebook",
        )
        .unwrap()
    }

    #[test]
    fn test_detect() {
        assert_eq!(GradebookSchema::detect(&legacy()), Some(GradebookSchema::Final));
        assert_eq!(
            GradebookSchema::detect(&GradebookSchema::Dual.empty_table()),
            Some(GradebookSchema::Dual)
        );
        assert_eq!(GradebookSchema::detect(&Table::new(["Estudiante"])), None);
    }

    #[test]
    fn test_migrate_legacy_to_dual() {
        let mut table = legacy();
        let schema = migrate(&mut table, GradebookSchema::Dual).unwrap();
        assert_eq!(schema, GradebookSchema::Dual);
        assert_eq!(table.headers(), GradebookSchema::Dual.headers());
        assert_eq!(table.cell(0, CALCULATED_COLUMN), Some("4.50"));
        assert_eq!(table.cell(0, SUBJECTIVE_COLUMN), Some(""));
        assert_eq!(table.cell(0, DATE_COLUMN), Some("2024-05-01"));
    }

    #[test]
    fn test_final_writer_keeps_dual_file() {
        let mut table = GradebookSchema::Dual.empty_table();
        let schema = migrate(&mut table, GradebookSchema::Final).unwrap();
        assert_eq!(schema, GradebookSchema::Dual);
        assert_eq!(table.headers(), GradebookSchema::Dual.headers());
    }

    #[test]
    fn test_final_stays_final() {
        let mut table = legacy();
        assert_eq!(
            migrate(&mut table, GradebookSchema::Final).unwrap(),
            GradebookSchema::Final
        );
        assert_eq!(table.headers(), GradebookSchema::Final.headers());
    }

    #[test]
    fn test_missing_student_column() {
        let mut table = Table::new(["Nombre", "Calificacion Final"]);
        let err = migrate(&mut table, GradebookSchema::Final).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }
}

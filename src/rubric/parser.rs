//! Parser for semicolon-delimited rubric tables.
//!
//! ```text
//! Enunciado;Dibuja DCL;Identifica Fuerzas;sobre;peso
//! Punto 1;si;no;5;2
//! Punto 2;SI;si;5;1
//! ```
//!
//! The first column is the item label, the last two are `sobre` and `peso`,
//! and every column in between is a candidate sub-item.

use crate::error::{GradingError, Result};
use crate::rubric::{DELIMITER, INCLUDED, REFERENCE_COLUMN, Rubric, RubricItem, WEIGHT_COLUMN};
use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const TABLE: &str = "rubric table";

/// Parses a rubric table from any reader.
///
/// # Errors
///
/// - [`GradingError::Parse`] if the table cannot be read as delimited text
/// - [`GradingError::MissingColumn`] if the trailing `sobre`/`peso` columns are absent
/// - [`GradingError::DuplicateColumn`] if a sub-item column appears twice
/// - [`GradingError::InvalidRubricNumber`] if `sobre` or `peso` is not a non-negative number
/// - any validation error from [`Rubric::new`]
pub fn parse_rubric<R: Read>(reader: R) -> Result<Rubric> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| GradingError::parse(TABLE, e))?
        .clone();
    let n = headers.len();

    // The label column must precede both trailing columns.
    for (offset, column) in [(2, REFERENCE_COLUMN), (1, WEIGHT_COLUMN)] {
        let present = n > offset && headers[n - offset].eq_ignore_ascii_case(column);
        if !present {
            return Err(GradingError::missing_column(TABLE, column));
        }
    }

    let sub_item_columns: Vec<&str> = headers.iter().skip(1).take(n - 3).collect();
    let mut seen = HashSet::new();
    if let Some(repeated) = sub_item_columns.iter().find(|c| !seen.insert(**c)) {
        return Err(GradingError::DuplicateColumn {
            table: TABLE.to_string(),
            column: repeated.to_string(),
        });
    }

    let mut items = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| GradingError::parse(TABLE, e))?;
        let row = index + 1;

        let sub_items = sub_item_columns
            .iter()
            .enumerate()
            .filter(|(col, _)| {
                record
                    .get(col + 1)
                    .is_some_and(|cell| cell.eq_ignore_ascii_case(INCLUDED))
            })
            .map(|(_, name)| name.to_string())
            .collect();

        let max_reference_score = parse_number(row, REFERENCE_COLUMN, &record[n - 2])?;
        let weight = parse_number(row, WEIGHT_COLUMN, &record[n - 1])?;

        items.push(RubricItem::new(
            &record[0],
            sub_items,
            max_reference_score,
            weight,
        ));
    }

    debug!(items = items.len(), "Parsed rubric table");
    Rubric::new(items)
}

pub fn parse_rubric_str(text: &str) -> Result<Rubric> {
    parse_rubric(text.as_bytes())
}

impl Rubric {
    /// Reads and parses a rubric table from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        parse_rubric(file)
    }
}

/// Parses a non-negative number, accepting `,` as the decimal separator.
fn parse_number(row: usize, column: &str, cell: &str) -> Result<f64> {
    let invalid = || GradingError::InvalidRubricNumber {
        row,
        column: column.to_string(),
        value: cell.to_string(),
    };

    let value: f64 = cell.trim().replace(',', ".").parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_marks_included_sub_items() {
        let text = "Enunciado;Dibuja DCL;Otro;sobre;peso\nPunto 1;si;no;5;2\n";
        let rubric = parse_rubric_str(text).unwrap();
        let item = &rubric.items()[0];
        assert_eq!(item.label, "Punto 1");
        assert_eq!(item.sub_items, vec!["Dibuja DCL"]);
        assert_eq!(item.max_reference_score, 5.0);
        assert_eq!(item.weight, 2.0);
    }

    #[test]
    fn test_inclusion_is_case_insensitive_and_blank_excludes() {
        let text = "Enunciado;A;B;C;sobre;peso\nP1; SI ;;x;5;1\n";
        let rubric = parse_rubric_str(text).unwrap();
        assert_eq!(rubric.items()[0].sub_items, vec!["A"]);
    }

    #[test]
    fn test_item_without_sub_items() {
        let text = "Enunciado;sobre;peso\nP1;5;1\n";
        let rubric = parse_rubric_str(text).unwrap();
        assert!(rubric.items()[0].sub_items.is_empty());
    }

    #[test]
    fn test_missing_weight_column_is_structural() {
        let text = "Enunciado;A;sobre\nP1;si;5\n";
        let err = parse_rubric_str(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(matches!(err, GradingError::MissingColumn { column, .. } if column == "sobre"));
    }

    #[test]
    fn test_missing_both_trailing_columns() {
        let err = parse_rubric_str("Enunciado;A\nP1;si\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_unparseable_weight_is_structural() {
        let text = "Enunciado;A;sobre;peso\nP1;si;5;mucho\n";
        let err = parse_rubric_str(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(matches!(
            err,
            GradingError::InvalidRubricNumber { row: 1, ref column, .. } if column == "peso"
        ));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let text = "Enunciado;A;sobre;peso\nP1;si;5;-1\n";
        assert!(matches!(
            parse_rubric_str(text),
            Err(GradingError::InvalidRubricNumber { .. })
        ));
    }

    #[test]
    fn test_repeated_sub_item_column_is_structural() {
        let text = "Enunciado;A;A;B;sobre;peso\nP1;si;si;si;5;1\n";
        let err = parse_rubric_str(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(matches!(err, GradingError::DuplicateColumn { column, .. } if column == "A"));
    }

    #[test]
    fn test_comma_decimal_weight() {
        let text = "Enunciado;A;sobre;peso\nP1;si;5;1,5\n";
        assert_eq!(parse_rubric_str(text).unwrap().items()[0].weight, 1.5);
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let text = "Enunciado;A;sobre;peso\nP1;si;5\n";
        let err = parse_rubric_str(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_header_only_table_is_empty_rubric() {
        let err = parse_rubric_str("Enunciado;A;sobre;peso\n").unwrap_err();
        assert!(matches!(err, GradingError::EmptyRubric));
    }
}

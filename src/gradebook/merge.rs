//! Consolidation of two gradebook files into one table keyed by student.

use crate::error::Result;
use crate::gradebook::schema::{CALCULATED_COLUMN, DATE_COLUMN, FINAL_COLUMN, STUDENT_COLUMN};
use crate::gradebook::table::Table;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// How two gradebooks are joined and how their columns are labelled.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Column both tables are joined on.
    pub key: String,
    /// Column removed from both tables before joining.
    pub drop_column: String,
    /// New name of the first table's grade column.
    pub first_label: String,
    /// New name of the second table's grade column.
    pub second_label: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            key: STUDENT_COLUMN.to_string(),
            drop_column: DATE_COLUMN.to_string(),
            first_label: "Nota Final".to_string(),
            second_label: "Nota Tarea 1".to_string(),
        }
    }
}

/// Full outer join of `first` and `second` on `options.key`.
///
/// Both tables are checked for the key column before anything else. Each
/// side's grade column (`Calificacion Final`, or `Calificacion Calculada`)
/// is renamed to its label, other non-key columns present on both sides get
/// a ` (<label>)` suffix. Rows come out ordered by key; a key repeated on a
/// side yields one output row per pairing. Cells with no counterpart stay
/// blank, and numeric cells use `,` as the decimal separator.
pub fn merge(first: &Table, second: &Table, options: &MergeOptions) -> Result<Table> {
    first.require_column(&options.key, "first gradebook")?;
    second.require_column(&options.key, "second gradebook")?;

    let mut first = prepare(first, options, &options.first_label);
    let mut second = prepare(second, options, &options.second_label);
    disambiguate(&mut first, &mut second, options);

    let first_key = first.require_column(&options.key, "first gradebook")?;
    let second_key = second.require_column(&options.key, "second gradebook")?;
    let first_values = value_columns(&first, first_key);
    let second_values = value_columns(&second, second_key);

    let mut headers = vec![options.key.clone()];
    headers.extend(first_values.iter().map(|&c| first.headers()[c].clone()));
    headers.extend(second_values.iter().map(|&c| second.headers()[c].clone()));
    let mut merged = Table::new(headers);

    let mut groups: BTreeMap<&str, (Vec<&Vec<String>>, Vec<&Vec<String>>)> = BTreeMap::new();
    for row in first.rows() {
        groups.entry(row[first_key].as_str()).or_default().0.push(row);
    }
    for row in second.rows() {
        groups.entry(row[second_key].as_str()).or_default().1.push(row);
    }

    for (key, (lefts, rights)) in &groups {
        let lefts: Vec<Option<&Vec<String>>> = sides(lefts);
        let rights: Vec<Option<&Vec<String>>> = sides(rights);

        for left in &lefts {
            for right in &rights {
                let mut record = vec![key.to_string()];
                record.extend(pick(*left, &first_values));
                record.extend(pick(*right, &second_values));
                merged.push_row(record);
            }
        }
    }

    info!(
        first = first.len(),
        second = second.len(),
        merged = merged.len(),
        "Gradebooks merged"
    );
    Ok(merged)
}

/// Reads two comma-delimited gradebooks, merges them and writes the result.
pub fn merge_files(
    first: impl AsRef<Path>,
    second: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &MergeOptions,
) -> Result<Table> {
    let first = Table::from_path(first, b',', "first gradebook")?;
    let second = Table::from_path(second, b',', "second gradebook")?;
    let merged = merge(&first, &second, options)?;
    merged.write_path(output, b',')?;
    Ok(merged)
}

/// Renders `cell` with a `,` decimal separator when it is a number.
pub fn decimal_comma(cell: &str) -> String {
    let trimmed = cell.trim();
    if !trimmed.is_empty() && trimmed.parse::<f64>().is_ok() {
        trimmed.replace('.', ",")
    } else {
        cell.to_string()
    }
}

fn prepare(table: &Table, options: &MergeOptions, label: &str) -> Table {
    let mut table = table.clone();
    table.drop_column(&options.drop_column);
    if !table.rename_column(FINAL_COLUMN, label) {
        table.rename_column(CALCULATED_COLUMN, label);
    }
    table
}

fn disambiguate(first: &mut Table, second: &mut Table, options: &MergeOptions) {
    let shared: Vec<String> = first
        .headers()
        .iter()
        .filter(|h| **h != options.key && second.column(h).is_some())
        .cloned()
        .collect();

    for name in shared {
        first.rename_column(&name, &format!("{name} ({})", options.first_label));
        second.rename_column(&name, &format!("{name} ({})", options.second_label));
    }
}

fn value_columns(table: &Table, key: usize) -> Vec<usize> {
    (0..table.headers().len()).filter(|&c| c != key).collect()
}

/// A side without rows still contributes one blank row to the join.
fn sides<'a>(rows: &[&'a Vec<String>]) -> Vec<Option<&'a Vec<String>>> {
    if rows.is_empty() {
        vec![None]
    } else {
        rows.iter().map(|r| Some(*r)).collect()
    }
}

fn pick(row: Option<&Vec<String>>, columns: &[usize]) -> Vec<String> {
    columns
        .iter()
        .map(|&c| {
            row.and_then(|r| r.get(c))
                .map(|cell| decimal_comma(cell))
                .unwrap_or_default()
        })
        .collect()
}

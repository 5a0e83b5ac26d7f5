//! Rubric model: the weighted items a submission is graded against.
//!
//! A [`Rubric`] is either assembled with a [`RubricBuilder`] or parsed from
//! a semicolon-delimited rubric table with [`parse_rubric`]. Both paths end in
//! the same validated structure, and [`Rubric::to_delimited`] writes the
//! table format back out.

pub mod builder;
pub mod parser;
pub mod types;

pub use builder::RubricBuilder;
pub use parser::{parse_rubric, parse_rubric_str};
pub use types::{Rubric, RubricItem};

/// Header of the first column in exported rubric tables.
pub const LABEL_COLUMN: &str = "Enunciado";
/// Informational maximum score column.
pub const REFERENCE_COLUMN: &str = "sobre";
/// Weight column.
pub const WEIGHT_COLUMN: &str = "peso";
/// Cell value that marks a sub-item as part of an item (case-insensitive).
pub const INCLUDED: &str = "si";
/// Cell value written for excluded sub-items.
pub const EXCLUDED: &str = "no";
/// Field delimiter of rubric tables.
pub const DELIMITER: u8 = b';';

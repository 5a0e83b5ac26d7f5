//! Course roster loading.
//!
//! Rosters are exported by the registrar as comma-delimited files, often in a
//! legacy single-byte Western encoding rather than UTF-8.

use crate::error::{GradingError, Result};
use crate::gradebook::Table;
use std::path::Path;
use tracing::debug;

/// Column that holds each student's full name.
pub const NAME_COLUMN: &str = "NOMBRE COMPLETO";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    /// Parses a roster from raw bytes.
    ///
    /// UTF-8 is tried first (a leading byte-order mark is ignored); anything
    /// else is read as Latin-1.
    ///
    /// # Errors
    ///
    /// - [`GradingError::Parse`] if the table is malformed
    /// - [`GradingError::MissingColumn`] if there is no `NOMBRE COMPLETO` column
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = decode(bytes);
        let table = Table::from_reader(text.as_bytes(), b',', "roster")?;
        let col = table.require_column(NAME_COLUMN, "roster")?;

        let names: Vec<String> = table
            .rows()
            .iter()
            .filter_map(|row| row.get(col))
            .filter(|name| !name.is_empty())
            .cloned()
            .collect();

        debug!(students = names.len(), "Roster loaded");
        Ok(Self { names })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Returns the roster entry for `name`.
    pub fn find(&self, name: &str) -> Result<&str> {
        self.names
            .iter()
            .find(|n| *n == name)
            .map(String::as_str)
            .ok_or_else(|| GradingError::Validation(format!("'{name}' is not on the roster")))
    }
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        // Latin-1 maps every byte to the code point of the same value.
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

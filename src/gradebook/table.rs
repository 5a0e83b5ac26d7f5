//! In-memory delimited table with named columns.

use crate::error::{GradingError, Result};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// A header row plus string cells. Every row has one cell per header; an
/// empty string is a blank cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Reads a table whose first record is the header row. `name` is used in
    /// error messages.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8, name: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| GradingError::parse(name, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| GradingError::parse(name, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn from_path(path: impl AsRef<Path>, delimiter: u8, name: &str) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, delimiter, name)
    }

    pub fn write_to<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        wtr.write_record(&self.headers)
            .map_err(|e| GradingError::parse("table output", e))?;
        for row in &self.rows {
            wtr.write_record(row)
                .map_err(|e| GradingError::parse("table output", e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Replaces the file at `path` with this table.
    ///
    /// The table goes to a sibling `<name>.tmp` file that is then renamed
    /// over `path`, so a failed write leaves the previous contents intact.
    pub fn write_path(&self, path: impl AsRef<Path>, delimiter: u8) -> Result<()> {
        let path = path.as_ref();
        let mut tmp_name = path.file_name().map(OsString::from).unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);

        let written = self
            .write_file(&tmp, delimiter)
            .and_then(|()| fs::rename(&tmp, path).map_err(GradingError::from));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }

    fn write_file(&self, path: &Path, delimiter: u8) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, delimiter)?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_delimited(&self, delimiter: u8) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf, delimiter)?;
        String::from_utf8(buf)
            .map_err(|e| GradingError::Validation(format!("table is not UTF-8: {e}")))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`Table::column`] but reports a structural error for `table`.
    pub fn require_column(&self, name: &str, table: &str) -> Result<usize> {
        self.column(name)
            .ok_or_else(|| GradingError::missing_column(table, name))
    }

    /// Cell of `row` under column `name`, if both exist.
    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.column(name)?;
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column(from) {
            Some(col) => {
                self.headers[col] = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(col) = self.column(name) else {
            return false;
        };
        self.headers.remove(col);
        for row in &mut self.rows {
            if col < row.len() {
                row.remove(col);
            }
        }
        true
    }

    /// Inserts a blank column at `index`.
    pub fn insert_column(&mut self, index: usize, name: &str) {
        let index = index.min(self.headers.len());
        self.headers.insert(index, name.to_string());
        for row in &mut self.rows {
            row.insert(index.min(row.len()), String::new());
        }
    }

    /// Appends a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_reader(
            "Estudiante,Calificacion Final,Fecha\nAna,4.50,2024-05-01\nBeto,3.20,2024-05-02\n"
                .as_bytes(),
            b',',
            "gradebook",
        )
        .unwrap()
    }

    #[test]
    fn test_read_headers_and_rows() {
        let table = sample();
        assert_eq!(table.headers(), ["Estudiante", "Calificacion Final", "Fecha"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "Calificacion Final"), Some("3.20"));
    }

    #[test]
    fn test_headers_are_trimmed() {
        let table =
            Table::from_reader("Estudiante, Calificacion Final, Fecha\n".as_bytes(), b',', "t")
                .unwrap();
        assert_eq!(table.column("Calificacion Final"), Some(1));
        assert!(table.is_empty());
    }

    #[test]
    fn test_drop_and_rename() {
        let mut table = sample();
        assert!(table.drop_column("Fecha"));
        assert!(!table.drop_column("Fecha"));
        assert!(table.rename_column("Calificacion Final", "Nota Final"));
        assert_eq!(table.headers(), ["Estudiante", "Nota Final"]);
        assert_eq!(table.rows()[0], vec!["Ana", "4.50"]);
    }

    #[test]
    fn test_insert_column_blank() {
        let mut table = sample();
        table.insert_column(2, "Extra");
        assert_eq!(table.cell(0, "Extra"), Some(""));
        assert_eq!(table.cell(0, "Fecha"), Some("2024-05-01"));
    }

    #[test]
    fn test_require_column_is_structural() {
        let err = sample().require_column("NOMBRE", "gradebook").unwrap_err();
        assert!(matches!(err, GradingError::MissingColumn { .. }));
    }

    #[test]
    fn test_write_round_trip() {
        let table = sample();
        let text = table.to_delimited(b',').unwrap();
        let again = Table::from_reader(text.as_bytes(), b',', "t").unwrap();
        assert_eq!(table, again);
    }

    #[test]
    fn test_write_path_replaces_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.csv");
        fs::write(&path, "old\n").unwrap();

        sample().write_path(&path, b',').unwrap();

        assert_eq!(Table::from_path(&path, b',', "t").unwrap(), sample());
        assert!(!dir.path().join("g.csv.tmp").exists());
    }

    #[test]
    fn test_failed_write_path_keeps_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("g.csv");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        assert!(sample().write_path(&target, b',').is_err());

        assert!(target.join("keep").exists());
        assert!(!dir.path().join("g.csv.tmp").exists());
    }

    #[test]
    fn test_push_row_pads() {
        let mut table = Table::new(["a", "b", "c"]);
        table.push_row(vec!["1".into()]);
        assert_eq!(table.rows()[0], vec!["1", "", ""]);
    }
}

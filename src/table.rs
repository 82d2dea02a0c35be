//! In-memory CSV table for survey response data.
//!
//! The whole input file is loaded up front, mutated only by appending
//! columns, and written back out in one pass. Cells are kept as strings;
//! score columns are formatted at merge time.

use std::io::Read;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur while loading, mutating, or writing a table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Column already exists: {0}")]
    DuplicateColumn(String),

    #[error("Column {name} has {got} values for {expected} rows")]
    LengthMismatch {
        name: String,
        got: usize,
        expected: usize,
    },

    #[error("Row {0} is out of bounds")]
    RowOutOfBounds(usize),
}

/// A rectangular table of string cells with named columns.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Load a table from a CSV file.
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a table from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Number of rows (participants).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Position of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value at a row and named column.
    pub fn value(&self, row: usize, column: &str) -> Result<&str, TableError> {
        let col = self
            .column_index(column)
            .ok_or_else(|| TableError::MissingColumn(column.to_string()))?;
        let cells = self
            .rows
            .get(row)
            .ok_or(TableError::RowOutOfBounds(row))?;
        // Short records leave trailing cells implicitly empty.
        Ok(cells.get(col).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Append a new column with one value per existing row.
    ///
    /// Existing cells are never touched; a duplicate name or a length
    /// mismatch is an error.
    pub fn push_column(&mut self, name: &str, values: Vec<String>) -> Result<(), TableError> {
        if self.column_index(name).is_some() {
            return Err(TableError::DuplicateColumn(name.to_string()));
        }
        if values.len() != self.rows.len() {
            return Err(TableError::LengthMismatch {
                name: name.to_string(),
                got: values.len(),
                expected: self.rows.len(),
            });
        }

        self.headers.push(name.to_string());
        for (cells, value) in self.rows.iter_mut().zip(values) {
            // Pad short records so every row reaches the new column.
            cells.resize(self.headers.len() - 1, String::new());
            cells.push(value);
        }
        Ok(())
    }

    /// Write the table to a CSV file with a leading unnamed row-index
    /// column (0..P-1), matching the layout downstream analysis expects.
    pub fn write_with_index(&self, path: &Path) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut header_record = Vec::with_capacity(self.headers.len() + 1);
        header_record.push(String::new());
        header_record.extend(self.headers.iter().cloned());
        writer.write_record(&header_record)?;

        for (idx, cells) in self.rows.iter().enumerate() {
            let mut record = Vec::with_capacity(self.headers.len() + 1);
            record.push(idx.to_string());
            record.extend(cells.iter().cloned());
            // Short records are padded to full width on the way out.
            while record.len() < self.headers.len() + 1 {
                record.push(String::new());
            }
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory tree record table.
//!
//! Loads a census CSV export into a column-oriented [`TreeTable`]. Cells are
//! trimmed and null markers are normalized at load time; typed coercion
//! (numbers, dates) happens once afterwards via [`TreeTable::coerce_numeric`]
//! and [`TreeTable::coerce_dates`].

pub mod coercion;
pub mod column;

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

pub use column::Column;

use crate::coercion::normalize_cell;

/// Errors that can occur while loading or modifying a table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// I/O error (file open/read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file has no header row.
    #[error("CSV file contains no header row")]
    MissingHeader,

    /// A column's length does not match the table's row count.
    #[error("Column '{column}' has {actual} cells, expected {expected}")]
    LengthMismatch {
        /// Column name.
        column: String,
        /// Row count of the table.
        expected: usize,
        /// Cells in the offending column.
        actual: usize,
    },
}

/// Options controlling how a CSV export is read.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter byte (defaults to `,`).
    pub delimiter: u8,
    /// When set, only these columns are kept; everything else is dropped
    /// while reading.
    pub keep_columns: Option<Vec<String>>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            keep_columns: None,
        }
    }
}

impl LoadOptions {
    /// Sets the field delimiter (e.g. `b';'` for spreadsheet exports).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Restricts the loaded columns to `columns`.
    #[must_use]
    pub fn with_columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.keep_columns = Some(columns.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }
}

/// A column-oriented table of tree records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeTable {
    names: Vec<String>,
    columns: Vec<Column>,
    rows: usize,
}

impl TreeTable {
    /// Creates an empty table with no columns and no rows.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// Builds a table from named columns.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::LengthMismatch`] if the columns differ in length.
    pub fn from_columns(
        columns: impl IntoIterator<Item = (String, Column)>,
    ) -> Result<Self, TableError> {
        let mut table = Self::new();
        for (i, (name, column)) in columns.into_iter().enumerate() {
            if i == 0 {
                table.rows = column.len();
            }
            table.insert_column(name, column)?;
        }
        Ok(table)
    }

    /// Loads a CSV file from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the file cannot be opened or parsed.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self, TableError> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file, options)?;
        log::info!(
            "Loaded {} rows x {} columns from {}",
            table.len(),
            table.names.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parses CSV data from any reader.
    ///
    /// Header names are trimmed (and stripped of a UTF-8 byte-order mark);
    /// rows shorter than the header are padded with missing cells. When a
    /// header name repeats, the first column with that name is kept.
    ///
    /// The row count is the number of data records, even when no column
    /// survives the `keep_columns` filter.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the data is not valid CSV or has no header.
    pub fn from_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
            .collect();

        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(TableError::MissingHeader);
        }

        // (header position, column name)
        let mut selected: Vec<(usize, String)> = Vec::new();
        for (i, name) in headers.iter().enumerate() {
            let wanted = options
                .keep_columns
                .as_ref()
                .is_none_or(|keep| keep.iter().any(|k| k == name));
            if !wanted {
                continue;
            }
            if selected.iter().any(|(_, seen)| seen == name) {
                log::warn!("Duplicate column '{name}' at position {i}; keeping the first one");
                continue;
            }
            selected.push((i, name.clone()));
        }

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); selected.len()];
        let mut rows = 0;

        for result in reader.records() {
            let record = result?;
            rows += 1;
            for (out, (pos, _)) in selected.iter().enumerate() {
                cells[out].push(record.get(*pos).and_then(normalize_cell));
            }
        }

        let dropped = headers.len() - selected.len();
        if dropped > 0 {
            log::debug!("Dropped {dropped} non-essential columns while loading");
        }

        let mut table = Self {
            rows,
            ..Self::new()
        };
        for ((_, name), values) in selected.into_iter().zip(cells) {
            table.insert_column(name, Column::Text(values))?;
        }
        Ok(table)
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in load order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// The set of column names, for alias resolution.
    #[must_use]
    pub fn column_set(&self) -> BTreeSet<&str> {
        self.column_names().collect()
    }

    /// Returns the column named `name`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Inserts or replaces a column.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::LengthMismatch`] if the column length differs
    /// from the table's row count.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<(), TableError> {
        let name = name.into();
        if column.len() != self.rows {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.rows,
                actual: column.len(),
            });
        }

        if let Some(i) = self.names.iter().position(|n| *n == name) {
            self.columns[i] = column;
        } else {
            self.names.push(name);
            self.columns.push(column);
        }
        Ok(())
    }

    /// Converts column `name` to numbers in place. Returns `false` if the
    /// column does not exist.
    pub fn coerce_numeric(&mut self, name: &str) -> bool {
        self.map_column(name, Column::into_numbers)
    }

    /// Converts column `name` to day-first dates in place. Returns `false`
    /// if the column does not exist.
    pub fn coerce_dates(&mut self, name: &str) -> bool {
        self.map_column(name, Column::into_dates)
    }

    fn map_column(&mut self, name: &str, f: impl FnOnce(Column) -> Column) -> bool {
        let Some(i) = self.names.iter().position(|n| n == name) else {
            return false;
        };
        let column = std::mem::replace(&mut self.columns[i], Column::Text(Vec::new()));
        self.columns[i] = f(column);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}x,y,nome_popular,altura,observacao\n\
        290000,9108000,Ipê-roxo,\"12,5\",ok\n\
        290100,9108100, ,nan,\n\
        290200,9108200,Oiti,7\n";

    #[test]
    fn loads_and_normalizes_cells() {
        let table = TreeTable::from_reader(SAMPLE.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["x", "y", "nome_popular", "altura", "observacao"]
        );
        let species = table.column("nome_popular").unwrap();
        assert_eq!(species.text(0), Some("Ipê-roxo".to_string()));
        assert_eq!(species.text(1), None);
        let height = table.column("altura").unwrap();
        assert_eq!(height.number(0), Some(12.5));
        assert_eq!(height.number(1), None);
    }

    #[test]
    fn pads_short_rows_with_missing_cells() {
        let table = TreeTable::from_reader(SAMPLE.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(table.column("observacao").unwrap().text(2), None);
    }

    #[test]
    fn keeps_only_requested_columns() {
        let options = LoadOptions::default().with_columns(&["x", "y", "altura"]);
        let table = TreeTable::from_reader(SAMPLE.as_bytes(), &options).unwrap();
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["x", "y", "altura"]
        );
        assert!(table.column("observacao").is_none());
    }

    #[test]
    fn reads_semicolon_delimited_exports() {
        let data = "rpa;altura\n1;3,2\n2;4\n";
        let options = LoadOptions::default().with_delimiter(b';');
        let table = TreeTable::from_reader(data.as_bytes(), &options).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("altura").unwrap().number(0), Some(3.2));
    }

    #[test]
    fn header_only_file_is_empty() {
        let table =
            TreeTable::from_reader("x,y\n".as_bytes(), &LoadOptions::default()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_set().len(), 2);
    }

    #[test]
    fn row_count_survives_unknown_columns() {
        let options = LoadOptions::default().with_columns(&["nome_popular", "altura"]);
        let table = TreeTable::from_reader("foo,bar\n1,2\n3,4\n5,6\n".as_bytes(), &options)
            .unwrap();
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
        assert_eq!(table.column_names().count(), 0);
    }

    #[test]
    fn duplicate_headers_keep_first_column() {
        let data = "altura,nome_popular,altura\n3,Oiti,99\n4,Ipê,98\n";
        let table = TreeTable::from_reader(data.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["altura", "nome_popular"]
        );
        let height = table.column("altura").unwrap();
        assert_eq!(height.number(0), Some(3.0));
        assert_eq!(height.number(1), Some(4.0));
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = TreeTable::from_reader("".as_bytes(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, TableError::MissingHeader));
    }

    #[test]
    fn rejects_columns_of_wrong_length() {
        let mut table = TreeTable::from_columns(vec![(
            "a".to_string(),
            Column::Number(vec![Some(1.0), Some(2.0)]),
        )])
        .unwrap();
        let err = table
            .insert_column("b", Column::Number(vec![Some(1.0)]))
            .unwrap_err();
        assert!(matches!(
            err,
            TableError::LengthMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn coerces_columns_in_place() {
        let mut table = TreeTable::from_reader(SAMPLE.as_bytes(), &LoadOptions::default()).unwrap();
        assert!(table.coerce_numeric("altura"));
        assert_eq!(
            table.column("altura"),
            Some(&Column::Number(vec![Some(12.5), None, Some(7.0)]))
        );
        assert!(!table.coerce_dates("data_plantio"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = TreeTable::load(
            Path::new("/nonexistent/censo.csv"),
            &LoadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Io(_)));
    }
}

//! Core table types for representing imported stat tables

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A parsed table from a single CSV extract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Destination table name (file stem of the source)
    pub name: String,
    /// Column definitions
    pub columns: Vec<Column>,
    /// Row data
    pub rows: Vec<Row>,
    /// Source file path
    pub source_path: PathBuf,
}

impl Table {
    /// Create a new empty table
    pub fn new(name: impl Into<String>, source_path: PathBuf) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            source_path,
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// A column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name (e.g., "Name" or "Team_Name")
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of data; `None` is an absent value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Option<String>>,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self { cells }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }

    /// True when no cell holds a value
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// Rows read back from the store, with the stored column order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableData {
    /// Table name in the store
    pub table: String,
    /// Column names in schema order
    pub columns: Vec<String>,
    /// Returned rows, in storage order
    pub rows: Vec<Row>,
    /// Number of rows the table holds, regardless of limits or filters
    pub total_rows: usize,
}

impl TableData {
    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of a named column in the given row
    pub fn value<'a>(&self, row: &'a Row, column: &str) -> Option<&'a str> {
        self.column_index(column).and_then(|i| row.get(i))
    }

    /// Rows as ordered `(column, value)` pairs
    pub fn records(&self) -> impl Iterator<Item = Vec<(&str, Option<&str>)>> + '_ {
        self.rows.iter().map(move |row| {
            self.columns
                .iter()
                .enumerate()
                .map(|(i, col)| (col.as_str(), row.get(i)))
                .collect()
        })
    }

    /// Number of returned rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows were returned
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read a numeric measure out of a text cell.
///
/// Accepts thousands separators and a bare leading dot (".327").
pub fn parse_measure(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TableData {
        TableData {
            table: "batting_1927".to_string(),
            columns: vec!["Statistic".into(), "Name".into(), "#".into()],
            rows: vec![Row::new(vec![
                Some("Home Runs".into()),
                Some("Babe Ruth".into()),
                None,
            ])],
            total_rows: 1,
        }
    }

    #[test]
    fn test_parse_measure() {
        assert_eq!(parse_measure("60"), Some(60.0));
        assert_eq!(parse_measure(" .356 "), Some(0.356));
        assert_eq!(parse_measure("1,234"), Some(1234.0));
        assert_eq!(parse_measure("-2.5"), Some(-2.5));
    }

    #[test]
    fn test_parse_measure_rejects_text() {
        assert_eq!(parse_measure(""), None);
        assert_eq!(parse_measure("N/A"), None);
        assert_eq!(parse_measure("inf"), None);
    }

    #[test]
    fn test_table_data_lookup_by_column() {
        let data = sample();
        let row = &data.rows[0];
        assert_eq!(data.column_index("#"), Some(2));
        assert_eq!(data.value(row, "Name"), Some("Babe Ruth"));
        assert_eq!(data.value(row, "#"), None);
        assert_eq!(data.value(row, "Team"), None);
    }

    #[test]
    fn test_records_keep_column_order() {
        let data = sample();
        let records: Vec<_> = data.records().collect();
        assert_eq!(
            records[0],
            vec![
                ("Statistic", Some("Home Runs")),
                ("Name", Some("Babe Ruth")),
                ("#", None)
            ]
        );
    }

    #[test]
    fn test_row_is_blank() {
        assert!(Row::new(vec![None, None]).is_blank());
        assert!(!Row::new(vec![None, Some("x".into())]).is_blank());
    }
}

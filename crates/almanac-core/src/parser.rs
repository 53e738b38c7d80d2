//! CSV parser for raw stat extracts
//!
//! Extracts carry a fixed number of noise rows before the real header row.
//! The parser only discards those and squares the records up against the
//! header; value and name cleanup happens in [`crate::clean`].

use crate::error::{Error, Result};
use crate::table::{Column, Row, Table};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Parse a CSV file into a Table named after the file stem
pub fn parse_csv<P: AsRef<Path>>(path: P, skip_rows: usize) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let name = table_name_for(path).ok_or_else(|| Error::CsvParse {
        path: path.to_path_buf(),
        message: "file name is not valid UTF-8".to_string(),
    })?;

    read_table(BufReader::new(file), name, path.to_path_buf(), skip_rows)
}

/// Parse CSV from a string (useful for testing)
pub fn parse_csv_str(content: &str, source_name: &str, skip_rows: usize) -> Result<Table> {
    let path = PathBuf::from(source_name);
    let name = table_name_for(&path).unwrap_or_else(|| source_name.to_string());
    read_table(content.as_bytes(), name, path, skip_rows)
}

/// Destination table name: the file's base name without extension
pub fn table_name_for(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

fn read_table<R: Read>(reader: R, name: String, path: PathBuf, skip_rows: usize) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // Allow varying number of fields
        .from_reader(reader);

    let mut records = csv_reader.records();

    for _ in 0..skip_rows {
        match records.next() {
            Some(result) => {
                result.map_err(|e| Error::Csv {
                    path: path.clone(),
                    source: e,
                })?;
            }
            None => break,
        }
    }

    let headers = match records.next() {
        Some(result) => result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?,
        None => {
            return Err(Error::CsvParse {
                path,
                message: "no header row".to_string(),
            })
        }
    };

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.to_string(), i))
        .collect();

    if columns.is_empty() {
        return Err(Error::CsvParse {
            path,
            message: "no columns found in CSV".to_string(),
        });
    }

    let mut rows = Vec::new();
    for (row_idx, result) in records.enumerate() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;

        let mut cells: Vec<Option<String>> =
            record.iter().map(|field| Some(field.to_string())).collect();

        // Pad with absent cells if row is shorter than header
        if cells.len() < columns.len() {
            cells.resize(columns.len(), None);
        }

        if cells.len() > columns.len() {
            warn!(
                "row {} in {} has more cells than columns, truncating",
                row_idx + 1,
                path.display()
            );
            cells.truncate(columns.len());
        }

        rows.push(Row::new(cells));
    }

    Ok(Table {
        name,
        columns,
        rows,
        source_path: path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOISE: &str = "2014 American League,,\nBatting Statistics,,\n";

    #[test]
    fn test_skips_noise_rows_before_header() {
        let csv = format!("{NOISE}Statistic,Name,#\nHome Runs,Nelson Cruz,40\n");
        let table = parse_csv_str(&csv, "batting_2014.csv", 2).unwrap();

        assert_eq!(table.name, "batting_2014");
        assert_eq!(table.column_names(), vec!["Statistic", "Name", "#"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get(1), Some("Nelson Cruz"));
    }

    #[test]
    fn test_zero_skip_uses_first_row_as_header() {
        let table = parse_csv_str("Name,Value\nfoo,100\n", "notes.csv", 0).unwrap();
        assert_eq!(table.column_names(), vec!["Name", "Value"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_pads_short_rows() {
        let csv = format!("{NOISE}Statistic,Name,#\nHome Runs,Nelson Cruz\n");
        let table = parse_csv_str(&csv, "batting_2014.csv", 2).unwrap();

        assert_eq!(table.rows[0].cells.len(), 3);
        assert_eq!(table.rows[0].cells[2], None);
    }

    #[test]
    fn test_truncates_long_rows() {
        let csv = format!("{NOISE}Statistic,Name\nHome Runs,Nelson Cruz,40,extra\n");
        let table = parse_csv_str(&csv, "batting_2014.csv", 2).unwrap();

        assert_eq!(table.rows[0].cells.len(), 2);
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let err = parse_csv_str(NOISE, "batting_2014.csv", 2).unwrap_err();
        assert!(err.to_string().contains("no header row"));
    }

    #[test]
    fn test_keeps_raw_values_for_cleaning() {
        let csv = format!("{NOISE}Statistic,Name,#\n Hits ,,200\n");
        let table = parse_csv_str(&csv, "batting_2014.csv", 2).unwrap();

        assert_eq!(table.rows[0].cells[0].as_deref(), Some(" Hits "));
        assert_eq!(table.rows[0].cells[1].as_deref(), Some(""));
    }

    #[test]
    fn test_parse_csv_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pitching_2003.csv");
        std::fs::write(&path, format!("{NOISE}Statistic,Name,#\nWins,Roy Halladay,22\n")).unwrap();

        let table = parse_csv(&path, 2).unwrap();
        assert_eq!(table.name, "pitching_2003");
        assert_eq!(table.source_path, path);
    }

    #[test]
    fn test_parse_csv_missing_file() {
        let err = parse_csv("does/not/exist.csv", 2).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}

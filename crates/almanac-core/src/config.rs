//! Configuration for the store, importer and query engine
//!
//! The store path is the only deployment setting; the import and query
//! sections hold tunables whose defaults match the extracts' layout.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the SQLite store
pub const DEFAULT_STORE_PATH: &str = "database/mlb_stats.db";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub import: ImportOptions,
    pub query: QueryOptions,
}

impl Config {
    /// Load configuration from JSON; missing fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no operation can work with
    pub fn validate(&self) -> Result<()> {
        if self.store.path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("store.path is empty".to_string()));
        }
        if self.query.row_limit == 0 {
            return Err(Error::InvalidConfig("query.row_limit must be at least 1".to_string()));
        }
        if self.query.first_year > self.query.last_year {
            return Err(Error::InvalidConfig(format!(
                "query.first_year {} is after query.last_year {}",
                self.query.first_year, self.query.last_year
            )));
        }
        let columns = [
            ("import.label_column", &self.import.label_column),
            ("query.player_column", &self.query.player_column),
            ("query.measure_column", &self.query.measure_column),
            ("query.statistic_column", &self.query.statistic_column),
        ];
        for (key, value) in columns {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{key} is empty")));
            }
        }
        Ok(())
    }
}

/// Where the store lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_PATH)
    }
}

/// Importer tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Noise rows before the header row
    pub skip_rows: usize,
    /// Column whose repeated header text marks an embedded header row
    pub label_column: String,
    /// Append-only log of failed files
    pub error_log: PathBuf,
    /// Extension of source files
    pub extension: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_rows: 2,
            label_column: "Statistic".to_string(),
            error_log: PathBuf::from("import_errors.log"),
            extension: "csv".to_string(),
        }
    }
}

/// Query engine tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Maximum rows returned by a point lookup
    pub row_limit: usize,
    pub player_column: String,
    pub measure_column: String,
    pub statistic_column: String,
    /// Category prefixes searched for player names
    pub search_prefixes: Vec<String>,
    /// Inclusive year range walked by trend aggregation
    pub first_year: u16,
    pub last_year: u16,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            row_limit: 10,
            player_column: "Name".to_string(),
            measure_column: "#".to_string(),
            statistic_column: "Statistic".to_string(),
            search_prefixes: vec!["batting".to_string(), "pitching".to_string()],
            first_year: 2002,
            last_year: 2025,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.path, PathBuf::from(DEFAULT_STORE_PATH));
        assert_eq!(config.import.skip_rows, 2);
        assert_eq!(config.query.row_limit, 10);
        assert_eq!(config.query.search_prefixes, vec!["batting", "pitching"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("almanac.json");
        fs::write(&path, r#"{"store": {"path": "stats.db"}, "query": {"row_limit": 25}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.store.path, PathBuf::from("stats.db"));
        assert_eq!(config.query.row_limit, 25);
        assert_eq!(config.query.player_column, "Name");
        assert_eq!(config.import.label_column, "Statistic");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.query.row_limit = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.query.first_year = 2030;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.query.player_column = " ".to_string();
        assert!(config.validate().is_err());
    }
}

//! almanac-core: Core library for importing and querying yearly baseball stat tables
//!
//! This library provides functionality to:
//! - Scan a directory for raw CSV extracts
//! - Clean each extract into a rectangular table and store it in SQLite
//! - Summarize stored tables by category and year
//! - Look up, search and trend player statistics across tables

pub mod catalog;
pub mod clean;
pub mod config;
pub mod errlog;
pub mod error;
pub mod importer;
pub mod naming;
pub mod parser;
pub mod query;
pub mod scanner;
pub mod store;
pub mod table;

pub use catalog::{Catalog, CatalogSummary, CategorySummary, TableInfo};
pub use clean::{clean_table, CleanStats};
pub use config::{Config, ImportOptions, QueryOptions, StoreConfig};
pub use errlog::ErrorLog;
pub use error::{Error, Result};
pub use importer::{FileOutcome, ImportReport, ImportStatus, Importer};
pub use naming::{table_name, Category, TableName};
pub use parser::{parse_csv, parse_csv_str};
pub use query::{
    Lookup, QueryEngine, SearchOutcome, TableMatches, Trend, TrendOutcome, TrendPoint, TrendSeries,
};
pub use scanner::scan_sources;
pub use store::Store;
pub use table::{parse_measure, Column, Row, Table, TableData};

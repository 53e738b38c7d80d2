//! Import raw CSV extracts into the store
//!
//! Each file is handled on its own: a file that fails to parse or store is
//! written to the error log and the run moves on. Only an unreachable store
//! stops the run.

use crate::clean::{clean_table, CleanStats};
use crate::config::ImportOptions;
use crate::errlog::ErrorLog;
use crate::error::Result;
use crate::parser::{parse_csv, table_name_for};
use crate::scanner::scan_sources;
use crate::store::Store;
use crate::table::Table;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// What happened to one source file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportStatus {
    /// Stored, replacing any previous table of the same name
    Imported {
        rows: usize,
        columns: usize,
        dropped: CleanStats,
    },
    /// Nothing left after cleaning; not stored
    Empty,
    /// Parsing or storing failed; recorded in the error log
    Failed { message: String },
}

/// Outcome for one source file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// Source file name
    pub file: String,
    /// Destination table name
    pub table: String,
    #[serde(flatten)]
    pub status: ImportStatus,
}

/// Summary of an import run
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub source: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<FileOutcome>,
}

impl ImportReport {
    /// Files stored
    pub fn imported(&self) -> usize {
        self.count(|s| matches!(s, ImportStatus::Imported { .. }))
    }

    /// Files skipped because they cleaned to zero rows
    pub fn empty(&self) -> usize {
        self.count(|s| matches!(s, ImportStatus::Empty))
    }

    /// Files that failed
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ImportStatus::Failed { .. }))
    }

    /// Rows stored across all files
    pub fn total_rows(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                ImportStatus::Imported { rows, .. } => rows,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&ImportStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Reads extracts from disk, cleans them and writes them to the store
#[derive(Debug, Clone)]
pub struct Importer {
    store: Store,
    options: ImportOptions,
    error_log: ErrorLog,
}

impl Importer {
    pub fn new(store: Store, options: ImportOptions) -> Self {
        let error_log = ErrorLog::new(options.error_log.clone());
        Self {
            store,
            options,
            error_log,
        }
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    /// Import every source file in `dir`, in file name order
    pub fn import_dir<P: AsRef<Path>>(&self, dir: P) -> Result<ImportReport> {
        let dir = dir.as_ref();
        let started_at = Utc::now();
        let files = scan_sources(dir, &self.options.extension)?;
        info!("found {} source files in {}", files.len(), dir.display());

        let mut outcomes = Vec::with_capacity(files.len());
        for path in &files {
            outcomes.push(self.import_file(path)?);
        }

        Ok(ImportReport {
            source: dir.to_path_buf(),
            started_at,
            finished_at: Utc::now(),
            outcomes,
        })
    }

    /// Import a single file.
    ///
    /// Returns `Err` only when the store cannot be reached; every other
    /// failure becomes [`ImportStatus::Failed`].
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<FileOutcome> {
        let path = path.as_ref();
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let table = table_name_for(path).unwrap_or_else(|| file.clone());

        let status = match self.load(path) {
            Ok((cleaned, dropped)) if cleaned.rows.is_empty() => {
                warn!(
                    "{} produced no rows after cleaning ({} blank, {} header rows dropped), skipped",
                    file, dropped.blank_rows, dropped.header_rows
                );
                ImportStatus::Empty
            }
            Ok((cleaned, dropped)) => match self.store.replace_table(&cleaned) {
                Ok(rows) => {
                    info!("imported {} rows from {} into '{}'", rows, file, cleaned.name);
                    ImportStatus::Imported {
                        rows,
                        columns: cleaned.column_count(),
                        dropped,
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => self.record_failure(&file, &e.to_string()),
            },
            Err(e) => self.record_failure(&file, &e.to_string()),
        };

        Ok(FileOutcome { file, table, status })
    }

    fn load(&self, path: &Path) -> Result<(Table, CleanStats)> {
        let mut table = parse_csv(path, self.options.skip_rows)?;
        let dropped = clean_table(&mut table, &self.options.label_column);
        Ok((table, dropped))
    }

    fn record_failure(&self, file: &str, message: &str) -> ImportStatus {
        error!("failed to import {}: {}", file, message);
        if let Err(e) = self.error_log.append(file, message) {
            warn!(
                "could not write to error log {}: {}",
                self.error_log.path().display(),
                e
            );
        }
        ImportStatus::Failed {
            message: message.to_string(),
        }
    }
}

//! SQLite-backed table store
//!
//! Every operation opens its own connection and drops it before returning, so
//! a failed statement never leaves a handle behind. Reads open the file
//! read-only and treat a missing file as an unreachable store; writes create
//! it on demand.

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::table::{Row, Table, TableData};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

/// Handle on the store file; holds no open connection between calls
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Create a store handle from configuration
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            path: config.path.clone(),
        }
    }

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store file exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Delete the store file so the next import starts from nothing
    pub fn reset(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)?;
        Ok(true)
    }

    /// All table names, sorted, excluding SQLite's own tables
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.open_read()?;
        let mut stmt = conn.prepare(
            r"SELECT name FROM sqlite_master
              WHERE type = 'table' AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
              ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Whether a table with exactly this name exists
    pub fn has_table(&self, table: &str) -> Result<bool> {
        let conn = self.open_read()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |_| Ok(()),
            )
            .optional()
            .map_err(|e| Error::sql(table, e))?;
        Ok(found.is_some())
    }

    /// Column names in schema order, or `None` if the table does not exist.
    /// Reads the schema only.
    pub fn columns(&self, table: &str) -> Result<Option<Vec<String>>> {
        let conn = self.open_read()?;
        table_columns(&conn, table)
    }

    /// Number of rows, or `None` if the table does not exist
    pub fn row_count(&self, table: &str) -> Result<Option<usize>> {
        let conn = self.open_read()?;
        if table_columns(&conn, table)?.is_none() {
            return Ok(None);
        }
        count_rows(&conn, table).map(Some)
    }

    /// Replace a table with the given contents in one transaction.
    ///
    /// Readers see either the previous table or the complete new one.
    pub fn replace_table(&self, table: &Table) -> Result<usize> {
        let mut conn = self.open_write()?;
        let name = quote_ident(&table.name);
        let column_defs: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("{} TEXT", quote_ident(&c.name)))
            .collect();
        let placeholders: Vec<String> = (1..=table.columns.len()).map(|i| format!("?{i}")).collect();

        let tx = conn.transaction().map_err(|e| Error::sql(&table.name, e))?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {name}; CREATE TABLE {name} ({});",
            column_defs.join(", ")
        ))
        .map_err(|e| Error::sql(&table.name, e))?;
        {
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT INTO {name} VALUES ({})",
                    placeholders.join(", ")
                ))
                .map_err(|e| Error::sql(&table.name, e))?;
            for row in &table.rows {
                stmt.execute(rusqlite::params_from_iter(row.cells.iter()))
                    .map_err(|e| Error::sql(&table.name, e))?;
            }
        }
        tx.commit().map_err(|e| Error::sql(&table.name, e))?;

        Ok(table.rows.len())
    }

    /// Rows in storage order, up to `limit` if given.
    /// `None` if the table does not exist.
    pub fn select(&self, table: &str, limit: Option<usize>) -> Result<Option<TableData>> {
        let conn = self.open_read()?;
        let Some(columns) = table_columns(&conn, table)? else {
            return Ok(None);
        };
        let total_rows = count_rows(&conn, table)?;
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));

        let mut rows = Vec::new();
        read_rows(
            &conn,
            table,
            &format!("SELECT * FROM {} LIMIT ?1", quote_ident(table)),
            [limit],
            |row| {
                rows.push(row);
            },
        )?;

        Ok(Some(TableData {
            table: table.to_string(),
            columns,
            rows,
            total_rows,
        }))
    }

    /// Rows for which `keep` returns true, in storage order.
    /// `None` if the table does not exist.
    pub fn select_filtered<F>(&self, table: &str, mut keep: F) -> Result<Option<TableData>>
    where
        F: FnMut(&[String], &Row) -> bool,
    {
        let conn = self.open_read()?;
        let Some(columns) = table_columns(&conn, table)? else {
            return Ok(None);
        };

        let mut total_rows = 0;
        let mut rows = Vec::new();
        read_rows(
            &conn,
            table,
            &format!("SELECT * FROM {}", quote_ident(table)),
            [],
            |row| {
                total_rows += 1;
                if keep(&columns, &row) {
                    rows.push(row);
                }
            },
        )?;

        Ok(Some(TableData {
            table: table.to_string(),
            columns,
            rows,
            total_rows,
        }))
    }

    fn open_read(&self) -> Result<Connection> {
        if !self.exists() {
            return Err(self.unavailable("store file does not exist"));
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| self.unavailable(e))?;
        self.check_readable(conn)
    }

    fn open_write(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.unavailable(e))?;
            }
        }
        let conn = Connection::open(&self.path).map_err(|e| self.unavailable(e))?;
        self.check_readable(conn)
    }

    /// Opening is lazy; reading the schema is what rejects a file that is
    /// not a SQLite database.
    fn check_readable(&self, conn: Connection) -> Result<Connection> {
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| self.unavailable(e))?;
        Ok(conn)
    }

    fn unavailable(&self, reason: impl ToString) -> Error {
        Error::StoreUnavailable {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

fn table_columns(conn: &Connection, table: &str) -> Result<Option<Vec<String>>> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
        .map_err(|e| Error::sql(table, e))?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .map_err(|e| Error::sql(table, e))?;
    Ok(if columns.is_empty() { None } else { Some(columns) })
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", quote_ident(table)), [], |row| {
            row.get(0)
        })
        .map_err(|e| Error::sql(table, e))?;
    Ok(usize::try_from(count).unwrap_or(0))
}

fn read_rows<P, F>(conn: &Connection, table: &str, sql: &str, params: P, mut sink: F) -> Result<()>
where
    P: rusqlite::Params,
    F: FnMut(Row),
{
    let mut stmt = conn.prepare(sql).map_err(|e| Error::sql(table, e))?;
    let width = stmt.column_count();
    let mut rows = stmt.query(params).map_err(|e| Error::sql(table, e))?;
    while let Some(row) = rows.next().map_err(|e| Error::sql(table, e))? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            let value = row.get_ref(i).map_err(|e| Error::sql(table, e))?;
            cells.push(cell_text(value));
        }
        sink(Row::new(cells));
    }
    Ok(())
}

/// Render any stored value as text
fn cell_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

/// Quote an identifier for SQLite
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

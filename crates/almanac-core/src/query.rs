//! Point lookups, player search and multi-year trends
//!
//! Missing tables, missing columns and malformed input all come back as
//! explicit "not found" / "no data" values. Only an unreachable store is
//! returned as an error.

use crate::config::QueryOptions;
use crate::error::Result;
use crate::naming::table_name;
use crate::store::Store;
use crate::table::{parse_measure, Row, TableData};
use serde::Serialize;
use tracing::debug;

/// Result of a point lookup
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Lookup {
    Found(TableData),
    NotFound { table: String },
}

/// Matching rows from one table
#[derive(Debug, Clone, Serialize)]
pub struct TableMatches {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Result of a player search
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// At least one table matched; tables in name order
    Matches { tables: Vec<TableMatches> },
    /// Eligible tables were searched but none matched
    NoMatches { tables_searched: usize },
    /// No table had both a searchable name and a player column
    NoEligibleTables,
}

/// One year's value for a player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: u16,
    /// Player name as stored
    pub player: String,
    /// Measure parsed as a number, when it is one
    pub value: Option<f64>,
    /// Measure as stored
    pub raw: Option<String>,
}

/// Points sharing one statistic label, in year order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub statistic: Option<String>,
    pub points: Vec<TrendPoint>,
}

/// A player's rows across years within one category
#[derive(Debug, Clone, Serialize)]
pub struct Trend {
    pub category: String,
    pub player: String,
    pub series: Vec<TrendSeries>,
}

impl Trend {
    /// Number of points across all series
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

/// Result of a trend aggregation
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TrendOutcome {
    Series(Trend),
    NoData,
}

/// Answers lookups, searches and trends against the store
#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: Store,
    options: QueryOptions,
}

impl QueryEngine {
    pub fn new(store: Store, options: QueryOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// First rows of `<category>_<year>`, capped at `limit` or the configured row limit
    pub fn lookup(&self, category: &str, year: &str, limit: Option<usize>) -> Result<Lookup> {
        match table_name(category, year) {
            Some(table) => self.lookup_table(&table, limit),
            None => Ok(Lookup::NotFound {
                table: format!("{}_{}", category.trim(), year.trim()),
            }),
        }
    }

    /// First rows of a table by exact name, including uncategorized tables
    pub fn lookup_table(&self, table: &str, limit: Option<usize>) -> Result<Lookup> {
        let limit = limit.unwrap_or(self.options.row_limit);
        match self.store.select(table, Some(limit)) {
            Ok(Some(data)) => Ok(Lookup::Found(data)),
            Ok(None) => Ok(Lookup::NotFound {
                table: table.to_string(),
            }),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                debug!("lookup of '{}' failed: {}", table, e);
                Ok(Lookup::NotFound {
                    table: table.to_string(),
                })
            }
        }
    }

    /// Rows whose player column contains `needle`, ignoring case, across
    /// every table under one of the search prefixes
    pub fn search_player(&self, needle: &str) -> Result<SearchOutcome> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(SearchOutcome::NoMatches { tables_searched: 0 });
        }

        let mut tables_searched = 0;
        let mut tables = Vec::new();

        for table in self.store.list_tables()? {
            if !self.is_searchable(&table) {
                continue;
            }
            match self.matching_rows(&table, &needle) {
                Ok(Some(data)) => {
                    tables_searched += 1;
                    if !data.is_empty() {
                        tables.push(TableMatches {
                            table: data.table,
                            columns: data.columns,
                            rows: data.rows,
                        });
                    }
                }
                Ok(None) => debug!("'{}' has no player column, skipped", table),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => debug!("search of '{}' failed, skipped: {}", table, e),
            }
        }

        Ok(if !tables.is_empty() {
            SearchOutcome::Matches { tables }
        } else if tables_searched > 0 {
            SearchOutcome::NoMatches { tables_searched }
        } else {
            SearchOutcome::NoEligibleTables
        })
    }

    /// A player's measure across the configured years, one series per statistic.
    ///
    /// Years whose table is missing or lacks the player or measure column
    /// contribute nothing.
    pub fn trend(&self, category: &str, player: &str) -> Result<TrendOutcome> {
        let needle = player.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(TrendOutcome::NoData);
        }

        let mut series: Vec<TrendSeries> = Vec::new();
        for year in self.options.first_year..=self.options.last_year {
            let Some(table) = table_name(category, &year.to_string()) else {
                return Ok(TrendOutcome::NoData);
            };
            let points = match self.year_points(&table, year, &needle) {
                Ok(points) => points,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    debug!("skipping '{}' in trend: {}", table, e);
                    continue;
                }
            };
            for (statistic, point) in points {
                match series.iter_mut().find(|s| s.statistic == statistic) {
                    Some(existing) => existing.points.push(point),
                    None => series.push(TrendSeries {
                        statistic,
                        points: vec![point],
                    }),
                }
            }
        }

        if series.is_empty() {
            return Ok(TrendOutcome::NoData);
        }
        Ok(TrendOutcome::Series(Trend {
            category: category.trim().to_string(),
            player: player.trim().to_string(),
            series,
        }))
    }

    fn is_searchable(&self, table: &str) -> bool {
        self.options.search_prefixes.iter().any(|prefix| {
            table
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('_'))
        })
    }

    /// `None` if the table is absent or has no player column
    fn matching_rows(&self, table: &str, needle: &str) -> Result<Option<TableData>> {
        let Some(columns) = self.store.columns(table)? else {
            return Ok(None);
        };
        let Some(player) = find_column(&columns, &self.options.player_column) else {
            return Ok(None);
        };
        self.store
            .select_filtered(table, |_, row| player_matches(row, player, needle))
    }

    fn year_points(
        &self,
        table: &str,
        year: u16,
        needle: &str,
    ) -> Result<Vec<(Option<String>, TrendPoint)>> {
        let Some(columns) = self.store.columns(table)? else {
            return Ok(Vec::new());
        };
        let (Some(player), Some(measure)) = (
            find_column(&columns, &self.options.player_column),
            find_column(&columns, &self.options.measure_column),
        ) else {
            debug!("'{}' lacks player or measure column", table);
            return Ok(Vec::new());
        };
        let statistic = find_column(&columns, &self.options.statistic_column);

        let Some(data) = self
            .store
            .select_filtered(table, |_, row| player_matches(row, player, needle))?
        else {
            return Ok(Vec::new());
        };

        Ok(data
            .rows
            .iter()
            .map(|row| {
                let raw = row.get(measure).map(str::to_string);
                let point = TrendPoint {
                    year,
                    player: row.get(player).unwrap_or_default().to_string(),
                    value: raw.as_deref().and_then(parse_measure),
                    raw,
                };
                (statistic.and_then(|i| row.get(i)).map(str::to_string), point)
            })
            .collect())
    }
}

/// Column position by name; SQLite treats identifiers case-insensitively
fn find_column(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c.eq_ignore_ascii_case(name))
}

/// Unanchored substring match on lowercased text. No accent folding:
/// "jose" does not match "José".
fn player_matches(row: &Row, column: usize, needle: &str) -> bool {
    row.get(column)
        .is_some_and(|name| name.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::parser::parse_csv_str;
    use tempfile::TempDir;

    fn engine_with(tables: &[(&str, &str)]) -> (TempDir, QueryEngine) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(&StoreConfig::new(dir.path().join("stats.db")));
        for (name, csv) in tables {
            let table = parse_csv_str(csv, &format!("{name}.csv"), 0).unwrap();
            store.replace_table(&table).unwrap();
        }
        (dir, QueryEngine::new(store, QueryOptions::default()))
    }

    #[test]
    fn test_lookup_caps_rows_and_keeps_columns() {
        let csv: String = std::iter::once("Team,W,L\n".to_string())
            .chain((0..15).map(|i| format!("Team {i},{i},{}\n", 15 - i)))
            .collect();
        let (_dir, engine) = engine_with(&[("standings_2012", &csv)]);

        let Lookup::Found(data) = engine.lookup("standings", "2012", None).unwrap() else {
            panic!("expected table");
        };
        assert_eq!(data.columns, vec!["Team", "W", "L"]);
        assert_eq!(data.rows.len(), 10);
        assert_eq!(data.total_rows, 15);
        assert_eq!(data.rows[0].get(0), Some("Team 0"));

        let Lookup::Found(data) = engine.lookup("standings", "2012", Some(3)).unwrap() else {
            panic!("expected table");
        };
        assert_eq!(data.rows.len(), 3);
    }

    #[test]
    fn test_lookup_not_found() {
        let (_dir, engine) = engine_with(&[("batting_2014", "Name\nx\n")]);

        assert!(matches!(
            engine.lookup("batting", "2015", None).unwrap(),
            Lookup::NotFound { table } if table == "batting_2015"
        ));
        assert!(matches!(
            engine.lookup("batting", "twenty", None).unwrap(),
            Lookup::NotFound { .. }
        ));
        assert!(matches!(
            engine.lookup("batting; DROP", "2014", None).unwrap(),
            Lookup::NotFound { .. }
        ));
    }

    #[test]
    fn test_lookup_table_by_exact_name() {
        let (_dir, engine) = engine_with(&[("notes", "Text\nhello\n")]);
        assert!(matches!(engine.lookup_table("notes", None).unwrap(), Lookup::Found(_)));
    }

    #[test]
    fn test_queries_on_missing_store_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(&StoreConfig::new(dir.path().join("absent.db")));
        let engine = QueryEngine::new(store, QueryOptions::default());

        assert!(engine.lookup("batting", "2014", None).unwrap_err().is_fatal());
        assert!(engine.search_player("ruth").unwrap_err().is_fatal());
        assert!(engine.trend("batting", "ruth").unwrap_err().is_fatal());
    }

    #[test]
    fn test_queries_on_corrupt_store_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.db");
        std::fs::write(&path, vec![b'x'; 4096]).unwrap();
        let engine = QueryEngine::new(Store::new(&StoreConfig::new(path)), QueryOptions::default());

        assert!(engine.lookup("batting", "2014", None).unwrap_err().is_fatal());
        assert!(engine.lookup_table("notes", None).unwrap_err().is_fatal());
        assert!(engine.search_player("ruth").unwrap_err().is_fatal());
        assert!(engine.trend("batting", "ruth").unwrap_err().is_fatal());
    }

    #[test]
    fn test_search_matches_substring_ignoring_case() {
        let (_dir, engine) = engine_with(&[
            ("batting_2002", "Statistic,Name,#\nHome Runs,Babe Ruth,60\nHits,Ty Cobb,200\n"),
            ("batting_2003", "Statistic,Name,#\nHits,Ichiro Suzuki,212\n"),
            ("pitching_2002", "Statistic,Name,#\nWins,George Herman RUTHLESS,20\n"),
            ("fielding_2002", "Statistic,Name,#\nErrors,Babe Ruth,3\n"),
        ]);

        let SearchOutcome::Matches { tables } = engine.search_player("ruth").unwrap() else {
            panic!("expected matches");
        };
        let names: Vec<_> = tables.iter().map(|t| t.table.as_str()).collect();
        assert_eq!(names, vec!["batting_2002", "pitching_2002"]);
        assert_eq!(tables[0].rows.len(), 1);
        assert_eq!(tables[0].rows[0].get(1), Some("Babe Ruth"));
    }

    #[test]
    fn test_search_skips_tables_without_player_column() {
        let (_dir, engine) = engine_with(&[
            ("batting_2002", "Statistic,Leader,#\nHome Runs,Babe Ruth,60\n"),
            ("pitching_2002", "Statistic,Name,#\nWins,Cy Young,20\n"),
        ]);

        assert!(matches!(
            engine.search_player("ruth").unwrap(),
            SearchOutcome::NoMatches { tables_searched: 1 }
        ));
    }

    #[test]
    fn test_search_without_eligible_tables() {
        let (_dir, engine) = engine_with(&[
            ("batting_2002", "Statistic,Leader,#\nHome Runs,Babe Ruth,60\n"),
            ("battingavg_2002", "Name\nBabe Ruth\n"),
            ("standings_2002", "Name\nBabe Ruth\n"),
        ]);

        assert!(matches!(
            engine.search_player("ruth").unwrap(),
            SearchOutcome::NoEligibleTables
        ));
    }

    #[test]
    fn test_search_does_not_fold_accents() {
        let (_dir, engine) = engine_with(&[("batting_2010", "Name\nJosé Bautista\n")]);

        assert!(matches!(
            engine.search_player("JOSÉ").unwrap(),
            SearchOutcome::Matches { .. }
        ));
        assert!(matches!(
            engine.search_player("jose").unwrap(),
            SearchOutcome::NoMatches { .. }
        ));
    }

    #[test]
    fn test_search_empty_needle() {
        let (_dir, engine) = engine_with(&[("batting_2010", "Name\nJosé Bautista\n")]);
        assert!(matches!(
            engine.search_player("  ").unwrap(),
            SearchOutcome::NoMatches { tables_searched: 0 }
        ));
    }

    #[test]
    fn test_trend_groups_by_statistic_in_year_order() {
        let (_dir, engine) = engine_with(&[
            ("batting_2004", "Statistic,Name,#\nHits,Ichiro Suzuki,262\nAverage,Ichiro Suzuki,.372\n"),
            ("batting_2002", "Statistic,Name,#\nHits,Ichiro Suzuki,208\n"),
            ("batting_2003", "Statistic,Leader\nHits,Ichiro Suzuki\n"),
            ("batting_2005", "Statistic,Name,#\nHits,Derek Jeter,202\n"),
            ("pitching_2004", "Statistic,Name,#\nWins,Ichiro Suzuki,1\n"),
        ]);

        let TrendOutcome::Series(trend) = engine.trend("batting", "ichiro").unwrap() else {
            panic!("expected trend");
        };
        assert_eq!(trend.category, "batting");
        assert_eq!(trend.point_count(), 3);
        assert_eq!(trend.series.len(), 2);

        let hits = &trend.series[0];
        assert_eq!(hits.statistic.as_deref(), Some("Hits"));
        let years: Vec<_> = hits.points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2002, 2004]);
        assert_eq!(hits.points[1].value, Some(262.0));
        assert_eq!(hits.points[1].player, "Ichiro Suzuki");

        let average = &trend.series[1];
        assert_eq!(average.statistic.as_deref(), Some("Average"));
        assert_eq!(average.points[0].value, Some(0.372));
    }

    #[test]
    fn test_trend_without_statistic_column() {
        let (_dir, engine) = engine_with(&[("pitching_2010", "Name,#\nRoy Halladay,21\n")]);

        let TrendOutcome::Series(trend) = engine.trend("pitching", "halladay").unwrap() else {
            panic!("expected trend");
        };
        assert_eq!(trend.series.len(), 1);
        assert_eq!(trend.series[0].statistic, None);
        assert_eq!(trend.series[0].points[0].raw.as_deref(), Some("21"));
    }

    #[test]
    fn test_trend_absent_player_is_no_data() {
        let (_dir, engine) = engine_with(&[("batting_2004", "Statistic,Name,#\nHits,Ichiro Suzuki,262\n")]);

        assert!(matches!(engine.trend("batting", "Ruth").unwrap(), TrendOutcome::NoData));
        assert!(matches!(engine.trend("fielding", "Ichiro").unwrap(), TrendOutcome::NoData));
        assert!(matches!(engine.trend("bad category", "Ichiro").unwrap(), TrendOutcome::NoData));
        assert!(matches!(engine.trend("batting", "").unwrap(), TrendOutcome::NoData));
    }

    #[test]
    fn test_trend_respects_year_range() {
        let (dir, _) = engine_with(&[("batting_1999", "Statistic,Name,#\nHits,Tony Gwynn,139\n")]);
        let store = Store::new(&StoreConfig::new(dir.path().join("stats.db")));

        let engine = QueryEngine::new(store.clone(), QueryOptions::default());
        assert!(matches!(engine.trend("batting", "gwynn").unwrap(), TrendOutcome::NoData));

        let options = QueryOptions {
            first_year: 1990,
            last_year: 2000,
            ..QueryOptions::default()
        };
        let engine = QueryEngine::new(store, options);
        assert!(matches!(engine.trend("batting", "gwynn").unwrap(), TrendOutcome::Series(_)));
    }
}

//! Cleanup rules applied to a parsed extract before it is stored

use crate::table::{Column, Table};
use serde::Serialize;
use std::collections::HashSet;

const NBSP: char = '\u{a0}';

/// Counts of rows removed while cleaning a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanStats {
    /// Rows with no value in any column
    pub blank_rows: usize,
    /// Header rows repeated inside the data
    pub header_rows: usize,
}

/// Clean a parsed table in place.
///
/// Values are trimmed with non-breaking spaces turned into plain spaces, blank
/// rows and repeated header rows are dropped, then column names are normalized
/// and made unique.
pub fn clean_table(table: &mut Table, label_column: &str) -> CleanStats {
    let mut stats = CleanStats::default();

    for row in &mut table.rows {
        for cell in &mut row.cells {
            *cell = cell.as_deref().and_then(clean_value);
        }
    }

    let before = table.rows.len();
    table.rows.retain(|row| !row.is_blank());
    stats.blank_rows = before - table.rows.len();

    if let Some(label) = table
        .columns
        .iter()
        .find(|c| header_text(&c.name).eq_ignore_ascii_case(label_column))
    {
        let index = label.index;
        let own_name = header_text(&label.name).to_lowercase();
        let before = table.rows.len();
        table.rows.retain(|row| {
            row.get(index)
                .map_or(true, |value| value.to_lowercase() != own_name)
        });
        stats.header_rows = before - table.rows.len();
    }

    let names = table
        .columns
        .iter()
        .map(|c| normalize_column_name(&c.name, c.index))
        .collect();
    table.columns = dedupe_column_names(names)
        .into_iter()
        .enumerate()
        .map(|(i, name)| Column::new(name, i))
        .collect();

    stats
}

/// Trim a raw value and swap non-breaking spaces for plain ones.
/// Values that end up empty are absent.
pub fn clean_value(raw: &str) -> Option<String> {
    let value = raw.replace(NBSP, " ");
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Normalize a header cell into a column name.
///
/// Spaces, non-breaking spaces and hyphens each become `_`; case is kept.
/// A header with no text becomes `column_<n>` for its 1-based position.
pub fn normalize_column_name(raw: &str, index: usize) -> String {
    let trimmed = header_text(raw);
    if trimmed.is_empty() {
        return format!("column_{}", index + 1);
    }
    trimmed
        .chars()
        .map(|c| match c {
            ' ' | NBSP | '-' => '_',
            other => other,
        })
        .collect()
}

/// Suffix repeated names with `_2`, `_3`, ... in order of appearance.
///
/// Comparison ignores ASCII case, matching how SQLite resolves identifiers.
pub fn dedupe_column_names(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        if seen.insert(name.to_ascii_lowercase()) {
            out.push(name);
            continue;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{name}_{n}");
            if seen.insert(candidate.to_ascii_lowercase()) {
                out.push(candidate);
                break;
            }
            n += 1;
        }
    }

    out
}

fn header_text(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == NBSP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_csv_str;

    fn parse(csv: &str) -> Table {
        parse_csv_str(csv, "batting_2014.csv", 0).unwrap()
    }

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value("  Babe Ruth "), Some("Babe Ruth".to_string()));
        assert_eq!(clean_value("Babe\u{a0}Ruth"), Some("Babe Ruth".to_string()));
        assert_eq!(clean_value("\u{a0}\u{a0}"), None);
        assert_eq!(clean_value(""), None);
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("Team Name", 0), "Team_Name");
        assert_eq!(normalize_column_name(" Left-Field ", 0), "Left_Field");
        assert_eq!(normalize_column_name("Runs\u{a0}Scored", 0), "Runs_Scored");
        assert_eq!(normalize_column_name("#", 0), "#");
        assert_eq!(normalize_column_name("  ", 3), "column_4");
    }

    #[test]
    fn test_dedupe_column_names() {
        let names = vec![
            "Team".to_string(),
            "team".to_string(),
            "Team".to_string(),
            "Team_2".to_string(),
        ];
        assert_eq!(
            dedupe_column_names(names),
            vec!["Team", "team_2", "Team_3", "Team_2_2"]
        );
    }

    #[test]
    fn test_drops_blank_rows() {
        let mut table = parse("Statistic,Name,#\n,,\nHits,Ichiro Suzuki,262\n , \u{a0},\n");
        let stats = clean_table(&mut table, "Statistic");

        assert_eq!(stats.blank_rows, 2);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_drops_embedded_header_rows() {
        let mut table = parse(
            "Statistic,Name,#\nHits,Ichiro Suzuki,262\nSTATISTIC,Name,#\nstatistic ,Name,#\n",
        );
        let stats = clean_table(&mut table, "Statistic");

        assert_eq!(stats.header_rows, 2);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0].get(1), Some("Ichiro Suzuki"));
    }

    #[test]
    fn test_without_label_column_keeps_rows() {
        let mut table = parse("Team,Wins\nTeam,Wins\nYankees,101\n");
        let stats = clean_table(&mut table, "Statistic");

        assert_eq!(stats.header_rows, 0);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_normalizes_and_dedupes_columns() {
        let mut table = parse("Team Name,Games-Behind,Team Name\nYankees,0.0,NYY\n");
        clean_table(&mut table, "Statistic");

        assert_eq!(
            table.column_names(),
            vec!["Team_Name", "Games_Behind", "Team_Name_2"]
        );
        assert_eq!(table.columns[2].index, 2);
    }

    #[test]
    fn test_only_noise_cleans_to_zero_rows() {
        let mut table = parse("Statistic,Name,#\nStatistic,Name,#\n,,\n");
        clean_table(&mut table, "Statistic");
        assert_eq!(table.row_count(), 0);
    }
}

//! Plain-text rendering of query results

use almanac_core::{
    CatalogSummary, ImportReport, ImportStatus, Lookup, Row, SearchOutcome, TableInfo,
    TrendOutcome,
};
/// Columns padded to their widest cell, separated by ` | `
pub fn render_rows(columns: &[String], rows: &[Row]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, width) in widths.iter_mut().enumerate() {
            let len = row.get(i).map_or(0, |v| v.chars().count());
            *width = (*width).max(len);
        }
    }

    let mut out = String::new();
    let header: Vec<&str> = columns.iter().map(String::as_str).collect();
    push_line(&mut out, &header, &widths);
    let rule: usize = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(rule));
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = (0..columns.len()).map(|i| row.get(i).unwrap_or("")).collect();
        push_line(&mut out, &cells, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

pub fn render_categories(summary: &CatalogSummary) -> String {
    let mut out = String::new();
    if summary.categories.is_empty() {
        out.push_str("No categorized tables in the store.\n");
    } else {
        out.push_str("Available data:\n");
        for c in &summary.categories {
            out.push_str(&format!(
                "  {:<15} {}-{} ({} years)\n",
                c.category,
                c.min_year,
                c.max_year,
                c.years.len()
            ));
        }
    }
    if !summary.uncategorized.is_empty() {
        out.push_str(&format!("Uncategorized: {}\n", summary.uncategorized.join(", ")));
    }
    out
}

pub fn render_tables(tables: &[TableInfo]) -> String {
    let mut out = format!("Tables ({}):\n", tables.len());
    for t in tables {
        let marker = if t.categorized { "" } else { " [uncategorized]" };
        out.push_str(&format!(
            "  {:<20} {:>6} rows {:>3} columns{}\n",
            t.name, t.rows, t.columns, marker
        ));
    }
    out
}

pub fn render_lookup(lookup: &Lookup) -> String {
    match lookup {
        Lookup::NotFound { table } => format!("Table '{}' not found.\n", table),
        Lookup::Found(data) => {
            let mut out = format!("Showing {} of {} rows from {}:\n\n", data.len(), data.total_rows, data.table);
            out.push_str(&render_rows(&data.columns, &data.rows));
            out
        }
    }
}

pub fn render_search(outcome: &SearchOutcome, player: &str) -> String {
    match outcome {
        SearchOutcome::NoEligibleTables => {
            "No batting or pitching tables with a player column to search.\n".to_string()
        }
        SearchOutcome::NoMatches { tables_searched } => {
            format!("No matches found for '{}' in {} tables.\n", player, tables_searched)
        }
        SearchOutcome::Matches { tables } => {
            let mut out = String::new();
            for t in tables {
                out.push_str(&format!("\n{} ({} rows)\n", t.table, t.rows.len()));
                out.push_str(&render_rows(&t.columns, &t.rows));
            }
            out
        }
    }
}

pub fn render_trend(outcome: &TrendOutcome, category: &str, player: &str) -> String {
    let trend = match outcome {
        TrendOutcome::NoData => {
            return format!("No trend data found for player '{}' in {}.\n", player, category)
        }
        TrendOutcome::Series(trend) => trend,
    };

    let mut out = format!("Trend for '{}' in {}:\n", trend.player, trend.category);
    for series in &trend.series {
        out.push('\n');
        out.push_str(series.statistic.as_deref().unwrap_or("(no statistic)"));
        out.push('\n');
        for p in &series.points {
            out.push_str(&format!(
                "  {}  {:<25} {}\n",
                p.year,
                p.player,
                p.raw.as_deref().unwrap_or("-")
            ));
        }
    }
    out
}

pub fn render_import(report: &ImportReport) -> String {
    let mut out = String::new();
    for o in &report.outcomes {
        let line = match &o.status {
            ImportStatus::Imported { rows, .. } => {
                format!("  ok     {} -> '{}' ({} rows)", o.file, o.table, rows)
            }
            ImportStatus::Empty => format!("  empty  {} (no rows after cleaning, skipped)", o.file),
            ImportStatus::Failed { message } => format!("  FAILED {}: {}", o.file, message),
        };
        out.push_str(&line);
        out.push('\n');
    }
    let elapsed = report.finished_at - report.started_at;
    out.push_str(&format!(
        "\nImport complete: {} imported ({} rows), {} empty, {} failed in {} ms\n",
        report.imported(),
        report.total_rows(),
        report.empty(),
        report.failed(),
        elapsed.num_milliseconds()
    ));
    out
}

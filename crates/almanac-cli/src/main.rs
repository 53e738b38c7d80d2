//! Almanac CLI
//!
//! Command-line tool for importing yearly baseball stat extracts into SQLite
//! and browsing, searching and trending them.

mod render;
mod shell;

use almanac_core::{Catalog, Config, Importer, QueryEngine, Store};
use clap::{ArgGroup, Parser, Subcommand};
use render::{render_categories, render_import, render_lookup, render_search, render_tables, render_trend};
use serde::Serialize;
use shell::Shell;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "almanac")]
#[command(about = "Yearly baseball stats importer and browser", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the SQLite store (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import every CSV extract in a directory into the store
    Import {
        /// Directory holding the raw CSV files
        #[arg(short, long, default_value = "data")]
        source: PathBuf,

        /// Delete the existing store before importing
        #[arg(long)]
        fresh: bool,

        /// File that failed imports are appended to
        #[arg(long)]
        error_log: Option<PathBuf>,
    },

    /// List categories and their year ranges
    Categories,

    /// List every table with its size
    Tables,

    /// Show the first rows of a table
    #[command(group(ArgGroup::new("target").required(true).args(["category", "table"])))]
    Show {
        /// Category, e.g. batting
        #[arg(short, long, requires = "year")]
        category: Option<String>,

        /// Year, e.g. 2014
        #[arg(short, long, requires = "category")]
        year: Option<String>,

        /// Exact table name, for tables outside the category_year convention
        #[arg(short, long, conflicts_with = "category")]
        table: Option<String>,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search batting and pitching tables for a player name
    Search {
        /// Part of the player's name, any case
        #[arg(short, long)]
        player: String,
    },

    /// Follow a player across years within a category
    Trend {
        /// Category, e.g. batting
        #[arg(short, long)]
        category: String,

        /// Part of the player's name, any case
        #[arg(short, long)]
        player: String,
    },

    /// Interactive menu
    Shell,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        if e.is_fatal() {
            eprintln!("Run `almanac import` first, or pass --db with the store location.");
        }
        std::process::exit(1);
    }
}

fn run() -> almanac_core::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(db) = cli.db.clone() {
        config.store.path = db;
    }
    config.validate()?;

    let store = Store::new(&config.store);
    let json = cli.json;

    match cli.command {
        Commands::Import {
            source,
            fresh,
            error_log,
        } => {
            if let Some(path) = error_log {
                config.import.error_log = path;
            }
            cmd_import(store, config, &source, fresh, json)
        }
        Commands::Categories => cmd_categories(store, json),
        Commands::Tables => cmd_tables(store, json),
        Commands::Show {
            category,
            year,
            table,
            limit,
        } => cmd_show(store, config, category, year, table, limit, json),
        Commands::Search { player } => cmd_search(store, config, &player, json),
        Commands::Trend { category, player } => cmd_trend(store, config, &category, &player, json),
        Commands::Shell => cmd_shell(store, config),
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Print either the JSON form or the rendered text
fn emit<T: Serialize>(value: &T, json: bool, text: impl FnOnce() -> String) -> almanac_core::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

fn cmd_import(
    store: Store,
    config: Config,
    source: &PathBuf,
    fresh: bool,
    json: bool,
) -> almanac_core::Result<()> {
    if fresh && store.reset()? {
        info!("removed existing store {}", store.path().display());
    }

    let importer = Importer::new(store, config.import);
    let report = importer.import_dir(source)?;

    emit(&report, json, || render_import(&report))?;
    if report.failed() > 0 && !json {
        println!("Failures logged to {}", importer.error_log().path().display());
    }
    Ok(())
}

fn cmd_categories(store: Store, json: bool) -> almanac_core::Result<()> {
    let summary = Catalog::new(store).summary()?;
    emit(&summary, json, || render_categories(&summary))
}

fn cmd_tables(store: Store, json: bool) -> almanac_core::Result<()> {
    let tables = Catalog::new(store).tables()?;
    emit(&tables, json, || render_tables(&tables))
}

fn cmd_show(
    store: Store,
    config: Config,
    category: Option<String>,
    year: Option<String>,
    table: Option<String>,
    limit: Option<usize>,
    json: bool,
) -> almanac_core::Result<()> {
    let engine = QueryEngine::new(store, config.query);
    let lookup = match table {
        Some(table) => engine.lookup_table(&table, limit)?,
        None => engine.lookup(
            category.as_deref().unwrap_or_default(),
            year.as_deref().unwrap_or_default(),
            limit,
        )?,
    };
    emit(&lookup, json, || render_lookup(&lookup))
}

fn cmd_search(store: Store, config: Config, player: &str, json: bool) -> almanac_core::Result<()> {
    let engine = QueryEngine::new(store, config.query);
    let outcome = engine.search_player(player)?;
    emit(&outcome, json, || render_search(&outcome, player))
}

fn cmd_trend(
    store: Store,
    config: Config,
    category: &str,
    player: &str,
    json: bool,
) -> almanac_core::Result<()> {
    let engine = QueryEngine::new(store, config.query);
    let outcome = engine.trend(category, player)?;
    emit(&outcome, json, || render_trend(&outcome, category, player))
}

fn cmd_shell(store: Store, config: Config) -> almanac_core::Result<()> {
    let catalog = Catalog::new(store.clone());
    let engine = QueryEngine::new(store, config.query);
    let stdin = io::stdin();
    let stdout = io::stdout();
    Shell::new(&catalog, &engine, stdin.lock(), stdout.lock()).run()
}

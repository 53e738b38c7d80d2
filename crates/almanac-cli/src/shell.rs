//! Interactive menu over the catalog and query engine

use crate::render::{render_categories, render_lookup, render_search, render_trend};
use almanac_core::{Catalog, QueryEngine, Result};
use std::io::{BufRead, Write};

const MENU: &str = "\nChoose an option:\n\
  1. Browse by category & year\n\
  2. Search for player name (batting/pitching only)\n\
  3. Player trend across years\n\
  L. List categories\n\
  Q. Quit\n";

pub struct Shell<'a, R, W> {
    catalog: &'a Catalog,
    engine: &'a QueryEngine,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(catalog: &'a Catalog, engine: &'a QueryEngine, input: R, output: W) -> Self {
        Self {
            catalog,
            engine,
            input,
            output,
        }
    }

    /// Loop until the user quits or input ends.
    /// Only an unreachable store ends the loop with an error.
    pub fn run(&mut self) -> Result<()> {
        self.list_categories()?;

        loop {
            write!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("> ")? else {
                break;
            };

            match choice.to_lowercase().as_str() {
                "1" => self.browse()?,
                "2" => self.search()?,
                "3" => self.trend()?,
                "l" => self.list_categories()?,
                "q" => {
                    writeln!(self.output, "Exiting.")?;
                    break;
                }
                _ => writeln!(self.output, "Invalid choice.")?,
            }
        }

        Ok(())
    }

    fn list_categories(&mut self) -> Result<()> {
        let summary = self.catalog.summary()?;
        write!(self.output, "{}", render_categories(&summary))?;
        Ok(())
    }

    fn browse(&mut self) -> Result<()> {
        let Some(category) =
            self.prompt("Enter category (batting/pitching/fielding/standings/misc_<n>): ")?
        else {
            return Ok(());
        };
        let Some(year) = self.prompt("Enter year (e.g. 2014): ")? else {
            return Ok(());
        };
        let lookup = self.engine.lookup(&category.to_lowercase(), &year, None)?;
        write!(self.output, "{}", render_lookup(&lookup))?;
        Ok(())
    }

    fn search(&mut self) -> Result<()> {
        let Some(player) = self.prompt("Enter player name: ")? else {
            return Ok(());
        };
        let outcome = self.engine.search_player(&player)?;
        write!(self.output, "{}", render_search(&outcome, &player))?;
        Ok(())
    }

    fn trend(&mut self) -> Result<()> {
        let Some(category) = self.prompt("Enter category (e.g. batting): ")? else {
            return Ok(());
        };
        let Some(player) = self.prompt("Enter player name: ")? else {
            return Ok(());
        };
        let category = category.to_lowercase();
        let outcome = self.engine.trend(&category, &player)?;
        write!(self.output, "{}", render_trend(&outcome, &category, &player))?;
        Ok(())
    }

    /// Read one non-empty trimmed line; `None` at end of input
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        loop {
            write!(self.output, "{label}")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }
}

//! Category and year summary derived from table names

use crate::error::Result;
use crate::naming::TableName;
use crate::store::Store;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Years available for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub min_year: u16,
    pub max_year: u16,
    /// Every year seen; gaps between min and max are allowed
    pub years: BTreeSet<u16>,
}

/// Categories plus the tables that do not follow `<category>_<year>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub categories: Vec<CategorySummary>,
    pub uncategorized: Vec<String>,
}

/// Size of one stored table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    /// Whether the name classifies into a category and year
    pub categorized: bool,
}

/// Read-only view of what the store holds
#[derive(Debug, Clone)]
pub struct Catalog {
    store: Store,
}

impl Catalog {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Categories with their year ranges, sorted by category name
    pub fn list_categories(&self) -> Result<Vec<CategorySummary>> {
        Ok(self.summary()?.categories)
    }

    /// Classify every table name in the store
    pub fn summary(&self) -> Result<CatalogSummary> {
        Ok(summarize(self.store.list_tables()?))
    }

    /// Every table with its row and column counts
    pub fn tables(&self) -> Result<Vec<TableInfo>> {
        let mut out = Vec::new();
        for name in self.store.list_tables()? {
            // replaced since list_tables
            let Some(columns) = self.store.columns(&name)? else {
                continue;
            };
            let rows = self.store.row_count(&name)?.unwrap_or(0);
            out.push(TableInfo {
                categorized: TableName::parse(&name).is_some(),
                name,
                rows,
                columns: columns.len(),
            });
        }
        Ok(out)
    }
}

/// Group table names by category
pub fn summarize<I, S>(names: I) -> CatalogSummary
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut by_category: BTreeMap<String, BTreeSet<u16>> = BTreeMap::new();
    let mut uncategorized = Vec::new();

    for name in names {
        let name = name.as_ref();
        match TableName::parse(name) {
            Some(parsed) => {
                by_category
                    .entry(parsed.category.to_string())
                    .or_default()
                    .insert(parsed.year);
            }
            None => uncategorized.push(name.to_string()),
        }
    }

    let categories = by_category
        .into_iter()
        .filter_map(|(category, years)| {
            let min_year = *years.first()?;
            let max_year = *years.last()?;
            Some(CategorySummary {
                category,
                min_year,
                max_year,
                years,
            })
        })
        .collect();

    CatalogSummary {
        categories,
        uncategorized,
    }
}

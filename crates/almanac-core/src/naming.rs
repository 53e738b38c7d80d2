//! Table naming convention: `<category>_<year>`
//!
//! Examples:
//! - "batting_2014" -> (Batting, 2014)
//! - "misc_3_2009" -> (Misc(3), 2009)
//! - "notes" -> uncategorized

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a stats table
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Category {
    Batting,
    Pitching,
    Fielding,
    Standings,
    /// Unclassified extract, numbered by its position on the source page
    Misc(u32),
    /// Any other category token
    Other(String),
}

impl Category {
    /// Classify a category token. `misc_<n>` is the fallback bucket for
    /// extracts that could not be classified. A bucket number with a leading
    /// zero stays `Other` so the token displays exactly as stored.
    pub fn parse(token: &str) -> Self {
        match token {
            "batting" => Category::Batting,
            "pitching" => Category::Pitching,
            "fielding" => Category::Fielding,
            "standings" => Category::Standings,
            _ => token
                .strip_prefix("misc_")
                .filter(|n| is_digits(n) && (n.len() == 1 || !n.starts_with('0')))
                .and_then(|n| n.parse().ok())
                .map(Category::Misc)
                .unwrap_or_else(|| Category::Other(token.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Batting => write!(f, "batting"),
            Category::Pitching => write!(f, "pitching"),
            Category::Fielding => write!(f, "fielding"),
            Category::Standings => write!(f, "standings"),
            Category::Misc(n) => write!(f, "misc_{}", n),
            Category::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.to_string()
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Category::parse(&s)
    }
}

/// A table name split into category and year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableName {
    pub category: Category,
    pub year: u16,
}

impl TableName {
    /// Split on the last underscore. The trailing segment must be all digits
    /// without a leading zero and the remainder non-empty, otherwise the
    /// table is uncategorized.
    pub fn parse(name: &str) -> Option<Self> {
        let (category, year) = name.rsplit_once('_')?;
        if category.is_empty() || !is_digits(year) || year.starts_with('0') {
            return None;
        }
        let year = year.parse().ok()?;
        Some(Self {
            category: Category::parse(category),
            year,
        })
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category, self.year)
    }
}

/// Build the table name for a category and year as typed by a user.
///
/// Returns `None` when either part cannot form a valid table name, so the
/// caller can report "not found" instead of touching the store.
pub fn table_name(category: &str, year: &str) -> Option<String> {
    let category = category.trim();
    let year = year.trim();
    let valid_category = !category.is_empty()
        && category
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_category || !is_digits(year) {
        return None;
    }
    Some(format!("{category}_{year}"))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

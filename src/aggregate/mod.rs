// src/aggregate/mod.rs
pub mod genres;
pub mod kpis;
pub mod ranking;
pub mod timeline;

pub use genres::top_genres;
pub use kpis::{kpis, Kpis};
pub use ranking::{top_n, Ranked};
pub use timeline::{titles_by_year, YearCount};

use crate::process::utils::non_missing;
use crate::table::{TitleTable, COUNTRY, DIRECTOR};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Row caps for the top-N views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub countries: usize,
    pub genres: usize,
    pub directors: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            countries: 10,
            genres: 10,
            directors: 15,
        }
    }
}

/// Rank a string column, treating each non-missing value as one opaque key.
fn top_values(table: &TitleTable, column: &str, n: usize) -> Result<Vec<Ranked>> {
    let values = table.utf8(column)?;
    Ok(top_n(values.iter().filter_map(non_missing), n))
}

/// `country` is not split: "United States, Ghana" is its own key.
pub fn top_countries(table: &TitleTable, n: usize) -> Result<Vec<Ranked>> {
    top_values(table, COUNTRY, n)
}

pub fn top_directors(table: &TitleTable, n: usize) -> Result<Vec<Ranked>> {
    top_values(table, DIRECTOR, n)
}

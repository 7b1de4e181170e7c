use super::ranking::{top_n, Ranked};
use crate::table::{TitleTable, LISTED_IN};
use anyhow::Result;
use std::fmt;

/// Separator between genres inside `listed_in`.
pub const GENRE_SEPARATOR: &str = ", ";

/// A single genre name taken from a `listed_in` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Genre<'a>(&'a str);

impl<'a> Genre<'a> {
    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

impl fmt::Display for Genre<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Split a `listed_in` value into genre tokens.
///
/// Splits on `", "` exactly, keeps token order, and drops empty tokens.
/// No other trimming: `"Drama,Comedy"` is a single genre.
pub fn tokenize(listed_in: &str) -> impl Iterator<Item = Genre<'_>> {
    listed_in
        .split(GENRE_SEPARATOR)
        .filter(|t| !t.is_empty())
        .map(Genre)
}

/// Top genres over all rows, ties in first-occurrence order.
pub fn top_genres(table: &TitleTable, n: usize) -> Result<Vec<Ranked>> {
    let listed = table.utf8(LISTED_IN)?;
    let tokens = listed
        .iter()
        .flatten()
        .flat_map(tokenize)
        .map(|g| g.as_str());
    Ok(top_n(tokens, n))
}

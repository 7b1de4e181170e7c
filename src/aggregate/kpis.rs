use crate::process::utils::non_missing;
use crate::table::{ContentType, TitleTable, DIRECTOR};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Headline counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_titles: u64,
    pub movies: u64,
    pub tv_shows: u64,
    pub unique_directors: u64,
}

pub fn kpis(table: &TitleTable) -> Result<Kpis> {
    let mut out = Kpis {
        total_titles: table.num_rows() as u64,
        ..Kpis::default()
    };

    for ty in table.content_types()? {
        match ty {
            ContentType::Movie => out.movies += 1,
            ContentType::TvShow => out.tv_shows += 1,
            ContentType::Other(_) => {}
        }
    }

    let directors: HashSet<&str> = table
        .utf8(DIRECTOR)?
        .iter()
        .filter_map(non_missing)
        .collect();
    out.unique_directors = directors.len() as u64;

    Ok(out)
}

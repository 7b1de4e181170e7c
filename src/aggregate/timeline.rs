use crate::table::{TitleTable, YEAR_ADDED};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Titles added in one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: u64,
}

/// Count rows per `YearAdded`, ascending by year. Rows without a year are
/// left out. Needs an enriched table.
pub fn titles_by_year(table: &TitleTable) -> Result<Vec<YearCount>> {
    let mut by_year: BTreeMap<i32, u64> = BTreeMap::new();
    for year in table.int32(YEAR_ADDED)?.iter().flatten() {
        *by_year.entry(year).or_insert(0) += 1;
    }
    Ok(by_year
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect())
}

// src/pipeline.rs
use crate::aggregate::{self, Limits};
use crate::cache::LoadCache;
use crate::enrich::enrich;
use crate::present::{Dashboard, RankedTable, YearSeries};
use crate::process::Source;
use crate::table::TitleTable;
use anyhow::{Context, Result};
use tracing::info;

/// Compute every view from an already loaded table.
pub fn build_dashboard(table: &TitleTable, limits: Limits) -> Result<Dashboard> {
    let enriched = enrich(table).context("enriching title table")?;

    let kpis = aggregate::kpis(&enriched)?;
    let by_year = aggregate::titles_by_year(&enriched)?;
    let countries = aggregate::top_countries(&enriched, limits.countries)?;
    let genres = aggregate::top_genres(&enriched, limits.genres)?;
    let directors = aggregate::top_directors(&enriched, limits.directors)?;

    Ok(Dashboard {
        kpis: kpis.into(),
        titles_by_year: YearSeries::titles_added(&by_year),
        top_countries: RankedTable::countries(countries, limits.countries),
        top_genres: RankedTable::genres(genres, limits.genres),
        top_directors: RankedTable::directors(directors, limits.directors),
    })
}

/// One dashboard run: cached load, enrich, aggregate.
pub struct Pipeline<'a> {
    cache: &'a LoadCache,
    limits: Limits,
}

impl<'a> Pipeline<'a> {
    pub fn new(cache: &'a LoadCache, limits: Limits) -> Self {
        Self { cache, limits }
    }

    #[tracing::instrument(level = "info", skip(self, source), fields(source = %source))]
    pub fn run(&self, source: &Source) -> Result<Dashboard> {
        let table = self
            .cache
            .get_or_load(source)
            .with_context(|| format!("loading {}", source))?;
        let dash = build_dashboard(&table, self.limits)?;
        info!(
            titles = table.num_rows(),
            years = dash.titles_by_year.points.len(),
            "dashboard ready"
        );
        Ok(dash)
    }
}

// src/present/mod.rs
//! View contracts handed to whatever draws the dashboard.
//!
//! Nothing here computes; every value comes straight from `aggregate`.

pub mod export;
pub mod render;

use crate::aggregate::{Kpis, Ranked, YearCount};
use serde::{Deserialize, Serialize};

/// One labelled KPI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: u64,
}

/// The four headline metrics, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiBlock {
    pub metrics: Vec<Metric>,
}

impl From<Kpis> for KpiBlock {
    fn from(k: Kpis) -> Self {
        let metric = |label: &str, value| Metric {
            label: label.to_string(),
            value,
        };
        Self {
            metrics: vec![
                metric("Total Titles", k.total_titles),
                metric("Movies", k.movies),
                metric("TV Shows", k.tv_shows),
                metric("Unique Directors", k.unique_directors),
            ],
        }
    }
}

/// A point on the titles-added line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: u64,
}

/// Ordered (year, count) series for a line plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSeries {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<Point>,
}

impl YearSeries {
    pub fn titles_added(series: &[YearCount]) -> Self {
        Self {
            title: "Titles Added by Year".into(),
            x_label: "YearAdded".into(),
            y_label: "added".into(),
            points: series
                .iter()
                .map(|p| Point {
                    x: p.year,
                    y: p.count,
                })
                .collect(),
        }
    }
}

/// How a ranked view is meant to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Bar,
    Pie,
    Table,
}

/// A ranked (label, count) table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedTable {
    pub title: String,
    pub label_column: String,
    pub count_column: String,
    pub display: ViewKind,
    pub rows: Vec<Ranked>,
}

impl RankedTable {
    fn new(title: String, label: &str, count: &str, display: ViewKind, rows: Vec<Ranked>) -> Self {
        Self {
            title,
            label_column: label.into(),
            count_column: count.into(),
            display,
            rows,
        }
    }

    pub fn countries(rows: Vec<Ranked>, cap: usize) -> Self {
        let title = format!("Top {} Countries by Content Count", cap);
        Self::new(title, "Country", "ContentCount", ViewKind::Bar, rows)
    }

    pub fn genres(rows: Vec<Ranked>, cap: usize) -> Self {
        let title = format!("Top {} Genres", cap);
        Self::new(title, "Genre", "GenreCount", ViewKind::Pie, rows)
    }

    pub fn directors(rows: Vec<Ranked>, cap: usize) -> Self {
        let title = format!("Top {} Directors by Title Count", cap);
        Self::new(title, "Director", "TitleCount", ViewKind::Table, rows)
    }
}

/// Everything one dashboard render needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub kpis: KpiBlock,
    pub titles_by_year: YearSeries,
    pub top_countries: RankedTable,
    pub top_genres: RankedTable,
    pub top_directors: RankedTable,
}

impl Dashboard {
    pub fn ranked_tables(&self) -> [(&'static str, &RankedTable); 3] {
        [
            ("top_countries", &self.top_countries),
            ("top_genres", &self.top_genres),
            ("top_directors", &self.top_directors),
        ]
    }
}

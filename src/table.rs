// src/table.rs
use anyhow::{anyhow, Result};
use arrow::{
    array::{Array, Date32Array, Int32Array, Int64Array, StringArray},
    datatypes::SchemaRef,
    record_batch::RecordBatch,
};
use serde::{Deserialize, Serialize};

pub const TYPE: &str = "type";
pub const DIRECTOR: &str = "director";
pub const COUNTRY: &str = "country";
pub const DATE_ADDED: &str = "date_added";
pub const RELEASE_YEAR: &str = "release_year";
pub const LISTED_IN: &str = "listed_in";

/// Derived by the enricher.
pub const YEAR_ADDED: &str = "YearAdded";
pub const RELEASE_YEAR_DERIVED: &str = "ReleaseYear";

/// Columns a source must carry for the aggregates to be computable.
pub const REQUIRED_COLUMNS: [&str; 6] = [TYPE, DIRECTOR, COUNTRY, DATE_ADDED, RELEASE_YEAR, LISTED_IN];

/// The `type` of a title.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Movie,
    TvShow,
    /// Anything else, including a missing value.
    Other(String),
}

impl ContentType {
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Movie => "Movie",
            ContentType::TvShow => "TV Show",
            ContentType::Other(s) => s,
        }
    }

}

/// Exact match, like the dashboard filters do. `"movie"` is `Other`.
impl From<&str> for ContentType {
    fn from(s: &str) -> Self {
        match s {
            "Movie" => ContentType::Movie,
            "TV Show" => ContentType::TvShow,
            other => ContentType::Other(other.to_string()),
        }
    }
}

/// An in-memory table of title records.
///
/// Wraps an Arrow `RecordBatch` whose schema has every source column as
/// nullable `Utf8`, except `date_added` (`Date32`) and `release_year`
/// (`Int64`). After enrichment it also carries `YearAdded` (`Int32`) and
/// `ReleaseYear` (`Int64`).
#[derive(Clone, Debug, PartialEq)]
pub struct TitleTable {
    batch: RecordBatch,
}

impl TitleTable {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.column_by_name(name).is_some()
    }

    fn column<T: Array + 'static>(&self, name: &str) -> Result<&T> {
        let col = self
            .batch
            .column_by_name(name)
            .ok_or_else(|| anyhow!("column `{}` not found", name))?;
        col.as_any().downcast_ref::<T>().ok_or_else(|| {
            anyhow!(
                "column `{}` has type {:?}, not the expected one",
                name,
                col.data_type()
            )
        })
    }

    pub fn utf8(&self, name: &str) -> Result<&StringArray> {
        self.column::<StringArray>(name)
    }

    pub fn date32(&self, name: &str) -> Result<&Date32Array> {
        self.column::<Date32Array>(name)
    }

    pub fn int32(&self, name: &str) -> Result<&Int32Array> {
        self.column::<Int32Array>(name)
    }

    pub fn int64(&self, name: &str) -> Result<&Int64Array> {
        self.column::<Int64Array>(name)
    }

    /// `type` of every row, in row order.
    pub fn content_types(&self) -> Result<Vec<ContentType>> {
        let arr = self.utf8(TYPE)?;
        Ok(arr
            .iter()
            .map(|v| ContentType::from(v.unwrap_or_default()))
            .collect())
    }
}

impl From<RecordBatch> for TitleTable {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}

// src/enrich.rs
use crate::process::convert::days_to_date;
use crate::table::{TitleTable, DATE_ADDED, RELEASE_YEAR, RELEASE_YEAR_DERIVED, YEAR_ADDED};
use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, Int32Array},
    datatypes::{Field, Schema},
    record_batch::RecordBatch,
};
use chrono::Datelike;
use std::sync::Arc;

/// Put `col` under `name`, replacing an existing column of that name in place
/// or appending it at the end.
fn upsert_column(batch: &RecordBatch, name: &str, col: ArrayRef) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
    let field = Field::new(name, col.data_type().clone(), true);

    match schema.index_of(name) {
        Ok(i) => {
            fields[i] = field;
            columns[i] = col;
        }
        Err(_) => {
            fields.push(field);
            columns.push(col);
        }
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .with_context(|| format!("adding column `{}`", name))
}

/// Add the derived year columns:
/// - `YearAdded`: calendar year of `date_added`, null where the date is null
/// - `ReleaseYear`: copy of `release_year`
///
/// Rows are never filtered. Running this on an already-enriched table
/// rewrites both columns with identical values.
pub fn enrich(table: &TitleTable) -> Result<TitleTable> {
    let dates = table.date32(DATE_ADDED)?;
    let year_added: Int32Array = dates
        .iter()
        .map(|days| days.and_then(days_to_date).map(|d| d.year()))
        .collect();
    debug_assert_eq!(year_added.len(), table.num_rows());

    let release = table.int64(RELEASE_YEAR)?.clone();

    let batch = upsert_column(table.batch(), YEAR_ADDED, Arc::new(year_added))?;
    let batch = upsert_column(&batch, RELEASE_YEAR_DERIVED, Arc::new(release))?;
    Ok(TitleTable::new(batch))
}

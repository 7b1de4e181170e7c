use crate::process::{date_parser, utils};
use crate::table::{DATE_ADDED, RELEASE_YEAR};
use arrow::{
    array::{Array, ArrayRef, Date32Builder, Int64Builder, StringArray},
    datatypes::{DataType, Field, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::{debug, warn};

/// Days from 0001-01-01 (CE) to 1970-01-01, the Date32 epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
}

/// Outcome of converting the raw string batch.
pub struct Converted {
    pub batch: RecordBatch,
    /// Non-blank `date_added` cells that no known layout could parse.
    pub bad_dates: usize,
    /// Non-blank `release_year` cells that were not integers.
    pub bad_years: usize,
}

fn parse_dates(sarr: &StringArray) -> (ArrayRef, usize) {
    let mut b = Date32Builder::with_capacity(sarr.len());
    let mut bad = 0;
    for opt in sarr.iter() {
        let raw = utils::non_missing(opt);
        let days = raw.and_then(date_parser::parse_date).map(date_to_days);
        if let (Some(s), None) = (raw, days) {
            debug!(value = s, "unparseable date_added");
            bad += 1;
        }
        b.append_option(days);
    }
    (Arc::new(b.finish()) as ArrayRef, bad)
}

fn parse_years(sarr: &StringArray) -> (ArrayRef, usize) {
    let mut b = Int64Builder::with_capacity(sarr.len());
    let mut bad = 0;
    for opt in sarr.iter() {
        let raw = utils::non_missing(opt);
        let year = raw.and_then(utils::parse_int);
        if raw.is_some() && year.is_none() {
            bad += 1;
        }
        b.append_option(year);
    }
    (Arc::new(b.finish()) as ArrayRef, bad)
}

/// Convert the all-string batch into the title schema: `date_added` becomes
/// `Date32`, `release_year` becomes `Int64`, everything else stays `Utf8`.
pub fn convert_to_final_types(batch: &RecordBatch) -> Result<Converted, ArrowError> {
    let mut out = Vec::with_capacity(batch.num_columns());
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut bad_dates = 0;
    let mut bad_years = 0;

    for (arr, fld) in batch.columns().iter().zip(batch.schema().fields()) {
        let sarr = arr.as_any().downcast_ref::<StringArray>();
        match (sarr, fld.name().as_str()) {
            (Some(sarr), DATE_ADDED) => {
                let (col, bad) = parse_dates(sarr);
                bad_dates = bad;
                fields.push(Field::new(DATE_ADDED, DataType::Date32, true));
                out.push(col);
            }
            (Some(sarr), RELEASE_YEAR) => {
                let (col, bad) = parse_years(sarr);
                bad_years = bad;
                fields.push(Field::new(RELEASE_YEAR, DataType::Int64, true));
                out.push(col);
            }
            _ => {
                fields.push(fld.as_ref().clone());
                out.push(arr.clone());
            }
        }
    }

    if bad_dates > 0 {
        warn!(bad_dates, "date_added values could not be parsed; left undefined");
    }
    if bad_years > 0 {
        warn!(bad_years, "release_year values were not integers; left undefined");
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), out)?;
    Ok(Converted {
        batch,
        bad_dates,
        bad_years,
    })
}

// src/process/mod.rs
pub mod convert;
pub mod date_parser;
pub mod source;
pub mod utils;

pub use source::{Source, SourceKey};

use crate::error::LoadError;
use crate::table::{TitleTable, REQUIRED_COLUMNS};
use arrow::{
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
};
use std::{io::Cursor, sync::Arc};
use tracing::{debug, info};

/// Rows per Arrow batch while reading; batches are concatenated afterwards.
const BATCH_SIZE: usize = 8192;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header names of the CSV, trimmed.
fn read_headers(data: &[u8]) -> Result<Vec<String>, LoadError> {
    let (schema, _) = Format::default()
        .with_header(true)
        .infer_schema(Cursor::new(data), Some(0))?;
    Ok(schema
        .fields()
        .iter()
        .map(|f| f.name().trim().to_string())
        .collect())
}

/// All required columns absent from `headers`, in canonical order.
fn missing_columns(headers: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|req| !headers.iter().any(|h| h == *req))
        .map(|req| req.to_string())
        .collect()
}

/// Parse CSV bytes into a title table.
///
/// Every column is read as a string first, then `date_added` and
/// `release_year` are converted (see [`convert::convert_to_final_types`]).
/// Unparseable dates become null; a missing required column is fatal. Rows
/// shorter than the header are padded with nulls, longer rows are an error.
pub fn load_csv_bytes(data: &[u8]) -> Result<TitleTable, LoadError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let headers = read_headers(data)?;
    let missing = missing_columns(&headers);
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let fields: Vec<Field> = headers
        .iter()
        .map(|n| Field::new(n, DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_truncated_rows(true)
        .with_batch_size(BATCH_SIZE)
        .build(Cursor::new(data))?;

    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    debug!(batches = batches.len(), "read CSV batches");
    let raw = concat_batches(&schema, &batches)?;

    let converted = convert::convert_to_final_types(&raw).map_err(LoadError::Convert)?;
    info!(
        rows = converted.batch.num_rows(),
        columns = converted.batch.num_columns(),
        bad_dates = converted.bad_dates,
        "loaded title table"
    );
    Ok(TitleTable::new(converted.batch))
}

/// Read a source and parse it. Uncached; see [`crate::cache::LoadCache`].
#[tracing::instrument(level = "info", skip(source), fields(source = %source))]
pub fn load_source(source: &Source) -> Result<TitleTable, LoadError> {
    let bytes = source.read()?;
    load_csv_bytes(&bytes)
}

/// Like [`load_source`], but fails with [`LoadError::Changed`] if a file
/// source no longer matches `key` once its bytes are in hand.
pub fn load_unchanged(source: &Source, key: &SourceKey) -> Result<TitleTable, LoadError> {
    let bytes = source.read()?;
    if let Source::Path(path) = source {
        if source.key()? != *key {
            return Err(LoadError::Changed { path: path.clone() });
        }
    }
    load_csv_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{COUNTRY, DATE_ADDED, DIRECTOR, LISTED_IN, RELEASE_YEAR};
    use anyhow::Result;
    use arrow::array::Array;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,titlestats::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const NETFLIX_LIKE: &str = r#"show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description
s1,Movie,Dick Johnson Is Dead,Kirsten Johnson,,United States,"September 25, 2021",2020,PG-13,90 min,Documentaries,"As her father nears the end of his life, filmmaker Kirsten Johnson stages his death."
s2,TV Show,Blood & Water,,"Ama Qamata, Khosi Ngema",South Africa,"September 24, 2021",2021,TV-MA,2 Seasons,"International TV Shows, TV Dramas, TV Mysteries","After crossing paths at a party, a Cape Town teen sets out to prove whether a private-school swimming star is her sister."
s3,TV Show,Ganglands,Julien Leclercq,Sami Bouajila,,"September 24, 2021",2021,TV-MA,1 Season,"Crime TV Shows, International TV Shows, TV Action & Adventure","To protect his family from a powerful drug lord, skilled thief Mehdi and his expert team of robbers are pulled into a violent and deadly turf war."
s4,Movie,Sankofa,Haile Gerima,,"United States, Ghana, Burkina Faso",,1993,TV-MA,125 min,"Dramas, Independent Movies, International Movies","On a photo shoot in Ghana, an American model slips back in time."
"#;

    #[test]
    fn loads_netflix_shaped_csv() -> Result<()> {
        init_test_logging();
        let table = load_csv_bytes(NETFLIX_LIKE.as_bytes())?;
        assert_eq!(table.num_rows(), 4);
        assert_eq!(table.batch().num_columns(), 12);

        let dates = table.date32(DATE_ADDED)?;
        assert_eq!(dates.value_as_date(0), NaiveDate::from_ymd_opt(2021, 9, 25));
        assert!(dates.is_null(3));

        let years = table.int64(RELEASE_YEAR)?;
        assert_eq!(years.value(3), 1993);

        let directors = table.utf8(DIRECTOR)?;
        assert!(directors.is_null(1) || directors.value(1).is_empty());

        let countries = table.utf8(COUNTRY)?;
        assert_eq!(countries.value(3), "United States, Ghana, Burkina Faso");
        Ok(())
    }

    #[test]
    fn header_only_is_an_empty_table() -> Result<()> {
        let table = load_csv_bytes(b"type,director,country,date_added,release_year,listed_in\n")?;
        assert!(table.is_empty());
        assert!(table.date32(DATE_ADDED).is_ok());
        Ok(())
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let err = load_csv_bytes(b"type,director,release_year\nMovie,A,2020\n").unwrap_err();
        match err {
            LoadError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["country", "date_added", "listed_in"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_rows_are_padded_with_nulls() -> Result<()> {
        let csv = b"type,director,country,date_added,release_year,listed_in\nMovie,A,US,2021-01-01,2020,Drama\nTV Show,B,US\n";
        let table = load_csv_bytes(csv)?;
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.utf8(COUNTRY)?.value(1), "US");
        assert!(table.date32(DATE_ADDED)?.is_null(1));
        assert!(table.int64(RELEASE_YEAR)?.is_null(1));
        assert!(table.utf8(LISTED_IN)?.is_null(1));
        Ok(())
    }

    #[test]
    fn long_rows_are_a_csv_error() {
        let csv = b"type,director,country,date_added,release_year,listed_in\nMovie,A,US,2021-01-01,2020,Drama,extra\n";
        assert!(matches!(load_csv_bytes(csv), Err(LoadError::Csv(_))));
    }

    #[test]
    fn empty_input_is_a_load_error() {
        assert!(load_csv_bytes(b"").is_err());
    }

    #[test]
    fn bom_and_padded_headers_are_tolerated() -> Result<()> {
        let csv = b"\xEF\xBB\xBFtype, director,country,date_added,release_year,listed_in\nMovie,A,US,2021-01-01,2020,Drama\n";
        let table = load_csv_bytes(csv)?;
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.utf8(DIRECTOR)?.value(0), "A");
        Ok(())
    }

    #[test]
    fn load_source_reads_files() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(NETFLIX_LIKE.as_bytes())?;
        tmp.flush()?;
        let table = load_source(&Source::from_path(tmp.path()))?;
        assert_eq!(table.num_rows(), 4);
        Ok(())
    }

    #[test]
    fn file_edited_after_keying_is_reported() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(NETFLIX_LIKE.as_bytes())?;
        tmp.flush()?;
        let src = Source::from_path(tmp.path());
        let key = src.key()?;
        assert_eq!(load_unchanged(&src, &key)?.num_rows(), 4);

        tmp.write_all(b"s5,Movie,X,Y,,Chile,2021-01-01,2020,,,Dramas,\n")?;
        tmp.flush()?;
        assert!(matches!(
            load_unchanged(&src, &key),
            Err(LoadError::Changed { .. })
        ));
        assert_eq!(load_unchanged(&src, &src.key()?)?.num_rows(), 5);
        Ok(())
    }
}

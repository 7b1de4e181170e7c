// src/error.rs
use arrow::error::ArrowError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors while turning a source into a title table.
///
/// No partial table is ever produced alongside one of these.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source could not be read at all.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not well-formed CSV.
    #[error("CSV parse error: {0}")]
    Csv(#[from] ArrowError),

    /// One or more required columns are absent from the header.
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The file's fingerprint moved between keying it and reading it.
    #[error("{} changed while it was being read", .path.display())]
    Changed { path: PathBuf },

    /// Typed conversion of the parsed columns failed.
    #[error("column conversion failed: {0}")]
    Convert(#[source] ArrowError),
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}

//! Descriptive statistics over a catalogue of streaming titles.
//!
//! Load a CSV (`process`), optionally through a keyed cache (`cache`), derive
//! the year columns (`enrich`), compute the five dashboard views
//! (`aggregate`) and hand them to a renderer (`present`). `pipeline` strings
//! the steps together.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod enrich;
pub mod error;
pub mod pipeline;
pub mod present;
pub mod process;
pub mod table;

pub use cache::LoadCache;
pub use error::LoadError;
pub use pipeline::{build_dashboard, Pipeline};
pub use process::{load_csv_bytes, load_source, Source, SourceKey};
pub use table::TitleTable;

//! sp-results: summary tables, failure reports and the summary cache.

pub mod hash;
pub mod series;
pub mod store;
pub mod table_io;
pub mod types;

use std::path::PathBuf;

pub use hash::{FileStamp, compute_fingerprint};
pub use series::{RunSeriesPaths, write_stage_series, write_trajectory};
pub use store::SummaryStore;
pub use table_io::{read_summary, write_failures, write_rows, write_runs, write_summary};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Summary file not found: {path}")]
    MissingSummaryFile { path: PathBuf },

    #[error("Summary manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("{path} has no column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path}, row {row}: column '{column}' is not numeric ('{value}')")]
    Parse {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Table shape error: {what}")]
    Shape { what: String },
}

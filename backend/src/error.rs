//! Error taxonomy of the dashboard core.
//!
//! `QueryError` aborts a fetch cycle (or an option enumeration) and is
//! surfaced once to the caller. `ExportError` only concerns the caller that
//! asked for the export; it never touches the loaded result set. An empty
//! result is not an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("request to the query service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("query service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode rows: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("could not read data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("query task aborted: {0}")]
    Join(String),

    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet serialization failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("export i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

use thiserror::Error;

use crate::store::StoreError;

/// Errors that abort a whole import job
///
/// Row-level problems never surface here; they are collected into the
/// [`JobResult`](crate::model::JobResult) instead.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The feed is not readable as CSV at all
    #[error("Failed to parse CSV feed: {0}")]
    CsvError(#[from] csv::Error),

    /// Failed to set up the HTTP client
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to read the input file
    #[error("Failed to read input: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Storage could not be opened or prepared
    #[error("Storage error: {0}")]
    StoreError(#[from] StoreError),
}

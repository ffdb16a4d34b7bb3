//! Error types for courier-rates
//!
//! Loading and quoting never fail (bad tariff rows are dropped, unknown
//! destinations quote as zero). Errors only come from files, config and
//! invoice numbering.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// courier-rates errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Tariff error: {0}")]
    Tariff(String),

    #[error("Invalid invoice number: {0}")]
    InvoiceNumber(String),

    #[error("Unknown branch: {0}")]
    UnknownBranch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

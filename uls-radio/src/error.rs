use thiserror::Error;

/// Errors raised by the loader, query engine and export pipeline
#[derive(Error, Debug)]
pub enum UlsError {
    /// Unsupported radio profile, non-positive name length, empty service list
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Missing or malformed search criteria, rejected before any I/O
    #[error("invalid input: {0}")]
    InputValidation(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("flat file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("download error: {0}")]
    Download(String),

    #[error("archive error: {0}")]
    Archive(String),
}

pub type Result<T> = std::result::Result<T, UlsError>;

//! Error types for spreadsheet ingestion

use thiserror::Error;

/// Result type alias using [`IngestError`]
pub type Result<T> = std::result::Result<T, IngestError>;

/// Everything that can stop a spreadsheet from becoming the served record set.
///
/// None of these variants ever touch the record store: the caller only
/// publishes a record set after the whole pipeline returned `Ok`.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Upload request carried no `file` field
    #[error("no file uploaded")]
    NoFileProvided,

    /// Bytes could not be opened as a workbook or CSV file
    #[error("unreadable spreadsheet: {0}")]
    UnreadableSpreadsheet(String),

    /// No row within the scan bound satisfied the header policy
    #[error("could not find a header row in the first {scanned} rows")]
    HeaderNotFound { scanned: usize },

    /// Anything else: I/O, worker panics
    #[error("server fault: {0}")]
    ServerFault(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::Error> for IngestError {
    fn from(err: calamine::Error) -> Self {
        IngestError::UnreadableSpreadsheet(err.to_string())
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::UnreadableSpreadsheet(err.to_string())
    }
}

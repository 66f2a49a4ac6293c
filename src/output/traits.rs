//! Record sink trait and error types
//!
//! A sink receives the complete record set after every extracted record and replaces
//! whatever it held before, so its contents always equal everything extracted so far.

use crate::record::AccidentRecord;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Durable destination for harvested records
pub trait RecordSink {
    /// Replaces the stored record set with `records`
    fn persist(&mut self, records: &[AccidentRecord]) -> OutputResult<()>;

    /// Where the records end up, if they end up in a file
    fn location(&self) -> Option<&Path> {
        None
    }
}

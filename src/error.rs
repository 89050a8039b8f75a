//! Error types for sort operations.

use std::path::Path;

use thiserror::Error;

use crate::storage::RunId;

/// Result type alias for sort operations
pub type Result<T> = std::result::Result<T, SortError>;

/// Error type for sort operations
#[derive(Error, Debug)]
pub enum SortError {
    /// The input file does not exist
    #[error("Input file not found: {path}")]
    NotFound {
        /// Path of the missing file
        path: String,
    },

    /// The key column could not be resolved against the header
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey {
        /// The requested key, a column name or an index
        key: String,
        /// Explanation of why it does not resolve
        reason: String,
    },

    /// The input has no header row
    #[error("Input file has no header: {path}")]
    EmptyInput {
        /// Path of the empty file
        path: String,
    },

    /// A record with a field count different from the header
    #[error("Malformed record at line {line}: expected {expected} fields, found {found}")]
    MalformedRecord {
        /// Line number of the record, starting at 1 for the header
        line: u64,
        /// Number of fields in the header
        expected: usize,
        /// Number of fields in the record
        found: usize,
    },

    /// I/O failure while reading, writing or removing a file
    #[error("I/O failure, {context}: {source}")]
    Io {
        /// What was being done
        context: String,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by the CSV reader or writer
    #[error("CSV failure, {context}: {source}")]
    Csv {
        /// What was being done
        context: String,
        /// The underlying error
        #[source]
        source: csv::Error,
    },

    /// Run storage was asked for a run it does not hold
    #[error("Run storage failure, run {run}: {reason}")]
    Storage {
        /// The run identifier
        run: RunId,
        /// Explanation of the failure
        reason: String,
    },
}

impl SortError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> SortError {
        SortError::Io { context: context.into(), source }
    }

    pub(crate) fn csv(context: impl Into<String>, source: csv::Error) -> SortError {
        if let csv::ErrorKind::UnequalLengths { pos, expected_len, len } = source.kind() {
            return SortError::MalformedRecord {
                line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
                expected: *expected_len as usize,
                found: *len as usize,
            };
        }
        SortError::Csv { context: context.into(), source }
    }

    /// Map an open failure on the input, reporting a missing file as [SortError::NotFound]
    pub(crate) fn open_input(path: &Path, source: std::io::Error) -> SortError {
        if source.kind() == std::io::ErrorKind::NotFound {
            SortError::NotFound { path: path.to_string_lossy().to_string() }
        } else {
            SortError::io(format!("open {}", path.to_string_lossy()), source)
        }
    }
}

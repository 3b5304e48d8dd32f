//! Distribution load errors
//!
//! Every variant is fatal to the load call only. The caller decides whether
//! to abort or to continue without weighted packet lengths.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for distribution loading
pub type LoadResult<T> = Result<T, LoadError>;

/// Distribution load errors
#[derive(Error, Debug)]
pub enum LoadError {
    /// The distribution file could not be opened or read
    #[error("Could not open traffic packet length distribution file: {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Growing the entry list failed
    #[error("Out of memory while reading distribution ({entries} entries loaded)")]
    OutOfMemory { entries: usize },

    /// Slot allocation ran past the fixed table capacity
    #[error("Length table overflow: {requested} slots requested, capacity is {capacity}")]
    TableOverflow { requested: usize, capacity: usize },

    /// A row did not hold two unsigned integers (strict parsing only)
    #[error("Malformed distribution record on line {line}: {content:?}")]
    MalformedRecord { line: usize, content: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_source() {
        let err = LoadError::SourceUnavailable {
            path: PathBuf::from("/tmp/missing.csv"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "Could not open traffic packet length distribution file: /tmp/missing.csv"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_overflow_message() {
        let err = LoadError::TableOverflow {
            requested: 10_001,
            capacity: 10_000,
        };
        assert!(err.to_string().contains("10001 slots requested"));
    }
}

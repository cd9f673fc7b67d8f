//! Metadata errors
//!
//! Raised by table description providers, by the description parser, and by
//! the cache when a caller's deadline passes mid-fetch.

use thiserror::Error;

/// Result type for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Metadata errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("metadata request throttled: {0}")]
    Throttled(String),

    #[error("metadata transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("cannot decode table description: {0}")]
    Decode(String),

    #[error("invalid description for table {table}: {reason}")]
    InvalidDescription { table: String, reason: String },

    #[error("deadline exceeded while fetching metadata for table {0}")]
    DeadlineExceeded(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MetadataError {
    /// Create an invalid description error
    pub fn invalid(table: impl Into<String>, reason: impl Into<String>) -> Self {
        MetadataError::InvalidDescription {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            MetadataError::TableNotFound(_) => "AUTOINDEX_TABLE_NOT_FOUND",
            MetadataError::Throttled(_) => "AUTOINDEX_METADATA_THROTTLED",
            MetadataError::Transport(_) => "AUTOINDEX_METADATA_TRANSPORT",
            MetadataError::Io(_) => "AUTOINDEX_METADATA_IO",
            MetadataError::Decode(_) => "AUTOINDEX_METADATA_DECODE",
            MetadataError::InvalidDescription { .. } => "AUTOINDEX_INVALID_DESCRIPTION",
            MetadataError::DeadlineExceeded(_) => "AUTOINDEX_DEADLINE_EXCEEDED",
            MetadataError::Internal(_) => "AUTOINDEX_INTERNAL",
        }
    }

    /// Whether retrying the same call later may succeed.
    ///
    /// Informational only; nothing in this crate retries.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MetadataError::Throttled(_)
                | MetadataError::Transport(_)
                | MetadataError::DeadlineExceeded(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            MetadataError::TableNotFound("t".into()).code(),
            "AUTOINDEX_TABLE_NOT_FOUND"
        );
        assert_eq!(
            MetadataError::invalid("t", "no HASH key").code(),
            "AUTOINDEX_INVALID_DESCRIPTION"
        );
        assert_eq!(
            MetadataError::DeadlineExceeded("t".into()).code(),
            "AUTOINDEX_DEADLINE_EXCEEDED"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(MetadataError::Throttled("slow down".into()).is_transient());
        assert!(!MetadataError::TableNotFound("t".into()).is_transient());
        assert!(!MetadataError::invalid("t", "x").is_transient());
    }

    #[test]
    fn test_display_includes_table_and_reason() {
        let err = MetadataError::invalid("orders", "missing ItemCount");
        let display = err.to_string();
        assert!(display.contains("orders"));
        assert!(display.contains("missing ItemCount"));
    }
}

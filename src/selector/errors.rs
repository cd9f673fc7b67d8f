//! Selection errors
//!
//! Error codes:
//! - AUTOINDEX_METADATA_UNAVAILABLE
//! - AUTOINDEX_INDEX_NOT_VIABLE
//! - AUTOINDEX_NO_VIABLE_INDEX

use std::fmt;

use thiserror::Error;

use super::viability::Infraction;
use crate::metadata::MetadataError;

/// Selection error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionErrorCode {
    /// Table metadata could not be obtained
    MetadataUnavailable,
    /// One index cannot serve the expression
    IndexNotViable,
    /// No index can serve the expression
    NoViableIndex,
}

impl SelectionErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SelectionErrorCode::MetadataUnavailable => "AUTOINDEX_METADATA_UNAVAILABLE",
            SelectionErrorCode::IndexNotViable => "AUTOINDEX_INDEX_NOT_VIABLE",
            SelectionErrorCode::NoViableIndex => "AUTOINDEX_NO_VIABLE_INDEX",
        }
    }
}

impl fmt::Display for SelectionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Why one index was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNotViable {
    pub index_name: String,
    /// Infractions in rule order, never empty
    pub reasons: Vec<Infraction>,
}

impl IndexNotViable {
    pub fn new(index_name: impl Into<String>, reasons: Vec<Infraction>) -> Self {
        Self {
            index_name: index_name.into(),
            reasons,
        }
    }

    pub fn code(&self) -> SelectionErrorCode {
        SelectionErrorCode::IndexNotViable
    }

    /// Reasons as messages
    pub fn reason_messages(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for IndexNotViable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "index {} is not viable: {}",
            self.index_name,
            self.reason_messages().join("; ")
        )
    }
}

impl std::error::Error for IndexNotViable {}

/// Every index of a table was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoViableIndex {
    pub table_name: String,
    /// One entry per index, in metadata order
    pub rejections: Vec<IndexNotViable>,
}

impl NoViableIndex {
    pub fn code(&self) -> SelectionErrorCode {
        SelectionErrorCode::NoViableIndex
    }

    /// Rejection of one index by name
    pub fn rejection(&self, index_name: &str) -> Option<&IndexNotViable> {
        self.rejections.iter().find(|r| r.index_name == index_name)
    }
}

impl fmt::Display for NoViableIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no viable index for table {} ({} rejected)",
            self.table_name,
            self.rejections.len()
        )?;
        for rejection in &self.rejections {
            write!(f, "\n  index {}:", rejection.index_name)?;
            for reason in &rejection.reasons {
                write!(f, "\n    - {}", reason)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for NoViableIndex {}

/// Errors returned by index selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The provider (or parsing its output) failed; carried unchanged
    #[error(transparent)]
    MetadataUnavailable(#[from] MetadataError),

    #[error(transparent)]
    NoViableIndex(#[from] NoViableIndex),
}

impl SelectionError {
    pub fn code(&self) -> SelectionErrorCode {
        match self {
            SelectionError::MetadataUnavailable(_) => SelectionErrorCode::MetadataUnavailable,
            SelectionError::NoViableIndex(_) => SelectionErrorCode::NoViableIndex,
        }
    }

    /// Per-index rejections when no index was viable
    pub fn rejections(&self) -> Option<&[IndexNotViable]> {
        match self {
            SelectionError::NoViableIndex(e) => Some(&e.rejections),
            SelectionError::MetadataUnavailable(_) => None,
        }
    }
}

/// Result type for selection
pub type SelectionResult<T> = Result<T, SelectionError>;

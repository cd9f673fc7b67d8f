//! Observable events emitted by the metadata cache and the index selector.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Metadata cache
    /// Cached index metadata served
    MetadataCacheHit,
    /// Table not yet cached
    MetadataCacheMiss,

    // Metadata provider
    /// Provider call begins
    MetadataFetchBegin,
    /// Provider call returned a description
    MetadataFetchComplete,
    /// Provider call or parse failed; nothing cached
    MetadataFetchFailed,
    /// Description parsed into index metadata and cached
    MetadataParsed,

    // Selection
    /// An index was chosen for an expression
    IndexSelected,
    /// Every index was rejected
    IndexSelectionRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::MetadataCacheHit => "METADATA_CACHE_HIT",
            Event::MetadataCacheMiss => "METADATA_CACHE_MISS",
            Event::MetadataFetchBegin => "METADATA_FETCH_BEGIN",
            Event::MetadataFetchComplete => "METADATA_FETCH_COMPLETE",
            Event::MetadataFetchFailed => "METADATA_FETCH_FAILED",
            Event::MetadataParsed => "METADATA_PARSED",
            Event::IndexSelected => "INDEX_SELECTED",
            Event::IndexSelectionRejected => "INDEX_SELECTION_REJECTED",
        }
    }

    /// Severity this event is logged at.
    ///
    /// Every event is TRACE: failures reach the caller as values, and the
    /// host application's default output stays quiet.
    pub fn severity(&self) -> Severity {
        Severity::Trace
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Observability for index selection
//!
//! - Structured logging (JSON lines)
//! - Typed events
//! - Per-client counters
//!
//! Observability is read-only: errors are always returned to the caller,
//! events only record that they happened.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, SelectorMetrics};

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // Verifies no panic
        log_event(Event::MetadataCacheMiss);
        log_event(Event::IndexSelected);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::MetadataParsed, &[("table", "orders"), ("indexes", "3")]);
    }

    #[test]
    fn test_default_floor_emits_no_events() {
        let events = [
            Event::MetadataCacheHit,
            Event::MetadataCacheMiss,
            Event::MetadataFetchBegin,
            Event::MetadataFetchComplete,
            Event::MetadataFetchFailed,
            Event::MetadataParsed,
            Event::IndexSelected,
            Event::IndexSelectionRejected,
        ];

        let mut buffer = Vec::new();
        for event in events {
            Logger::log_at_floor(
                Severity::default(),
                event.severity(),
                event.as_str(),
                &[("code", "AUTOINDEX_TABLE_NOT_FOUND"), ("table", "missing")],
                &mut buffer,
            );
        }
        assert!(buffer.is_empty());
    }
}

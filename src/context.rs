//! Query Context
//!
//! Carried unchanged from the caller through the metadata cache into the
//! table description provider.

use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

/// Per-call context
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Request ID for tracing
    pub request_id: Uuid,

    /// Point after which a metadata fetch on this caller's behalf is abandoned
    pub deadline: Option<Instant>,
}

impl QueryContext {
    /// Context with a fresh request id and no deadline
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            deadline: None,
        }
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().with_deadline(Instant::now() + timeout)
    }

    /// Sets the deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Time left before the deadline, `None` when unbounded
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// True once the deadline has passed
    pub fn is_expired(&self) -> bool {
        matches!(self.remaining(), Some(d) if d.is_zero())
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::new()
    }
}

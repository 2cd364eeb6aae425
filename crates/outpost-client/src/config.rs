//! Selector configuration.

use std::time::Duration;

/// Configuration for a selector set's cache and event channel.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Maximum number of memoized query results.
    ///
    /// The cache evicts least-recently-used entries past this bound; an
    /// evicted key is simply re-queried on its next request.
    pub max_entries: u64,
    /// Optional time-to-live for memoized results.
    ///
    /// `None` keeps values until evicted by capacity, matching the original
    /// resolve-once selector behavior.
    pub time_to_live: Option<Duration>,
    /// Buffered capacity of the change-notification channel.
    pub event_capacity: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            time_to_live: None,
            event_capacity: 64,
        }
    }
}

impl SelectorConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of memoized results.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: u64) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set a time-to-live for memoized results.
    #[must_use]
    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }

    /// Set the event channel capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

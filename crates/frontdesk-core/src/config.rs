//! Tuning knobs for search and the mailbox views.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default quiet time before a search runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Number of documents shown per mailbox page.
pub const PAGE_SIZE: usize = 10;

/// Search aggregator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before the fan-out fires.
    #[serde(with = "duration_millis")]
    pub debounce: Duration,
    /// Merged results are truncated to this many entries.
    pub max_results: usize,
    /// Trimmed queries shorter than this clear the results without a call.
    pub min_query_len: usize,
    /// Page size requested from the tenant directory.
    pub directory_page_size: u32,
    /// Upper bound on a single source call; slower sources count as unavailable.
    #[serde(with = "duration_millis")]
    pub source_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            max_results: 10,
            min_query_len: 2,
            directory_page_size: 10,
            source_timeout: Duration::from_secs(10),
        }
    }
}

impl SearchConfig {
    /// Sets the debounce interval.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the per-source timeout.
    #[must_use]
    pub const fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    /// Sets the result cap.
    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Mailbox configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// Documents per page.
    pub page_size: usize,
    /// Length of generated pickup codes.
    pub pickup_code_len: usize,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            pickup_code_len: 6,
        }
    }
}

/// Serde helpers for `Duration` stored as whole milliseconds.
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref, clippy::cast_possible_truncation)] // serde with= signature; config values never approach u64::MAX ms
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

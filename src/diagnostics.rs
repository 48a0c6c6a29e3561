use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::RequestError;

/// How many times an identical message is logged before it is suppressed.
pub const DEFAULT_REPEAT_LIMIT: u64 = 1;

/// Per-campaign sink for classified request errors.
///
/// Every report is counted; only the first `repeat_limit` occurrences of a
/// given message are logged. Never consulted for control flow.
#[derive(Debug)]
pub struct Diagnostics {
    repeat_limit: u64,
    counts: Mutex<HashMap<String, u64>>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DEFAULT_REPEAT_LIMIT)
    }
}

impl Diagnostics {
    #[must_use]
    pub fn new(repeat_limit: u64) -> Self {
        Self {
            repeat_limit,
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Records `error` and logs it unless its message was already shown
    /// `repeat_limit` times. Returns whether it was logged.
    pub fn report(&self, error: &RequestError) -> bool {
        let message = error.to_string();
        let count = {
            let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
            let entry = counts.entry(message.clone()).or_insert(0);
            *entry = entry.saturating_add(1);
            *entry
        };

        if count <= self.repeat_limit {
            warn!(kind = error.kind().as_str(), "{}", message);
            true
        } else {
            if count == self.repeat_limit.saturating_add(1) {
                debug!("Suppressing further occurrences of: {}", message);
            }
            false
        }
    }

    #[must_use]
    pub fn occurrences(&self, message: &str) -> u64 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(message)
            .copied()
            .unwrap_or(0)
    }

    /// All messages seen, most frequent first.
    #[must_use]
    pub fn summary(&self) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(message, count)| (message.clone(), *count))
            .collect();
        entries.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));
        entries
    }

    pub fn log_summary(&self) {
        for (message, count) in self.summary() {
            debug!("{} (x{})", message, count);
        }
    }
}

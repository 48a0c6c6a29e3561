use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{FailureKind, RequestError};

/// What a worker reports for one attempted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub elapsed: Duration,
    pub bytes: u64,
    pub error: Option<RequestError>,
}

impl Outcome {
    #[must_use]
    pub const fn success(elapsed: Duration, bytes: u64) -> Self {
        Self {
            elapsed,
            bytes,
            error: None,
        }
    }

    #[must_use]
    pub const fn failure(elapsed: Duration, error: RequestError) -> Self {
        Self {
            elapsed,
            bytes: 0,
            error: Some(error),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureTally {
    pub count: u64,
    pub total_time: Duration,
}

impl FailureTally {
    #[must_use]
    pub fn average(&self) -> Duration {
        let nanos = self
            .total_time
            .as_nanos()
            .checked_div(u128::from(self.count))
            .unwrap_or(0);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

/// Accumulated campaign statistics, owned by the monitor until termination.
///
/// `total_requests == total_success + total_failed` holds after every
/// [`RunningStats::record`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningStats {
    pub total_requests: u64,
    pub total_success: u64,
    pub total_failed: u64,
    pub failures: BTreeMap<FailureKind, FailureTally>,
    pub response_times: Vec<Duration>,
    pub total_response_time: Duration,
    pub total_received: u64,
    pub total_execution_time: Duration,
}

impl RunningStats {
    pub fn record(&mut self, outcome: Outcome) {
        self.total_requests = self.total_requests.saturating_add(1);
        self.total_received = self.total_received.saturating_add(outcome.bytes);
        match outcome.error {
            None => {
                self.total_success = self.total_success.saturating_add(1);
                self.total_response_time = self.total_response_time.saturating_add(outcome.elapsed);
                self.response_times.push(outcome.elapsed);
            }
            Some(error) => {
                self.total_failed = self.total_failed.saturating_add(1);
                let tally = self.failures.entry(error.kind()).or_default();
                tally.count = tally.count.saturating_add(1);
                tally.total_time = tally.total_time.saturating_add(outcome.elapsed);
            }
        }
    }

    #[must_use]
    pub fn failure_count(&self, kind: FailureKind) -> u64 {
        self.failures.get(&kind).map_or(0, |tally| tally.count)
    }
}

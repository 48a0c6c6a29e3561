//! Final campaign report: text rendering and JSON export.
mod export;
mod text;


use std::time::Duration;

use crate::domain::LoadPlan;
use crate::error::FailureKind;
use crate::metrics::{LatencySummary, RunningStats};
use crate::run::{MonitorReport, ProbeFacts, StopReason};

pub use export::export_json;
pub use text::report_lines;

const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MICRO: u128 = 1_000;
const BYTES_PER_KB: u64 = 1_024;
/// Two decimal places for fixed-point rates.
const RATE_SCALE: u128 = 100;

/// Everything the report layer prints or exports for one campaign.
#[derive(Debug, Clone)]
pub struct Report {
    pub url: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub concurrency: usize,
    pub planned_requests: u64,
    pub stop_reason: StopReason,
    pub probe: ProbeFacts,
    pub stats: RunningStats,
    pub latency: LatencySummary,
}

impl Report {
    #[must_use]
    pub fn new(plan: &LoadPlan, monitor: MonitorReport, probe: ProbeFacts) -> Self {
        let latency = LatencySummary::from_samples(&monitor.stats.response_times);
        Self {
            url: plan.target.url.to_string(),
            host: plan.target.host.clone(),
            port: plan.target.port,
            path: plan.target.path.clone(),
            concurrency: plan.concurrency,
            planned_requests: plan.requests,
            stop_reason: monitor.stop_reason,
            probe,
            stats: monitor.stats,
            latency,
        }
    }

    #[must_use]
    pub fn non_2xx(&self) -> u64 {
        self.stats.failure_count(FailureKind::Response)
    }

    /// Requests per second, scaled by 100.
    #[must_use]
    pub fn requests_per_sec_x100(&self) -> u128 {
        per_second(
            u128::from(self.stats.total_requests).saturating_mul(RATE_SCALE),
            self.stats.total_execution_time,
        )
    }

    /// Mean wall-clock time per request for one worker.
    #[must_use]
    pub fn time_per_request(&self) -> Duration {
        let concurrency = u128::try_from(self.concurrency).unwrap_or(u128::MAX);
        let nanos = self
            .stats
            .total_execution_time
            .as_nanos()
            .saturating_mul(concurrency)
            .checked_div(u128::from(self.stats.total_requests))
            .unwrap_or(0);
        nanos_to_duration(nanos)
    }

    /// Mean wall-clock time per request across all workers.
    #[must_use]
    pub fn time_per_request_all(&self) -> Duration {
        let nanos = self
            .stats
            .total_execution_time
            .as_nanos()
            .checked_div(u128::from(self.stats.total_requests))
            .unwrap_or(0);
        nanos_to_duration(nanos)
    }

    /// Received kilobytes per second, scaled by 100. Partial kilobytes are
    /// dropped before dividing.
    #[must_use]
    pub fn transfer_rate_kb_x100(&self) -> u128 {
        let kilobytes = self.stats.total_received.checked_div(BYTES_PER_KB).unwrap_or(0);
        per_second(
            u128::from(kilobytes).saturating_mul(RATE_SCALE),
            self.stats.total_execution_time,
        )
    }

    #[must_use]
    pub fn bytes_per_sec(&self) -> u128 {
        per_second(
            u128::from(self.stats.total_received),
            self.stats.total_execution_time,
        )
    }
}

fn per_second(count: u128, elapsed: Duration) -> u128 {
    count
        .saturating_mul(NANOS_PER_SEC)
        .checked_div(elapsed.as_nanos())
        .unwrap_or(0)
}

fn nanos_to_duration(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

fn duration_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos().checked_div(NANOS_PER_MICRO).unwrap_or(0))
        .unwrap_or(u64::MAX)
}

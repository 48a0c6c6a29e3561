//! Outcome accumulation and latency statistics.
mod stats;
mod types;


pub use stats::{LatencySummary, PERCENTILES, PercentileValue, mean, percentile, sorted, std_dev};
pub use types::{FailureTally, Outcome, RunningStats};

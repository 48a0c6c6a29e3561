//! Reducers over the successful-latency sample list.
//!
//! Everything is computed in integer nanoseconds; empty input yields zeros.
use std::time::Duration;

/// Percentiles shown in the report. `100` is the maximum.
pub const PERCENTILES: [u64; 9] = [50, 66, 75, 80, 90, 95, 98, 99, 100];

const PERCENT_DIVISOR: u64 = 100;

fn nanos_to_duration(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

fn len_u128(samples: &[Duration]) -> u128 {
    u128::try_from(samples.len()).unwrap_or(u128::MAX)
}

#[must_use]
pub fn mean(samples: &[Duration]) -> Duration {
    let total: u128 = samples.iter().map(Duration::as_nanos).sum();
    nanos_to_duration(total.checked_div(len_u128(samples)).unwrap_or(0))
}

/// Population standard deviation (not Bessel-corrected).
#[must_use]
pub fn std_dev(samples: &[Duration]) -> Duration {
    if samples.is_empty() {
        return Duration::ZERO;
    }
    let mean_nanos = mean(samples).as_nanos();
    let squares: u128 = samples
        .iter()
        .map(|sample| {
            let deviation = sample.as_nanos().abs_diff(mean_nanos);
            deviation.saturating_mul(deviation)
        })
        .fold(0u128, u128::saturating_add);
    let variance = squares.checked_div(len_u128(samples)).unwrap_or(0);
    nanos_to_duration(variance.isqrt())
}

#[must_use]
pub fn sorted(samples: &[Duration]) -> Vec<Duration> {
    let mut ordered = samples.to_vec();
    ordered.sort_unstable();
    ordered
}

/// Nearest-rank lookup `sorted[p * len / 100]`, clamped to the last sample.
#[must_use]
pub fn percentile(sorted: &[Duration], percentile: u64) -> Duration {
    let Some(last) = sorted.len().checked_sub(1) else {
        return Duration::ZERO;
    };
    let len = u64::try_from(sorted.len()).unwrap_or(u64::MAX);
    let rank = percentile
        .saturating_mul(len)
        .checked_div(PERCENT_DIVISOR)
        .unwrap_or(0);
    let idx = usize::try_from(rank).unwrap_or(last).min(last);
    sorted.get(idx).copied().unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PercentileValue {
    pub percentile: u64,
    pub latency: Duration,
}

/// Reduced view of the success latencies, as printed by the report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatencySummary {
    pub count: usize,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub median: Duration,
    pub std_dev: Duration,
    pub percentiles: Vec<PercentileValue>,
}

impl LatencySummary {
    #[must_use]
    pub fn from_samples(samples: &[Duration]) -> Self {
        let ordered = sorted(samples);
        let percentiles = PERCENTILES
            .iter()
            .map(|p| PercentileValue {
                percentile: *p,
                latency: percentile(&ordered, *p),
            })
            .collect();

        Self {
            count: ordered.len(),
            min: ordered.first().copied().unwrap_or_default(),
            max: ordered.last().copied().unwrap_or_default(),
            mean: mean(&ordered),
            median: percentile(&ordered, 50),
            std_dev: std_dev(&ordered),
            percentiles,
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::trace;

/// Shortest refill tick; higher rates add several tokens per tick.
const MIN_REFILL_INTERVAL: Duration = Duration::from_millis(1);
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Token bucket pacing request issuance to a fixed rate per second.
///
/// The bucket starts with one token and holds at most one refill tick worth
/// of tokens, so idle workers cannot bank a burst. Without a rate every
/// [`RateLimiter::acquire`] returns immediately.
#[derive(Debug)]
pub struct RateLimiter {
    permits: Option<Arc<Semaphore>>,
    refill: Option<JoinHandle<()>>,
}

impl RateLimiter {
    /// Must be called inside a tokio runtime when `rate` is set.
    #[must_use]
    pub fn new(rate: Option<u64>) -> Self {
        match rate.filter(|rate| *rate > 0) {
            Some(rate) => {
                let permits = Arc::new(Semaphore::new(1));
                let refill = spawn_refill_controller(Arc::clone(&permits), rate);
                Self {
                    permits: Some(permits),
                    refill: Some(refill),
                }
            }
            None => Self::unlimited(),
        }
    }

    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            permits: None,
            refill: None,
        }
    }

    #[must_use]
    pub const fn is_limited(&self) -> bool {
        self.permits.is_some()
    }

    /// Waits until one more request may be sent. Never rejects.
    pub async fn acquire(&self, worker_id: usize) {
        let Some(permits) = self.permits.as_ref() else {
            return;
        };
        match permits.acquire().await {
            Ok(permit) => permit.forget(),
            Err(err) => trace!(worker = worker_id, "Rate limiter closed: {}", err),
        }
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        if let Some(refill) = self.refill.take() {
            refill.abort();
        }
    }
}

fn refill_interval(rate: u64) -> Duration {
    let nanos = NANOS_PER_SEC.checked_div(u128::from(rate)).unwrap_or(0);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)).max(MIN_REFILL_INTERVAL)
}

fn tokens_per_tick(rate: u64, tick: Duration) -> usize {
    let owed = tick.as_nanos().saturating_mul(u128::from(rate));
    let tokens = owed.div_ceil(NANOS_PER_SEC).max(1);
    usize::try_from(tokens)
        .unwrap_or(usize::MAX)
        .min(Semaphore::MAX_PERMITS)
}

fn div_mod_u128(value: u128, divisor: u128) -> (u128, u128) {
    if divisor == 0 {
        return (0, 0);
    }
    let div = value.checked_div(divisor).unwrap_or(0);
    let rem = value.checked_rem(divisor).unwrap_or(0);
    (div, rem)
}

fn spawn_refill_controller(limiter: Arc<Semaphore>, rate: u64) -> JoinHandle<()> {
    let tick = refill_interval(rate);
    let capacity = tokens_per_tick(rate, tick);
    tokio::spawn(async move {
        let mut refill_tick = interval(tick);
        refill_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        refill_tick.tick().await;
        let mut last = Instant::now();
        // Sub-token remainder in nanosecond-tokens, carried across ticks.
        let mut carry: u128 = 0;
        loop {
            refill_tick.tick().await;
            let now = Instant::now();
            let elapsed = now.saturating_duration_since(last);
            last = now;

            let owed = elapsed
                .as_nanos()
                .saturating_mul(u128::from(rate))
                .saturating_add(carry);
            let (tokens, remainder) = div_mod_u128(owed, NANOS_PER_SEC);
            carry = remainder;

            let room = capacity.saturating_sub(limiter.available_permits());
            let add = usize::try_from(tokens).unwrap_or(usize::MAX).min(room);
            if add > 0 {
                limiter.add_permits(add);
            }
        }
    })
}

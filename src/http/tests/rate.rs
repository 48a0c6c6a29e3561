use super::*;
use tokio::time::{Instant, sleep};

#[test]
fn unlimited_limiter_never_waits() -> AppResult<()> {
    run_paused_test(async {
        let limiter = RateLimiter::new(None);
        if limiter.is_limited() {
            return Err(AppError::validation("Expected an unlimited limiter"));
        }
        let started = Instant::now();
        for _ in 0..1_000 {
            limiter.acquire(0).await;
        }
        if started.elapsed() != Duration::ZERO {
            return Err(AppError::validation("Unlimited acquire should not wait"));
        }
        Ok(())
    })
}

#[test]
fn limiter_paces_to_configured_rate() -> AppResult<()> {
    run_paused_test(async {
        let limiter = RateLimiter::new(Some(10));
        let started = Instant::now();
        for _ in 0..5 {
            limiter.acquire(0).await;
        }
        let elapsed = started.elapsed();
        // first token is immediate, the next four arrive every 100ms
        if elapsed < Duration::from_millis(400) || elapsed > Duration::from_millis(450) {
            return Err(AppError::validation(format!(
                "Unexpected pacing: {:?}",
                elapsed
            )));
        }
        Ok(())
    })
}

#[test]
fn idle_limiter_does_not_bank_a_burst() -> AppResult<()> {
    run_paused_test(async {
        let limiter = RateLimiter::new(Some(1_000));
        sleep(Duration::from_secs(1)).await;

        let started = Instant::now();
        for _ in 0..3 {
            limiter.acquire(0).await;
        }
        if started.elapsed() < Duration::from_millis(1) {
            return Err(AppError::validation(
                "Tokens accumulated while idle should be capped",
            ));
        }
        Ok(())
    })
}

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

/// Upper bound on the spacing; larger configured delays are clamped to it.
pub const MAX_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// The `RateLimiter` enforces a minimum spacing between outbound requests.
///
/// The only state is the time the last request was permitted. It is held behind an
/// async mutex for the whole wait, so callers sharing one limiter proceed one at a
/// time in arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    /// The minimum spacing between two permitted requests.
    delay: Duration,
    /// When the previous request was let through.
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        if delay > MAX_DELAY {
            warn!("Rate-limit delay {:?} exceeds {:?}; clamping", delay, MAX_DELAY);
        }
        Self {
            delay: delay.min(MAX_DELAY),
            last_request: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until at least `delay` has elapsed since the previous permitted call,
    /// then records now as the new last-call time. The first call never waits.
    pub async fn respect_rate_limit(&self) {
        let mut last_request = self.last_request.lock().await;

        if let Some(previous) = *last_request {
            let ready_at = previous
                .checked_add(self.delay)
                .unwrap_or_else(|| Instant::now() + MAX_DELAY);
            if ready_at > Instant::now() {
                debug!("Rate limit: waiting {:?}", ready_at - Instant::now());
                sleep_until(ready_at).await;
            }
        }

        *last_request = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_call_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = std::time::Instant::now();
        limiter.respect_rate_limit().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_back_to_back_calls_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(300));

        limiter.respect_rate_limit().await;
        let first = std::time::Instant::now();
        limiter.respect_rate_limit().await;

        assert!(first.elapsed() >= Duration::from_millis(290));
    }

    #[tokio::test]
    async fn test_no_wait_after_delay_already_elapsed() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        limiter.respect_rate_limit().await;
        tokio::time::sleep(Duration::from_millis(120)).await;

        let start = std::time::Instant::now();
        limiter.respect_rate_limit().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_huge_delay_is_clamped() {
        let limiter = RateLimiter::new(Duration::from_millis(u64::MAX));
        assert_eq!(limiter.delay(), MAX_DELAY);

        // Only the first call; the second would legitimately wait a day.
        let start = std::time::Instant::now();
        limiter.respect_rate_limit().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_second_call_with_huge_delay_waits_instead_of_panicking() {
        let limiter = RateLimiter::new(Duration::MAX);
        limiter.respect_rate_limit().await;

        let second = tokio::time::timeout(Duration::from_millis(50), limiter.respect_rate_limit()).await;
        assert!(second.is_err(), "second call should still be waiting");
    }

    #[tokio::test]
    async fn test_independent_limiters_do_not_interfere() {
        let a = RateLimiter::new(Duration::from_secs(5));
        let b = RateLimiter::new(Duration::from_secs(5));
        a.respect_rate_limit().await;

        let start = std::time::Instant::now();
        b.respect_rate_limit().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_concurrent_callers_are_serialized() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(100)));
        let start = std::time::Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.respect_rate_limit().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        // Three permits need two full gaps.
        assert!(start.elapsed() >= Duration::from_millis(195));
    }
}

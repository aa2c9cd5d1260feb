//! Minimum-spacing rate limiter shared by every outbound request.
//!
//! One timestamp covers all upstreams, so a CoinGecko call and a Yahoo call
//! issued back to back are still spaced by the full delay. This bounds the
//! total outbound rate rather than the per-provider rate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tickr_api::RequestGate;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Default spacing between consecutive outbound calls.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(1500);

/// Spaces outbound calls by at least `min_delay`.
///
/// Each caller reserves the next free slot under the lock and sleeps after
/// releasing it, so concurrent callers queue up one `min_delay` apart
/// without holding the lock across the wait.
pub struct RateLimiter {
    next_slot: Mutex<Option<Instant>>,
    min_delay: Duration,
    granted: AtomicU64,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            next_slot: Mutex::new(None),
            min_delay,
            granted: AtomicU64::new(0),
        }
    }

    /// Waits until at least `min_delay` has passed since the previously
    /// granted call, then returns. Call once before each outbound request.
    pub async fn throttle(&self) {
        let slot = {
            let mut last = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *last {
                Some(prev) if prev + self.min_delay > now => prev + self.min_delay,
                _ => now,
            };
            *last = Some(slot);
            slot
        };

        let wait = slot.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            tracing::debug!("Rate limiter waiting {:.2}s", wait.as_secs_f64());
            sleep_until(slot).await;
        }
        self.granted.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of calls let through so far.
    pub fn granted(&self) -> u64 {
        self.granted.load(Ordering::Relaxed)
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }
}

/// Clients gated on the limiter throttle before each HTTP request they send.
#[async_trait]
impl RequestGate for RateLimiter {
    async fn wait(&self) {
        self.throttle().await;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn first_call_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        let start = Instant::now();
        limiter.throttle().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.granted(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn back_to_back_calls_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(1500));
        let start = Instant::now();
        limiter.throttle().await;
        limiter.throttle().await;
        limiter.throttle().await;
        assert!(start.elapsed() >= Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_gap_resets_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        limiter.throttle().await;
        tokio::time::advance(Duration::from_secs(5)).await;

        let before = Instant::now();
        limiter.throttle().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_serialize() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(1)));
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move {
                    limiter.throttle().await;
                    Instant::now()
                })
            })
            .collect();

        let mut granted_at = Vec::new();
        for handle in handles {
            granted_at.push(handle.await.unwrap());
        }
        granted_at.sort();

        assert_eq!(granted_at[0], start);
        assert!(granted_at[1] - granted_at[0] >= Duration::from_secs(1));
        assert!(granted_at[2] - granted_at[1] >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn partial_elapsed_waits_remainder() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        limiter.throttle().await;
        tokio::time::advance(Duration::from_millis(500)).await;

        let before = Instant::now();
        limiter.throttle().await;
        assert_eq!(before.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn gate_wait_is_a_throttled_call() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let gate: &dyn RequestGate = &limiter;
        let start = Instant::now();
        gate.wait().await;
        gate.wait().await;
        assert_eq!(limiter.granted(), 2);
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[test]
    fn default_delay() {
        assert_eq!(RateLimiter::default().min_delay(), Duration::from_millis(1500));
    }
}

//! Outbound call throttling for quota-constrained APIs
//!
//! Alpha Vantage's free tier allows five calls per minute and rejects the
//! sixth with a "Note" payload instead of an HTTP error, so calls are held
//! back client-side. [`FixedWindowLimiter`] counts calls in a fixed window and
//! sleeps out the rest of the window once the quota is used up.
//! [`SmoothThrottle`] spaces calls evenly using `governor`, which suits
//! providers with generous per-minute quotas.

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

/// Length of a quota window
pub const QUOTA_WINDOW: Duration = Duration::from_secs(60);

/// Alpha Vantage free tier: calls per [`QUOTA_WINDOW`]
pub const ALPHA_VANTAGE_FREE_QUOTA: u32 = 5;

/// Finnhub free tier: calls per minute
pub const FINNHUB_FREE_QUOTA: u32 = 60;

/// Gate that must be passed before every outbound call
#[async_trait]
pub trait Throttle: Send + Sync {
    /// Wait until a call is allowed; returns how long the caller was held
    async fn acquire(&self) -> Duration;
}

#[derive(Debug)]
struct WindowState {
    call_count: u32,
    window_start: Instant,
}

/// Fixed-window call counter.
///
/// The state lock is held while waiting, so callers sharing one limiter are
/// admitted one at a time and the count never exceeds the quota.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    quota: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

impl FixedWindowLimiter {
    /// Create a limiter allowing `quota` calls per `window`
    pub fn new(quota: u32, window: Duration) -> Self {
        Self {
            quota: quota.max(1),
            window,
            state: Mutex::new(WindowState {
                call_count: 0,
                window_start: Instant::now(),
            }),
        }
    }

    /// Limiter matching the Alpha Vantage free tier
    pub fn alpha_vantage_free_tier() -> Self {
        Self::new(ALPHA_VANTAGE_FREE_QUOTA, QUOTA_WINDOW)
    }

    /// Count the next call, sleeping out the current window first when the
    /// quota is already used.
    pub async fn check_and_wait(&self) -> Duration {
        let mut state = self.state.lock().await;

        let elapsed = state.window_start.elapsed();
        if elapsed > self.window {
            state.call_count = 0;
            state.window_start = Instant::now();
        }

        let mut waited = Duration::ZERO;
        if state.call_count >= self.quota {
            waited = self.window.saturating_sub(elapsed);
            info!(
                "Rate limit reached. Waiting for {:.2} seconds...",
                waited.as_secs_f64()
            );
            sleep(waited).await;
            state.call_count = 0;
            state.window_start = Instant::now();
        }

        state.call_count += 1;
        debug!("API call #{} in current window", state.call_count);
        waited
    }

    /// Calls counted in the current window
    pub async fn call_count(&self) -> u32 {
        self.state.lock().await.call_count
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }
}

#[async_trait]
impl Throttle for FixedWindowLimiter {
    async fn acquire(&self) -> Duration {
        self.check_and_wait().await
    }
}

/// Evenly spaced calls backed by a GCRA limiter
pub struct SmoothThrottle {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl SmoothThrottle {
    /// Allow `per_minute` calls per minute
    pub fn per_minute(per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::direct(quota),
        }
    }
}

#[async_trait]
impl Throttle for SmoothThrottle {
    async fn acquire(&self) -> Duration {
        let started = Instant::now();
        self.limiter.until_ready().await;
        started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_quota_calls_pass_without_waiting() {
        let limiter = FixedWindowLimiter::alpha_vantage_free_tier();

        for _ in 0..5 {
            assert_eq!(limiter.check_and_wait().await, Duration::ZERO);
        }
        assert_eq!(limiter.call_count().await, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sixth_call_waits_out_the_window() {
        let limiter = FixedWindowLimiter::new(5, QUOTA_WINDOW);
        let window_start = Instant::now();

        for _ in 0..5 {
            limiter.check_and_wait().await;
        }
        tokio::time::advance(Duration::from_secs(20)).await;

        let waited = limiter.check_and_wait().await;
        assert_eq!(waited, Duration::from_secs(40));
        assert!(window_start.elapsed() >= QUOTA_WINDOW);
        assert_eq!(limiter.call_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sixth_call_is_pending_until_window_ends() {
        let limiter = FixedWindowLimiter::new(5, QUOTA_WINDOW);
        for _ in 0..5 {
            limiter.check_and_wait().await;
        }

        let mut sixth = tokio_test::task::spawn(limiter.check_and_wait());
        tokio_test::assert_pending!(sixth.poll());

        tokio::time::advance(QUOTA_WINDOW).await;
        assert!(sixth.is_woken());
        tokio_test::assert_ready!(sixth.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_count_never_exceeds_quota() {
        let limiter = FixedWindowLimiter::new(5, QUOTA_WINDOW);

        for _ in 0..17 {
            limiter.check_and_wait().await;
            assert!(limiter.call_count().await <= limiter.quota());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_elapsing() {
        let limiter = FixedWindowLimiter::new(5, QUOTA_WINDOW);
        for _ in 0..5 {
            limiter.check_and_wait().await;
        }

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(limiter.check_and_wait().await, Duration::ZERO);
        assert_eq!(limiter.call_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_quota_is_clamped() {
        let limiter = FixedWindowLimiter::new(0, QUOTA_WINDOW);
        assert_eq!(limiter.quota(), 1);
        assert_eq!(limiter.acquire().await, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_smooth_throttle_first_call_is_immediate() {
        let throttle = SmoothThrottle::per_minute(FINNHUB_FREE_QUOTA);
        assert!(throttle.acquire().await < Duration::from_secs(1));
    }
}

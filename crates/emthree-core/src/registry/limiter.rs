//! Rolling-window request limiter shared by every registry call.
//!
//! The registry allows a fixed number of requests per minute. One limiter
//! instance is owned by a [`RegistryClient`](super::RegistryClient) and shared
//! by handle across all concurrent pipelines; the window state lives behind a
//! single async mutex so concurrent increments observe one consistent window.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default registry budget: 300 requests per 60 seconds.
pub const DEFAULT_MAX_REQUESTS: u32 = 300;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    count: u32,
    started: Option<Instant>,
}

/// Grants at most `max_requests` permits per `window`.
///
/// When the budget is exhausted mid-window, [`acquire`](Self::acquire) sleeps
/// out the remainder of the window while holding the lock, so every other
/// caller queues behind the same sleep instead of timing its own.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<Window>,
    total: AtomicU64,
    first: std::sync::OnceLock<Instant>,
}

impl RateLimiter {
    /// Create a limiter with an explicit budget.
    ///
    /// A budget of zero is clamped to one.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            state: Mutex::new(Window {
                count: 0,
                started: None,
            }),
            total: AtomicU64::new(0),
            first: std::sync::OnceLock::new(),
        }
    }

    /// Wait for one request permit.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        let started = match state.started {
            Some(started) if now.duration_since(started) < self.window => started,
            // First call, or the window ran out without hitting the budget.
            _ => {
                state.count = 0;
                state.started = Some(now);
                now
            }
        };

        if state.count >= self.max_requests {
            let remaining = self.window.saturating_sub(now.duration_since(started));
            tracing::info!(
                "Rate limited after {} requests, pausing for {:.1}s",
                state.count,
                remaining.as_secs_f64()
            );
            tokio::time::sleep(remaining).await;
            tracing::info!("Rate limit window elapsed, resuming");
            state.count = 0;
            state.started = Some(Instant::now());
        }

        state.count += 1;
        drop(state);

        self.total.fetch_add(1, Ordering::Relaxed);
        self.first.get_or_init(Instant::now);
    }

    /// Number of permits granted since creation.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Time since the first permit was granted, if any was.
    pub fn elapsed(&self) -> Option<Duration> {
        self.first.get().map(Instant::elapsed)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

//! Request rate limiter
//!
//! Token bucket shared by every clone of an [`ApiClient`](crate::ApiClient),
//! so the cap is global across concurrent callers rather than per caller.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Sustained requests per second. `0` disables limiting.
    pub requests_per_second: u32,
    /// Requests that may be issued back to back before the rate applies.
    pub burst: u32,
}

impl RateLimitConfig {
    pub fn new(requests_per_second: u32, burst: u32) -> Self {
        Self {
            requests_per_second,
            burst: burst.max(1),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.requests_per_second > 0
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Arc<Mutex<BucketState>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let state = BucketState {
            tokens: config.burst as f64,
            last_refill: Instant::now(),
        };
        Self {
            config,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Take one token, sleeping until one is available.
    ///
    /// Returns how long the caller waited, if at all.
    pub async fn acquire(&self) -> Option<Duration> {
        if !self.config.is_enabled() {
            return None;
        }

        // 待ち時間を予約してからロックを外して眠る。
        // トークンを先に負債として引くので、並行呼び出しは順番に並ぶ。
        let wait = {
            let mut state = self.state.lock().await;
            self.refill(&mut state);
            state.tokens -= 1.0;
            if state.tokens >= 0.0 {
                return None;
            }
            Duration::from_secs_f64(-state.tokens / self.config.requests_per_second as f64)
        };

        tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limited, waiting");
        tokio::time::sleep(wait).await;
        Some(wait)
    }

    /// Take one token if available right now.
    pub async fn try_acquire(&self) -> bool {
        if !self.config.is_enabled() {
            return true;
        }

        let mut state = self.state.lock().await;
        self.refill(&mut state);
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        let added = elapsed * self.config.requests_per_second as f64;
        state.tokens = (state.tokens + added).min(self.config.burst as f64);
        state.last_refill = now;
    }
}

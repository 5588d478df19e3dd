//! Fixed-window request limiting keyed by voter identity.
//!
//! State lives in process memory, so limits reset on restart and are not
//! shared between instances. Callers only see [`RateLimiter`], so a shared
//! TTL-capable store or another algorithm can replace [`FixedWindowLimiter`].

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

/// Entries past this count trigger a sweep of expired windows.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    /// Operation class, used as the key prefix.
    pub class: &'static str,
    pub max_requests: u32,
    pub window: Duration,
}

impl RatePolicy {
    pub const SUBMIT: RatePolicy = RatePolicy {
        class: "submit",
        max_requests: 3,
        window: Duration::from_secs(300),
    };

    pub const VOTE: RatePolicy = RatePolicy {
        class: "vote",
        max_requests: 10,
        window: Duration::from_secs(60),
    };

    pub fn key(&self, identity: &str) -> String {
        format!("{}:{}", self.class, identity)
    }
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Records one request against `key` and reports whether it may proceed.
    async fn allow(&self, key: &str, max_requests: u32, window: Duration) -> bool;

    async fn allow_policy(&self, policy: RatePolicy, identity: &str) -> bool {
        self.allow(&policy.key(identity), policy.max_requests, policy.window)
            .await
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

#[derive(Default)]
pub struct FixedWindowLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, key: &str, max_requests: u32, window: Duration, now: Instant) -> bool {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, w| now < w.reset_at);
        }

        match windows.get_mut(key) {
            Some(entry) if now < entry.reset_at => {
                if entry.count >= max_requests {
                    debug!(key, "rate limit exceeded");
                    return false;
                }
                entry.count += 1;
                true
            }
            _ => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                true
            }
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .map(|w| w.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    async fn allow(&self, key: &str, max_requests: u32, window: Duration) -> bool {
        self.check(key, max_requests, window, Instant::now())
    }
}

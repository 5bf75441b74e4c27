//! Login throttling against password guessing
//!
//! Failed attempts are counted per key (the normalised login email). Once
//! `max_attempts` failures land inside `window_seconds`, the key is blocked
//! for `ban_duration_seconds`. A successful login clears the counter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Failures allowed inside one window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,       // 5 minutes
            ban_duration_seconds: 900, // 15 minutes
        }
    }
}

#[derive(Debug)]
struct RateLimiterEntry {
    failures: u32,
    window_start: Instant,
    ban_expires: Option<Instant>,
}

impl RateLimiterEntry {
    /// Neither a live ban nor failures inside the current window
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        match self.ban_expires {
            Some(ban_expires) => now >= ban_expires,
            None => now.duration_since(self.window_start) >= window,
        }
    }
}

/// Rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether `key` may attempt a login right now
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_seconds);

        let Some((stale, ban_expires)) = entries
            .get(key)
            .map(|entry| (entry.is_stale(now, window), entry.ban_expires))
        else {
            return true;
        };

        if stale {
            entries.remove(key);
            return true;
        }

        !matches!(ban_expires, Some(ban_expires) if now < ban_expires)
    }

    /// Count a failed attempt; returns true when this failure triggers a ban
    pub async fn record_failure(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_seconds);

        // Keys that never reach a ban would otherwise stay forever
        entries.retain(|_, entry| !entry.is_stale(now, window));

        let entry = entries.entry(key.to_string()).or_insert(RateLimiterEntry {
            failures: 0,
            window_start: now,
            ban_expires: None,
        });

        if now.duration_since(entry.window_start) >= window {
            entry.failures = 0;
            entry.window_start = now;
            entry.ban_expires = None;
        }

        entry.failures += 1;
        if entry.failures >= self.config.max_attempts && entry.ban_expires.is_none() {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            warn!(
                "Blocked logins for {} for {} seconds after {} failures",
                key, self.config.ban_duration_seconds, entry.failures
            );
            return true;
        }

        false
    }

    /// Forget all failures for `key`
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.len()
    }
}

//! Fixed-window rate limiting keyed by action identifier.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use jiff::{SignedDuration, Timestamp};

use crate::config::RateLimitConfig;

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Timestamp,
    count: u32,
}

/// Counts requests per key inside a fixed window.
///
/// State lives in the instance; callers own its lifetime and call
/// [`RateLimiter::cleanup`] periodically to drop expired windows.
#[derive(Debug)]
pub struct RateLimiter {
    window: SignedDuration,
    max_requests: u32,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(window: SignedDuration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            windows: DashMap::new(),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        let window_secs = i64::try_from(config.window_secs).unwrap_or(i64::MAX);
        Self::new(SignedDuration::from_secs(window_secs), config.max_requests)
    }

    /// Counts one request for `key`. Returns false when the window is exhausted.
    pub fn check(&self, key: &str, now: Timestamp) -> bool {
        match self.windows.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                let window = entry.get_mut();
                if self.is_expired(window, now) {
                    *window = Window {
                        started_at: now,
                        count: 1,
                    };
                    return true;
                }
                if window.count >= self.max_requests {
                    return false;
                }
                window.count += 1;
                true
            }
            Entry::Vacant(entry) => {
                if self.max_requests == 0 {
                    return false;
                }
                entry.insert(Window {
                    started_at: now,
                    count: 1,
                });
                true
            }
        }
    }

    /// Requests still allowed for `key` in its current window.
    pub fn remaining(&self, key: &str, now: Timestamp) -> u32 {
        match self.windows.get(key) {
            Some(window) if !self.is_expired(&window, now) => {
                self.max_requests.saturating_sub(window.count)
            }
            _ => self.max_requests,
        }
    }

    /// Drops every expired window. Returns how many were removed.
    pub fn cleanup(&self, now: Timestamp) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, window| now.duration_since(window.started_at) < self.window);
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    fn is_expired(&self, window: &Window, now: Timestamp) -> bool {
        now.duration_since(window.started_at) >= self.window
    }
}
